use crate::mapping::{MappingStore, PressSemantics};
use crate::profile::{ControlKind, ControlSpec, DeviceProfile};

/// Gamepad object exposed by the robot SDK
pub const SDK_PREFIX: &str = "gamepad1";

/// Analog button reading that counts as pressed in generated code
pub const TRIGGER_THRESHOLD: &str = "0.5";

fn camel_case(alias: &str) -> String {
    let mut out = String::with_capacity(alias.len());
    let mut upper = false;
    for c in alias.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Expression that reads the control, e.g. `gamepad1.leftBumperWasPressed()`
pub fn snippet(spec: &ControlSpec, press: Option<PressSemantics>) -> String {
    // The SDK has no edge helpers for analog buttons
    if spec.analog && spec.kind == ControlKind::Button {
        return format!("{}.{} > {}", SDK_PREFIX, spec.code_alias, TRIGGER_THRESHOLD);
    }

    match (spec.kind, press) {
        (ControlKind::Button, Some(PressSemantics::OnPress)) => {
            format!("{}.{}WasPressed()", SDK_PREFIX, camel_case(spec.code_alias))
        }
        (ControlKind::Button, Some(PressSemantics::OnRelease)) => {
            format!("{}.{}WasReleased()", SDK_PREFIX, camel_case(spec.code_alias))
        }
        _ => format!("{}.{}", SDK_PREFIX, spec.code_alias),
    }
}

/// Code for every mapped control flagged for export, in profile order
pub fn listing(profile: &DeviceProfile, store: &MappingStore) -> String {
    let mut lines = Vec::new();

    for spec in &profile.items {
        let Some(entry) = store.get(spec.key()) else {
            continue;
        };
        if !entry.export_in_code {
            continue;
        }

        let expr = snippet(spec, entry.press);
        let line = match spec.kind {
            ControlKind::Button => format!("if ({}) {{ {}(); }}", expr, entry.function_name),
            ControlKind::Axis => format!("{}({});", entry.function_name, expr),
        };
        lines.push(line);
    }

    lines.join("\n")
}
