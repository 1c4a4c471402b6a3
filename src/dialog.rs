use crate::error::Result;
use crate::mapping::{MappingStore, PressSemantics};
use crate::profile::{ControlKey, ControlKind, ControlSpec};
use crate::snippet;

/// Edit buffer of the mapping dialog for one control
#[derive(Debug, Clone, PartialEq)]
pub struct MappingDialog {
    pub key: ControlKey,
    pub title: &'static str,
    pub function_name: String,
    pub press: PressSemantics,
    pub export_in_code: bool,
}

impl MappingDialog {
    /// Pre-filled from the current mapping, if any
    pub fn open_for(spec: &ControlSpec, store: &MappingStore) -> Self {
        let entry = store.get(spec.key());
        Self {
            key: spec.key(),
            title: spec.title,
            function_name: entry.map(|e| e.function_name.clone()).unwrap_or_default(),
            press: entry.and_then(|e| e.press).unwrap_or_default(),
            export_in_code: entry.map(|e| e.export_in_code).unwrap_or(true),
        }
    }

    pub fn is_button(&self) -> bool {
        self.key.kind == ControlKind::Button
    }

    pub fn heading(&self) -> String {
        match self.key.kind {
            ControlKind::Button => format!("{} Pressed", self.title),
            ControlKind::Axis => format!("{} Moved", self.title),
        }
    }

    pub fn description(&self) -> String {
        match self.key.kind {
            ControlKind::Button => format!(
                "You pressed {}. Assign a function and choose a press type.",
                self.title
            ),
            ControlKind::Axis => format!("You moved {}. Assign a function.", self.title),
        }
    }

    /// Code the current selection would generate
    pub fn preview(&self, spec: &ControlSpec) -> String {
        let press = self.is_button().then_some(self.press);
        snippet::snippet(spec, press)
    }

    pub fn save(&self, store: &mut MappingStore) -> Result<()> {
        let press = self.is_button().then_some(self.press);
        store.assign(self.key, &self.function_name, press, self.export_in_code)
    }
}
