use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    Button,
    Axis,
}

impl ControlKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Button => "Button",
            Self::Axis => "Axis",
        }
    }
}

/// Identifies a control. Ids are indices into the hardware button or axis
/// array, so they are only unique together with the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlKey {
    pub kind: ControlKind,
    pub id: u32,
}

impl ControlKey {
    pub fn button(id: u32) -> Self {
        Self { kind: ControlKind::Button, id }
    }

    pub fn axis(id: u32) -> Self {
        Self { kind: ControlKind::Axis, id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Which side of the device image the label line runs towards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDirection {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct ControlSpec {
    pub id: u32,
    pub kind: ControlKind,
    pub title: &'static str,
    /// Field name on the SDK gamepad object, e.g. `left_bumper`
    pub code_alias: &'static str,
    /// Point on the physical control
    pub origin: Point,
    /// Where the connector bends into the horizontal label line
    pub elbow: Point,
    pub direction: LineDirection,
    /// Mapped as a button but read by robot code as a float, like the triggers
    pub analog: bool,
}

impl ControlSpec {
    pub fn key(&self) -> ControlKey {
        ControlKey {
            kind: self.kind,
            id: self.id,
        }
    }

    /// "A Button", "Left Stick X Axis"
    pub fn full_title(&self) -> String {
        format!("{} {}", self.title, self.kind.label())
    }
}

#[derive(Debug, Clone)]
pub struct ImageRef {
    /// File stem of the background raster inside the asset directory
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct DeviceProfile {
    pub name: &'static str,
    pub image: ImageRef,
    /// Coordinate space of every anchor in `items`
    pub view_box: (f32, f32),
    pub items: Vec<ControlSpec>,
}

impl DeviceProfile {
    pub fn spec(&self, key: ControlKey) -> Option<&ControlSpec> {
        self.items.iter().find(|item| item.key() == key)
    }

    pub fn image_path(&self, asset_dir: &Path) -> PathBuf {
        asset_dir.join(format!("{}.png", self.image.name))
    }
}

fn button(
    id: u32,
    title: &'static str,
    code_alias: &'static str,
    origin: (f32, f32),
    direction: LineDirection,
    elbow: (f32, f32),
) -> ControlSpec {
    ControlSpec {
        id,
        kind: ControlKind::Button,
        title,
        code_alias,
        origin: Point::new(origin.0, origin.1),
        elbow: Point::new(elbow.0, elbow.1),
        direction,
        analog: false,
    }
}

fn axis(
    id: u32,
    title: &'static str,
    code_alias: &'static str,
    origin: (f32, f32),
    direction: LineDirection,
    elbow: (f32, f32),
) -> ControlSpec {
    ControlSpec {
        id,
        kind: ControlKind::Axis,
        title,
        code_alias,
        origin: Point::new(origin.0, origin.1),
        elbow: Point::new(elbow.0, elbow.1),
        direction,
        analog: false,
    }
}

fn trigger(
    id: u32,
    title: &'static str,
    code_alias: &'static str,
    origin: (f32, f32),
    direction: LineDirection,
    elbow: (f32, f32),
) -> ControlSpec {
    ControlSpec {
        analog: true,
        ..button(id, title, code_alias, origin, direction, elbow)
    }
}

static F310: LazyLock<DeviceProfile> = LazyLock::new(|| {
    use LineDirection::{Left, Right};

    DeviceProfile {
        name: "Logitech F310",
        image: ImageRef {
            name: "logitech_f310",
            width: 960,
            height: 455,
        },
        view_box: (1920.0, 911.0),
        items: vec![
            button(0, "A", "a", (1235.0, 480.0), Right, (1450.0, 519.0)),
            button(1, "B", "b", (1305.0, 410.0), Right, (1450.0, 451.0)),
            button(2, "X", "x", (1165.0, 410.0), Right, (1450.0, 378.0)),
            button(3, "Y", "y", (1235.0, 340.0), Right, (1450.0, 310.0)),
            button(4, "Left Bumper", "left_bumper", (695.0, 188.0), Left, (470.0, 210.0)),
            button(5, "Right Bumper", "right_bumper", (1225.0, 188.0), Right, (1450.0, 210.0)),
            trigger(6, "Left Trigger", "left_trigger", (695.0, 172.0), Left, (470.0, 137.0)),
            trigger(7, "Right Trigger", "right_trigger", (1225.0, 172.0), Right, (1450.0, 137.0)),
            button(8, "Back", "back", (861.0, 335.0), Left, (940.0, 127.0)),
            button(9, "Start", "start", (1059.0, 335.0), Right, (980.0, 127.0)),
            button(10, "Left Stick", "left_stick_button", (820.0, 560.0), Left, (470.0, 630.0)),
            button(11, "Right Stick", "right_stick_button", (1100.0, 560.0), Right, (1450.0, 650.0)),
            button(12, "D-Pad Up", "dpad_up", (687.0, 365.0), Left, (470.0, 310.0)),
            button(13, "D-Pad Down", "dpad_down", (687.0, 448.0), Left, (470.0, 530.0)),
            button(14, "D-Pad Left", "dpad_left", (642.0, 405.0), Left, (470.0, 457.0)),
            button(15, "D-Pad Right", "dpad_right", (735.0, 405.0), Left, (470.0, 383.0)),
            axis(0, "Left Stick X", "left_stick_x", (820.0, 560.0), Left, (550.0, 800.0)),
            axis(1, "Left Stick Y", "left_stick_y", (820.0, 560.0), Left, (940.0, 850.0)),
            axis(2, "Right Stick X", "right_stick_x", (1100.0, 560.0), Right, (1370.0, 800.0)),
            axis(3, "Right Stick Y", "right_stick_y", (1100.0, 560.0), Right, (980.0, 850.0)),
        ],
    }
});

/// The only supported controller
pub fn f310() -> &'static DeviceProfile {
    &F310
}
