mod reader;

pub use reader::*;

use crate::profile::{ControlKey, ControlKind};

/// Axis magnitude that counts as "moved"
pub const AXIS_DEADZONE: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct InputDevice {
    pub id: String,
    pub name: String,
}

/// Raw state of one gamepad at one poll tick, in standard layout order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSnapshot {
    pub buttons: Vec<bool>,
    /// -1.0..1.0
    pub axes: Vec<f32>,
}

impl RawSnapshot {
    /// Whether the control is currently pressed or pushed past the deadzone.
    /// `None` when the hardware reports no such index.
    pub fn is_active(&self, key: ControlKey) -> Option<bool> {
        let index = key.id as usize;
        match key.kind {
            ControlKind::Button => self.buttons.get(index).copied(),
            ControlKind::Axis => self
                .axes
                .get(index)
                .map(|value| value.abs() > AXIS_DEADZONE),
        }
    }
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    DeviceConnected { device: InputDevice },
    DeviceDisconnected { device_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_active_follows_pressed_flag() {
        let snapshot = RawSnapshot {
            buttons: vec![false, true],
            axes: vec![],
        };
        assert_eq!(snapshot.is_active(ControlKey::button(0)), Some(false));
        assert_eq!(snapshot.is_active(ControlKey::button(1)), Some(true));
    }

    #[test]
    fn test_axis_deadzone_is_exclusive() {
        let snapshot = RawSnapshot {
            buttons: vec![],
            axes: vec![0.5, -0.51, 0.49, -1.0],
        };
        assert_eq!(snapshot.is_active(ControlKey::axis(0)), Some(false));
        assert_eq!(snapshot.is_active(ControlKey::axis(1)), Some(true));
        assert_eq!(snapshot.is_active(ControlKey::axis(2)), Some(false));
        assert_eq!(snapshot.is_active(ControlKey::axis(3)), Some(true));
    }

    #[test]
    fn test_out_of_range_index_is_unknown() {
        let snapshot = RawSnapshot {
            buttons: vec![true],
            axes: vec![0.9],
        };
        assert_eq!(snapshot.is_active(ControlKey::button(5)), None);
        assert_eq!(snapshot.is_active(ControlKey::axis(1)), None);
    }

    #[test]
    fn test_nan_axis_is_inactive() {
        let snapshot = RawSnapshot {
            buttons: vec![],
            axes: vec![f32::NAN],
        };
        assert_eq!(snapshot.is_active(ControlKey::axis(0)), Some(false));
    }
}
