use super::{InputDevice, InputEvent, RawSnapshot};
use gilrs::{Axis, Button, EventType, GamepadId, Gilrs};

/// Standard gamepad button order. Index is the profile button id.
pub const STANDARD_BUTTONS: [Button; 17] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
];

/// Standard gamepad axis order. Index is the profile axis id.
pub const STANDARD_AXES: [Axis; 4] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
];

/// Reads the first connected gamepad. Other pads are ignored until the
/// active one goes away.
pub struct InputReader {
    gilrs: Gilrs,
    active: Option<GamepadId>,
}

impl InputReader {
    pub fn new() -> anyhow::Result<Self> {
        let gilrs = Gilrs::new().map_err(|e| anyhow::anyhow!("Failed to initialize gilrs: {}", e))?;

        for (id, gamepad) in gilrs.gamepads() {
            log::info!("Found device: {} ({:?})", gamepad.name(), id);
        }

        Ok(Self {
            gilrs,
            active: None,
        })
    }

    /// Pads already attached at start-up never send a Connected event, so
    /// report them once here.
    pub fn initial_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        if self.active.is_none() {
            if let Some(id) = self.first_connected() {
                self.active = Some(id);
                events.push(InputEvent::DeviceConnected {
                    device: self.device_info(id),
                });
            }
        }
        events
    }

    fn first_connected(&self) -> Option<GamepadId> {
        self.gilrs
            .gamepads()
            .filter(|(_, gamepad)| gamepad.is_connected())
            .map(|(id, _)| id)
            .next()
    }

    fn device_info(&self, id: GamepadId) -> InputDevice {
        let gamepad = self.gilrs.gamepad(id);
        InputDevice {
            id: format!("{:?}", id),
            name: gamepad.name().to_string(),
        }
    }

    pub fn poll(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        while let Some(event) = self.gilrs.next_event() {
            match event.event {
                EventType::Connected => {
                    if self.active.is_none() {
                        self.active = Some(event.id);
                        let device = self.device_info(event.id);
                        log::info!("Gamepad connected: {} ({})", device.name, device.id);
                        events.push(InputEvent::DeviceConnected { device });
                    } else {
                        log::debug!("Ignoring additional gamepad {:?}", event.id);
                    }
                }
                EventType::Disconnected => {
                    if self.active != Some(event.id) {
                        continue;
                    }
                    self.active = None;
                    events.push(InputEvent::DeviceDisconnected {
                        device_id: format!("{:?}", event.id),
                    });

                    // Fall over to another pad that is still attached
                    if let Some(next) = self.first_connected() {
                        self.active = Some(next);
                        events.push(InputEvent::DeviceConnected {
                            device: self.device_info(next),
                        });
                    }
                }
                _ => {}
            }
        }

        events
    }

    /// Current state of the active pad, `None` while no pad is attached
    pub fn snapshot(&self) -> Option<RawSnapshot> {
        let gamepad = self.gilrs.connected_gamepad(self.active?)?;

        let buttons = STANDARD_BUTTONS
            .iter()
            .map(|button| gamepad.is_pressed(*button))
            .collect();
        let axes = STANDARD_AXES
            .iter()
            .map(|axis| gamepad.value(*axis))
            .collect();

        Some(RawSnapshot { buttons, axes })
    }
}
