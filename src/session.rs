use crate::dialog::MappingDialog;
use crate::input::{InputEvent, RawSnapshot};
use crate::mapping::MappingStore;
use crate::poller::{ActivationQueue, ConnectionState, Poller, PollerEvent};
use crate::profile::{ControlKey, DeviceProfile};
use std::time::{Duration, Instant};

/// Connection, pending activations and the open mapping dialog.
///
/// At most one dialog is open. Activations that arrive meanwhile wait in a
/// FIFO and open one after the other as dialogs close.
pub struct MappingSession {
    profile: &'static DeviceProfile,
    poller: Poller,
    queue: ActivationQueue,
    dialog: Option<MappingDialog>,
    device_name: Option<String>,
}

impl MappingSession {
    pub fn new(profile: &'static DeviceProfile, settle_delay: Duration) -> Self {
        Self {
            profile,
            poller: Poller::new(settle_delay),
            queue: ActivationQueue::default(),
            dialog: None,
            device_name: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.poller.state()
    }

    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    /// Controls queued behind the open dialog
    pub fn waiting(&self) -> usize {
        self.queue.len()
    }

    pub fn dialog_mut(&mut self) -> Option<&mut MappingDialog> {
        self.dialog.as_mut()
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    /// Returns the connection change the event caused, if any
    pub fn handle_input_event(&mut self, event: InputEvent, now: Instant) -> Option<PollerEvent> {
        match event {
            InputEvent::DeviceConnected { device } => {
                let change = self.poller.on_connect(now)?;
                self.device_name = Some(device.name);
                Some(change)
            }
            InputEvent::DeviceDisconnected { device_id } => {
                let change = self.poller.on_disconnect()?;
                log::debug!("Lost {}", device_id);
                self.device_name = None;
                self.queue.clear();
                self.dialog = None;
                Some(change)
            }
        }
    }

    /// One poll tick: queue new activations, then open the next dialog if
    /// none is showing.
    pub fn tick(&mut self, store: &MappingStore, now: Instant, snapshot: Option<&RawSnapshot>) {
        for event in self.poller.tick(self.profile, now, snapshot) {
            if let PollerEvent::Activated(key) = event {
                self.enqueue(key);
            }
        }

        if self.dialog.is_none() {
            if let Some(spec) = self.queue.pop().and_then(|key| self.profile.spec(key)) {
                self.dialog = Some(MappingDialog::open_for(spec, store));
            }
        }
    }

    fn enqueue(&mut self, key: ControlKey) {
        if self.dialog.as_ref().is_some_and(|d| d.key == key) {
            return;
        }
        if !self.queue.push(key) {
            log::debug!("{:?} already waiting for the mapping dialog", key);
        }
    }
}
