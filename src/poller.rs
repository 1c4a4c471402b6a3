//! Connection state machine and rising-edge detection.
//!
//! The poller is driven once per UI frame. Edges are only evaluated while
//! the connection is `Ready`, which is entered a fixed settle delay after
//! the hardware reports a connect. Some drivers emit a burst of bogus
//! input right after attach; the delay swallows it.

use crate::input::RawSnapshot;
use crate::profile::{ControlKey, DeviceProfile};
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerEvent {
    Connected,
    Ready,
    Disconnected,
    /// A control went from inactive to active
    Activated(ControlKey),
}

pub struct Poller {
    state: ConnectionState,
    settle_delay: Duration,
    connected_at: Option<Instant>,
    /// Last observed active flag per control. Runtime only.
    previous: HashMap<ControlKey, bool>,
}

impl Poller {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            settle_delay,
            connected_at: None,
            previous: HashMap::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn on_connect(&mut self, now: Instant) -> Option<PollerEvent> {
        if self.state != ConnectionState::Disconnected {
            return None;
        }
        log::info!("Gamepad connected, settling for {:?}", self.settle_delay);
        self.state = ConnectionState::Connected;
        self.connected_at = Some(now);
        Some(PollerEvent::Connected)
    }

    pub fn on_disconnect(&mut self) -> Option<PollerEvent> {
        if self.state == ConnectionState::Disconnected {
            return None;
        }
        log::warn!("Gamepad disconnected");
        self.state = ConnectionState::Disconnected;
        self.connected_at = None;
        self.previous.clear();
        Some(PollerEvent::Disconnected)
    }

    /// Advance the settle timer and, once ready, compare `snapshot` against
    /// the previous tick. Controls the snapshot has no value for are skipped.
    pub fn tick(
        &mut self,
        profile: &DeviceProfile,
        now: Instant,
        snapshot: Option<&RawSnapshot>,
    ) -> Vec<PollerEvent> {
        let mut events = Vec::new();

        if self.state == ConnectionState::Connected {
            let settled = self
                .connected_at
                .is_some_and(|at| now.saturating_duration_since(at) >= self.settle_delay);
            if settled {
                log::info!("Gamepad ready");
                self.state = ConnectionState::Ready;
                self.connected_at = None;
                events.push(PollerEvent::Ready);
            }
        }

        if self.state != ConnectionState::Ready {
            return events;
        }
        let Some(snapshot) = snapshot else {
            return events;
        };

        for spec in &profile.items {
            let key = spec.key();
            let Some(active) = snapshot.is_active(key) else {
                continue;
            };

            let previous = self.previous.entry(key).or_insert(false);
            if active && !*previous {
                log::debug!("{} activated", spec.full_title());
                events.push(PollerEvent::Activated(key));
            }
            *previous = active;
        }

        events
    }
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_DELAY)
    }
}

/// Activations waiting for the mapping dialog, oldest first. A control that
/// is already waiting is not queued twice.
#[derive(Debug, Default)]
pub struct ActivationQueue {
    pending: VecDeque<ControlKey>,
}

impl ActivationQueue {
    /// Returns false when the key was coalesced into an existing entry
    pub fn push(&mut self, key: ControlKey) -> bool {
        if self.pending.contains(&key) {
            return false;
        }
        self.pending.push_back(key);
        true
    }

    pub fn pop(&mut self) -> Option<ControlKey> {
        self.pending.pop_front()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::f310;

    const TICK: Duration = Duration::from_millis(16);

    fn idle() -> RawSnapshot {
        RawSnapshot {
            buttons: vec![false; 17],
            axes: vec![0.0; 4],
        }
    }

    fn with_button(id: usize) -> RawSnapshot {
        let mut snapshot = idle();
        snapshot.buttons[id] = true;
        snapshot
    }

    fn with_axis(id: usize, value: f32) -> RawSnapshot {
        let mut snapshot = idle();
        snapshot.axes[id] = value;
        snapshot
    }

    /// A poller that has gone through connect and settle
    fn ready_poller(start: Instant) -> (Poller, Instant) {
        let mut poller = Poller::default();
        poller.on_connect(start);
        let now = start + DEFAULT_SETTLE_DELAY;
        let events = poller.tick(f310(), now, Some(&idle()));
        assert_eq!(events, vec![PollerEvent::Ready]);
        (poller, now)
    }

    fn run(poller: &mut Poller, start: Instant, frames: &[RawSnapshot]) -> Vec<ControlKey> {
        let mut now = start;
        let mut fired = Vec::new();
        for frame in frames {
            now += TICK;
            for event in poller.tick(f310(), now, Some(frame)) {
                if let PollerEvent::Activated(key) = event {
                    fired.push(key);
                }
            }
        }
        fired
    }

    #[test]
    fn test_starts_disconnected_and_ignores_input() {
        let mut poller = Poller::default();
        assert_eq!(poller.state(), ConnectionState::Disconnected);
        let events = poller.tick(f310(), Instant::now(), Some(&with_button(0)));
        assert!(events.is_empty());
    }

    #[test]
    fn test_ready_after_settle_delay() {
        let start = Instant::now();
        let mut poller = Poller::default();
        assert_eq!(poller.on_connect(start), Some(PollerEvent::Connected));

        let events = poller.tick(f310(), start + Duration::from_millis(499), Some(&idle()));
        assert!(events.is_empty());
        assert_eq!(poller.state(), ConnectionState::Connected);

        let events = poller.tick(f310(), start + Duration::from_millis(500), Some(&idle()));
        assert_eq!(events, vec![PollerEvent::Ready]);
        assert_eq!(poller.state(), ConnectionState::Ready);
    }

    #[test]
    fn test_input_during_settle_is_not_reported() {
        let start = Instant::now();
        let mut poller = Poller::default();
        poller.on_connect(start);
        let events = poller.tick(f310(), start + TICK, Some(&with_button(0)));
        assert!(events.is_empty());
    }

    #[test]
    fn test_held_button_fires_once() {
        let (mut poller, now) = ready_poller(Instant::now());
        let frames = vec![with_button(0); 10];
        assert_eq!(run(&mut poller, now, &frames), vec![ControlKey::button(0)]);
    }

    #[test]
    fn test_release_and_press_fires_again() {
        let (mut poller, now) = ready_poller(Instant::now());
        let frames = [with_button(3), with_button(3), idle(), with_button(3)];
        assert_eq!(
            run(&mut poller, now, &frames),
            vec![ControlKey::button(3), ControlKey::button(3)]
        );
    }

    #[test]
    fn test_axis_oscillating_outside_deadzone_fires_once() {
        let (mut poller, now) = ready_poller(Instant::now());
        let frames = [
            with_axis(1, 0.6),
            with_axis(1, 0.7),
            with_axis(1, 0.6),
            with_axis(1, 0.7),
        ];
        assert_eq!(run(&mut poller, now, &frames), vec![ControlKey::axis(1)]);
    }

    #[test]
    fn test_axis_returning_inside_deadzone_rearms() {
        let (mut poller, now) = ready_poller(Instant::now());
        let frames = [with_axis(2, 0.6), with_axis(2, 0.3), with_axis(2, 0.6)];
        assert_eq!(
            run(&mut poller, now, &frames),
            vec![ControlKey::axis(2), ControlKey::axis(2)]
        );
    }

    #[test]
    fn test_negative_axis_counts() {
        let (mut poller, now) = ready_poller(Instant::now());
        assert_eq!(
            run(&mut poller, now, &[with_axis(0, -0.9)]),
            vec![ControlKey::axis(0)]
        );
    }

    #[test]
    fn test_simultaneous_presses_fire_in_profile_order() {
        let (mut poller, now) = ready_poller(Instant::now());
        let mut frame = with_button(5);
        frame.buttons[1] = true;
        frame.axes[3] = 1.0;
        assert_eq!(
            run(&mut poller, now, &[frame]),
            vec![ControlKey::button(1), ControlKey::button(5), ControlKey::axis(3)]
        );
    }

    #[test]
    fn test_short_snapshot_skips_missing_controls() {
        let (mut poller, now) = ready_poller(Instant::now());
        let frame = RawSnapshot {
            buttons: vec![true, true],
            axes: vec![],
        };
        assert_eq!(
            run(&mut poller, now, &[frame]),
            vec![ControlKey::button(0), ControlKey::button(1)]
        );
    }

    #[test]
    fn test_disconnect_during_settle_never_becomes_ready() {
        let start = Instant::now();
        let mut poller = Poller::default();
        poller.on_connect(start);
        assert_eq!(poller.on_disconnect(), Some(PollerEvent::Disconnected));

        let events = poller.tick(f310(), start + Duration::from_secs(5), Some(&with_button(0)));
        assert!(events.is_empty());
        assert_eq!(poller.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_reconnect_restarts_settle_timer() {
        let start = Instant::now();
        let mut poller = Poller::default();
        poller.on_connect(start);
        poller.on_disconnect();

        let again = start + Duration::from_millis(400);
        poller.on_connect(again);
        let events = poller.tick(f310(), start + Duration::from_millis(600), Some(&idle()));
        assert!(events.is_empty());
        let events = poller.tick(f310(), again + DEFAULT_SETTLE_DELAY, Some(&idle()));
        assert_eq!(events, vec![PollerEvent::Ready]);
    }

    #[test]
    fn test_disconnect_forgets_held_state() {
        let (mut poller, now) = ready_poller(Instant::now());
        assert_eq!(run(&mut poller, now, &[with_button(0)]), vec![ControlKey::button(0)]);

        poller.on_disconnect();
        poller.on_connect(now);
        let now = now + DEFAULT_SETTLE_DELAY;
        // Still held across the reconnect: counts as a fresh press
        let events = poller.tick(f310(), now, Some(&with_button(0)));
        assert_eq!(
            events,
            vec![PollerEvent::Ready, PollerEvent::Activated(ControlKey::button(0))]
        );
    }

    #[test]
    fn test_duplicate_signals_are_ignored() {
        let start = Instant::now();
        let mut poller = Poller::default();
        assert_eq!(poller.on_disconnect(), None);
        poller.on_connect(start);
        assert_eq!(poller.on_connect(start + TICK), None);
    }

    #[test]
    fn test_missing_snapshot_while_ready_is_inert() {
        let (mut poller, now) = ready_poller(Instant::now());
        assert!(poller.tick(f310(), now + TICK, None).is_empty());
        assert_eq!(poller.state(), ConnectionState::Ready);
    }

    #[test]
    fn test_queue_is_fifo_and_coalesces() {
        let mut queue = ActivationQueue::default();
        assert!(queue.push(ControlKey::button(0)));
        assert!(queue.push(ControlKey::axis(0)));
        assert!(!queue.push(ControlKey::button(0)));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop(), Some(ControlKey::button(0)));
        assert!(queue.push(ControlKey::button(0)));
        assert_eq!(queue.pop(), Some(ControlKey::axis(0)));
        queue.clear();
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.pop(), None);
    }
}
