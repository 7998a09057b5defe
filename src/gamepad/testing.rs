//! Test doubles for the host collaborators

use crate::gamepad::snapshot::{ButtonState, DeviceSlot, Gamepad, Snapshot};
use crate::host::{FrameScheduler, GamepadHost, HostError, NotificationSink};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub fn pad(slot: DeviceSlot, buttons: &[bool], axes: &[f64]) -> Gamepad {
    let buttons = buttons
        .iter()
        .map(|&pressed| {
            if pressed {
                ButtonState::pressed(1.0)
            } else {
                ButtonState::default()
            }
        })
        .collect();
    Gamepad::new(slot, format!("Fake Pad {slot}"), Snapshot::new(buttons, axes.to_vec()))
}

struct FakeHostState {
    slot_count: usize,
    slots: Vec<Option<Gamepad>>,
    available: bool,
    sink: Option<NotificationSink>,
    pumps: usize,
}

/// Host whose slot table the test edits between ticks
#[derive(Clone)]
pub struct FakeHost {
    state: Rc<RefCell<FakeHostState>>,
}

impl FakeHost {
    pub fn new(slot_count: usize) -> Self {
        Self {
            state: Rc::new(RefCell::new(FakeHostState {
                slot_count,
                slots: vec![None; slot_count],
                available: true,
                sink: None,
                pumps: 0,
            })),
        }
    }

    pub fn set_slot(&self, slot: DeviceSlot, gamepad: Option<Gamepad>) {
        self.state.borrow_mut().slots[slot] = gamepad;
    }

    // Entry past the advertised slot count, as a misbehaving host would report
    pub fn push_extra(&self, gamepad: Gamepad) {
        self.state.borrow_mut().slots.push(Some(gamepad));
    }

    pub fn set_available(&self, available: bool) {
        self.state.borrow_mut().available = available;
    }

    pub fn sink(&self) -> NotificationSink {
        self.state
            .borrow()
            .sink
            .clone()
            .expect("host was never subscribed")
    }

    pub fn pumps(&self) -> usize {
        self.state.borrow().pumps
    }

    /// Plug a device in: slot becomes visible and the attach notification is queued
    pub fn attach(&self, gamepad: Gamepad) {
        self.set_slot(gamepad.index, Some(gamepad.clone()));
        self.sink().connected(gamepad);
    }

    /// Unplug a device: slot empties and the detach notification is queued
    pub fn detach(&self, slot: DeviceSlot) {
        let gamepad = self.state.borrow_mut().slots[slot].take();
        if let Some(mut gamepad) = gamepad {
            gamepad.connected = false;
            self.sink().disconnected(gamepad);
        }
    }
}

impl GamepadHost for FakeHost {
    fn slot_count(&self) -> usize {
        self.state.borrow().slot_count
    }

    fn get_gamepads(&mut self) -> Result<Vec<Option<Gamepad>>, HostError> {
        let state = self.state.borrow();
        if !state.available {
            return Err(HostError::SnapshotUnavailable(
                "fake host switched off".to_string(),
            ));
        }
        Ok(state.slots.clone())
    }

    fn subscribe(&mut self, sink: NotificationSink) {
        self.state.borrow_mut().sink = Some(sink);
    }

    fn pump(&mut self) {
        self.state.borrow_mut().pumps += 1;
    }
}

/// Scheduler that only counts frame requests
#[derive(Clone, Default)]
pub struct CountingScheduler {
    requested: Rc<Cell<usize>>,
}

impl CountingScheduler {
    pub fn requested(&self) -> usize {
        self.requested.get()
    }
}

impl FrameScheduler for CountingScheduler {
    fn request_frame(&mut self) {
        self.requested.set(self.requested.get() + 1);
    }
}
