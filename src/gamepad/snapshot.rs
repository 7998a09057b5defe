use chrono::{DateTime, Local};

/// Host-assigned slot index of a connected gamepad
pub type DeviceSlot = usize;

// Digital + analog state of one button
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ButtonState {
    /// Authoritative digital state, the only field transition detection looks at
    pub pressed: bool,
    pub touched: bool,
    /// Analog amount in `[0, 1]`
    pub value: f64,
}

impl ButtonState {
    pub fn pressed(value: f64) -> Self {
        Self {
            pressed: true,
            touched: true,
            value,
        }
    }
}

/// Button and axis state of one device at one poll instant
///
/// Indices are significant: `buttons[i]` and `axes[i]` are compared against the same
/// indices of the previous snapshot for the same slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub buttons: Vec<ButtonState>,
    pub axes: Vec<f64>,
}

impl Snapshot {
    pub fn new(buttons: Vec<ButtonState>, axes: Vec<f64>) -> Self {
        Self { buttons, axes }
    }

    // Baseline stored on connect: every button released, axes at their reported values
    pub fn seeded_from(current: &Snapshot) -> Self {
        Self {
            buttons: vec![ButtonState::default(); current.buttons.len()],
            axes: current.axes.clone(),
        }
    }
}

/// Device reference handed to listeners
///
/// Carries the identity the host reported together with the state read in the same
/// poll. Listeners receive it behind an `Arc` so one poll's reading is shared by every
/// event emitted for it.
#[derive(Clone, Debug, PartialEq)]
pub struct Gamepad {
    pub index: DeviceSlot,
    pub id: String,
    pub mapping: String,
    pub connected: bool,
    pub timestamp: DateTime<Local>,
    pub state: Snapshot,
}

impl Gamepad {
    pub fn new(index: DeviceSlot, id: impl Into<String>, state: Snapshot) -> Self {
        Self {
            index,
            id: id.into(),
            mapping: String::from("standard"),
            connected: true,
            timestamp: Local::now(),
            state,
        }
    }

    pub fn button_count(&self) -> usize {
        self.state.buttons.len()
    }

    pub fn axis_count(&self) -> usize {
        self.state.axes.len()
    }
}
