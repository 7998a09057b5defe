use crate::gamepad::snapshot::{ButtonState, DeviceSlot, Gamepad, Snapshot};
use crate::host::{GamepadHost, HostError, NotificationSink};
use chrono::Local;
use gilrs::{Axis, Button, Event, EventType, GamepadId, Gilrs, MappingSource};
use tracing::{debug, error, info, warn};

// Standard gamepad layout, index = position in the snapshot
const STANDARD_BUTTONS: [Button; 17] = [
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

// Stick axes with the sign that makes "down" positive on Y
const STANDARD_AXES: [(Axis, f64); 4] = [
    (Axis::LeftStickX, 1.0),
    (Axis::LeftStickY, -1.0),
    (Axis::RightStickX, 1.0),
    (Axis::RightStickY, -1.0),
];

/// Fixed number of slots handed out to device ids, lowest free slot first
#[derive(Debug, Clone)]
pub struct SlotTable<K> {
    slots: Vec<Option<K>>,
}

impl<K: Copy + PartialEq> SlotTable<K> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slot_of(&self, key: K) -> Option<DeviceSlot> {
        self.slots.iter().position(|entry| *entry == Some(key))
    }

    // Existing slot if the key already has one, otherwise the lowest free slot
    pub fn assign(&mut self, key: K) -> Option<DeviceSlot> {
        if let Some(slot) = self.slot_of(key) {
            return Some(slot);
        }
        let slot = self.slots.iter().position(Option::is_none)?;
        self.slots[slot] = Some(key);
        Some(slot)
    }

    pub fn release(&mut self, key: K) -> Option<DeviceSlot> {
        let slot = self.slot_of(key)?;
        self.slots[slot] = None;
        Some(slot)
    }

    pub fn occupied(&self) -> impl Iterator<Item = (DeviceSlot, K)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.map(|key| (slot, key)))
    }
}

/// [`GamepadHost`] backed by gilrs
///
/// gilrs keeps per-gamepad state up to date while its event queue is drained; `pump`
/// drains it and turns `Connected`/`Disconnected` into notifications, `get_gamepads`
/// then reads that state as snapshots.
pub struct GilrsHost {
    gilrs: Gilrs,
    slots: SlotTable<GamepadId>,
    sink: Option<NotificationSink>,
}

impl GilrsHost {
    pub fn new(slot_count: usize) -> Result<Self, HostError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(HostError::Initialization(e.to_string()));
            }
        };

        Ok(Self {
            gilrs,
            slots: SlotTable::new(slot_count),
            sink: None,
        })
    }

    fn announce(&mut self, id: GamepadId) {
        if self.slots.slot_of(id).is_some() {
            debug!("Gamepad {} already has a slot", id);
            return;
        }
        let Some(slot) = self.slots.assign(id) else {
            warn!(
                "No free slot for gamepad {}, all {} in use",
                id,
                self.slots.capacity()
            );
            return;
        };

        let gamepad = read_gamepad(slot, &self.gilrs.gamepad(id));
        match &self.sink {
            Some(sink) => sink.connected(gamepad),
            None => debug!("Gamepad {} connected before subscription", id),
        }
    }

    fn retire(&mut self, id: GamepadId) {
        let Some(slot) = self.slots.release(id) else {
            debug!("Disconnect for untracked gamepad {}", id);
            return;
        };

        let mut gamepad = read_gamepad(slot, &self.gilrs.gamepad(id));
        gamepad.connected = false;
        if let Some(sink) = &self.sink {
            sink.disconnected(gamepad);
        }
    }
}

impl GamepadHost for GilrsHost {
    fn slot_count(&self) -> usize {
        self.slots.capacity()
    }

    fn get_gamepads(&mut self) -> Result<Vec<Option<Gamepad>>, HostError> {
        let mut gamepads = vec![None; self.slots.capacity()];
        for (slot, id) in self.slots.occupied() {
            let gamepad = self.gilrs.gamepad(id);
            if gamepad.is_connected() {
                gamepads[slot] = Some(read_gamepad(slot, &gamepad));
            }
        }
        Ok(gamepads)
    }

    fn subscribe(&mut self, sink: NotificationSink) {
        self.sink = Some(sink);

        // Devices present before anyone listened still get a connect
        let present: Vec<GamepadId> = self.gilrs.gamepads().map(|(id, _)| id).collect();
        info!("Found {} gamepads at subscription", present.len());
        for id in present {
            self.announce(id);
        }
    }

    fn pump(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => {
                    info!("Controller connected event detected: {}", id);
                    self.announce(id);
                }
                EventType::Disconnected => {
                    warn!("Controller disconnected event detected: {}", id);
                    self.retire(id);
                }
                _ => {}
            }
        }
    }
}

fn read_gamepad(slot: DeviceSlot, gamepad: &gilrs::Gamepad<'_>) -> Gamepad {
    let buttons = STANDARD_BUTTONS
        .iter()
        .map(|&button| match gamepad.button_data(button) {
            Some(data) => ButtonState {
                pressed: data.is_pressed(),
                touched: data.is_pressed() || data.value() > 0.0,
                value: f64::from(data.value()),
            },
            None => ButtonState::default(),
        })
        .collect();
    let axes = STANDARD_AXES
        .iter()
        .map(|&(axis, sign)| f64::from(gamepad.value(axis)) * sign)
        .collect();

    let id = match (gamepad.vendor_id(), gamepad.product_id()) {
        (Some(vendor), Some(product)) => format!(
            "{} (Vendor: {:04x} Product: {:04x})",
            gamepad.name(),
            vendor,
            product
        ),
        _ => gamepad.name().to_string(),
    };
    let mapping = match gamepad.mapping_source() {
        MappingSource::None => String::new(),
        _ => String::from("standard"),
    };

    Gamepad {
        index: slot,
        id,
        mapping,
        connected: gamepad.is_connected(),
        timestamp: Local::now(),
        state: Snapshot::new(buttons, axes),
    }
}
