use crate::gamepad::snapshot::{DeviceSlot, Snapshot};
use tracing::debug;

// Cache errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Slot {slot} is outside the cache capacity of {capacity}")]
    SlotOutOfRange { slot: DeviceSlot, capacity: usize },
}

/// Last observed snapshot per device slot
///
/// Fixed capacity, sized once from the host's slot count. An entry exists only while
/// the device in that slot is connected.
#[derive(Debug, Default)]
pub struct DeviceStateCache {
    entries: Vec<Option<Snapshot>>,
}

impl DeviceStateCache {
    pub fn with_capacity(slots: usize) -> Self {
        debug!("Creating device state cache with {} slots", slots);
        Self {
            entries: vec![None; slots],
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, slot: DeviceSlot) -> Option<&Snapshot> {
        self.entries.get(slot).and_then(Option::as_ref)
    }

    // Full replacement, never a patch of the previous entry
    pub fn set(&mut self, slot: DeviceSlot, snapshot: Snapshot) -> Result<(), CacheError> {
        let capacity = self.entries.len();
        match self.entries.get_mut(slot) {
            Some(entry) => {
                *entry = Some(snapshot);
                Ok(())
            }
            None => Err(CacheError::SlotOutOfRange { slot, capacity }),
        }
    }

    pub fn remove(&mut self, slot: DeviceSlot) -> Option<Snapshot> {
        self.entries.get_mut(slot).and_then(Option::take)
    }

    pub fn contains(&self, slot: DeviceSlot) -> bool {
        self.get(slot).is_some()
    }

    /// Number of slots currently holding an entry
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
