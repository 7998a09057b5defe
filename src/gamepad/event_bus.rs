use crate::gamepad::event::{GamepadEventDetail, GamepadEventType};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error};

/// Callback registered for one event category
pub type Listener = Box<dyn FnMut(&GamepadEventDetail)>;

// Listener errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ListenerError {
    #[error("Listener #{position} for {event_type} panicked: {message}")]
    Panicked {
        event_type: GamepadEventType,
        position: usize,
        message: String,
    },
}

/// Category -> ordered listener list
///
/// Append-only: there is no deduplication and no way to unregister. Dispatch is
/// synchronous and runs every listener of the category in registration order; a
/// listener that panics is reported and skipped for that dispatch only.
pub struct EventBus {
    listeners: HashMap<GamepadEventType, Vec<Listener>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let listeners = GamepadEventType::ALL
            .into_iter()
            .map(|kind| (kind, Vec::new()))
            .collect();
        Self { listeners }
    }

    pub fn on(&mut self, event_type: GamepadEventType, listener: Listener) {
        let list = self.listeners.entry(event_type).or_default();
        list.push(listener);
        debug!(
            "Registered listener #{} for {}",
            list.len() - 1,
            event_type
        );
    }

    pub fn listener_count(&self, event_type: GamepadEventType) -> usize {
        self.listeners.get(&event_type).map_or(0, Vec::len)
    }

    /// Run every listener of `event_type` with `detail`
    ///
    /// Returns the failures that were caught; they have already been logged.
    pub fn dispatch(
        &mut self,
        event_type: GamepadEventType,
        detail: &GamepadEventDetail,
    ) -> Vec<ListenerError> {
        let Some(list) = self.listeners.get_mut(&event_type) else {
            return Vec::new();
        };

        let mut failures = Vec::new();
        for (position, listener) in list.iter_mut().enumerate() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener(detail))) {
                let failure = ListenerError::Panicked {
                    event_type,
                    position,
                    message: panic_message(payload.as_ref()),
                };
                error!("{} (slot {})", failure, detail.gamepad.index);
                failures.push(failure);
            }
        }
        failures
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("non-string panic payload")
    }
}
