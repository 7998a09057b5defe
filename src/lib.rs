//! padwatch - press, release, axis and connection events for polled gamepads

pub mod config;
pub mod gamepad;
pub mod host;

pub use gamepad::cache::{CacheError, DeviceStateCache};
pub use gamepad::event::{GamepadEvent, GamepadEventDetail, GamepadEventType, UnknownEventType};
pub use gamepad::event_bus::{EventBus, Listener, ListenerError};
pub use gamepad::sdk::GamepadSdk;
pub use gamepad::snapshot::{ButtonState, DeviceSlot, Gamepad, Snapshot};
pub use gamepad::transition::detect_transitions;
pub use host::{FrameScheduler, GamepadHost, HostError, HostNotification, NotificationSink};
