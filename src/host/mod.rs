//! Host collaborators the poll loop depends on
//!
//! The host owns the actual devices and offers three things:
//!
//! 1. [`GamepadHost::get_gamepads`] - snapshot of every fixed slot, `None` for empty slots
//! 2. [`GamepadHost::subscribe`] - attach/detach notifications through a [`NotificationSink`]
//! 3. [`FrameScheduler::request_frame`] - "run the next tick on the next frame"
//!
//! ```text
//! Host ──[HostNotification]──► NotificationSink ──► ConnectionTracker
//!  │                          (mpsc, drained per tick)
//!  └──[get_gamepads]──► PollLoop ──► EventBus
//! ```
//!
//! [`gilrs_host`] and [`frame_clock`] provide the native implementations.

pub mod frame_clock;
pub mod gilrs_host;

use crate::gamepad::snapshot::Gamepad;
use tokio::sync::mpsc;
use tracing::warn;

pub use frame_clock::{frame_clock, ClockScheduler, FrameClock};
pub use gilrs_host::GilrsHost;

// Host errors
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Failed to initialize host: {0}")]
    Initialization(String),

    #[error("Snapshot read unavailable: {0}")]
    SnapshotUnavailable(String),
}

/// Attach/detach notification delivered by the host
#[derive(Debug, Clone)]
pub enum HostNotification {
    Connected(Gamepad),
    Disconnected(Gamepad),
}

/// Sending half of the notification queue
///
/// Cloneable and usable from any thread; the SDK only drains the queue between ticks,
/// which keeps every cache and listener access on the polling thread.
#[derive(Debug, Clone)]
pub struct NotificationSink {
    sender: mpsc::UnboundedSender<HostNotification>,
}

impl NotificationSink {
    pub fn new(sender: mpsc::UnboundedSender<HostNotification>) -> Self {
        Self { sender }
    }

    pub fn connected(&self, gamepad: Gamepad) {
        self.send(HostNotification::Connected(gamepad));
    }

    pub fn disconnected(&self, gamepad: Gamepad) {
        self.send(HostNotification::Disconnected(gamepad));
    }

    pub fn send(&self, notification: HostNotification) {
        if let Err(e) = self.sender.send(notification) {
            warn!("Dropping host notification, SDK is gone: {:?}", e.0);
        }
    }
}

/// Snapshot-style device source
pub trait GamepadHost {
    /// Number of fixed device slots this host reports
    fn slot_count(&self) -> usize;

    /// Read the current state of every slot
    ///
    /// The returned vector has one entry per slot; `None` marks an empty slot.
    fn get_gamepads(&mut self) -> Result<Vec<Option<Gamepad>>, HostError>;

    /// Register the sink for attach/detach notifications
    fn subscribe(&mut self, sink: NotificationSink);

    /// Called at the start of every tick, before notifications are drained
    fn pump(&mut self) {}
}

/// Per-frame scheduling primitive
pub trait FrameScheduler {
    /// Run one more tick on the next frame
    fn request_frame(&mut self);
}
