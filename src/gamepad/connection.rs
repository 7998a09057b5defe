use crate::gamepad::cache::DeviceStateCache;
use crate::gamepad::event::{GamepadEventDetail, GamepadEventType};
use crate::gamepad::event_bus::EventBus;
use crate::gamepad::snapshot::{DeviceSlot, Gamepad, Snapshot};
use crate::host::HostNotification;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Turns host attach/detach notifications into cache entries and events
///
/// Also keeps the roster of connected gamepads, indexed by slot.
pub struct ConnectionTracker {
    notifications: mpsc::UnboundedReceiver<HostNotification>,
    roster: Vec<Option<Arc<Gamepad>>>,
}

impl ConnectionTracker {
    pub fn new(notifications: mpsc::UnboundedReceiver<HostNotification>, slots: usize) -> Self {
        Self {
            notifications,
            roster: vec![None; slots],
        }
    }

    // Handle everything queued since the last tick
    pub fn drain(&mut self, cache: &mut DeviceStateCache, bus: &mut EventBus) -> usize {
        let mut handled = 0;
        loop {
            match self.notifications.try_recv() {
                Ok(notification) => {
                    self.handle(notification, cache, bus);
                    handled += 1;
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    debug!("Notification queue closed by host");
                    break;
                }
            }
        }
        handled
    }

    pub fn handle(
        &mut self,
        notification: HostNotification,
        cache: &mut DeviceStateCache,
        bus: &mut EventBus,
    ) {
        match notification {
            HostNotification::Connected(gamepad) => self.on_connected(gamepad, cache, bus),
            HostNotification::Disconnected(gamepad) => self.on_disconnected(gamepad, cache, bus),
        }
    }

    fn on_connected(&mut self, gamepad: Gamepad, cache: &mut DeviceStateCache, bus: &mut EventBus) {
        info!(
            "Gamepad connected: [{}] {} ({} buttons, {} axes)",
            gamepad.index,
            gamepad.id,
            gamepad.button_count(),
            gamepad.axis_count()
        );

        let slot = gamepad.index;
        if let Err(e) = cache.set(slot, Snapshot::seeded_from(&gamepad.state)) {
            error!("Cannot track gamepad {}: {}", gamepad.id, e);
            return;
        }

        let gamepad = Arc::new(gamepad);
        self.refresh(&gamepad);
        bus.dispatch(GamepadEventType::Connect, &GamepadEventDetail::device(gamepad));
    }

    fn on_disconnected(
        &mut self,
        gamepad: Gamepad,
        cache: &mut DeviceStateCache,
        bus: &mut EventBus,
    ) {
        info!("Gamepad disconnected: [{}] {}", gamepad.index, gamepad.id);

        let slot = gamepad.index;
        if !cache.contains(slot) && !self.is_connected(slot) {
            warn!("Ignoring disconnect for untracked slot {}", slot);
            return;
        }

        // Listeners still see the device before its state goes away
        bus.dispatch(
            GamepadEventType::Disconnect,
            &GamepadEventDetail::device(Arc::new(gamepad)),
        );

        cache.remove(slot);
        if let Some(entry) = self.roster.get_mut(slot) {
            *entry = None;
        }
    }

    /// Point the roster at the latest reading of a polled device
    ///
    /// Also records devices the poll loop found without a connect notification.
    pub fn refresh(&mut self, gamepad: &Arc<Gamepad>) {
        if let Some(entry) = self.roster.get_mut(gamepad.index) {
            *entry = Some(Arc::clone(gamepad));
        }
    }

    pub fn gamepad(&self, slot: DeviceSlot) -> Option<&Arc<Gamepad>> {
        self.roster.get(slot).and_then(Option::as_ref)
    }

    pub fn gamepads(&self) -> impl Iterator<Item = &Arc<Gamepad>> {
        self.roster.iter().flatten()
    }

    pub fn is_connected(&self, slot: DeviceSlot) -> bool {
        self.gamepad(slot).is_some()
    }
}
