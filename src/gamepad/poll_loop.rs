//! Frame-driven poll loop with statum state machine
//!
//! # State Machine
//!
//! ```text
//! Idle ──(start)──► Running ──(tick)──┐
//!                      ▲              │
//!                      └──────────────┘
//! ```
//!
//! `Running` is entered as soon as the SDK is constructed and is never left; the loop
//! stops only when the owner stops delivering frames.
//!
//! # Tick
//!
//! ```text
//! pump host ─► drain notifications ─► get_gamepads ─► detect ─► dispatch ─► cache write
//!                                                                              │
//!                                                               request_frame ◄┘
//! ```

use crate::gamepad::cache::DeviceStateCache;
use crate::gamepad::connection::ConnectionTracker;
use crate::gamepad::event_bus::EventBus;
use crate::gamepad::snapshot::Gamepad;
use crate::gamepad::transition::detect_transitions;
use crate::host::{FrameScheduler, GamepadHost};
use statum::{machine, state};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[state]
#[derive(Debug, Clone)]
pub enum PollState {
    Idle,    // Built, no frame requested yet
    Running, // Rescheduling itself every frame
}

/// Counters for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub notifications: usize,
    pub gamepads: usize,
    pub events: usize,
    pub listener_failures: usize,
}

#[machine]
pub struct PollLoop<S: PollState> {
    // Snapshot source
    host: Box<dyn GamepadHost>,

    // Frame primitive used to reschedule
    scheduler: Box<dyn FrameScheduler>,

    // Last observed snapshot per slot, owned exclusively by the loop
    cache: DeviceStateCache,

    // Completed ticks
    ticks: u64,
}

impl<S: PollState> PollLoop<S> {
    pub fn cache(&self) -> &DeviceStateCache {
        &self.cache
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl PollLoop<Idle> {
    pub fn create(host: Box<dyn GamepadHost>, scheduler: Box<dyn FrameScheduler>) -> Self {
        let slots = host.slot_count();
        debug!("Creating poll loop for {} slots", slots);
        Self::new(host, scheduler, DeviceStateCache::with_capacity(slots), 0)
    }

    pub fn start(mut self) -> PollLoop<Running> {
        info!("Starting gamepad poll loop");
        self.scheduler.request_frame();
        self.transition()
    }
}

impl PollLoop<Running> {
    // One discrete unit of work, run once per frame
    pub fn tick(&mut self, tracker: &mut ConnectionTracker, bus: &mut EventBus) -> TickStats {
        let mut stats = TickStats::default();

        self.host.pump();
        stats.notifications = tracker.drain(&mut self.cache, bus);

        let gamepads = match self.host.get_gamepads() {
            Ok(gamepads) => gamepads,
            Err(e) => {
                warn!("Treating roster as empty this tick: {}", e);
                Vec::new()
            }
        };

        for gamepad in gamepads.into_iter().flatten() {
            stats.gamepads += 1;
            self.poll_gamepad(Arc::new(gamepad), tracker, bus, &mut stats);
        }

        self.ticks += 1;
        if stats.events > 0 {
            debug!("Tick {} finished: {:?}", self.ticks, stats);
        }

        self.scheduler.request_frame();
        stats
    }

    fn poll_gamepad(
        &mut self,
        gamepad: Arc<Gamepad>,
        tracker: &mut ConnectionTracker,
        bus: &mut EventBus,
        stats: &mut TickStats,
    ) {
        let slot = gamepad.index;
        if slot >= self.cache.capacity() {
            warn!(
                "Host reported slot {} beyond capacity {}, skipping",
                slot,
                self.cache.capacity()
            );
            return;
        }

        let previous = self.cache.get(slot);
        if previous.is_none() {
            warn!(
                "Slot {} polled without a connect notification, seeding it now",
                slot
            );
        }

        let events = detect_transitions(&gamepad, previous);
        stats.events += events.len();
        for event in &events {
            stats.listener_failures += bus.dispatch(event.event_type, &event.detail).len();
        }

        tracker.refresh(&gamepad);
        if let Err(e) = self.cache.set(slot, gamepad.state.clone()) {
            warn!("Failed to store snapshot: {}", e);
        }
    }
}
