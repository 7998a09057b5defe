//! Gamepad change detection over a snapshot-only host
//!
//! The host can only answer "what is the state right now"; this subsystem turns
//! successive answers into press, release, axis and connection events:
//!
//! 1. [`connection`] - attach/detach notifications, cache seeding, roster
//! 2. [`transition`] - diff of a new snapshot against the cached one
//! 3. [`event_bus`] - per-category listener lists with isolated dispatch
//! 4. [`poll_loop`] - once-per-frame driver tying the above together
//! 5. [`sdk`] - public facade
//!
//! # Architecture
//!
//! ```text
//! attach ──► ConnectionTracker ──► cache seed + connect ──► EventBus
//! frame  ──► PollLoop ──► detect (reads cache) ──► EventBus ──► cache write
//! detach ──► ConnectionTracker ──► disconnect ──► EventBus, then cache removal
//! ```
//!
//! Everything runs on the single thread that drives frames.

pub mod cache;
pub mod connection;
pub mod event;
pub mod event_bus;
pub mod poll_loop;
pub mod sdk;
pub mod snapshot;
pub mod transition;

#[cfg(test)]
pub(crate) mod testing;
