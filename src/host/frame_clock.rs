//! Fixed-interval stand-in for a display's per-frame callback
//!
//! [`ClockScheduler`] is handed to the SDK; each `request_frame` queues one frame.
//! [`FrameClock`] stays with the driver and resolves a queued frame on the next
//! interval tick, until the shutdown token is cancelled.

use crate::host::FrameScheduler;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct ClockScheduler {
    requests: mpsc::UnboundedSender<()>,
}

impl FrameScheduler for ClockScheduler {
    fn request_frame(&mut self) {
        if self.requests.send(()).is_err() {
            debug!("Frame clock stopped, request dropped");
        }
    }
}

pub struct FrameClock {
    requests: mpsc::UnboundedReceiver<()>,
    interval: Interval,
    shutdown: CancellationToken,
}

// Create a connected scheduler/clock pair
pub fn frame_clock(period: Duration, shutdown: CancellationToken) -> (ClockScheduler, FrameClock) {
    info!("Creating frame clock with {}ms period", period.as_millis());

    let (sender, receiver) = mpsc::unbounded_channel();
    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    (
        ClockScheduler { requests: sender },
        FrameClock {
            requests: receiver,
            interval,
            shutdown,
        },
    )
}

impl FrameClock {
    /// Wait for the next requested frame
    ///
    /// Returns `false` once the token is cancelled or the scheduler is gone, i.e. no
    /// further frame will ever be requested.
    pub async fn next_frame(&mut self) -> bool {
        let requested = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => None,
            request = self.requests.recv() => request,
        };
        if requested.is_none() {
            debug!("Frame clock finished");
            return false;
        }

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => false,
            _ = self.interval.tick() => true,
        }
    }
}
