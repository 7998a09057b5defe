use crate::gamepad::connection::ConnectionTracker;
use crate::gamepad::event::{GamepadEventDetail, GamepadEventType};
use crate::gamepad::event_bus::EventBus;
use crate::gamepad::poll_loop::{PollLoop, Running};
use crate::gamepad::snapshot::{DeviceSlot, Gamepad};
use crate::host::{FrameScheduler, GamepadHost, NotificationSink};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Gamepad event layer over a snapshot-only host
///
/// Construction subscribes to the host's attach/detach notifications and starts the
/// poll loop right away by requesting the first frame. Whoever delivers frames calls
/// [`GamepadSdk::tick`] once per frame; there is no separate start or stop.
///
/// # Examples
///
/// ```rust,no_run
/// use padwatch::host::{frame_clock, GilrsHost};
/// use padwatch::{GamepadEventType, GamepadSdk};
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (scheduler, mut clock) = frame_clock(Duration::from_millis(16), CancellationToken::new());
/// let mut sdk = GamepadSdk::new(GilrsHost::new(4)?, scheduler);
///
/// sdk.add_event_listener(GamepadEventType::ButtonPress, |detail| {
///     println!("pressed {:?} on {}", detail.button_index, detail.gamepad.id);
/// });
///
/// while clock.next_frame().await {
///     sdk.tick();
/// }
/// # Ok(())
/// # }
/// ```
pub struct GamepadSdk {
    poll_loop: PollLoop<Running>,
    tracker: ConnectionTracker,
    bus: EventBus,
}

impl GamepadSdk {
    pub fn new(
        mut host: impl GamepadHost + 'static,
        scheduler: impl FrameScheduler + 'static,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        host.subscribe(NotificationSink::new(sender));
        debug!("Subscribed to host attach/detach notifications");

        let poll_loop = PollLoop::create(Box::new(host), Box::new(scheduler)).start();
        // Roster and cache share one capacity
        let slots = poll_loop.cache().capacity();
        info!("Initialized gamepad SDK with {} slots", slots);

        Self {
            poll_loop,
            tracker: ConnectionTracker::new(receiver, slots),
            bus: EventBus::new(),
        }
    }

    /// Register `callback` for one event category
    ///
    /// Callbacks run synchronously on the polling thread in registration order. A
    /// callback that panics is logged and skipped; it stays registered.
    pub fn add_event_listener<F>(&mut self, event_type: GamepadEventType, callback: F)
    where
        F: FnMut(&GamepadEventDetail) + 'static,
    {
        self.bus.on(event_type, Box::new(callback));
    }

    /// Same as [`add_event_listener`](Self::add_event_listener), keyed by event name
    ///
    /// Unknown names are ignored.
    pub fn add_event_listener_named<F>(&mut self, name: &str, callback: F)
    where
        F: FnMut(&GamepadEventDetail) + 'static,
    {
        match name.parse::<GamepadEventType>() {
            Ok(event_type) => self.add_event_listener(event_type, callback),
            Err(e) => debug!("Ignoring listener: {}", e),
        }
    }

    // Run one poll pass; called by the frame driver
    pub fn tick(&mut self) {
        self.poll_loop.tick(&mut self.tracker, &mut self.bus);
    }

    pub fn gamepads(&self) -> Vec<Arc<Gamepad>> {
        self.tracker.gamepads().cloned().collect()
    }

    pub fn gamepad(&self, slot: DeviceSlot) -> Option<Arc<Gamepad>> {
        self.tracker.gamepad(slot).cloned()
    }

    pub fn ticks(&self) -> u64 {
        self.poll_loop.ticks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamepad::testing::{pad, CountingScheduler, FakeHost};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Connect(DeviceSlot),
        Disconnect(DeviceSlot),
        Press(usize),
        Release(usize),
        Axis(usize, f64),
    }

    fn record_all(sdk: &mut GamepadSdk) -> Rc<RefCell<Vec<Seen>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in GamepadEventType::ALL {
            let log = Rc::clone(&log);
            sdk.add_event_listener(kind, move |d| {
                let seen = match kind {
                    GamepadEventType::Connect => Seen::Connect(d.gamepad.index),
                    GamepadEventType::Disconnect => Seen::Disconnect(d.gamepad.index),
                    GamepadEventType::ButtonPress => Seen::Press(d.button_index.unwrap()),
                    GamepadEventType::ButtonRelease => Seen::Release(d.button_index.unwrap()),
                    GamepadEventType::AxisChange => {
                        Seen::Axis(d.axis_index.unwrap(), d.axis_value.unwrap())
                    }
                };
                log.borrow_mut().push(seen);
            });
        }
        log
    }

    fn sdk(slots: usize) -> (GamepadSdk, FakeHost, CountingScheduler) {
        let host = FakeHost::new(slots);
        let scheduler = CountingScheduler::default();
        let sdk = GamepadSdk::new(host.clone(), scheduler.clone());
        (sdk, host, scheduler)
    }

    fn take(log: &Rc<RefCell<Vec<Seen>>>) -> Vec<Seen> {
        log.borrow_mut().drain(..).collect()
    }

    #[test]
    fn construction_starts_the_loop() {
        let (sdk, _host, scheduler) = sdk(4);

        assert_eq!(scheduler.requested(), 1);
        assert_eq!(sdk.ticks(), 0);
        assert!(sdk.gamepads().is_empty());
    }

    #[test]
    fn connect_then_unchanged_poll_reports_only_connect() {
        let (mut sdk, host, _) = sdk(4);
        let log = record_all(&mut sdk);

        host.attach(pad(0, &[false, false, false], &[0.25, -0.5]));
        sdk.tick();

        assert_eq!(take(&log), vec![Seen::Connect(0)]);
        sdk.tick();
        assert!(take(&log).is_empty());
    }

    #[test]
    fn press_axis_release_scenario() {
        let (mut sdk, host, _) = sdk(4);
        let log = record_all(&mut sdk);
        host.attach(pad(0, &[false, false], &[0.0]));
        sdk.tick();
        assert_eq!(take(&log), vec![Seen::Connect(0)]);

        host.set_slot(0, Some(pad(0, &[true, false], &[0.0])));
        sdk.tick();
        assert_eq!(take(&log), vec![Seen::Press(0)]);

        host.set_slot(0, Some(pad(0, &[true, false], &[0.5])));
        sdk.tick();
        assert_eq!(take(&log), vec![Seen::Axis(0, 0.5)]);

        host.set_slot(0, Some(pad(0, &[false, false], &[0.5])));
        sdk.tick();
        assert_eq!(take(&log), vec![Seen::Release(0)]);
    }

    #[test]
    fn disconnect_emits_once_and_slot_stops_being_polled() {
        let (mut sdk, host, _) = sdk(4);
        let log = record_all(&mut sdk);
        host.attach(pad(2, &[false], &[0.0]));
        sdk.tick();
        take(&log);

        host.detach(2);
        sdk.tick();
        assert_eq!(take(&log), vec![Seen::Disconnect(2)]);
        assert!(sdk.gamepad(2).is_none());

        sdk.tick();
        sdk.tick();
        assert!(take(&log).is_empty());
    }

    #[test]
    fn out_of_range_device_never_reports_connect_or_disconnect() {
        let (mut sdk, host, _) = sdk(1);
        let log = record_all(&mut sdk);

        host.sink().connected(pad(5, &[false], &[0.0]));
        host.sink().disconnected(pad(5, &[false], &[0.0]));
        sdk.tick();

        assert!(take(&log).is_empty());
        assert!(sdk.gamepads().is_empty());
    }

    #[test]
    fn slot_is_reusable_after_disconnect() {
        let (mut sdk, host, _) = sdk(1);
        let log = record_all(&mut sdk);
        host.attach(pad(0, &[true], &[0.0]));
        sdk.tick();
        host.detach(0);
        sdk.tick();

        host.attach(pad(0, &[false], &[1.0]));
        sdk.tick();

        // Held button on first connect shows as a press on the first poll
        assert_eq!(
            take(&log),
            vec![
                Seen::Connect(0),
                Seen::Press(0),
                Seen::Disconnect(0),
                Seen::Connect(0),
            ]
        );
        assert_eq!(sdk.gamepad(0).unwrap().state.axes, vec![1.0]);
    }

    #[test]
    fn panicking_listener_does_not_block_the_next_one() {
        let (mut sdk, host, _) = sdk(1);
        let presses = Rc::new(RefCell::new(0));
        sdk.add_event_listener(GamepadEventType::ButtonPress, |_| panic!("listener failed"));
        let counter = Rc::clone(&presses);
        sdk.add_event_listener(GamepadEventType::ButtonPress, move |_| {
            *counter.borrow_mut() += 1
        });

        host.attach(pad(0, &[false], &[]));
        sdk.tick();
        host.set_slot(0, Some(pad(0, &[true], &[])));
        sdk.tick();

        assert_eq!(*presses.borrow(), 1);
    }

    #[test]
    fn named_listeners_ignore_unknown_names() {
        let (mut sdk, host, _) = sdk(1);
        let hits = Rc::new(RefCell::new(Vec::new()));
        for name in ["connect", "gamepadconnected", "CONNECT"] {
            let hits = Rc::clone(&hits);
            sdk.add_event_listener_named(name, move |_| hits.borrow_mut().push(name));
        }

        host.attach(pad(0, &[], &[]));
        sdk.tick();

        assert_eq!(*hits.borrow(), vec!["connect"]);
    }

    #[test]
    fn roster_tracks_latest_reading() {
        let (mut sdk, host, _) = sdk(4);
        host.attach(pad(1, &[false], &[0.0]));
        host.attach(pad(3, &[false], &[0.0]));
        sdk.tick();
        host.set_slot(3, Some(pad(3, &[false], &[0.75])));
        sdk.tick();

        let indices: Vec<_> = sdk.gamepads().iter().map(|g| g.index).collect();
        assert_eq!(indices, vec![1, 3]);
        assert_eq!(sdk.gamepad(3).unwrap().state.axes, vec![0.75]);
        assert!(host.pumps() >= 2);
    }
}
