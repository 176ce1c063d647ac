use anyhow::{Context, Result};
use crossbeam::channel::{Receiver, RecvTimeoutError, Sender, bounded};
use log::{debug, error, info, warn};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::hotkey::Hotkey;
use crate::keyboard::{KeyStateError, KeyStateSource};
use crate::opener::UrlOpener;
use crate::settings::Settings;

pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    pub poll_interval: Duration,
    /// Quiet period after a trigger, so one press opens the page once
    pub debounce: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            debounce: DEBOUNCE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    #[error(transparent)]
    KeyState(#[from] KeyStateError),
}

/// Result of a single poll iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// No supported hotkey is configured
    Inactive,
    /// Still inside the debounce window, the key was not sampled
    Suppressed,
    Idle,
    Fired { opened: bool },
}

/// Messages sent from the poller thread to the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerEvent {
    Triggered { url: String },
    OpenFailed { url: String, reason: String },
    /// The poller has exited. `reason` is set when it died rather than being stopped.
    Stopped { reason: Option<String> },
}

/// Watches one hotkey and opens one URL. Settings are captured at construction.
pub struct Poller<K, O> {
    hotkey: Option<Hotkey>,
    url: String,
    key_state: K,
    opener: O,
    timing: PollTiming,
    suppressed_until: Option<Instant>,
    last_open_error: Option<String>,
}

impl<K: KeyStateSource, O: UrlOpener> Poller<K, O> {
    pub fn new(settings: &Settings, key_state: K, opener: O, timing: PollTiming) -> Self {
        let hotkey = settings.resolved_hotkey();
        if hotkey.is_none() {
            warn!(
                "Hotkey '{}' is not supported, the hotkey listener stays inactive",
                settings.hotkey
            );
        }

        Self {
            hotkey,
            url: settings.url.clone(),
            key_state,
            opener,
            timing,
            suppressed_until: None,
            last_open_error: None,
        }
    }

    pub fn hotkey(&self) -> Option<Hotkey> {
        self.hotkey
    }

    /// Run one iteration at time `now`. Only a fatal key state error is returned;
    /// everything else is logged and the next tick proceeds normally.
    pub fn tick(&mut self, now: Instant) -> Result<Tick, PollerError> {
        let Some(hotkey) = self.hotkey else {
            return Ok(Tick::Inactive);
        };

        if self.suppressed_until.is_some_and(|until| now < until) {
            return Ok(Tick::Suppressed);
        }
        self.suppressed_until = None;

        match self.key_state.is_pressed(hotkey) {
            Ok(true) => {}
            Ok(false) => return Ok(Tick::Idle),
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!("Failed to sample {hotkey}: {e}");
                return Ok(Tick::Idle);
            }
        }

        debug!("{hotkey} pressed, opening {}", self.url);
        self.suppressed_until = Some(now + self.timing.debounce);

        let opened = match self.opener.open(&self.url) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to open {}: {e}", self.url);
                self.last_open_error = Some(e.to_string());
                false
            }
        };

        Ok(Tick::Fired { opened })
    }

    /// Poll until `shutdown` receives a message or is disconnected.
    pub fn run(
        mut self,
        shutdown: &Receiver<()>,
        events: &Sender<PollerEvent>,
    ) -> Result<(), PollerError> {
        match self.hotkey {
            Some(hotkey) => info!("Listening for {hotkey}, opens {}", self.url),
            None => info!("No hotkey bound, waiting for shutdown"),
        }

        loop {
            let wait = match self.tick(Instant::now())? {
                Tick::Fired { opened } => {
                    let url = self.url.clone();
                    let event = if opened {
                        PollerEvent::Triggered { url }
                    } else {
                        let reason = self.last_open_error.take().unwrap_or_default();
                        PollerEvent::OpenFailed { url, reason }
                    };
                    let _ = events.try_send(event);
                    self.timing.debounce
                }
                // Nothing will ever fire, just wait to be told to stop
                Tick::Inactive => Duration::MAX,
                Tick::Suppressed | Tick::Idle => self.timing.poll_interval,
            };

            match shutdown.recv_timeout(wait) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    debug!("Hotkey poller shutting down");
                    return Ok(());
                }
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
    }
}

/// Handle for communicating with the poller thread
pub struct PollerHandle {
    shutdown: Sender<()>,
    events: Receiver<PollerEvent>,
    thread: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Receiver side of the poller's event stream. Cloned receivers share the stream.
    pub fn events(&self) -> Receiver<PollerEvent> {
        self.events.clone()
    }

    pub fn try_recv(&self) -> Option<PollerEvent> {
        self.events.try_recv().ok()
    }

    pub fn stop(&self) {
        let _ = self.shutdown.try_send(());
    }

    /// Stop the poller and wait for the thread to exit
    pub fn join(mut self) {
        self.stop();
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            error!("Hotkey poller thread panicked");
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start the poller in a background thread
pub fn start_poller<K, O>(poller: Poller<K, O>) -> Result<PollerHandle>
where
    K: KeyStateSource + 'static,
    O: UrlOpener + 'static,
{
    let (shutdown_sender, shutdown_receiver) = bounded(1);
    let (event_sender, event_receiver) = bounded(16);

    let thread = thread::Builder::new()
        .name("hotkey-poller".to_string())
        .spawn(move || {
            let reason = match poller.run(&shutdown_receiver, &event_sender) {
                Ok(()) => None,
                Err(e) => {
                    error!("Hotkey poller stopped: {e}");
                    Some(e.to_string())
                }
            };
            let _ = event_sender.try_send(PollerEvent::Stopped { reason });
        })
        .context("Failed to spawn hotkey poller thread")?;

    Ok(PollerHandle {
        shutdown: shutdown_sender,
        events: event_receiver,
        thread: Some(thread),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opener::OpenError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const MS: Duration = Duration::from_millis(1);

    /// Reports the key as pressed on every sample
    struct AlwaysPressed;

    impl KeyStateSource for AlwaysPressed {
        fn is_pressed(&self, _: Hotkey) -> Result<bool, KeyStateError> {
            Ok(true)
        }
    }

    /// Replays a fixed sequence of samples, then reports released
    struct Script(Mutex<Vec<Result<bool, KeyStateError>>>);

    impl Script {
        fn new(mut samples: Vec<Result<bool, KeyStateError>>) -> Self {
            samples.reverse();
            Self(Mutex::new(samples))
        }
    }

    impl KeyStateSource for Script {
        fn is_pressed(&self, _: Hotkey) -> Result<bool, KeyStateError> {
            self.0.lock().unwrap().pop().unwrap_or(Ok(false))
        }
    }

    #[derive(Clone, Default)]
    struct Recorder {
        opened: Arc<Mutex<Vec<String>>>,
    }

    impl UrlOpener for Recorder {
        fn open(&self, url: &str) -> Result<(), OpenError> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct Broken {
        attempts: Arc<AtomicUsize>,
    }

    impl UrlOpener for Broken {
        fn open(&self, url: &str) -> Result<(), OpenError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(OpenError::NoHandler {
                url: url.to_string(),
                source: std::io::Error::other("no browser"),
            })
        }
    }

    fn settings(hotkey: &str) -> Settings {
        Settings::new(hotkey, "https://example.com")
    }

    #[test]
    fn test_debounce_fires_once_per_window() {
        let opener = Recorder::default();
        let mut poller = Poller::new(
            &settings("F9"),
            AlwaysPressed,
            opener.clone(),
            PollTiming::default(),
        );
        let start = Instant::now();

        let ticks: Vec<Tick> = (0..5)
            .map(|i| poller.tick(start + POLL_INTERVAL * i).unwrap())
            .collect();

        assert_eq!(ticks[0], Tick::Fired { opened: true });
        assert!(ticks[1..].iter().all(|t| *t == Tick::Suppressed));
        assert_eq!(opener.opened.lock().unwrap().len(), 1);

        // the window has elapsed, a key that is still down fires again
        assert_eq!(
            poller.tick(start + DEBOUNCE).unwrap(),
            Tick::Fired { opened: true }
        );
        assert_eq!(opener.opened.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_released_key_does_not_fire() {
        let opener = Recorder::default();
        let mut poller = Poller::new(
            &settings("F1"),
            Script::new(vec![Ok(false), Ok(false)]),
            opener.clone(),
            PollTiming::default(),
        );
        let now = Instant::now();

        assert_eq!(poller.tick(now).unwrap(), Tick::Idle);
        assert_eq!(poller.tick(now + POLL_INTERVAL).unwrap(), Tick::Idle);
        assert!(opener.opened.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_hotkey_is_inactive() {
        let opener = Recorder::default();
        let mut poller = Poller::new(
            &settings("F12"),
            AlwaysPressed,
            opener.clone(),
            PollTiming::default(),
        );

        assert_eq!(poller.hotkey(), None);
        assert_eq!(poller.tick(Instant::now()).unwrap(), Tick::Inactive);
        assert!(opener.opened.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failing_opener_keeps_polling() {
        let opener = Broken::default();
        let mut poller = Poller::new(
            &settings("F5"),
            AlwaysPressed,
            opener.clone(),
            PollTiming::default(),
        );
        let start = Instant::now();

        for i in 0..3 {
            let tick = poller.tick(start + DEBOUNCE * i).unwrap();
            assert_eq!(tick, Tick::Fired { opened: false });
        }
        assert_eq!(opener.attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_transient_key_error_keeps_polling() {
        let opener = Recorder::default();
        let mut poller = Poller::new(
            &settings("F2"),
            Script::new(vec![
                Err(KeyStateError::Unavailable("busy".to_string())),
                Ok(true),
            ]),
            opener.clone(),
            PollTiming::default(),
        );
        let now = Instant::now();

        assert_eq!(poller.tick(now).unwrap(), Tick::Idle);
        assert_eq!(
            poller.tick(now + POLL_INTERVAL).unwrap(),
            Tick::Fired { opened: true }
        );
    }

    #[test]
    fn test_fatal_key_error_stops_poller() {
        let mut poller = Poller::new(
            &settings("F2"),
            Script::new(vec![Err(KeyStateError::ListenerStopped("gone".to_string()))]),
            Recorder::default(),
            PollTiming::default(),
        );

        assert!(matches!(
            poller.tick(Instant::now()),
            Err(PollerError::KeyState(KeyStateError::ListenerStopped(_)))
        ));
    }

    #[test]
    fn test_thread_stops_on_request() {
        let poller = Poller::new(
            &settings("F9"),
            Script::new(vec![]),
            Recorder::default(),
            PollTiming::default(),
        );
        let handle = start_poller(poller).unwrap();
        let events = handle.events();

        handle.stop();
        let event = events.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event, PollerEvent::Stopped { reason: None });
        handle.join();
    }

    #[test]
    fn test_inactive_thread_stops_on_request() {
        let poller = Poller::new(
            &settings("nope"),
            AlwaysPressed,
            Recorder::default(),
            PollTiming::default(),
        );
        let handle = start_poller(poller).unwrap();
        let events = handle.events();

        drop(handle);
        let event = events.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event, PollerEvent::Stopped { reason: None });
    }

    #[test]
    fn test_thread_survives_open_failures() {
        let opener = Broken::default();
        let timing = PollTiming {
            poll_interval: MS,
            debounce: 5 * MS,
        };
        let poller = Poller::new(&settings("F3"), AlwaysPressed, opener.clone(), timing);
        let handle = start_poller(poller).unwrap();
        let events = handle.events();

        for _ in 0..3 {
            let event = events.recv_timeout(Duration::from_secs(5)).unwrap();
            assert!(matches!(event, PollerEvent::OpenFailed { .. }), "{event:?}");
        }
        // the thread is still polling after repeated failures
        handle.stop();
        let stopped = loop {
            match events.recv_timeout(Duration::from_secs(5)).unwrap() {
                PollerEvent::OpenFailed { .. } => {}
                other => break other,
            }
        };
        assert_eq!(stopped, PollerEvent::Stopped { reason: None });
        handle.join();
        assert!(opener.attempts.load(Ordering::SeqCst) >= 3);
    }

    #[test]
    fn test_thread_reports_fatal_error() {
        let poller = Poller::new(
            &settings("F7"),
            Script::new(vec![Err(KeyStateError::ListenerStopped("no display".to_string()))]),
            Recorder::default(),
            PollTiming::default(),
        );
        let handle = start_poller(poller).unwrap();

        let event = handle
            .events()
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        match event {
            PollerEvent::Stopped { reason: Some(reason) } => assert!(reason.contains("no display")),
            other => panic!("unexpected event {other:?}"),
        }
        handle.join();
    }
}
