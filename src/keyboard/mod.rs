use anyhow::{Context, Result};
use log::{debug, error};
use rdev::EventType;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

use crate::hotkey::Hotkey;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyStateError {
    /// The key state could not be read this time; the next sample may succeed.
    /// Not produced by [`RdevKeyState`], which only fails fatally; other
    /// `KeyStateSource` backends report recoverable read errors with it.
    #[error("key state unavailable: {0}")]
    Unavailable(String),

    /// The OS key listener is gone and no further samples will succeed.
    #[error("key listener stopped: {0}")]
    ListenerStopped(String),
}

impl KeyStateError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ListenerStopped(_))
    }
}

/// Answers "is this key down right now?" for the poller.
pub trait KeyStateSource: Send {
    fn is_pressed(&self, hotkey: Hotkey) -> Result<bool, KeyStateError>;
}

#[derive(Debug, Default)]
struct KeyFlags {
    held: AtomicBool,
    /// Set when the key goes down, cleared by the next sample
    tapped: AtomicBool,
}

#[derive(Debug, Default)]
struct SharedState {
    keys: [KeyFlags; Hotkey::COUNT],
    failure: OnceLock<String>,
}

impl SharedState {
    fn on_event(&self, event_type: EventType) {
        match event_type {
            EventType::KeyPress(key) => {
                if let Some(hotkey) = Hotkey::from_key(key) {
                    let flags = &self.keys[hotkey.index()];
                    // auto-repeat of a key that is already down does not latch again
                    if !flags.held.swap(true, Ordering::AcqRel) {
                        flags.tapped.store(true, Ordering::Release);
                    }
                }
            }
            EventType::KeyRelease(key) => {
                if let Some(hotkey) = Hotkey::from_key(key) {
                    self.keys[hotkey.index()]
                        .held
                        .store(false, Ordering::Release);
                }
            }
            _ => {}
        }
    }

    fn sample(&self, hotkey: Hotkey) -> Result<bool, KeyStateError> {
        if let Some(reason) = self.failure.get() {
            return Err(KeyStateError::ListenerStopped(reason.clone()));
        }

        let flags = &self.keys[hotkey.index()];
        let tapped = flags.tapped.swap(false, Ordering::AcqRel);
        Ok(tapped || flags.held.load(Ordering::Acquire))
    }
}

/// Global key state fed by a dedicated listener thread.
///
/// A key counts as pressed while it is held, and also once after a press that
/// was released again before the poller got to sample it.
#[derive(Debug, Clone)]
pub struct RdevKeyState {
    state: Arc<SharedState>,
}

impl RdevKeyState {
    pub fn start() -> Result<Self> {
        let state = Arc::new(SharedState::default());
        let listener_state = Arc::clone(&state);

        thread::Builder::new()
            .name("key-listener".to_string())
            .spawn(move || {
                debug!("Key listener started");
                let callback_state = Arc::clone(&listener_state);
                let result = rdev::listen(move |event: rdev::Event| {
                    callback_state.on_event(event.event_type);
                });

                let reason = match result {
                    Ok(()) => "listener returned".to_string(),
                    Err(e) => format!("{e:?}"),
                };
                error!("Global key listener stopped: {reason}");
                let _ = listener_state.failure.set(reason);
            })
            .context("Failed to spawn key listener thread")?;

        Ok(Self { state })
    }
}

impl KeyStateSource for RdevKeyState {
    fn is_pressed(&self, hotkey: Hotkey) -> Result<bool, KeyStateError> {
        self.state.sample(hotkey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdev::Key;

    #[test]
    fn test_held_key_stays_pressed() {
        let state = SharedState::default();
        state.on_event(EventType::KeyPress(Key::F3));

        assert_eq!(state.sample(Hotkey::F3), Ok(true));
        assert_eq!(state.sample(Hotkey::F3), Ok(true));
        assert_eq!(state.sample(Hotkey::F4), Ok(false));

        state.on_event(EventType::KeyRelease(Key::F3));
        assert_eq!(state.sample(Hotkey::F3), Ok(false));
    }

    #[test]
    fn test_quick_tap_is_seen_once() {
        let state = SharedState::default();
        state.on_event(EventType::KeyPress(Key::F9));
        state.on_event(EventType::KeyRelease(Key::F9));

        assert_eq!(state.sample(Hotkey::F9), Ok(true));
        assert_eq!(state.sample(Hotkey::F9), Ok(false));
    }

    #[test]
    fn test_auto_repeat_does_not_latch_again() {
        let state = SharedState::default();
        state.on_event(EventType::KeyPress(Key::F5));
        assert_eq!(state.sample(Hotkey::F5), Ok(true));

        // repeats while held, then released before the next sample
        state.on_event(EventType::KeyPress(Key::F5));
        state.on_event(EventType::KeyPress(Key::F5));
        state.on_event(EventType::KeyRelease(Key::F5));
        assert_eq!(state.sample(Hotkey::F5), Ok(false));

        // a fresh press after the release still counts
        state.on_event(EventType::KeyPress(Key::F5));
        state.on_event(EventType::KeyRelease(Key::F5));
        assert_eq!(state.sample(Hotkey::F5), Ok(true));
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let state = SharedState::default();
        state.on_event(EventType::KeyPress(Key::F11));
        state.on_event(EventType::KeyPress(Key::CapsLock));

        for hotkey in Hotkey::ALL {
            assert_eq!(state.sample(hotkey), Ok(false));
        }
    }

    #[test]
    fn test_listener_failure_is_fatal() {
        let state = SharedState::default();
        let _ = state.failure.set("no display".to_string());

        let err = state.sample(Hotkey::F1).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err, KeyStateError::ListenerStopped("no display".to_string()));
    }
}
