use rdev::Key;
use std::str::FromStr;

/// The function keys that can be bound to the open-URL action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hotkey {
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
}

impl Hotkey {
    pub const COUNT: usize = 10;

    /// Every supported hotkey, in the order shown in the settings dialog
    pub const ALL: [Self; Self::COUNT] = [
        Self::F1,
        Self::F2,
        Self::F3,
        Self::F4,
        Self::F5,
        Self::F6,
        Self::F7,
        Self::F8,
        Self::F9,
        Self::F10,
    ];

    /// Resolve a persisted hotkey identifier. Unknown identifiers are not an
    /// error, they simply leave the hotkey unbound.
    pub fn resolve(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|hotkey| hotkey.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::F1 => "F1",
            Self::F2 => "F2",
            Self::F3 => "F3",
            Self::F4 => "F4",
            Self::F5 => "F5",
            Self::F6 => "F6",
            Self::F7 => "F7",
            Self::F8 => "F8",
            Self::F9 => "F9",
            Self::F10 => "F10",
        }
    }

    /// Platform key code used by the global key listener
    pub fn key(self) -> Key {
        match self {
            Self::F1 => Key::F1,
            Self::F2 => Key::F2,
            Self::F3 => Key::F3,
            Self::F4 => Key::F4,
            Self::F5 => Key::F5,
            Self::F6 => Key::F6,
            Self::F7 => Key::F7,
            Self::F8 => Key::F8,
            Self::F9 => Key::F9,
            Self::F10 => Key::F10,
        }
    }

    pub fn from_key(key: Key) -> Option<Self> {
        Self::ALL.into_iter().find(|hotkey| hotkey.key() == key)
    }

    /// Position in [`Hotkey::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Hotkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported hotkey '{0}', expected one of F1..F10")]
pub struct UnsupportedHotkey(pub String);

impl FromStr for Hotkey {
    type Err = UnsupportedHotkey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s).ok_or_else(|| UnsupportedHotkey(s.to_string()))
    }
}
