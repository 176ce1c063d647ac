use crate::hotkey::Hotkey;

#[derive(Debug, Clone)]
pub enum SettingsMessage {
    Open,
    Cancel,
    Save,
    HotkeySelected(Hotkey),
    UrlChanged(String),
    /// Close the confirmation shown after saving
    Dismiss,
}
