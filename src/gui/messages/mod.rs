pub mod settings;

pub use settings::*;

#[derive(Debug, Clone)]
pub enum Message {
    Settings(SettingsMessage),

    // Drain events from the hotkey poller
    PollerTick,
}
