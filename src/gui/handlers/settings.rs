use iced::{Element, Task};
use log::{error, info};

use crate::gui::components::dialogs::settings::SettingsDialog;
use crate::gui::messages::{Message, SettingsMessage};
use crate::settings::{Settings, SettingsStore};

pub struct SettingsHandler {
    dialog: SettingsDialog,
    store: SettingsStore,
}

impl SettingsHandler {
    pub fn new(store: SettingsStore, settings: &Settings) -> Self {
        Self {
            dialog: SettingsDialog::new(settings),
            store,
        }
    }

    pub fn handle(&mut self, message: SettingsMessage, settings: &mut Settings) -> Task<Message> {
        match message {
            SettingsMessage::Open => {
                self.dialog.show(settings);
            }
            SettingsMessage::Cancel | SettingsMessage::Dismiss => {
                self.dialog.hide();
            }
            SettingsMessage::Save => {
                let new_settings = self.dialog.get_settings();

                match self.store.save(&new_settings) {
                    Ok(()) => {
                        info!(
                            "Saved hotkey {} for {}, restart to apply",
                            new_settings.hotkey, new_settings.url
                        );
                        *settings = new_settings;
                        self.dialog.mark_saved();
                    }
                    Err(e) => {
                        error!("Failed to save settings: {e:#}");
                        self.dialog.mark_failed(format!("{e:#}"));
                    }
                }
            }
            SettingsMessage::HotkeySelected(hotkey) => {
                self.dialog.set_hotkey(hotkey);
            }
            SettingsMessage::UrlChanged(url) => {
                self.dialog.set_url(url);
            }
        }

        Task::none()
    }

    pub fn view(&self) -> Option<Element<'_, Message>> {
        self.dialog.view()
    }
}
