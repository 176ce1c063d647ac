use iced::widget::{button, column, container, pick_list, row, rule, space, text, text_input};
use iced::{Color, Element, Length};

use crate::gui::messages::{Message, SettingsMessage};
use crate::hotkey::Hotkey;
use crate::settings::Settings;

const ORANGE: Color = Color::from_rgb(1.0, 0.7, 0.3);
const RED: Color = Color::from_rgb(1.0, 0.4, 0.4);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState {
    Hidden,
    Editing,
    Saved,
    SaveFailed(String),
}

/// Hotkey and URL editor
pub struct SettingsDialog {
    hotkey: Option<Hotkey>,
    /// Stored identifier, kept when it is not one of the supported keys
    raw_hotkey: String,
    url: String,
    state: DialogState,
}

impl SettingsDialog {
    pub fn new(settings: &Settings) -> Self {
        Self {
            hotkey: settings.resolved_hotkey(),
            raw_hotkey: settings.hotkey.clone(),
            url: settings.url.clone(),
            state: DialogState::Hidden,
        }
    }

    pub fn show(&mut self, current_settings: &Settings) {
        *self = Self::new(current_settings);
        self.state = DialogState::Editing;
    }

    pub fn hide(&mut self) {
        self.state = DialogState::Hidden;
    }

    pub fn is_visible(&self) -> bool {
        self.state != DialogState::Hidden
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn set_hotkey(&mut self, hotkey: Hotkey) {
        self.hotkey = Some(hotkey);
    }

    pub fn set_url(&mut self, url: String) {
        self.url = url;
    }

    pub fn mark_saved(&mut self) {
        self.state = DialogState::Saved;
    }

    pub fn mark_failed(&mut self, reason: String) {
        self.state = DialogState::SaveFailed(reason);
    }

    pub fn get_settings(&self) -> Settings {
        let hotkey = self
            .hotkey
            .map_or_else(|| self.raw_hotkey.clone(), |h| h.name().to_string());
        Settings::new(hotkey, self.url.clone())
    }

    pub fn view(&self) -> Option<Element<'_, Message>> {
        let content = match &self.state {
            DialogState::Hidden => return None,
            DialogState::Editing => self.form_view(),
            DialogState::Saved => Self::notice_view(
                "Settings saved! Restart for changes to take effect.".to_string(),
                ORANGE,
            ),
            DialogState::SaveFailed(reason) => {
                Self::notice_view(format!("Failed to save settings: {reason}"), RED)
            }
        };

        // Create a modal overlay
        let dialog = container(content).style(|theme: &iced::Theme| {
            container::Style::default()
                .background(theme.palette().background)
                .border(iced::Border::default().rounded(10).width(2))
        });

        let centered = container(dialog)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(|_theme: &iced::Theme| {
                container::Style::default().background(Color::from_rgba(0.0, 0.0, 0.0, 0.7))
            });

        Some(centered.into())
    }

    fn form_view(&self) -> Element<'_, Message> {
        let title = text("Settings")
            .size(24)
            .style(|theme: &iced::Theme| iced::widget::text::Style {
                color: Some(theme.palette().text),
            });

        let hotkey_section = column![
            text("Select Hotkey:").size(16),
            pick_list(Hotkey::ALL, self.hotkey, |h| {
                Message::Settings(SettingsMessage::HotkeySelected(h))
            })
            .placeholder(self.raw_hotkey.as_str())
            .width(Length::Fill),
        ]
        .spacing(5);

        let url_section = column![
            text("Set Webpage URL:").size(16),
            text_input("https://...", &self.url)
                .on_input(|url| Message::Settings(SettingsMessage::UrlChanged(url)))
                .on_submit(Message::Settings(SettingsMessage::Save))
                .width(Length::Fill),
        ]
        .spacing(5);

        let controls = row![
            space::horizontal(),
            button("Cancel").on_press(Message::Settings(SettingsMessage::Cancel)),
            button("Save")
                .on_press(Message::Settings(SettingsMessage::Save))
                .style(iced::widget::button::success),
        ]
        .spacing(10)
        .width(Length::Fill);

        column![
            title,
            rule::horizontal(1),
            hotkey_section,
            url_section,
            text("Changes take effect after a restart")
                .size(12)
                .style(|_: &iced::Theme| iced::widget::text::Style {
                    color: Some(ORANGE),
                }),
            controls,
        ]
        .spacing(15)
        .padding(20)
        .width(Length::Fill)
        .into()
    }

    fn notice_view(message: String, color: Color) -> Element<'static, Message> {
        column![
            text(message)
                .size(16)
                .style(move |_: &iced::Theme| iced::widget::text::Style { color: Some(color) }),
            row![
                space::horizontal(),
                button("OK").on_press(Message::Settings(SettingsMessage::Dismiss)),
            ],
        ]
        .spacing(15)
        .padding(20)
        .width(Length::Fill)
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_starts_from_current_settings() {
        let mut dialog = SettingsDialog::new(&Settings::default());
        assert!(!dialog.is_visible());

        dialog.show(&Settings::new("F3", "https://example.com"));
        assert_eq!(dialog.state(), &DialogState::Editing);
        assert_eq!(
            dialog.get_settings(),
            Settings::new("F3", "https://example.com")
        );
    }

    #[test]
    fn test_edits_are_reflected() {
        let mut dialog = SettingsDialog::new(&Settings::default());
        dialog.show(&Settings::default());
        dialog.set_hotkey(Hotkey::F1);
        dialog.set_url("https://rust-lang.org".to_string());

        assert_eq!(
            dialog.get_settings(),
            Settings::new("F1", "https://rust-lang.org")
        );
    }

    #[test]
    fn test_unsupported_hotkey_is_kept_until_changed() {
        let mut dialog = SettingsDialog::new(&Settings::default());
        dialog.show(&Settings::new("F12", "https://example.com"));
        assert_eq!(dialog.get_settings().hotkey, "F12");

        dialog.set_hotkey(Hotkey::F4);
        assert_eq!(dialog.get_settings().hotkey, "F4");
    }

    #[test]
    fn test_reopen_discards_unsaved_edits() {
        let saved = Settings::new("F6", "https://example.com");
        let mut dialog = SettingsDialog::new(&saved);
        dialog.show(&saved);
        dialog.set_url("https://unsaved.example".to_string());
        dialog.hide();

        dialog.show(&saved);
        assert_eq!(dialog.get_settings(), saved);
    }
}
