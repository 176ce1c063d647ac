use crossbeam::channel::Receiver;
use iced::widget::{button, column, container, row, space, text};
use iced::{Color, Element, Length, Subscription, Task, Theme, time, time::Duration};
use log::{debug, info, warn};

use crate::gui::handlers::settings::SettingsHandler;
use crate::gui::messages::{Message, SettingsMessage};
use crate::hotkey::Hotkey;
use crate::poller::PollerEvent;
use crate::settings::{Settings, SettingsStore};

const POLLER_EVENT_INTERVAL: Duration = Duration::from_millis(250);
const WARNING: Color = Color::from_rgb(1.0, 0.5, 0.3);

pub struct WebOpenerApp {
    /// Latest saved settings
    settings: Settings,
    /// Hotkey the running poller was started with
    active_hotkey: String,
    settings_handler: SettingsHandler,
    poller_events: Receiver<PollerEvent>,
    poller_warning: Option<String>,
}

impl WebOpenerApp {
    pub fn new(
        store: SettingsStore,
        settings: Settings,
        poller_events: Receiver<PollerEvent>,
    ) -> Self {
        let settings_handler = SettingsHandler::new(store, &settings);

        Self {
            active_hotkey: settings.hotkey.clone(),
            settings,
            settings_handler,
            poller_events,
            poller_warning: None,
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        if let Some(dialog) = self.settings_handler.view() {
            return dialog;
        }

        let top_bar = row![
            space::horizontal(),
            button("Settings").on_press(Message::Settings(SettingsMessage::Open)),
        ];

        let label = text(hotkey_label(&self.active_hotkey)).size(18);
        let mut main_content = column![top_bar, label].spacing(20).padding(20);

        if let Some(warning) = &self.poller_warning {
            main_content = main_content.push(text(warning.as_str()).size(14).style(
                |_: &iced::Theme| iced::widget::text::Style {
                    color: Some(WARNING),
                },
            ));
        }

        container(main_content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        Theme::TokyoNight
    }

    pub fn subscription(&self) -> Subscription<Message> {
        time::every(POLLER_EVENT_INTERVAL).map(|_| Message::PollerTick)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Settings(msg) => {
                return self.settings_handler.handle(msg, &mut self.settings);
            }
            Message::PollerTick => self.drain_poller_events(),
        }

        Task::none()
    }

    fn drain_poller_events(&mut self) {
        while let Ok(event) = self.poller_events.try_recv() {
            match event {
                PollerEvent::Triggered { url } => debug!("Opened {url}"),
                PollerEvent::OpenFailed { url, reason } => {
                    warn!("Could not open {url}: {reason}");
                }
                PollerEvent::Stopped { reason: Some(reason) } => {
                    self.poller_warning = Some(format!(
                        "The hotkey stopped working: {reason}. Restart Web Opener to try again."
                    ));
                }
                PollerEvent::Stopped { reason: None } => info!("Hotkey poller stopped"),
            }
        }
    }
}

/// Text of the main window label for the hotkey the poller is using
pub fn hotkey_label(hotkey: &str) -> String {
    match Hotkey::resolve(hotkey) {
        Some(hotkey) => format!("Press {hotkey} to open the webpage!"),
        None => format!("Hotkey '{hotkey}' is not supported, pick one in Settings."),
    }
}
