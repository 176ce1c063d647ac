pub mod app;
pub mod components;
pub mod handlers;
pub mod messages;

pub use app::WebOpenerApp;
use crossbeam::channel::Receiver;
pub use messages::Message;

use crate::poller::PollerEvent;
use crate::settings::{Settings, SettingsStore};

pub fn start(
    store: SettingsStore,
    settings: Settings,
    poller_events: Receiver<PollerEvent>,
) -> iced::Result {
    iced::application(
        move || WebOpenerApp::new(store.clone(), settings.clone(), poller_events.clone()),
        WebOpenerApp::update,
        WebOpenerApp::view,
    )
    .title("Web Opener")
    .window_size((360.0, 280.0))
    .theme(WebOpenerApp::theme)
    .subscription(WebOpenerApp::subscription)
    .run()
}
