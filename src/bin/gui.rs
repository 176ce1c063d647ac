use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use web_opener::gui;
use web_opener::keyboard::RdevKeyState;
use web_opener::opener::SystemOpener;
use web_opener::poller::{PollTiming, Poller, start_poller};
use web_opener::settings::SettingsStore;

#[derive(Parser, Debug)]
#[command(name = "web-opener")]
#[command(version)]
#[command(about = "Open a webpage with a global hotkey.")]
struct Args {
    #[arg(long, env = "WEB_OPENER_CONFIG", help = "Path to the settings file")]
    config: Option<PathBuf>,
}

pub fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("Web Opener v{}", env!("CARGO_PKG_VERSION"));

    let store = args.config.map_or_else(SettingsStore::default, SettingsStore::new);
    let settings = store.load();
    info!("Settings ({}):\n{settings}", store.path().display());

    let key_state = RdevKeyState::start().context("failed to start the key listener")?;
    let poller = Poller::new(&settings, key_state, SystemOpener, PollTiming::default());
    let poller_handle = start_poller(poller)?;

    let result = gui::start(store, settings, poller_handle.events());

    poller_handle.join();
    result.map_err(|e| anyhow::anyhow!("GUI error: {e}"))
}
