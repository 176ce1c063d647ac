use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;
use web_opener::keyboard::RdevKeyState;
use web_opener::opener::SystemOpener;
use web_opener::poller::{PollTiming, PollerEvent, Poller, start_poller};
use web_opener::settings::SettingsStore;

#[derive(Parser, Debug)]
#[command(name = "web-opener-cli")]
#[command(version)]
#[command(about = "Open a webpage with a global hotkey, without a window.")]
struct Args {
    #[arg(long, env = "WEB_OPENER_CONFIG", help = "Path to the settings file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Hotkey to use for this session (F1..F10)")]
    hotkey: Option<String>,

    #[arg(long, help = "URL to open for this session")]
    url: Option<String>,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("Web Opener v{}", env!("CARGO_PKG_VERSION"));
    info!("Args: {args:?}");

    let store = args.config.map_or_else(SettingsStore::default, SettingsStore::new);
    let mut settings = store.load();
    if let Some(hotkey) = args.hotkey {
        settings.hotkey = hotkey;
    }
    if let Some(url) = args.url {
        settings.url = url;
    }
    info!("Settings:\n{settings}");

    let key_state = RdevKeyState::start().context("failed to start the key listener")?;
    let poller = Poller::new(&settings, key_state, SystemOpener, PollTiming::default());
    let poller_handle = start_poller(poller)?;

    let running = Arc::new(AtomicBool::new(true));
    let shutdown_flag = Arc::clone(&running);

    ctrlc::set_handler(move || {
        info!("Ctrl+C received, shutting down...");
        shutdown_flag.store(false, Ordering::SeqCst);
    })
    .context("error setting Ctrl+C handler")?;

    while running.load(Ordering::SeqCst) {
        while let Some(event) = poller_handle.try_recv() {
            match event {
                PollerEvent::Triggered { url } => info!("Opened {url}"),
                PollerEvent::OpenFailed { url, reason } => warn!("Could not open {url}: {reason}"),
                PollerEvent::Stopped { reason } => {
                    poller_handle.join();
                    return match reason {
                        Some(reason) => Err(anyhow::anyhow!("hotkey poller stopped: {reason}")),
                        None => Ok(()),
                    };
                }
            }
        }
        thread::sleep(Duration::from_millis(250));
    }

    poller_handle.join();
    Ok(())
}
