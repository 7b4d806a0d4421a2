//! Menu process: a resident full-screen menu toggled over a local socket.
//!
//! `menu-overlay --toggle` is the client side: it asks a running menu to
//! flip visibility and exits immediately.

use clap::Parser;
use mos_overlay::{
    ActivationChannel, Config, DeviceRegistry, EventMultiplexer, HeadlessSurface, Menu, UiLoop,
    send_toggle,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Ask the running menu to toggle, then exit
    #[arg(long)]
    toggle: bool,

    /// Path to the JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    let config = Config::load_or_default(args.config.as_deref());

    if args.toggle {
        // Nobody listening is not an error for the client.
        let _ = send_toggle(&config.menu.socket_path);
        return ExitCode::SUCCESS;
    }

    // Escape, navigation and select come straight from the input devices.
    let input = match DeviceRegistry::discover(&config.daemon.input_dir) {
        Ok(devices) => Some(EventMultiplexer::new(devices, Duration::ZERO)),
        Err(e) => {
            log::warn!("Menu keys unavailable: {}", e);
            None
        }
    };

    let mut ui: UiLoop<Menu> = UiLoop::new().with_tick(Duration::from_millis(20));
    let mut menu = Menu::new(
        &config.menu,
        Box::new(HeadlessSurface::new(input)),
        ui.handle(),
    );

    let handle = ui.handle();
    let _channel = match ActivationChannel::bind(&config.menu.socket_path, move || {
        let _ = handle.call_soon(|menu: &mut Menu| menu.toggle());
    }) {
        Ok(channel) => Some(channel),
        Err(e) => {
            log::warn!("Toggle socket unavailable: {}", e);
            None
        }
    };

    if let Err(e) = ui
        .handle()
        .call_later(config.menu.reveal_delay(), |menu: &mut Menu| menu.show())
    {
        log::error!("{}", e);
        return ExitCode::FAILURE;
    }

    ui.run(&mut menu, Menu::on_turn);
    log::info!("Menu exited");
    ExitCode::SUCCESS
}
