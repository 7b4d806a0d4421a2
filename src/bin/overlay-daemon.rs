//! Trigger daemon: watches input devices and launches the menu on a combo.

use clap::Parser;
use mos_overlay::{Config, Daemon, DeviceRegistry, InputSource, ProcessSpawner};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
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

    let devices = match DeviceRegistry::discover(&config.daemon.input_dir) {
        Ok(devices) => devices,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    for device in &devices {
        log::info!("{} | {}", device.path().display(), device.name());
    }

    let mut command = config
        .daemon
        .menu_command
        .clone()
        .unwrap_or_else(ProcessSpawner::default_command);
    if let Some(path) = &args.config {
        command.push("--config".into());
        command.push(path.to_string_lossy().into_owned());
    }
    let spawner = ProcessSpawner::new(config.daemon.process_token.clone(), command);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        log::warn!("Cannot install signal handler: {}", e);
    }

    let mut daemon = Daemon::from_config(devices, &config, spawner);
    match daemon.run(&running) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
