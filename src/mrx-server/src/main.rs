// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

mod audio;
mod config;
mod decode_logs;
mod decode_task;
mod display;
mod dsp;

use std::path::PathBuf;

use clap::Parser;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use mrx_app::init_logging;
use mrx_core::{DynResult, MorseEvent};
use mrx_morse::{MorseDecoder, MorseDecoderConfig};

use config::ServerConfig;
use decode_logs::MorseLogger;
use display::TerminalDisplay;

const PKG_DESCRIPTION: &str = concat!(env!("CARGO_PKG_NAME"), " - Morse demodulation daemon");
const EVENT_CHANNEL_DEPTH: usize = 64;

#[derive(Debug, Parser)]
#[command(
    version = env!("CARGO_PKG_VERSION"),
    about = PKG_DESCRIPTION,
)]
struct Cli {
    /// Path to configuration file
    #[arg(long = "config", short = 'C', value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print example configuration and exit
    #[arg(long = "print-config")]
    print_config: bool,
    /// Audio input device name (overrides config)
    #[arg(short = 'd', long = "device")]
    device: Option<String>,
    /// Dump the normalized envelope as raw PCM to FILE (overrides config)
    #[arg(long = "monitor", value_name = "FILE")]
    monitor: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> DynResult<()> {
    let cli = Cli::parse();

    if cli.print_config {
        println!("{}", ServerConfig::example_combined_toml());
        return Ok(());
    }

    let (mut cfg, config_path) = match cli.config {
        Some(ref path) => (ServerConfig::load_from_file(path)?, Some(path.clone())),
        None => ServerConfig::load_from_default_paths()?,
    };
    if let Some(device) = cli.device {
        cfg.audio.device = Some(device);
    }
    if let Some(monitor) = cli.monitor {
        cfg.dsp.monitor_path = Some(monitor.to_string_lossy().into_owned());
    }
    cfg.validate()
        .map_err(|e| format!("invalid configuration: {}", e))?;

    init_logging(cfg.general.log_level.as_deref());
    match config_path {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }

    let logger = MorseLogger::from_config(&cfg.decode_logs)?;
    let morse_cfg = MorseDecoderConfig::from(&cfg.morse);
    let decoder = MorseDecoder::new(&morse_cfg)?;

    let (edge_tx, edge_rx) = decode_task::edge_event_channel();
    let (event_tx, _) = broadcast::channel::<MorseEvent>(EVENT_CHANNEL_DEPTH);

    // Log keying-speed changes as the decoder adapts.
    let mut event_rx = event_tx.subscribe();
    tokio::spawn(async move {
        let mut last_threshold = 0;
        while let Ok(event) = event_rx.recv().await {
            if event.dit_threshold != last_threshold {
                last_threshold = event.dit_threshold;
                debug!(dit_threshold = last_threshold, "timing threshold updated");
            }
        }
    });

    let (_capture_handle, block_rx) = audio::spawn_audio_capture(&cfg.audio);

    let dsp_cfg = cfg.dsp.clone();
    let audio_cfg = cfg.audio.clone();
    std::thread::spawn(move || {
        if let Err(e) = audio::run_dsp_stage(&dsp_cfg, &audio_cfg, block_rx, edge_tx) {
            error!("Demodulator error: {}", e);
        }
    });

    let decode_handle = tokio::spawn(decode_task::run_decode_task(
        edge_rx,
        decoder,
        Box::new(TerminalDisplay::new()),
        event_tx,
        logger,
    ));

    info!("mrx-server running, press Ctrl-C to stop");
    tokio::select! {
        _ = signal::ctrl_c() => info!("Shutdown requested"),
        _ = decode_handle => info!("Decode task ended"),
    }
    Ok(())
}
