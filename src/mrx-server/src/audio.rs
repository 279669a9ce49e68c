// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Audio capture and the synchronous demodulation stage.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use mrx_core::DynResult;

use crate::config::{AudioConfig, DspConfig};
use crate::decode_task::EdgeEventSender;
use crate::dsp::OokDemodulator;

/// Capture blocks queued between the cpal callback and the DSP stage.
const CAPTURE_CHANNEL_DEPTH: usize = 64;
/// How long the DSP stage waits for a capture block before checking for
/// shutdown.
const CAPTURE_RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// Spawn the audio capture thread.
///
/// Opens the configured input device via cpal and forwards interleaved
/// i16 blocks into a bounded channel. Blocks are dropped when the DSP
/// stage falls behind.
pub fn spawn_audio_capture(
    cfg: &AudioConfig,
) -> (std::thread::JoinHandle<()>, Receiver<Vec<i16>>) {
    let (block_tx, block_rx) = std::sync::mpsc::sync_channel::<Vec<i16>>(CAPTURE_CHANNEL_DEPTH);
    let sample_rate = cfg.sample_rate;
    let channels = cfg.channels as u16;
    let device_name = cfg.device.clone();

    let handle = std::thread::spawn(move || {
        if let Err(e) = run_capture(sample_rate, channels, device_name, block_tx) {
            error!("Audio capture thread error: {}", e);
        }
    });
    (handle, block_rx)
}

fn run_capture(
    sample_rate: u32,
    channels: u16,
    device_name: Option<String>,
    block_tx: SyncSender<Vec<i16>>,
) -> DynResult<()> {
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

    let host = cpal::default_host();
    let device = if let Some(ref name) = device_name {
        host.input_devices()?
            .find(|d| d.name().map(|n| n == *name).unwrap_or(false))
            .ok_or_else(|| format!("audio input device '{}' not found", name))?
    } else {
        host.default_input_device()
            .ok_or("no default audio input device")?
    };

    info!(
        "Audio capture: using device '{}'",
        device.name().unwrap_or_else(|_| "unknown".into())
    );

    let config = cpal::StreamConfig {
        channels,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let callback_tx = block_tx.clone();
    let stream = device.build_input_stream(
        &config,
        move |data: &[i16], _: &cpal::InputCallbackInfo| {
            if callback_tx.try_send(data.to_vec()).is_err() {
                debug!("Audio capture: dropped block, demodulator is behind");
            }
        },
        |err| {
            warn!("Audio input stream error: {}", err);
        },
        None,
    )?;

    stream.play()?;
    info!(
        "Audio capture: started ({}Hz, {} ch)",
        sample_rate, channels
    );

    // The stream object must stay alive for capture to continue; park
    // until the consumer side hangs up.
    loop {
        std::thread::sleep(Duration::from_secs(1));
        let probe = block_tx.try_send(Vec::new());
        if matches!(probe, Err(std::sync::mpsc::TrySendError::Disconnected(_))) {
            break;
        }
    }
    info!("Audio capture: stopped");
    Ok(())
}

/// Run the demodulation stage: drain capture blocks, run the OOK
/// pipeline, and submit edge events to the decode task.
///
/// Blocking; intended to run on its own thread. Returns when the capture
/// side hangs up or the decode task goes away.
pub fn run_dsp_stage(
    dsp_cfg: &DspConfig,
    audio_cfg: &AudioConfig,
    block_rx: Receiver<Vec<i16>>,
    edge_tx: EdgeEventSender,
) -> DynResult<()> {
    let mut demod = OokDemodulator::new(dsp_cfg, audio_cfg.sample_rate, audio_cfg.channels as usize)?;
    let mut monitor = match dsp_cfg.monitor_path.as_deref() {
        Some(path) => Some(open_monitor(Path::new(path))?),
        None => None,
    };

    info!("Demodulator started");
    loop {
        let mut block = match block_rx.recv_timeout(CAPTURE_RECV_TIMEOUT) {
            Ok(block) => block,
            // Idle periods are the decode task's business; it runs its
            // own receive timeout.
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        for event in demod.process_block(&mut block) {
            if !edge_tx.submit(event) {
                info!("Demodulator stopping, decode task is gone");
                return Ok(());
            }
        }

        if let Some(ref mut writer) = monitor {
            write_monitor_block(writer, &block);
        }
    }
    info!("Demodulator stopped, capture ended");
    Ok(())
}

fn open_monitor(path: &Path) -> DynResult<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    info!("Monitor dump: writing normalized envelope to {}", path.display());
    Ok(BufWriter::new(File::create(path)?))
}

fn write_monitor_block(writer: &mut BufWriter<File>, block: &[i16]) {
    for sample in block {
        if writer.write_all(&sample.to_le_bytes()).is_err() {
            warn!("Monitor dump write failed");
            return;
        }
    }
}
