// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! The decode task: consumes edge events, drives the Morse decoder and
//! fans results out to the display, the event bus and the decode log.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::timeout;
use tracing::{debug, info};

use mrx_core::{MorseEvent, MorseTranscript};
use mrx_morse::{MorseDecoder, MorseOutput};

use crate::decode_logs::MorseLogger;
use crate::display::CharDisplay;

/// Edge events queued between the demodulator and the decode task.
const EDGE_CHANNEL_DEPTH: usize = 16;
/// With no edge event for this long, the decoder gets an idle tick.
const IDLE_TICK: Duration = Duration::from_secs(1);

/// Producer half of the edge-event queue.
///
/// `submit` never blocks the demodulator: when the decode task falls
/// behind, events are dropped and decoding degrades instead of audio
/// capture stalling.
#[derive(Clone)]
pub struct EdgeEventSender {
    tx: mpsc::Sender<i32>,
}

impl EdgeEventSender {
    /// Returns false when the decode task is gone.
    pub fn submit(&self, event: i32) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(event, "edge event dropped, decode queue full");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}

pub fn edge_event_channel() -> (EdgeEventSender, mpsc::Receiver<i32>) {
    let (tx, rx) = mpsc::channel(EDGE_CHANNEL_DEPTH);
    (EdgeEventSender { tx }, rx)
}

/// Run the decode loop until the edge-event channel closes.
pub async fn run_decode_task(
    mut edge_rx: mpsc::Receiver<i32>,
    mut decoder: MorseDecoder,
    mut display: Box<dyn CharDisplay + Send>,
    event_tx: broadcast::Sender<MorseEvent>,
    logger: Option<MorseLogger>,
) {
    info!("Decode task started");
    loop {
        let outputs = match timeout(IDLE_TICK, edge_rx.recv()).await {
            Ok(Some(event)) => decoder.handle_edge(event),
            Ok(None) => break,
            Err(_) => decoder.handle_idle(),
        };

        for output in outputs {
            match output {
                MorseOutput::Char(c) => {
                    display.put_char(c);
                    let _ = event_tx.send(MorseEvent {
                        text: c.to_string(),
                        dit_threshold: decoder.dit_threshold(),
                    });
                }
                MorseOutput::WordGap => {
                    display.put_char(' ');
                    let _ = event_tx.send(MorseEvent {
                        text: " ".to_string(),
                        dit_threshold: decoder.dit_threshold(),
                    });
                }
                MorseOutput::Flush { raw, text } => {
                    info!(%raw, %text, "morse transcript");
                    if let Some(ref logger) = logger {
                        logger.log_morse(&MorseTranscript { raw, text });
                    }
                }
            }
        }
    }
    info!("Decode task stopped");
}
