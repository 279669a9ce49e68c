// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! OOK demodulation pipeline: tone bandpass, envelope detection, range
//! normalization and edge slicing.

pub mod biquad;
pub mod edge;
pub mod normalize;
pub mod threshold;

use thiserror::Error;
use tracing::debug;

use crate::config::DspConfig;
use biquad::Biquad;
use edge::EdgeDetector;
use normalize::RangeNormalizer;

#[derive(Debug, Error)]
pub enum DspError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Q of the tone-selection bandpass. Narrow enough to isolate a keyed
/// carrier from adjacent traffic.
const BANDPASS_Q: f32 = 20.0;
/// Q of the envelope smoothing lowpass (Butterworth).
const LOWPASS_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Turns interleaved PCM blocks into signed edge events.
///
/// Each block is processed in two passes: channel 0 is bandpassed at the
/// tone frequency, full-wave rectified and lowpassed into an envelope,
/// then the normalizer range is updated over the whole block and every
/// envelope sample is mapped into the u32 domain and sliced with the
/// hysteresis edge detector. Edge events are the signed run lengths
/// between threshold crossings, in samples.
pub struct OokDemodulator {
    bandpass: Biquad,
    lowpass: Biquad,
    normalizer: RangeNormalizer,
    edges: EdgeDetector,
    channels: usize,
    monitor: bool,
    envelope: Vec<f32>,
}

impl OokDemodulator {
    pub fn new(cfg: &DspConfig, sample_rate: u32, channels: usize) -> Result<Self, DspError> {
        if channels == 0 {
            return Err(DspError::InvalidArgument("channels must be positive"));
        }
        let nyquist = sample_rate as f32 / 2.0;
        if cfg.tone_hz <= 0.0 || cfg.tone_hz >= nyquist {
            return Err(DspError::InvalidArgument(
                "tone_hz must be below the Nyquist frequency",
            ));
        }
        if cfg.envelope_cutoff_hz <= 0.0 || cfg.envelope_cutoff_hz >= cfg.tone_hz {
            return Err(DspError::InvalidArgument(
                "envelope_cutoff_hz must be below tone_hz",
            ));
        }

        debug!(
            tone_hz = cfg.tone_hz,
            envelope_cutoff_hz = cfg.envelope_cutoff_hz,
            sample_rate,
            "demodulator configured"
        );

        Ok(Self {
            bandpass: Biquad::bandpass(cfg.tone_hz / sample_rate as f32, BANDPASS_Q),
            lowpass: Biquad::lowpass(cfg.envelope_cutoff_hz / sample_rate as f32, LOWPASS_Q),
            normalizer: RangeNormalizer::new(),
            edges: EdgeDetector::new(cfg.decay_step, cfg.min_range)?,
            channels,
            monitor: cfg.monitor_path.is_some(),
            envelope: Vec::new(),
        })
    }

    /// Process one interleaved block in place.
    ///
    /// When monitoring is enabled, channel 0 of each frame is replaced
    /// with the normalized envelope folded back into i16, so the block
    /// can be dumped and inspected.
    pub fn process_block(&mut self, block: &mut [i16]) -> Vec<i32> {
        self.envelope.clear();
        for frame in block.chunks(self.channels) {
            let filtered = self.bandpass.process(frame[0] as f32);
            self.envelope.push(self.lowpass.process(filtered.abs()));
        }
        self.normalizer.update_block(&self.envelope);

        let mut events = Vec::new();
        for (frame, &envelope) in block.chunks_mut(self.channels).zip(&self.envelope) {
            let normalized = self.normalizer.scale(envelope);

            if self.monitor {
                frame[0] = ((normalized >> 16) as i32 + i16::MIN as i32) as i16;
            }

            if let Some(event) = self.edges.process(normalized) {
                events.push(event);
            }
        }
        events
    }
}
