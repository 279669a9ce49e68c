// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Adaptive level tracker for OOK slicing.

use crate::dsp::DspError;

/// Tracks the min/max envelope of the normalized signal and derives the
/// two hysteresis thresholds the edge detector slices against.
///
/// Each update decays the extreme on the side opposite the sample by
/// `decay_step`, so a stuck extreme (one loud burst, then silence) is
/// forgotten. The decay is clamped so the tracked range never drops
/// below `min_range`; without that floor, noise during long silence
/// would collapse the range and turn the noise itself into edges.
pub struct AdaptiveThreshold {
    min: i64,
    max: i64,
    decay_step: i64,
    min_range: i64,
}

impl AdaptiveThreshold {
    pub fn new(decay_step: u32, min_range: u32) -> Result<Self, DspError> {
        if decay_step == 0 {
            return Err(DspError::InvalidArgument("decay_step must be positive"));
        }
        if min_range as u64 <= 2 * decay_step as u64 {
            return Err(DspError::InvalidArgument(
                "min_range must exceed twice decay_step",
            ));
        }
        // Start from a tiny interval around zero; the first samples widen
        // it to the real signal range.
        Ok(Self {
            min: -1,
            max: 1,
            decay_step: decay_step as i64,
            min_range: min_range as i64,
        })
    }

    pub fn update(&mut self, sample: u32) {
        let s = sample as i64;
        if s > self.max {
            self.max = s;
        }
        if s < self.min {
            self.min = s;
        }

        let range = self.max - self.min;
        if range > self.min_range {
            let step = self.decay_step.min(range - self.min_range);
            if s > self.min + range / 2 {
                self.min += step;
            } else {
                self.max -= step;
            }
        }
    }

    /// Threshold a rising signal must reach to count as "tone on".
    pub fn positive_threshold(&self) -> i64 {
        self.min + (self.max - self.min) / 2
    }

    /// Threshold a falling signal must drop below to count as "tone off".
    /// Sits at a quarter of the range so envelope ripple near the midpoint
    /// cannot chatter.
    pub fn negative_threshold(&self) -> i64 {
        self.min + (self.max - self.min) / 4
    }

    pub fn range(&self) -> i64 {
        self.max - self.min
    }
}
