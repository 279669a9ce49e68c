// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Dynamic range normalization into the unsigned threshold domain.

/// Headroom ceiling: normalized samples never reach the top 1/128th of
/// the u32 range, so downstream integer midpoints cannot overflow.
pub const NORMALIZED_CEILING: u32 = u32::MAX - u32::MAX / 128;

/// Tracks a decaying envelope range block by block and maps samples
/// into `0..=NORMALIZED_CEILING`.
///
/// Once per block both extremes decay by 1% toward zero, then widen to
/// the block's own extremes. The decay lets the range follow a fading
/// signal; the widening still captures transient peaks. A degenerate
/// range is held open at least 0.1 so the scale factor stays finite.
pub struct RangeNormalizer {
    smin: f32,
    smax: f32,
}

impl RangeNormalizer {
    pub fn new() -> Self {
        Self {
            smin: f32::MAX / 2.0,
            smax: -f32::MAX / 2.0,
        }
    }

    /// Decay the tracked range and widen it to cover `block`.
    pub fn update_block(&mut self, block: &[f32]) {
        if block.is_empty() {
            return;
        }

        self.smax -= 0.01 * self.smax.abs();
        self.smin += 0.01 * self.smin.abs();
        for &s in block {
            if s > self.smax {
                self.smax = s;
            }
            if s < self.smin {
                self.smin = s;
            }
        }
        if self.smin >= self.smax {
            self.smin = self.smax - 0.1;
        }
    }

    /// Map one sample into the normalized domain using the current range.
    pub fn scale(&self, sample: f32) -> u32 {
        let scale = (self.smax - self.smin) / u32::MAX as f32;
        let scaled = ((sample - self.smin) / scale).max(0.0);
        if scaled >= NORMALIZED_CEILING as f32 {
            NORMALIZED_CEILING
        } else {
            scaled as u32
        }
    }
}

impl Default for RangeNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{RangeNormalizer, NORMALIZED_CEILING};

    #[test]
    fn test_silent_block_pins_output_at_ceiling() {
        // All-zero input collapses the range to the forced 0.1-wide
        // window just below zero, so zero itself sits at the top.
        let mut norm = RangeNormalizer::new();
        norm.update_block(&[0.0; 64]);
        assert_eq!(norm.scale(0.0), NORMALIZED_CEILING);
    }

    #[test]
    fn test_block_extremes_map_to_opposite_ends() {
        let mut norm = RangeNormalizer::new();
        let block: Vec<f32> = (0..=200).map(|n| n as f32 * 10.0 - 1000.0).collect();
        norm.update_block(&block);

        assert_eq!(norm.scale(-1000.0), 0);
        assert_eq!(norm.scale(1000.0), NORMALIZED_CEILING);
        let mid = norm.scale(0.0) as i64;
        assert!((mid - (u32::MAX / 2) as i64).abs() < 1 << 24, "mid {}", mid);
    }

    #[test]
    fn test_output_stays_within_bounds() {
        let mut norm = RangeNormalizer::new();
        norm.update_block(&[-500.0, 500.0]);
        assert_eq!(norm.scale(-2000.0), 0);
        assert_eq!(norm.scale(2000.0), NORMALIZED_CEILING);
        for n in 0..1000 {
            let s = (n - 500) as f32;
            assert!(norm.scale(s) <= NORMALIZED_CEILING);
        }
    }

    #[test]
    fn test_range_decays_toward_zero_between_blocks() {
        let mut norm = RangeNormalizer::new();
        norm.update_block(&[-1000.0, 1000.0]);

        // A loud block followed by a long quiet stretch: the extremes
        // decay 1% per block until the quiet swing spans the range again.
        for _ in 0..500 {
            norm.update_block(&[-10.0, 10.0]);
        }
        assert_eq!(norm.scale(-10.0), 0);
        assert_eq!(norm.scale(10.0), NORMALIZED_CEILING);
    }

    #[test]
    fn test_empty_block_leaves_range_untouched() {
        let mut norm = RangeNormalizer::new();
        norm.update_block(&[-100.0, 100.0]);
        let before = norm.scale(0.0);
        norm.update_block(&[]);
        assert_eq!(norm.scale(0.0), before);
    }
}
