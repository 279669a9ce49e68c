// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Exponentially decaying pulse-duration histogram.
//!
//! Pulse durations are bimodal (short = dit, long = dah). The histogram
//! decays every counter on each new sample so the two populations track
//! the sender's speed as it drifts, and the midpoint between the two
//! dominant peaks is the dit/dah discrimination threshold.

use crate::MorseError;

pub struct DecayingHistogram {
    bins: Vec<f32>,
    min_val: i32,
    max_val: i32,
    bin_width: f32,
    /// Bins around the primary peak that signal jitter is assumed to
    /// spread into; excluded when searching for the secondary peak.
    signal_spread: usize,
    decay_exponent: f32,
}

impl DecayingHistogram {
    pub fn new(
        min_val: i32,
        max_val: i32,
        num_bins: usize,
        signal_spread: usize,
        decay_exponent: f32,
    ) -> Result<Self, MorseError> {
        if num_bins == 0 {
            return Err(MorseError::InvalidArgument("num_bins must be positive"));
        }
        if !(0.0..1.0).contains(&decay_exponent) || decay_exponent == 0.0 {
            return Err(MorseError::InvalidArgument(
                "decay_exponent must be in (0, 1)",
            ));
        }
        if min_val >= max_val {
            return Err(MorseError::InvalidArgument("min_val must be below max_val"));
        }

        Ok(Self {
            bins: vec![0.0; num_bins],
            min_val,
            max_val,
            bin_width: (max_val - min_val) as f32 / num_bins as f32,
            signal_spread,
            decay_exponent,
        })
    }

    /// Apply one decay step to every bin.
    pub fn decay(&mut self) {
        for bin in &mut self.bins {
            *bin *= self.decay_exponent;
        }
    }

    /// Decay all bins, then count `sample` if it falls inside
    /// `[min_val, max_val]`. Out-of-range samples are decayed over but
    /// not counted.
    pub fn add_sample(&mut self, sample: i32) {
        self.decay();

        if sample >= self.min_val && sample <= self.max_val {
            let index = ((sample - self.min_val) as f32 / self.bin_width) as usize;
            if let Some(bin) = self.bins.get_mut(index) {
                *bin += 1.0;
            }
        }
    }

    /// Locate the two dominant peaks.
    ///
    /// The global maximum is found first; a window of `signal_spread`
    /// bins on each side of it is excluded while searching for the
    /// secondary peak. The pair is returned ordered by bin index, not by
    /// magnitude. An all-zero histogram degrades to `(0, num_bins - 1)`.
    pub fn min_max_bins(&self) -> (usize, usize) {
        let num_bins = self.bins.len();

        let mut peak1 = 0usize;
        let mut peak1_count = 0.0f32;
        for (i, &count) in self.bins.iter().enumerate() {
            if count > peak1_count {
                peak1_count = count;
                peak1 = i;
            }
        }
        if peak1_count == 0.0 {
            return (0, num_bins - 1);
        }

        let excl_lo = peak1.saturating_sub(self.signal_spread);
        let excl_hi = (peak1 + self.signal_spread).min(num_bins - 1);

        let mut peak2 = if excl_lo > 0 { 0 } else { num_bins - 1 };
        let mut peak2_count = -1.0f32;
        for (i, &count) in self.bins.iter().enumerate() {
            if i >= excl_lo && i <= excl_hi {
                continue;
            }
            if count > peak2_count {
                peak2_count = count;
                peak2 = i;
            }
        }

        if peak1 <= peak2 {
            (peak1, peak2)
        } else {
            (peak2, peak1)
        }
    }

    /// Dit/dah discrimination threshold: the midpoint between the two
    /// dominant peaks' bin-center durations.
    pub fn threshold(&self) -> i32 {
        let (lo, hi) = self.min_max_bins();
        let lo_val = self.bin_value(lo);
        let hi_val = self.bin_value(hi);
        lo_val + (hi_val - lo_val) / 2
    }

    /// Center duration of a bin.
    fn bin_value(&self, index: usize) -> i32 {
        self.min_val + (index as f32 * self.bin_width + self.bin_width / 2.0) as i32
    }

    pub fn bins(&self) -> &[f32] {
        &self.bins
    }
}

#[cfg(test)]
mod tests {
    use super::DecayingHistogram;

    fn histogram() -> DecayingHistogram {
        DecayingHistogram::new(1000, 12000, 256, 8, 0.8).expect("valid config")
    }

    #[test]
    fn test_rejects_bad_config() {
        assert!(DecayingHistogram::new(0, 1000, 0, 2, 0.8).is_err());
        assert!(DecayingHistogram::new(0, 1000, 16, 2, 0.0).is_err());
        assert!(DecayingHistogram::new(0, 1000, 16, 2, 1.0).is_err());
        assert!(DecayingHistogram::new(1000, 1000, 16, 2, 0.8).is_err());
    }

    #[test]
    fn test_repeated_sample_accumulates_in_one_bin() {
        // Decay exponent close enough to 1 that N samples of the same
        // value leave essentially N counts in the containing bin.
        let mut hist = DecayingHistogram::new(1000, 12000, 256, 8, 0.999_999).expect("valid");
        for _ in 0..100 {
            hist.add_sample(2000);
        }
        // Bin width is (12000-1000)/256 ≈ 43; 2000 lands in bin 23. With
        // no secondary population the second peak falls back to the first
        // zero bin outside the spread window.
        assert_eq!(hist.min_max_bins(), (0, 23));
        assert!((hist.bins()[23] - 100.0).abs() < 0.01);
        assert_eq!(hist.bins().iter().filter(|&&b| b > 0.0).count(), 1);
    }

    #[test]
    fn test_idle_decay_drives_bins_to_zero() {
        let mut hist = histogram();
        for _ in 0..20 {
            hist.add_sample(2000);
        }
        for _ in 0..200 {
            hist.decay();
        }
        // 0.8^200 leaves nothing measurable in any bin.
        assert!(hist.bins().iter().all(|&b| b < 1e-6));
    }

    #[test]
    fn test_two_clusters_found_regardless_of_amplitude() {
        // Taller cluster at the longer duration: min_max_bins must still
        // return (short, long) ordered by index.
        let mut hist = histogram();
        for _ in 0..5 {
            hist.add_sample(2000);
        }
        for _ in 0..40 {
            hist.add_sample(6000);
        }
        let (lo, hi) = hist.min_max_bins();
        let width = (12000 - 1000) as f32 / 256.0;
        assert_eq!(lo, ((2000 - 1000) as f32 / width) as usize);
        assert_eq!(hi, ((6000 - 1000) as f32 / width) as usize);

        // And the mirror case: taller cluster at the short duration.
        let mut hist = histogram();
        for _ in 0..40 {
            hist.add_sample(2000);
        }
        for _ in 0..5 {
            hist.add_sample(6000);
        }
        assert_eq!(hist.min_max_bins(), (lo, hi));
    }

    #[test]
    fn test_threshold_between_clusters() {
        let mut hist = histogram();
        for _ in 0..10 {
            hist.add_sample(2000);
            hist.add_sample(6000);
        }
        let threshold = hist.threshold();
        assert!(threshold > 2000 && threshold < 6000, "got {}", threshold);
        // Roughly centered between the two populations.
        assert!((threshold - 4000).abs() < 200, "got {}", threshold);
    }

    #[test]
    fn test_out_of_range_samples_not_counted() {
        let mut hist = histogram();
        for _ in 0..10 {
            hist.add_sample(500);
            hist.add_sample(20000);
        }
        assert_eq!(hist.min_max_bins(), (0, 255));
    }

    #[test]
    fn test_jitter_around_peak_excluded_from_secondary_search() {
        // Two adjacent bins near the primary peak must not register as
        // the secondary peak; a distant smaller cluster must win.
        let mut hist = histogram();
        for _ in 0..30 {
            hist.add_sample(2000);
        }
        for _ in 0..20 {
            hist.add_sample(2050); // one bin over, inside the spread window
        }
        for _ in 0..5 {
            hist.add_sample(6000);
        }
        let (lo, hi) = hist.min_max_bins();
        let width = (12000 - 1000) as f32 / 256.0;
        assert_eq!(lo, ((2000 - 1000) as f32 / width) as usize);
        assert_eq!(hi, ((6000 - 1000) as f32 / width) as usize);
    }
}
