// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Hysteresis edge detector over the normalized envelope.

use crate::dsp::threshold::AdaptiveThreshold;
use crate::dsp::DspError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Above,
    Below,
}

/// Slices the normalized envelope into signed edge events.
///
/// A transition to Above (tone start) emits the preceding silence
/// duration as a positive sample count; a transition to Below (tone end)
/// emits the tone duration negated. Durations saturate rather than wrap
/// when a level persists past `i32::MAX` samples.
///
/// The two thresholds are asymmetric (rise at the range midpoint, fall
/// at a quarter of the range), so small ripple around either threshold
/// produces no chatter.
pub struct EdgeDetector {
    threshold: AdaptiveThreshold,
    level: Option<Level>,
    duration: i32,
}

impl EdgeDetector {
    pub fn new(decay_step: u32, min_range: u32) -> Result<Self, DspError> {
        Ok(Self {
            threshold: AdaptiveThreshold::new(decay_step, min_range)?,
            level: None,
            duration: 0,
        })
    }

    /// Feed one normalized sample; returns an edge event when the signal
    /// crosses the hysteresis band.
    pub fn process(&mut self, sample: u32) -> Option<i32> {
        self.threshold.update(sample);
        let s = sample as i64;

        let Some(level) = self.level else {
            // The first sample seeds the level without emitting an edge.
            self.level = Some(if s >= self.threshold.positive_threshold() {
                Level::Above
            } else {
                Level::Below
            });
            self.duration = 0;
            return None;
        };

        self.duration = self.duration.saturating_add(1);

        let next = match level {
            Level::Above if s <= self.threshold.negative_threshold() => Level::Below,
            Level::Below if s >= self.threshold.positive_threshold() => Level::Above,
            unchanged => unchanged,
        };
        if next == level {
            return None;
        }

        self.level = Some(next);
        let event = match next {
            Level::Above => self.duration,
            // A saturated tone run maps onto the full negative range.
            Level::Below if self.duration == i32::MAX => i32::MIN,
            Level::Below => -self.duration,
        };
        self.duration = 0;
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::EdgeDetector;

    const HIGH: u32 = 3_000_000_000;
    const LOW: u32 = 1_000;

    fn detector() -> EdgeDetector {
        EdgeDetector::new(1 << 22, 1 << 28).expect("valid config")
    }

    fn feed(det: &mut EdgeDetector, sample: u32, count: usize, events: &mut Vec<i32>) {
        for _ in 0..count {
            events.extend(det.process(sample));
        }
    }

    #[test]
    fn test_constant_stream_emits_no_edges() {
        let mut det = detector();
        let mut events = Vec::new();
        feed(&mut det, 42, 10_000, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn test_keying_produces_alternating_signed_events() {
        let mut det = detector();
        let mut events = Vec::new();

        // Open the range first; the initial level seeds from the first
        // sample without an edge.
        feed(&mut det, LOW, 10, &mut events);
        feed(&mut det, HIGH, 50, &mut events);
        feed(&mut det, LOW, 80, &mut events);
        feed(&mut det, HIGH, 60, &mut events);
        feed(&mut det, LOW, 10, &mut events);

        // The tiny startup interval puts the midpoint below the first
        // sample, so the level seeds as Above: the first tone start goes
        // unreported and the first event covers the seed block plus the
        // first tone (9 + 50 samples, plus the edge sample itself). After
        // that, durations track the block lengths exactly, each offset by
        // one for the crossing sample.
        assert_eq!(events, vec![-60, 80, -60]);
    }

    #[test]
    fn test_ripple_inside_hysteresis_band_is_ignored() {
        let mut det = detector();
        let mut events = Vec::new();
        feed(&mut det, LOW, 10, &mut events);
        feed(&mut det, HIGH, 50, &mut events);
        events.clear();

        // Wobble between the negative and positive thresholds while the
        // level is Above: above the fall threshold, below nothing.
        for _ in 0..200 {
            events.extend(det.process(HIGH));
            events.extend(det.process(HIGH - (1 << 26)));
        }
        assert!(events.is_empty(), "events: {:?}", events);
    }
}
