// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Edge-event classification and letter assembly.
//!
//! [`MorseDecoder`] owns the histogram, the trie cursor and both text
//! accumulators. It performs no I/O: every call returns the outputs the
//! event produced and the caller forwards them to the display and the
//! decode log.

use tracing::debug;

use crate::histogram::DecayingHistogram;
use crate::textbuf::CharBuffer;
use crate::trie::{MorseSymbol, MorseTrie, TrieCursor};
use crate::MorseError;

/// Marker appended when a letter boundary arrives but the accumulated
/// sequence does not resolve to a character.
pub const UNRESOLVED_MARKER: char = '~';

/// Tuning parameters for the symbol-domain decoder.
///
/// Defaults match the 44.1 kHz pipeline: pulse durations are sample
/// counts, so the histogram window of 1 000–12 000 samples covers
/// roughly 23–270 ms pulses.
#[derive(Debug, Clone)]
pub struct MorseDecoderConfig {
    /// Shortest pulse admitted to the histogram (samples)
    pub pulse_min: i32,
    /// Longest pulse admitted to the histogram (samples)
    pub pulse_max: i32,
    pub num_bins: usize,
    /// Jitter exclusion radius around the primary histogram peak (bins)
    pub signal_spread: usize,
    pub decay_exponent: f32,
    /// Capacity of the raw dit/dah trace accumulator
    pub raw_capacity: usize,
    /// Capacity of the decoded text accumulator
    pub text_capacity: usize,
}

impl Default for MorseDecoderConfig {
    fn default() -> Self {
        Self {
            pulse_min: 1000,
            pulse_max: 12000,
            num_bins: 256,
            signal_spread: 8,
            decay_exponent: 0.8,
            raw_capacity: 64,
            text_capacity: 32,
        }
    }
}

/// One observable result of an edge event or idle tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MorseOutput {
    /// A letter boundary resolved (or failed to resolve) a character.
    Char(char),
    /// A word boundary: the display gets a space.
    WordGap,
    /// Both accumulators were flushed (word boundary, full buffer, or
    /// long pause).
    Flush { raw: String, text: String },
}

pub struct MorseDecoder {
    histogram: DecayingHistogram,
    trie: MorseTrie,
    cursor: TrieCursor,
    raw: CharBuffer,
    text: CharBuffer,
    dit_threshold: i32,
    /// Set by every edge event, cleared by the idle tick that handles
    /// the trailing letter; further idle ticks only decay the histogram.
    idle_boundary_pending: bool,
}

impl MorseDecoder {
    pub fn new(cfg: &MorseDecoderConfig) -> Result<Self, MorseError> {
        Ok(Self {
            histogram: DecayingHistogram::new(
                cfg.pulse_min,
                cfg.pulse_max,
                cfg.num_bins,
                cfg.signal_spread,
                cfg.decay_exponent,
            )?,
            trie: MorseTrie::new(),
            cursor: TrieCursor::default(),
            raw: CharBuffer::new(cfg.raw_capacity),
            text: CharBuffer::new(cfg.text_capacity),
            dit_threshold: 0,
            idle_boundary_pending: false,
        })
    }

    /// Current dit/dah discrimination threshold (pulse samples).
    pub fn dit_threshold(&self) -> i32 {
        self.dit_threshold
    }

    /// Process one signed edge event from the OOK edge detector.
    pub fn handle_edge(&mut self, event: i32) -> Vec<MorseOutput> {
        let mut out = Vec::new();
        if event == 0 {
            return out;
        }
        self.idle_boundary_pending = true;

        let duration = event.unsigned_abs().min(i32::MAX as u32) as i32;
        if event < 0 {
            self.tone_ended(duration);
        } else {
            self.silence_ended(duration, &mut out);
        }
        out
    }

    /// Idle tick: no edge event arrived within the wait window.
    ///
    /// The first tick after activity closes the trailing letter and
    /// flushes the accumulators; later ticks only keep the histogram
    /// decaying so stale pulse populations fade during silence.
    pub fn handle_idle(&mut self) -> Vec<MorseOutput> {
        let mut out = Vec::new();
        if self.idle_boundary_pending {
            self.idle_boundary_pending = false;
            if !self.cursor.at_root() {
                self.letter_boundary(&mut out);
            }
            self.flush(&mut out);
        } else {
            self.histogram.decay();
        }
        out
    }

    /// Falling edge: the tone was on for `duration` samples.
    fn tone_ended(&mut self, duration: i32) {
        self.histogram.add_sample(duration);
        self.dit_threshold = self.histogram.threshold();

        if duration >= self.dit_threshold {
            debug!(duration, threshold = self.dit_threshold, "dah");
            self.trie.feed(&mut self.cursor, MorseSymbol::Dah);
            self.push_raw('-');
        } else {
            debug!(duration, threshold = self.dit_threshold, "dit");
            self.trie.feed(&mut self.cursor, MorseSymbol::Dit);
            self.push_raw('.');
        }
    }

    /// Rising edge: the tone was off for `duration` samples.
    fn silence_ended(&mut self, duration: i32, out: &mut Vec<MorseOutput>) {
        if duration < self.dit_threshold {
            // Intra-letter gap, nothing to resolve.
            return;
        }

        self.letter_boundary(out);

        if duration >= 3 * self.dit_threshold {
            debug!(duration, "word gap");
            self.flush(out);
            out.push(MorseOutput::WordGap);
        }
    }

    /// Resolve the accumulated sequence into a character (or the
    /// unresolved marker) and reset the cursor.
    fn letter_boundary(&mut self, out: &mut Vec<MorseOutput>) {
        match self.trie.feed(&mut self.cursor, MorseSymbol::Boundary) {
            Some(character) => {
                out.push(MorseOutput::Char(character));
                self.push_text(character, out);
                self.push_raw(' ');
            }
            None => {
                debug!(threshold = self.dit_threshold, "unresolved sequence");
                out.push(MorseOutput::Char(UNRESOLVED_MARKER));
                self.push_text(UNRESOLVED_MARKER, out);
            }
        }
    }

    /// Raw-trace pushes are best effort; a full trace buffer drops marks.
    fn push_raw(&mut self, mark: char) {
        let _ = self.raw.push(mark);
    }

    /// Decoded text is never dropped: a full buffer flushes first.
    fn push_text(&mut self, character: char, out: &mut Vec<MorseOutput>) {
        if !self.text.push(character) {
            self.flush(out);
            self.text.push(character);
        }
    }

    fn flush(&mut self, out: &mut Vec<MorseOutput>) {
        if self.raw.is_empty() && self.text.is_empty() {
            return;
        }
        out.push(MorseOutput::Flush {
            raw: self.raw.take_string(),
            text: self.text.take_string(),
        });
    }
}
