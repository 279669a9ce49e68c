// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Symbol-domain Morse decoder.
//!
//! Consumes signed edge-event durations produced by the OOK edge detector
//! (positive = tone started after that many samples of silence, negative =
//! tone ended after that many samples of carrier) and turns them into text:
//! a decaying pulse-duration histogram discriminates dits from dahs, a
//! fixed trie resolves symbol sequences to characters, and two bounded
//! accumulators batch the raw trace and the decoded text.

pub mod decoder;
pub mod histogram;
pub mod textbuf;
pub mod trie;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MorseError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

pub use decoder::{MorseDecoder, MorseDecoderConfig, MorseOutput};
pub use histogram::DecayingHistogram;
pub use textbuf::CharBuffer;
pub use trie::{MorseSymbol, MorseTrie, TrieCursor};
