// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Shared types for decoded Morse output.

use serde::{Deserialize, Serialize};

/// A decoded text fragment published by the decode task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MorseEvent {
    /// Decoded text fragment (one or more characters; `"~"` marks an
    /// unresolved letter, `" "` a word boundary)
    pub text: String,
    /// Current dit/dah discrimination threshold (pulse samples)
    pub dit_threshold: i32,
}

/// A flushed pair of text accumulators, forwarded to the decode log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MorseTranscript {
    /// Raw dit/dah/space symbol trace
    pub raw: String,
    /// Decoded letters
    pub text: String,
}
