// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

pub mod decode;

pub type DynResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub use decode::{MorseEvent, MorseTranscript};
