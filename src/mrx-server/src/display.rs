// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Character display sinks for decoded text.

use std::io::Write;

/// Receives decoded characters one at a time, in decode order.
pub trait CharDisplay {
    fn put_char(&mut self, c: char);
}

/// Writes decoded characters straight to stdout, wrapping at a fixed
/// width so a long transmission stays readable in a terminal.
pub struct TerminalDisplay {
    column: usize,
    width: usize,
}

impl TerminalDisplay {
    const DEFAULT_WIDTH: usize = 72;

    pub fn new() -> Self {
        Self {
            column: 0,
            width: Self::DEFAULT_WIDTH,
        }
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl CharDisplay for TerminalDisplay {
    fn put_char(&mut self, c: char) {
        let mut stdout = std::io::stdout().lock();
        if self.column >= self.width {
            let _ = stdout.write_all(b"\n");
            self.column = 0;
        }
        let mut buf = [0u8; 4];
        let _ = stdout.write_all(c.encode_utf8(&mut buf).as_bytes());
        let _ = stdout.flush();
        self.column += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::{CharDisplay, TerminalDisplay};

    #[test]
    fn test_terminal_display_tracks_column() {
        let mut display = TerminalDisplay::new();
        for _ in 0..80 {
            display.put_char('.');
        }
        // One wrap at 72 columns leaves 8 characters on the second line.
        assert_eq!(display.column, 8);
    }
}
