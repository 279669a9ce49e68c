// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Bounded character accumulator.

use std::collections::VecDeque;

/// Fixed-capacity ring of characters used to batch decoded text.
///
/// `push` refuses new characters once full; the owner is expected to
/// flush (`take_string`) and retry.
pub struct CharBuffer {
    chars: VecDeque<char>,
    capacity: usize,
}

impl CharBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            chars: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append one character. Returns `false` (buffer unchanged) when full.
    pub fn push(&mut self, ch: char) -> bool {
        if self.chars.len() >= self.capacity {
            return false;
        }
        self.chars.push_back(ch);
        true
    }

    /// Drain the buffer into a `String` in append order.
    pub fn take_string(&mut self) -> String {
        self.chars.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::CharBuffer;

    #[test]
    fn test_push_and_take_preserve_order() {
        let mut buf = CharBuffer::new(4);
        assert!(buf.push('s'));
        assert!(buf.push('o'));
        assert!(buf.push('s'));
        assert_eq!(buf.take_string(), "sos");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_push_refused_when_full() {
        let mut buf = CharBuffer::new(2);
        assert!(buf.push('a'));
        assert!(buf.push('b'));
        assert!(!buf.push('c'));
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.take_string(), "ab");
        // Emptied by take_string; accepts input again.
        assert!(buf.push('c'));
    }
}
