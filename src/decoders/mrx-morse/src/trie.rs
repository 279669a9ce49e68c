// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Fixed Morse code trie.
//!
//! All nodes live in one arena `Vec` with children referenced by index;
//! the tree is built once at startup and never mutated afterwards. The
//! walking state is a small [`TrieCursor`] owned by the caller, so one
//! trie could serve several decode streams.

/// One decoder input symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorseSymbol {
    Dit,
    Dah,
    /// Letter or word gap: resolve the accumulated sequence.
    Boundary,
}

// ITU Morse table, A–Z, 0–9 and the punctuation the decoder supports.
const MORSE_TABLE: &[(&str, char)] = &[
    (".-", 'A'),
    ("-...", 'B'),
    ("-.-.", 'C'),
    ("-..", 'D'),
    (".", 'E'),
    ("..-.", 'F'),
    ("--.", 'G'),
    ("....", 'H'),
    ("..", 'I'),
    (".---", 'J'),
    ("-.-", 'K'),
    (".-..", 'L'),
    ("--", 'M'),
    ("-.", 'N'),
    ("---", 'O'),
    (".--.", 'P'),
    ("--.-", 'Q'),
    (".-.", 'R'),
    ("...", 'S'),
    ("-", 'T'),
    ("..-", 'U'),
    ("...-", 'V'),
    (".--", 'W'),
    ("-..-", 'X'),
    ("-.--", 'Y'),
    ("--..", 'Z'),
    ("-----", '0'),
    (".----", '1'),
    ("..---", '2'),
    ("...--", '3'),
    ("....-", '4'),
    (".....", '5'),
    ("-....", '6'),
    ("--...", '7'),
    ("---..", '8'),
    ("----.", '9'),
    (".-.-.-", '.'),
    ("--..--", ','),
    ("..--..", '?'),
];

#[derive(Debug, Clone, Copy, Default)]
struct TrieNode {
    character: Option<char>,
    dit: Option<u16>,
    dah: Option<u16>,
}

/// Cursor into the trie representing the in-progress letter.
///
/// `None` is the invalid sentinel: the current sequence cannot resolve
/// and stays invalid until the next boundary resets it to the root.
#[derive(Debug, Clone, Copy)]
pub struct TrieCursor(Option<u16>);

impl TrieCursor {
    const ROOT: TrieCursor = TrieCursor(Some(0));

    pub fn at_root(&self) -> bool {
        self.0 == Some(0)
    }

    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }
}

impl Default for TrieCursor {
    fn default() -> Self {
        Self::ROOT
    }
}

pub struct MorseTrie {
    nodes: Vec<TrieNode>,
}

impl MorseTrie {
    pub fn new() -> Self {
        let mut trie = Self {
            nodes: vec![TrieNode::default()],
        };
        for &(code, character) in MORSE_TABLE {
            trie.insert(code, character);
        }
        trie
    }

    fn insert(&mut self, code: &str, character: char) {
        let mut index = 0usize;
        for symbol in code.chars() {
            let existing = match symbol {
                '.' => self.nodes[index].dit,
                _ => self.nodes[index].dah,
            };
            index = match existing {
                Some(next) => next as usize,
                None => {
                    let next = self.nodes.len() as u16;
                    self.nodes.push(TrieNode::default());
                    match symbol {
                        '.' => self.nodes[index].dit = Some(next),
                        _ => self.nodes[index].dah = Some(next),
                    }
                    next as usize
                }
            };
        }
        self.nodes[index].character = Some(character);
    }

    /// Advance `cursor` by one symbol.
    ///
    /// Dit/dah follow the matching edge when it exists and invalidate the
    /// cursor otherwise; both report "letter incomplete" (`None`). A
    /// boundary returns the resolved character when the cursor sits on a
    /// defined non-root node, `None` otherwise (invalid sequence, a path
    /// with no assigned character, or a boundary with nothing accumulated),
    /// and always resets the cursor to the root.
    pub fn feed(&self, cursor: &mut TrieCursor, symbol: MorseSymbol) -> Option<char> {
        match symbol {
            MorseSymbol::Dit | MorseSymbol::Dah => {
                if let Some(index) = cursor.0 {
                    let node = &self.nodes[index as usize];
                    cursor.0 = match symbol {
                        MorseSymbol::Dit => node.dit,
                        _ => node.dah,
                    };
                }
                None
            }
            MorseSymbol::Boundary => {
                let resolved = match cursor.0 {
                    Some(0) | None => None,
                    Some(index) => self.nodes[index as usize].character,
                };
                *cursor = TrieCursor::ROOT;
                resolved
            }
        }
    }
}

impl Default for MorseTrie {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{MorseSymbol, MorseTrie, TrieCursor, MORSE_TABLE};

    fn feed_code(trie: &MorseTrie, cursor: &mut TrieCursor, code: &str) -> Option<char> {
        for symbol in code.chars() {
            let sym = if symbol == '.' {
                MorseSymbol::Dit
            } else {
                MorseSymbol::Dah
            };
            assert_eq!(trie.feed(cursor, sym), None, "mid-letter must be incomplete");
        }
        trie.feed(cursor, MorseSymbol::Boundary)
    }

    #[test]
    fn test_every_table_entry_round_trips() {
        let trie = MorseTrie::new();
        let mut cursor = TrieCursor::default();
        for &(code, character) in MORSE_TABLE {
            assert_eq!(feed_code(&trie, &mut cursor, code), Some(character));
            assert!(cursor.at_root());
        }
    }

    #[test]
    fn test_undefined_sequence_yields_no_character() {
        let trie = MorseTrie::new();
        let mut cursor = TrieCursor::default();
        // Six dits walk past "5" and invalidate the cursor.
        assert_eq!(feed_code(&trie, &mut cursor, "......"), None);
        assert!(cursor.at_root());
    }

    #[test]
    fn test_boundary_at_root_yields_no_character() {
        let trie = MorseTrie::new();
        let mut cursor = TrieCursor::default();
        assert_eq!(trie.feed(&mut cursor, MorseSymbol::Boundary), None);
        assert!(cursor.at_root());
    }

    #[test]
    fn test_invalid_sequence_recovers_after_boundary() {
        let trie = MorseTrie::new();
        let mut cursor = TrieCursor::default();
        feed_code(&trie, &mut cursor, ".......");
        assert_eq!(feed_code(&trie, &mut cursor, "..."), Some('S'));
    }

    #[test]
    fn test_prefix_without_character_yields_none() {
        let trie = MorseTrie::new();
        let mut cursor = TrieCursor::default();
        // "-----" is 0, so its prefix "----" exists as a node but has no
        // assigned character.
        assert_eq!(feed_code(&trie, &mut cursor, "----"), None);
    }
}
