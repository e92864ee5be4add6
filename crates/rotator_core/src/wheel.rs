//! Letter wheel arithmetic for a single split-flap slot.
//!
//! Every slot carries the same 27 base symbols (space followed by `A..=Z`) plus one accent
//! symbol at the end, taken from the first rotation word. The wheel only turns forward.

use shared::domain::SlotIndex;

pub const BASE_CHARSET: &str = " ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const BASE_LEN: usize = 27;
pub const WHEEL_SIZE: usize = 28;
pub const ACCENT_INDEX: usize = 27;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wheel {
    symbols: [char; WHEEL_SIZE],
}

impl Wheel {
    /// Build the wheel for `slot`. The accent symbol is the first word's uppercased letter
    /// at that slot, or a space when the first word is shorter.
    pub fn build(slot: SlotIndex, first_word: &str) -> Self {
        let accent = first_word
            .to_uppercase()
            .chars()
            .nth(slot.0)
            .unwrap_or(' ');

        let mut symbols = [' '; WHEEL_SIZE];
        for (position, symbol) in BASE_CHARSET.chars().enumerate() {
            symbols[position] = symbol;
        }
        symbols[ACCENT_INDEX] = accent;
        Self { symbols }
    }

    pub fn symbol(&self, position: usize) -> char {
        self.symbols[position % WHEEL_SIZE]
    }

    pub fn accent(&self) -> char {
        self.symbols[ACCENT_INDEX]
    }

    /// True when `letter` should be read as the accent symbol rather than a base letter.
    /// A blank accent never highlights.
    pub fn is_accent_match(&self, letter: char) -> bool {
        self.accent() != ' ' && letter == self.accent()
    }

    pub fn symbols(&self) -> &[char; WHEEL_SIZE] {
        &self.symbols
    }
}

/// Position of `letter` on a wheel. The accent flag alone decides whether the reserved
/// accent position is used, since the accent letter also exists among the base symbols.
/// Letters outside the base alphabet fall back to the blank.
pub fn locate(letter: char, is_accent: bool) -> usize {
    if is_accent {
        return ACCENT_INDEX;
    }
    BASE_CHARSET
        .chars()
        .position(|symbol| symbol == letter)
        .unwrap_or(0)
}

/// Forward-only distance from `from` to `to`.
pub fn hop_count(from: usize, to: usize) -> usize {
    if from == to {
        0
    } else if to > from {
        to - from
    } else {
        (WHEEL_SIZE - from) + to
    }
}

pub fn next_index(position: usize) -> usize {
    (position + 1) % WHEEL_SIZE
}

#[cfg(test)]
#[path = "tests/wheel_tests.rs"]
mod tests;
