//! Word list normalization and per-slot padding.

use std::sync::OnceLock;

use shared::domain::{SlotIndex, WordIndex};

use crate::wheel::Wheel;

pub const DEFAULT_WORDS: [&str; 5] = ["math", "science", "technology", "engineering", "art"];

/// Trim every entry and drop the blank ones. An all-blank input yields the default list.
pub fn normalize_words<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let words: Vec<String> = raw
        .into_iter()
        .map(|word| word.as_ref().trim().to_string())
        .filter(|word| !word.is_empty())
        .collect();

    if words.is_empty() {
        return DEFAULT_WORDS.iter().map(|word| word.to_string()).collect();
    }
    words
}

/// An uppercased word padded with spaces to the board's slot count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    letters: Vec<char>,
}

impl Word {
    pub fn char_at(&self, slot: SlotIndex) -> char {
        self.letters.get(slot.0).copied().unwrap_or(' ')
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.letters.iter().try_for_each(|letter| write!(f, "{letter}"))
    }
}

/// The rotation list. Never empty; wheels are derived once per list.
#[derive(Debug, Clone)]
pub struct WordList {
    words: Vec<String>,
    slot_count: usize,
    wheels: OnceLock<Vec<Wheel>>,
}

impl WordList {
    pub fn new<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = normalize_words(raw);
        let slot_count = words
            .iter()
            .map(|word| word.to_uppercase().chars().count())
            .max()
            .unwrap_or(1);
        Self {
            words,
            slot_count,
            wheels: OnceLock::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn get(&self, index: WordIndex) -> Option<&str> {
        self.words.get(index.0).map(String::as_str)
    }

    pub fn first(&self) -> &str {
        self.words.first().map(String::as_str).unwrap_or_default()
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn padded(&self, index: WordIndex) -> Word {
        let mut letters: Vec<char> = self
            .get(index)
            .unwrap_or_default()
            .to_uppercase()
            .chars()
            .collect();
        letters.resize(self.slot_count, ' ');
        Word { letters }
    }

    pub fn next_index(&self, index: WordIndex) -> WordIndex {
        WordIndex((index.0 + 1) % self.len())
    }

    pub fn previous_index(&self, index: WordIndex) -> WordIndex {
        WordIndex((index.0 + self.len() - 1) % self.len())
    }

    pub fn is_last(&self, index: WordIndex) -> bool {
        index.0 + 1 == self.len()
    }

    pub fn wheel(&self, slot: SlotIndex) -> Wheel {
        self.wheels()
            .get(slot.0)
            .copied()
            .unwrap_or_else(|| Wheel::build(slot, self.first()))
    }

    fn wheels(&self) -> &[Wheel] {
        self.wheels.get_or_init(|| {
            (0..self.slot_count)
                .map(|slot| Wheel::build(SlotIndex(slot), self.first()))
                .collect()
        })
    }
}

#[cfg(test)]
#[path = "tests/words_tests.rs"]
mod tests;
