use serde::{Deserialize, Serialize};

use crate::domain::{SlotIndex, WordIndex};

/// Observer notifications published by a running rotator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum RotatorEvent {
    /// `settled == false` when a transition toward `word_index` begins, `true` once every
    /// slot has landed on it.
    Rotated { word_index: WordIndex, settled: bool },
    /// A slot reached `letter`. Also sent with `accent == false` right before a slot starts
    /// cycling, so the display can drop accent styling while it moves.
    LetterLanded {
        slot: SlotIndex,
        letter: char,
        word_index: WordIndex,
        accent: bool,
    },
}

impl RotatorEvent {
    pub fn word_index(&self) -> WordIndex {
        match self {
            Self::Rotated { word_index, .. } | Self::LetterLanded { word_index, .. } => {
                *word_index
            }
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Rotated { settled: true, .. })
    }
}
