use serde::{Deserialize, Serialize};

/// The persisted unit: one rendered flashcard. Notes are compared by full
/// structural equality when the deck assembler suppresses duplicates.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Note {
    pub front: String,
    pub back: String,
}
