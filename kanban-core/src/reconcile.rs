/// Referential integrity checks for a candidate board.
///
/// A board produced outside the process (an assistant reply, a client PUT)
/// must pass `validate_board` before it may replace the stored document.
/// Validation never rewrites the candidate: it is either accepted verbatim
/// or rejected with the first broken invariant.
use std::collections::{HashMap, HashSet};

use crate::types::KanbanBoard;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardValidationError {
    #[error("duplicate column id: {0}")]
    DuplicateColumnId(String),

    #[error("duplicate card id: {0}")]
    DuplicateCardId(String),

    #[error("card stored under key {key} declares id {id}")]
    CardKeyMismatch { key: String, id: String },

    #[error("column {column} references unknown card {card}")]
    DanglingCardRef { column: String, card: String },

    #[error("card {card} is placed more than once")]
    DuplicatePlacement { card: String },
}

impl BoardValidationError {
    /// Short name of the violated invariant.
    pub fn invariant(&self) -> &'static str {
        match self {
            Self::DuplicateColumnId(_) => "unique-column-ids",
            Self::DuplicateCardId(_) | Self::CardKeyMismatch { .. } => "unique-card-ids",
            Self::DanglingCardRef { .. } => "card-refs-resolve",
            Self::DuplicatePlacement { .. } => "single-placement",
        }
    }
}

/// What an accepted board looks like beyond the hard invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Cards present in `cards` that no column lists. Tolerated.
    pub orphaned_cards: Vec<String>,
}

pub fn validate_board(board: &KanbanBoard) -> Result<ValidationReport, BoardValidationError> {
    let mut column_ids = HashSet::with_capacity(board.columns.len());
    for col in &board.columns {
        if !column_ids.insert(col.id.as_str()) {
            return Err(BoardValidationError::DuplicateColumnId(col.id.clone()));
        }
    }

    // Map keys are unique already; the ids inside the entries must be too,
    // and must agree with their key.
    let mut declared: HashMap<&str, &str> = HashMap::with_capacity(board.cards.len());
    for (key, card) in &board.cards {
        if declared.insert(card.id.as_str(), key.as_str()).is_some() {
            return Err(BoardValidationError::DuplicateCardId(card.id.clone()));
        }
    }
    for (key, card) in &board.cards {
        if *key != card.id {
            return Err(BoardValidationError::CardKeyMismatch {
                key: key.clone(),
                id: card.id.clone(),
            });
        }
    }

    let mut placed: HashSet<&str> = HashSet::new();
    for col in &board.columns {
        for card_id in &col.card_ids {
            if !board.cards.contains_key(card_id) {
                return Err(BoardValidationError::DanglingCardRef {
                    column: col.id.clone(),
                    card: card_id.clone(),
                });
            }
            if !placed.insert(card_id.as_str()) {
                return Err(BoardValidationError::DuplicatePlacement {
                    card: card_id.clone(),
                });
            }
        }
    }

    let orphaned_cards = board
        .cards
        .keys()
        .filter(|id| !placed.contains(id.as_str()))
        .cloned()
        .collect();

    Ok(ValidationReport { orphaned_cards })
}
