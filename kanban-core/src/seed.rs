/// Starter board written for the default user on first bootstrap.
use std::collections::BTreeMap;

use crate::types::{KanbanBoard, KanbanCard, KanbanColumn};

const SEED_COLUMNS: &[(&str, &str, &[&str])] = &[
    ("col-backlog", "Backlog", &["card-1", "card-2"]),
    ("col-discovery", "Discovery", &["card-3"]),
    ("col-progress", "In Progress", &["card-4", "card-5"]),
    ("col-review", "Review", &["card-6"]),
    ("col-done", "Done", &["card-7", "card-8"]),
];

const SEED_CARDS: &[(&str, &str, &str)] = &[
    (
        "card-1",
        "Align roadmap themes",
        "Draft quarterly themes with impact statements and metrics.",
    ),
    (
        "card-2",
        "Gather customer signals",
        "Review support tags, sales notes, and churn feedback.",
    ),
    (
        "card-3",
        "Prototype analytics view",
        "Sketch initial dashboard layout and key drill-downs.",
    ),
    (
        "card-4",
        "Refine status language",
        "Standardize column labels and tone across the board.",
    ),
    (
        "card-5",
        "Design card layout",
        "Add hierarchy and spacing for scanning dense lists.",
    ),
    (
        "card-6",
        "QA micro-interactions",
        "Verify hover, focus, and loading states.",
    ),
    (
        "card-7",
        "Ship marketing page",
        "Final copy approved and asset pack delivered.",
    ),
    (
        "card-8",
        "Close onboarding sprint",
        "Document release notes and share internally.",
    ),
];

pub fn seed_board() -> KanbanBoard {
    let columns = SEED_COLUMNS
        .iter()
        .map(|(id, title, card_ids)| KanbanColumn {
            id: id.to_string(),
            title: title.to_string(),
            card_ids: card_ids.iter().map(|c| c.to_string()).collect(),
        })
        .collect();

    let cards: BTreeMap<String, KanbanCard> = SEED_CARDS
        .iter()
        .map(|(id, title, details)| {
            (
                id.to_string(),
                KanbanCard {
                    id: id.to_string(),
                    title: title.to_string(),
                    details: details.to_string(),
                },
            )
        })
        .collect();

    KanbanBoard { columns, cards }
}
