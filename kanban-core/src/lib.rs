//! Kanban core: board model, assistant prompt/reply handling, integrity
//! checks, and board persistence.

pub mod prompt;
pub mod reconcile;
pub mod reply;
pub mod seed;
pub mod storage;
pub mod types;
