/// Message assembly for the board assistant.
///
/// Every chat call re-embeds the whole board so the model answers from
/// current state. History is forwarded verbatim and uncapped; callers that
/// care about prompt size can read `prompt_chars`.
use serde::{Deserialize, Serialize};

use crate::types::{KanbanBoard, Role, Turn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl From<Role> for MessageRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => MessageRole::User,
            Role::Assistant => MessageRole::Assistant,
        }
    }
}

/// One entry of the `messages` array sent to a chat-completions endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: MessageRole,
    pub content: String,
}

impl PromptMessage {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

pub fn system_prompt() -> &'static str {
    "You are a Kanban board assistant. Help the user understand and manage their board.\n\n\
Always reply with a single valid JSON object, no markdown and no code fences, with exactly \
two fields:\n\
{\"response\": \"<plain-text reply>\", \"board\": null}\n\n\
If the user asks you to change the board, put the complete updated board in \"board\":\n\
{\"response\": \"<plain-text explanation>\", \"board\": {\"columns\": [...], \"cards\": {...}}}\n\n\
Rules:\n\
- \"response\" is short, friendly plain text with no markup.\n\
- \"board\" is null unless you are making changes.\n\
- A returned board is the ENTIRE board: every column and every card, unchanged ones included.\n\
- Column shape: {\"id\": \"...\", \"title\": \"...\", \"cardIds\": [...]}\n\
- Card shape: {\"id\": \"...\", \"title\": \"...\", \"details\": \"...\"}\n\
- \"cards\" maps each card id to its card.\n\
- Reuse existing ids for existing items; mint new ids for new items (e.g. \"card-abc123\")."
}

/// System message text: fixed instructions plus the grounded board.
pub fn grounded_system_message(board: &KanbanBoard) -> Result<String, serde_json::Error> {
    let board_json = serde_json::to_string_pretty(board)?;
    Ok(format!("{}\n\nCurrent board:\n{}", system_prompt(), board_json))
}

/// Build the ordered message list for a chat turn: system, history, message.
pub fn build_chat_messages(
    board: &KanbanBoard,
    message: &str,
    history: &[Turn],
) -> Result<Vec<PromptMessage>, serde_json::Error> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(PromptMessage::new(
        MessageRole::System,
        grounded_system_message(board)?,
    ));
    messages.extend(
        history
            .iter()
            .map(|turn| PromptMessage::new(turn.role.into(), turn.content.clone())),
    );
    messages.push(PromptMessage::new(MessageRole::User, message));
    Ok(messages)
}

/// Ungrounded single-prompt message list for diagnostics.
pub fn build_query_messages(prompt: &str) -> Vec<PromptMessage> {
    vec![PromptMessage::new(MessageRole::User, prompt)]
}

pub fn prompt_chars(messages: &[PromptMessage]) -> usize {
    messages.iter().map(|m| m.content.chars().count()).sum()
}
