//! Board assistant: grounded chat against an OpenAI-compatible provider.
//!
//! `ask` builds the grounded message list, calls `{base_url}/chat/completions`
//! in JSON mode, and decodes the reply under the configured leniency policy.
//! `query` is an ungrounded single-prompt call for checking connectivity.
//!
//! There is no timeout and no retry: one failed call is one `Provider` error.

use kanban_core::prompt::{build_chat_messages, build_query_messages, prompt_chars, PromptMessage};
use kanban_core::reply::decode_reply;
use kanban_core::types::{ChatResult, KanbanBoard, Turn};
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ChatError {
    /// The provider credential is missing. Raised before any network call.
    #[error("{0} environment variable is not set")]
    Config(String),

    /// Anything that went wrong in or after the remote call: transport,
    /// status, envelope, or reply decoding.
    #[error("AI provider error: {0}")]
    Provider(String),
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct ChatOrchestrator {
    config: AiConfig,
    http: reqwest::Client,
}

impl ChatOrchestrator {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Ask about (or for changes to) `board`. A returned board is NOT yet
    /// validated; callers run it through the reconciliation gate.
    pub async fn ask(
        &self,
        board: &KanbanBoard,
        message: &str,
        history: &[Turn],
    ) -> Result<ChatResult, ChatError> {
        let api_key = self.api_key()?;
        let messages = build_chat_messages(board, message, history)
            .map_err(|e| ChatError::Provider(format!("failed to serialize board: {}", e)))?;

        log::debug!(
            target: "kanban.ai",
            "chat: {} history turns, {} prompt chars",
            history.len(),
            prompt_chars(&messages)
        );

        let raw = self.complete(api_key, &messages, true).await?;
        decode_reply(&raw, self.config.reply_policy)
            .map_err(|e| ChatError::Provider(e.to_string()))
    }

    /// Free-form prompt with no board grounding; returns the raw reply text.
    pub async fn query(&self, prompt: &str) -> Result<String, ChatError> {
        let api_key = self.api_key()?;
        let messages = build_query_messages(prompt);
        self.complete(api_key, &messages, false).await
    }

    fn api_key(&self) -> Result<&str, ChatError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ChatError::Config(self.config.api_key_env.clone()))
    }

    async fn complete(
        &self,
        api_key: &str,
        messages: &[PromptMessage],
        json_mode: bool,
    ) -> Result<String, ChatError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = CompletionRequest {
            model: &self.config.model,
            messages,
            response_format: json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Provider(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Provider(format!(
                "HTTP {} from {}",
                status, self.config.base_url
            )));
        }

        let envelope: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Provider(format!("invalid completion envelope: {}", e)))?;

        envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ChatError::Provider("completion has no message content".to_string()))
    }
}
