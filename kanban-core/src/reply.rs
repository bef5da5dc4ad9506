/// Decoding of the assistant's structured reply.
///
/// The model is asked for `{"response": "...", "board": ...}`. How much of
/// that contract is enforced is an explicit `LeniencyPolicy`, not an
/// accident of loose JSON handling.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ChatResult, KanbanBoard};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeniencyPolicy {
    /// Missing `response` becomes an empty string; missing or null `board`
    /// means no mutation.
    #[default]
    Lenient,
    /// Both fields must be present; `response` must be a string.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("reply is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("reply is not a JSON object")]
    NotAnObject,

    #[error("reply is missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `response` is not a string")]
    ResponseNotText,

    #[error("field `board` does not match the board shape: {0}")]
    InvalidBoard(String),
}

pub fn decode_reply(raw: &str, policy: LeniencyPolicy) -> Result<ChatResult, DecodeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
    let Value::Object(mut fields) = value else {
        return Err(DecodeError::NotAnObject);
    };

    let response = match (fields.remove("response"), policy) {
        (Some(Value::String(text)), _) => text,
        (None, LeniencyPolicy::Lenient) | (Some(Value::Null), LeniencyPolicy::Lenient) => {
            String::new()
        }
        (None, LeniencyPolicy::Strict) => return Err(DecodeError::MissingField("response")),
        (Some(_), _) => return Err(DecodeError::ResponseNotText),
    };

    let board = match (fields.remove("board"), policy) {
        (None, LeniencyPolicy::Strict) => return Err(DecodeError::MissingField("board")),
        (None, LeniencyPolicy::Lenient) | (Some(Value::Null), _) => None,
        (Some(raw_board), _) => Some(
            serde_json::from_value::<KanbanBoard>(raw_board)
                .map_err(|e| DecodeError::InvalidBoard(e.to_string()))?,
        ),
    };

    Ok(ChatResult { response, board })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_reply_with_board() {
        let raw = r#"{"response": "Moved it.", "board": {"columns": [{"id": "c", "title": "C", "cardIds": []}], "cards": {}}}"#;
        let result = decode_reply(raw, LeniencyPolicy::Strict).unwrap();
        assert_eq!(result.response, "Moved it.");
        assert_eq!(result.board.unwrap().columns[0].id, "c");
    }

    #[test]
    fn test_lenient_defaults_missing_fields() {
        let result = decode_reply("{}", LeniencyPolicy::Lenient).unwrap();
        assert_eq!(
            result,
            ChatResult {
                response: String::new(),
                board: None
            }
        );
    }

    #[test]
    fn test_strict_requires_both_fields() {
        assert_eq!(
            decode_reply(r#"{"board": null}"#, LeniencyPolicy::Strict),
            Err(DecodeError::MissingField("response"))
        );
        assert_eq!(
            decode_reply(r#"{"response": "ok"}"#, LeniencyPolicy::Strict),
            Err(DecodeError::MissingField("board"))
        );
        assert!(decode_reply(r#"{"response": "ok", "board": null}"#, LeniencyPolicy::Strict).is_ok());
    }

    #[test]
    fn test_non_json_and_non_object_rejected() {
        assert!(matches!(
            decode_reply("Sure! Here you go", LeniencyPolicy::Lenient),
            Err(DecodeError::InvalidJson(_))
        ));
        assert_eq!(
            decode_reply("[1, 2]", LeniencyPolicy::Lenient),
            Err(DecodeError::NotAnObject)
        );
    }

    #[test]
    fn test_malformed_board_rejected_under_both_policies() {
        let raw = r#"{"response": "x", "board": {"columns": "nope"}}"#;
        for policy in [LeniencyPolicy::Lenient, LeniencyPolicy::Strict] {
            assert!(matches!(
                decode_reply(raw, policy),
                Err(DecodeError::InvalidBoard(_))
            ));
        }
    }

    #[test]
    fn test_response_must_be_text() {
        assert_eq!(
            decode_reply(r#"{"response": 42}"#, LeniencyPolicy::Lenient),
            Err(DecodeError::ResponseNotText)
        );
    }

    #[test]
    fn test_policy_parses_lowercase() {
        let policy: LeniencyPolicy = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(policy, LeniencyPolicy::Strict);
        assert_eq!(LeniencyPolicy::default(), LeniencyPolicy::Lenient);
    }
}
