use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::llm_client::{ChatMessage, Role};

pub const MESSAGES_REQUIRED: &str = "Messages array is required";
pub const SYSTEM_ROLE_REJECTED: &str = "Only user and assistant roles are allowed";

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Pulls the caller's conversation out of a `POST /api/chat` body.
///
/// `messages` must be an array of `{ role, content }` turns. The `system` role
/// is reserved for the proxy's own instruction turn and is rejected here.
pub fn validate_messages(body: &Value) -> Result<Vec<ChatMessage>, AppError> {
    let raw = body
        .get("messages")
        .filter(|v| v.is_array())
        .ok_or_else(|| AppError::Validation(MESSAGES_REQUIRED.to_string()))?;

    let turns: Vec<ChatMessage> = serde_json::from_value(raw.clone())
        .map_err(|_| AppError::Validation(MESSAGES_REQUIRED.to_string()))?;

    if turns.iter().any(|t| t.role == Role::System) {
        return Err(AppError::Validation(SYSTEM_ROLE_REJECTED.to_string()));
    }

    Ok(turns)
}
