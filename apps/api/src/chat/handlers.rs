//! Axum route handler for the portfolio chat endpoint.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;

use crate::chat::models::{validate_messages, ChatReply, MESSAGES_REQUIRED};
use crate::chat::prompts::build_system_prompt;
use crate::errors::AppError;
use crate::llm_client::{ChatMessage, CompletionRequest};
use crate::state::AppState;

/// POST /api/chat
///
/// Prepends the resume-grounded system turn to the caller's conversation and
/// returns the provider's first reply. Invalid bodies never reach the provider.
pub async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(body) = payload.map_err(|_| AppError::Validation(MESSAGES_REQUIRED.to_string()))?;
    let turns = validate_messages(&body)?;

    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(ChatMessage::system(build_system_prompt(&state.resume.text)));
    messages.extend(turns);

    let completion = state
        .provider
        .complete(&CompletionRequest::new(messages))
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    Ok(Json(ChatReply {
        reply: completion.first_content().unwrap_or_default().to_string(),
    }))
}
