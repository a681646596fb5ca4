//! Conversation endpoints backed by the hosted LLM

use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use manas_core::chat::{split_history, well_formed_turns, ChatTurn};
use manas_core::prompts;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ResultExt};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Last well-formed turn is the new message, everything before it is context
pub async fn chat(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<ChatRequest>, ApiError>,
) -> Result<Json<ChatResponse>, ApiError> {
    let (context, message) = split_history(req.history)?;
    let llm = state.registry.llm()?;

    debug!("Chat with {} context turns", context.len());
    let text = llm
        .chat(&context, &message)
        .await
        .public_error("Manas couldn't find the words right now. Please try again.")?;
    Ok(Json(ChatResponse { text }))
}

pub async fn summarize_chat(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<ChatRequest>, ApiError>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let turns = well_formed_turns(req.history);
    if turns.is_empty() {
        return Err(ApiError::bad_request(
            "'history' must contain at least one message",
        ));
    }
    let llm = state.registry.llm()?;

    let summary = llm
        .generate(&prompts::chat_summary(&turns))
        .await
        .public_error("Failed to summarize the conversation.")?;
    Ok(Json(SummaryResponse { summary }))
}
