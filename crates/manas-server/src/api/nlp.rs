//! Local NLP pipelines: zero-shot intent classification and extractive QA

use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use manas_core::capability::{Answer, IntentScores};
use serde::Deserialize;

use super::require_text;
use crate::error::{ApiError, ResultExt};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    pub text: String,
    pub candidate_labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct QaRequest {
    pub context: String,
    pub question: String,
}

pub async fn analyze_intent(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<IntentRequest>, ApiError>,
) -> Result<Json<IntentScores>, ApiError> {
    let text = require_text("text", &req.text)?;
    let labels: Vec<String> = req
        .candidate_labels
        .iter()
        .map(|label| label.trim())
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect();
    if labels.is_empty() {
        return Err(ApiError::bad_request(
            "'candidate_labels' must contain at least one label",
        ));
    }

    let classifier = state.registry.intent()?;
    let scores = classifier
        .classify(text, &labels)
        .await
        .public_error("Failed to analyze intent.")?;
    Ok(Json(scores))
}

pub async fn question_answering(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<QaRequest>, ApiError>,
) -> Result<Json<Answer>, ApiError> {
    let context = require_text("context", &req.context)?;
    let question = require_text("question", &req.question)?;

    let qa = state.registry.qa()?;
    let answer = qa
        .answer(question, context)
        .await
        .public_error("Failed to answer the question.")?;
    Ok(Json(answer))
}
