//! Prompted LLM endpoints: poems, meditations, goal plans, riddles, detox

use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use manas_core::prompts;
use serde::{Deserialize, Serialize};

use super::require_text;
use crate::error::{ApiError, ResultExt};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PoemRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct MeditationRequest {
    pub topic: String,
    pub duration: String,
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub goal: String,
}

#[derive(Debug, Deserialize)]
pub struct RiddleRequest {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct DetoxPledgeRequest {
    pub name: String,
    pub duration: String,
}

#[derive(Debug, Serialize)]
pub struct PoemResponse {
    pub poem: String,
}

#[derive(Debug, Serialize)]
pub struct MeditationResponse {
    pub script: String,
}

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub plan: String,
}

#[derive(Debug, Serialize)]
pub struct RiddleResponse {
    pub riddle: String,
}

#[derive(Debug, Serialize)]
pub struct DetoxPledgeResponse {
    pub pledge: String,
}

#[derive(Debug, Serialize)]
pub struct DetoxCompletionResponse {
    pub message: String,
}

/// One single-shot LLM call with an endpoint-specific public error
async fn generate(state: &AppState, prompt: String, public_error: &str) -> Result<String, ApiError> {
    let llm = state.registry.llm()?;
    llm.generate(&prompt).await.public_error(public_error)
}

pub async fn generate_poem(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<PoemRequest>, ApiError>,
) -> Result<Json<PoemResponse>, ApiError> {
    let prompt = require_text("prompt", &req.prompt)?;
    let poem = generate(&state, prompts::poem(prompt), "Failed to write a poem.").await?;
    Ok(Json(PoemResponse { poem }))
}

pub async fn generate_meditation(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<MeditationRequest>, ApiError>,
) -> Result<Json<MeditationResponse>, ApiError> {
    let topic = require_text("topic", &req.topic)?;
    let duration = require_text("duration", &req.duration)?;
    let script = generate(
        &state,
        prompts::meditation(topic, duration),
        "Failed to create a meditation.",
    )
    .await?;
    Ok(Json(MeditationResponse { script }))
}

pub async fn coach_goal(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<GoalRequest>, ApiError>,
) -> Result<Json<GoalResponse>, ApiError> {
    let goal = require_text("goal", &req.goal)?;
    let plan = generate(&state, prompts::goal_plan(goal), "Failed to create a plan.").await?;
    Ok(Json(GoalResponse { plan }))
}

pub async fn get_wisdom_riddle(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<RiddleRequest>, ApiError>,
) -> Result<Json<RiddleResponse>, ApiError> {
    let question = require_text("question", &req.question)?;
    let riddle = generate(
        &state,
        prompts::wisdom_riddle(question),
        "The Wisdom Stone is silent right now.",
    )
    .await?;
    Ok(Json(RiddleResponse {
        riddle: riddle.trim().to_string(),
    }))
}

pub async fn generate_detox_pledge(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<DetoxPledgeRequest>, ApiError>,
) -> Result<Json<DetoxPledgeResponse>, ApiError> {
    let name = require_text("name", &req.name)?;
    let duration = require_text("duration", &req.duration)?;
    let pledge = generate(
        &state,
        prompts::detox_pledge(name, duration),
        "Failed to create a pledge.",
    )
    .await?;
    Ok(Json(DetoxPledgeResponse {
        pledge: pledge.trim().to_string(),
    }))
}

pub async fn generate_detox_completion(
    State(state): State<AppState>,
) -> Result<Json<DetoxCompletionResponse>, ApiError> {
    let message = generate(
        &state,
        prompts::detox_completion(),
        "Failed to create a completion message.",
    )
    .await?;
    Ok(Json(DetoxCompletionResponse {
        message: message.trim().to_string(),
    }))
}
