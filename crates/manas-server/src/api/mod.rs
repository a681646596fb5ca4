//! API routes and handlers

mod audio;
mod chat;
mod creative;
mod health;
mod nlp;
mod places;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use manas_core::config::ServerConfig;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::cors::cors_layer;
use crate::error::ApiError;
use crate::state::AppState;

/// Largest accepted audio upload
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Create the main router: `/api/*` handlers plus the static frontend
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        // Audio
        .route("/generate-soundscape", post(audio::generate_soundscape))
        .route(
            "/transcribe",
            post(audio::transcribe).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/text-to-speech", post(audio::text_to_speech))
        // Local NLP pipelines
        .route("/analyze-intent", post(nlp::analyze_intent))
        .route("/qa", post(nlp::question_answering))
        // Conversation
        .route("/chat", post(chat::chat))
        .route("/summarize-chat", post(chat::summarize_chat))
        // Creative prompts
        .route("/generate-poem", post(creative::generate_poem))
        .route("/generate-meditation", post(creative::generate_meditation))
        .route("/coach-goal", post(creative::coach_goal))
        .route("/get-wisdom-riddle", post(creative::get_wisdom_riddle))
        .route("/generate-detox-pledge", post(creative::generate_detox_pledge))
        .route(
            "/generate-detox-completion",
            get(creative::generate_detox_completion),
        )
        // Geo
        .route("/safe-zones", post(places::safe_zones));

    let static_dir = &server.static_dir;

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/static", ServeDir::new(static_dir))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(server))
        .with_state(state)
}

/// Reject a missing or blank required string field
pub(crate) fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(format!("'{}' must not be empty", field)));
    }
    Ok(value)
}
