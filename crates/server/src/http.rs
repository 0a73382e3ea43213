//! HTTP Endpoints
//!
//! REST API for the avatar agent. Audio bytes are base64-encoded here, at the
//! transport boundary; everything upstream works with raw bytes.

use std::time::Instant;

use axum::{
    extract::{Json, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use avatar_agent_core::{Animation, Expression, ReplySegment, ReplySet};

use crate::metrics::{metrics_handler, record_chat_latency, record_pipeline_failure, record_request};
use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.config.server.cors_origins,
        state.config.server.cors_enabled,
    );

    Router::new()
        // Chat endpoint
        .route("/chat", post(chat))

        // Speech introspection and smoke test
        .route("/voices", get(voices))
        .route("/test-audio", post(test_audio))

        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))

        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))

        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// The avatar frontend runs on an arbitrary dev origin, so an empty origin
/// list means permissive, matching the development default.
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled || origins.is_empty() {
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed.is_empty() {
        tracing::warn!("All configured CORS origins are invalid, falling back to permissive");
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Chat request
#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

/// One reply segment on the wire; audio is base64-encoded
#[derive(Debug, Serialize)]
struct WireSegment {
    text: String,
    #[serde(rename = "facialExpression")]
    facial_expression: Expression,
    animation: Animation,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio: Option<String>,
}

impl From<ReplySegment> for WireSegment {
    fn from(segment: ReplySegment) -> Self {
        Self {
            text: segment.text,
            facial_expression: segment.expression,
            animation: segment.animation,
            audio: segment
                .audio
                .map(|bytes| base64::engine::general_purpose::STANDARD.encode(bytes)),
        }
    }
}

/// Chat response
#[derive(Debug, Serialize)]
struct ChatResponse {
    messages: Vec<WireSegment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ChatResponse {
    fn from_reply(reply: ReplySet) -> Self {
        Self {
            messages: reply
                .into_segments()
                .into_iter()
                .map(WireSegment::from)
                .collect(),
            error: None,
        }
    }
}

/// Chat endpoint
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    record_request("chat");
    let started = Instant::now();
    let utterance = request.message.unwrap_or_default();

    let result = state.pipeline.respond(&utterance).await;
    record_chat_latency(started.elapsed().as_secs_f64());

    match result {
        Ok(reply) => (StatusCode::OK, Json(ChatResponse::from_reply(reply))),
        Err(failure) => {
            tracing::error!(error = %failure.error, "chat request failed");
            record_pipeline_failure();
            let mut response = ChatResponse::from_reply(failure.reply);
            response.error = Some(failure.error.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response))
        }
    }
}

/// List available voices
async fn voices(State(state): State<AppState>) -> impl IntoResponse {
    record_request("voices");

    match state.synthesizer.list_voices().await {
        Ok(voices) => (StatusCode::OK, Json(serde_json::json!({ "voices": voices }))),
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch voices");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Failed to fetch voices" })),
            )
        }
    }
}

/// Synthesize one fixed segment without touching the language model
async fn test_audio(State(state): State<AppState>) -> impl IntoResponse {
    record_request("test-audio");

    let mut segment = state.prompts.audio_check.to_segment();
    match state.synthesizer.synthesize(&segment.text, 0).await {
        Ok(audio) => {
            segment.audio = Some(audio);
            (
                StatusCode::OK,
                Json(ChatResponse::from_reply(ReplySet::single(segment))),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "audio smoke test failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatResponse {
                    messages: Vec::new(),
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

/// Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let model_available = state.llm.is_available().await;

    Json(serde_json::json!({
        "status": if model_available { "ready" } else { "degraded" },
        "model_available": model_available,
    }))
}
