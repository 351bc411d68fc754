//! aava-vs library - Address validation service
//!
//! Exposes the grid codec and the validation orchestrator over HTTP/JSON.

use std::sync::Arc;

use aava_common::Validator;
use axum::Router;
use chrono::{DateTime, Utc};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Validator shared by all requests (stateless, read-only)
    pub validator: Arc<Validator>,
    /// Service start time, reported by /health
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(validator: Validator) -> Self {
        Self {
            validator: Arc::new(validator),
            started_at: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/codec/decode/:code", get(api::decode_code))
        .route("/api/codec/encode", get(api::encode_coordinate))
        .route("/api/validate", post(api::validate_address))
        .route("/api/score", post(api::score_signals))
        .route("/api/confidence", post(api::compute_confidence));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
