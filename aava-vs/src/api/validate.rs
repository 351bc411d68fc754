//! Validation and scoring endpoints

use aava_common::{
    interpret, AddressRequest, Coordinate, Decision, Signals, ValidationReport,
};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Full-pipeline validation request
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub code: String,
    pub address: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    /// Reference address for similarity (defaults to `address`)
    #[serde(default)]
    pub reference: Option<String>,
}

/// Validation from pre-computed rule/ml signals
#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub code: String,
    pub rule_score: f64,
    pub ml_score: f64,
    #[serde(default)]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

/// Raw sub-scores for the confidence calculation
#[derive(Debug, Deserialize)]
pub struct ConfidenceRequest {
    #[serde(default)]
    pub rule: Option<f64>,
    #[serde(default)]
    pub ml: Option<f64>,
    #[serde(default)]
    pub geo: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ConfidenceResponse {
    pub confidence: f64,
    pub decision: Decision,
}

/// Validation report with request metadata
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub request_id: Uuid,
    pub validated_at: DateTime<Utc>,
    pub report: ValidationReport,
}

impl ValidationResponse {
    fn new(report: ValidationReport) -> Self {
        let response = Self {
            request_id: Uuid::new_v4(),
            validated_at: Utc::now(),
            report,
        };
        info!(
            request_id = %response.request_id,
            code = %response.report.code,
            confidence = response.report.confidence,
            decision = %response.report.decision,
            "Validation complete"
        );
        response
    }
}

/// Claimed location from optional query fields; both or neither
fn claimed_location(lat: Option<f64>, lon: Option<f64>) -> ApiResult<Option<Coordinate>> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Some(Coordinate::new(lat, lon))),
        (None, None) => Ok(None),
        _ => Err(ApiError::BadRequest(
            "lat and lon must be supplied together".to_string(),
        )),
    }
}

/// POST /api/validate
///
/// Parses the address, runs rule checks and similarity, then scores the
/// code against the claimed location. An undecodable code is reported in
/// the body, not as an HTTP error.
pub async fn validate_address(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> ApiResult<Json<ValidationResponse>> {
    let claimed = claimed_location(request.lat, request.lon)?;
    let report = state.validator.validate_address(&AddressRequest {
        code: request.code,
        address: request.address,
        claimed,
        reference: request.reference,
    });
    Ok(Json(ValidationResponse::new(report)))
}

/// POST /api/score
///
/// Validates a code against rule and ml sub-scores computed elsewhere.
pub async fn score_signals(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> ApiResult<Json<ValidationResponse>> {
    let claimed = claimed_location(request.lat, request.lon)?;
    let signals = Signals {
        rule_score: request.rule_score,
        ml_score: request.ml_score,
        similarity: request.similarity.unwrap_or(0.0),
        reasons: request.reasons,
        ..Signals::default()
    };
    let report = state.validator.validate(&request.code, signals, claimed);
    Ok(Json(ValidationResponse::new(report)))
}

/// POST /api/confidence
pub async fn compute_confidence(
    State(state): State<AppState>,
    Json(request): Json<ConfidenceRequest>,
) -> Json<ConfidenceResponse> {
    let confidence = state
        .validator
        .engine()
        .compute_confidence(request.rule, request.ml, request.geo);
    Json(ConfidenceResponse {
        confidence,
        decision: interpret(Some(confidence)),
    })
}
