//! Grid code encode/decode endpoints

use aava_common::{BoundingBox, Centroid};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::AppState;

/// Query parameters for encoding
#[derive(Debug, Deserialize)]
pub struct EncodeQuery {
    pub lat: f64,
    pub lon: f64,
}

/// Decoded grid code
#[derive(Debug, Serialize)]
pub struct DecodeResponse {
    pub code: String,
    pub formatted: String,
    pub centroid: Centroid,
    pub bounds: BoundingBox,
}

/// Encoded coordinate
#[derive(Debug, Serialize)]
pub struct EncodeResponse {
    pub code: String,
    pub formatted: String,
    /// Centroid of the cell the coordinate fell into
    pub centroid: Centroid,
}

/// GET /api/codec/decode/:code
///
/// Dashes and lowercase are accepted; codec failures map to 400.
pub async fn decode_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<DecodeResponse>> {
    let codec = state.validator.codec();
    let parsed = codec.parse(&code)?;
    let bounds = codec.decode_bounds(parsed.as_str())?;
    let centroid = codec.decode(parsed.as_str())?;

    Ok(Json(DecodeResponse {
        code: parsed.to_string(),
        formatted: parsed.formatted(),
        centroid,
        bounds,
    }))
}

/// GET /api/codec/encode?lat=..&lon=..
pub async fn encode_coordinate(
    State(state): State<AppState>,
    Query(query): Query<EncodeQuery>,
) -> ApiResult<Json<EncodeResponse>> {
    let codec = state.validator.codec();
    let code = codec.encode(query.lat, query.lon)?;
    let centroid = codec.decode(code.as_str())?;

    Ok(Json(EncodeResponse {
        code: code.to_string(),
        formatted: code.formatted(),
        centroid,
    }))
}
