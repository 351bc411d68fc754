//! HTTP API handlers for aava-vs

pub mod codec;
pub mod health;
pub mod validate;

pub use codec::{decode_code, encode_coordinate};
pub use health::health_routes;
pub use validate::{compute_confidence, score_signals, validate_address};
