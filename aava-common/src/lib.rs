//! # AAVA Common Library
//!
//! Shared code for address validation:
//! - Grid codec (10-symbol spatial codes over a fixed bounding box)
//! - Confidence scoring and decision ladder
//! - Validation orchestrator
//! - Collaborators: address parser, text similarity, distance, reference data
//! - Configuration loading

pub mod address;
pub mod config;
pub mod error;
pub mod geo;
pub mod grid;
pub mod reference;
pub mod rules;
pub mod scoring;
pub mod similarity;
pub mod validation;

pub use error::{Error, Result};
pub use grid::{decode, encode, BoundingBox, Centroid, CodecError, Coordinate, GridCode, GridCodec};
pub use scoring::{compute_confidence, interpret, ConfidenceResult, ConfidenceScale, Decision, ScoreVector, ScoringEngine};
pub use validation::{AddressRequest, Signals, ValidationReport, Validator, ValidatorBuilder};
