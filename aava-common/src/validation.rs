//! Address validation orchestration
//!
//! Decodes the submitted grid code, derives the geo sub-score from the
//! distance between the code's centroid and the claimed location, and
//! combines it with the rule and ml sub-scores into a [`ValidationReport`].
//!
//! Validation never fails: a code that does not decode zeroes the rule and
//! geo sub-scores and is reported through `reasons` and `code_error`.

use crate::address::{AddressParser, ParsedAddress, RegexAddressParser};
use crate::geo::{DistanceMeasure, Haversine};
use crate::grid::{round_to, Centroid, CodecError, Coordinate, GridCodec};
use crate::reference::{ReferenceTable, RegionLookup};
use crate::rules::RuleChecker;
use crate::scoring::{round2, ConfidenceScale, Decision, ScoreVector, ScoringEngine, ML_MAX, RULE_MAX};
use crate::similarity::{SimilarityScorer, TfIdfCosine};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Reason added when the grid code does not decode
pub const REASON_INVALID_CODE: &str = "Invalid code";

/// Geo sub-score for a valid code without a claimed location
pub const GEO_UNCLAIMED_SCORE: f64 = 5.0;

/// (max distance in metres, geo sub-score), nearest band first
const GEO_BANDS: [(f64, f64); 4] = [(10.0, 20.0), (50.0, 14.0), (200.0, 8.0), (1000.0, 4.0)];

/// Map a centroid-to-claim distance onto the geo sub-score
pub fn geo_score_for_distance(distance_m: f64) -> f64 {
    GEO_BANDS
        .iter()
        .find(|(max, _)| distance_m <= *max)
        .map(|(_, score)| *score)
        .unwrap_or(0.0)
}

/// Pre-computed collaborator outputs for one validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    #[serde(default)]
    pub parsed: ParsedAddress,
    /// Rule sub-score, 0..=40
    #[serde(default)]
    pub rule_score: f64,
    /// Text-similarity sub-score, 0..=40
    #[serde(default)]
    pub ml_score: f64,
    /// Raw similarity, 0..=1
    #[serde(default)]
    pub similarity: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// Full-pipeline validation input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRequest {
    pub code: String,
    pub address: String,
    #[serde(default)]
    pub claimed: Option<Coordinate>,
    /// Reference address for similarity; the address itself when absent
    #[serde(default)]
    pub reference: Option<String>,
}

/// Outcome of one validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub code: String,
    pub address: String,
    pub parsed: ParsedAddress,
    pub rule_score: f64,
    pub ml_score: f64,
    pub geo_score: f64,
    pub similarity: f64,
    /// Centroid-to-claim distance in metres, 2 decimals
    pub distance_m: Option<f64>,
    pub confidence: f64,
    pub decision: Decision,
    pub centroid: Option<Centroid>,
    pub reasons: Vec<String>,
    /// Codec failure message when the code did not decode
    pub code_error: Option<String>,
}

/// Validation orchestrator with injectable collaborators
///
/// The core only needs the codec and scoring engine; the parser,
/// similarity scorer and region lookup are used by
/// [`Validator::validate_address`].
pub struct Validator {
    codec: GridCodec,
    engine: ScoringEngine,
    parser: Box<dyn AddressParser>,
    similarity: Box<dyn SimilarityScorer>,
    distance: Box<dyn DistanceMeasure>,
    lookup: Box<dyn RegionLookup>,
}

impl Default for Validator {
    fn default() -> Self {
        ValidatorBuilder::new().build()
    }
}

impl Validator {
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    pub fn codec(&self) -> &GridCodec {
        &self.codec
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Validate a code against pre-computed rule and ml signals
    pub fn validate(&self, code: &str, signals: Signals, claimed: Option<Coordinate>) -> ValidationReport {
        let decoded = self.codec.decode(code);
        let address = signals.parsed.raw.clone();
        self.assemble(code, address, decoded, signals, claimed)
    }

    /// Parse, rule-check and score a free-text address, then validate
    pub fn validate_address(&self, request: &AddressRequest) -> ValidationReport {
        let parsed = self.parser.parse(&request.address);
        let decoded = self.codec.decode(&request.code);

        let rules = RuleChecker::new(self.lookup.as_ref()).check(&parsed, decoded.is_ok());

        let reference = request.reference.as_deref().unwrap_or(&request.address);
        let sim = self.similarity.similarity(&request.address, reference);

        let signals = Signals {
            parsed,
            rule_score: rules.score,
            ml_score: round2(sim * ML_MAX),
            similarity: round_to(sim, 3),
            reasons: rules.reasons,
        };

        self.assemble(&request.code, request.address.clone(), decoded, signals, request.claimed)
    }

    fn assemble(
        &self,
        code: &str,
        address: String,
        decoded: Result<Centroid, CodecError>,
        signals: Signals,
        claimed: Option<Coordinate>,
    ) -> ValidationReport {
        let Signals {
            parsed,
            rule_score,
            ml_score,
            similarity,
            mut reasons,
        } = signals;

        let ml_score = clamp_score(ml_score, ML_MAX);

        let (rule_score, geo_score, distance_m, centroid, code_error) = match decoded {
            Err(e) => {
                reasons.push(REASON_INVALID_CODE.to_string());
                (0.0, 0.0, None, None, Some(e.to_string()))
            }
            Ok(centroid) => {
                let rule_score = clamp_score(rule_score, RULE_MAX);
                let (geo_score, distance_m) = match claimed {
                    None => (GEO_UNCLAIMED_SCORE, None),
                    Some(claim) => match self.distance.distance_m(Some(centroid), Some(claim)) {
                        Some(d) if d.is_finite() => (geo_score_for_distance(d), Some(round2(d))),
                        _ => (0.0, None),
                    },
                };
                (rule_score, geo_score, distance_m, Some(centroid), None)
            }
        };

        let result = self.engine.score(&ScoreVector {
            rule: rule_score,
            ml: ml_score,
            geo: geo_score,
        });

        debug!(
            code,
            rule_score,
            ml_score,
            geo_score,
            distance_m = ?distance_m,
            confidence = result.confidence,
            decision = %result.decision,
            "Validated address"
        );

        ValidationReport {
            code: code.to_string(),
            address,
            parsed,
            rule_score,
            ml_score,
            geo_score,
            similarity,
            distance_m,
            confidence: result.confidence,
            decision: result.decision,
            centroid,
            reasons,
            code_error,
        }
    }
}

/// Builder for [`Validator`]; every collaborator has a default
pub struct ValidatorBuilder {
    codec: GridCodec,
    scale: ConfidenceScale,
    parser: Box<dyn AddressParser>,
    similarity: Box<dyn SimilarityScorer>,
    distance: Box<dyn DistanceMeasure>,
    lookup: Box<dyn RegionLookup>,
}

impl Default for ValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidatorBuilder {
    pub fn new() -> Self {
        Self {
            codec: GridCodec::STANDARD,
            scale: ConfidenceScale::default(),
            parser: Box::new(RegexAddressParser),
            similarity: Box::new(TfIdfCosine),
            distance: Box::new(Haversine),
            lookup: Box::new(ReferenceTable::sample()),
        }
    }

    pub fn codec(mut self, codec: GridCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn scale(mut self, scale: ConfidenceScale) -> Self {
        self.scale = scale;
        self
    }

    pub fn parser(mut self, parser: impl AddressParser + 'static) -> Self {
        self.parser = Box::new(parser);
        self
    }

    pub fn similarity(mut self, similarity: impl SimilarityScorer + 'static) -> Self {
        self.similarity = Box::new(similarity);
        self
    }

    pub fn distance(mut self, distance: impl DistanceMeasure + 'static) -> Self {
        self.distance = Box::new(distance);
        self
    }

    pub fn lookup(mut self, lookup: impl RegionLookup + 'static) -> Self {
        self.lookup = Box::new(lookup);
        self
    }

    pub fn build(self) -> Validator {
        Validator {
            codec: self.codec,
            engine: ScoringEngine::new(self.scale),
            parser: self.parser,
            similarity: self.similarity,
            distance: self.distance,
            lookup: self.lookup,
        }
    }
}

fn clamp_score(value: f64, max: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, max)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Distance stub returning a fixed value
    struct Fixed(Option<f64>);

    impl DistanceMeasure for Fixed {
        fn distance_m(&self, _: Option<Coordinate>, _: Option<Coordinate>) -> Option<f64> {
            self.0
        }
    }

    fn signals(rule: f64, ml: f64) -> Signals {
        Signals {
            rule_score: rule,
            ml_score: ml,
            similarity: ml / ML_MAX,
            ..Signals::default()
        }
    }

    #[test]
    fn test_geo_bands() {
        assert_eq!(geo_score_for_distance(0.0), 20.0);
        assert_eq!(geo_score_for_distance(10.0), 20.0);
        assert_eq!(geo_score_for_distance(10.01), 14.0);
        assert_eq!(geo_score_for_distance(50.0), 14.0);
        assert_eq!(geo_score_for_distance(200.0), 8.0);
        assert_eq!(geo_score_for_distance(1000.0), 4.0);
        assert_eq!(geo_score_for_distance(1000.5), 0.0);
    }

    #[test]
    fn test_invalid_code_zeroes_rule_and_geo() {
        let validator = Validator::default();
        let report = validator.validate("NOT-A-CODE", signals(30.0, 40.0), None);
        assert_eq!(report.rule_score, 0.0);
        assert_eq!(report.geo_score, 0.0);
        assert_eq!(report.centroid, None);
        assert_eq!(report.confidence, 40.0);
        assert_eq!(report.decision, Decision::PhysicalVerificationRequired);
        assert_eq!(report.reasons, vec![REASON_INVALID_CODE.to_string()]);
        assert!(report.code_error.is_some());
    }

    #[test]
    fn test_valid_code_without_claim_gets_partial_geo() {
        let validator = Validator::default();
        let report = validator.validate("39J-438-TJC7", signals(40.0, 40.0), None);
        assert_eq!(report.geo_score, GEO_UNCLAIMED_SCORE);
        assert_eq!(report.distance_m, None);
        assert_eq!(report.centroid, Some(Coordinate::new(28.6139011, 77.2089977)));
        // (16 + 16 + 1) / 40 * 100
        assert_eq!(report.confidence, 82.5);
        assert_eq!(report.decision, Decision::Verified);
    }

    #[test]
    fn test_claim_at_centroid_gets_full_geo() {
        let validator = Validator::default();
        let claim = Coordinate::new(28.6139011, 77.2089977);
        let report = validator.validate("39J438TJC7", signals(40.0, 40.0), Some(claim));
        assert_eq!(report.geo_score, 20.0);
        assert_eq!(report.distance_m, Some(0.0));
        assert_eq!(report.confidence, 90.0);
        assert_eq!(report.decision, Decision::HighConfidence);
    }

    #[test]
    fn test_far_claim_gets_no_geo() {
        let validator = Validator::default();
        let claim = Coordinate::new(12.9716, 77.5946);
        let report = validator.validate("39J438TJC7", signals(40.0, 40.0), Some(claim));
        assert_eq!(report.geo_score, 0.0);
        assert!(report.distance_m.unwrap() > 1_000_000.0);
    }

    #[test]
    fn test_injected_distance_measure() {
        let validator = Validator::builder().distance(Fixed(Some(150.0))).build();
        let claim = Coordinate::new(28.6, 77.2);
        let report = validator.validate("39J438TJC7", signals(0.0, 0.0), Some(claim));
        assert_eq!(report.geo_score, 8.0);
        assert_eq!(report.distance_m, Some(150.0));

        let validator = Validator::builder().distance(Fixed(None)).build();
        let report = validator.validate("39J438TJC7", signals(0.0, 0.0), Some(claim));
        assert_eq!(report.geo_score, 0.0);
        assert_eq!(report.distance_m, None);
    }

    #[test]
    fn test_incoming_scores_are_clamped() {
        let validator = Validator::default();
        let report = validator.validate("39J438TJC7", signals(99.0, -4.0), None);
        assert_eq!(report.rule_score, RULE_MAX);
        assert_eq!(report.ml_score, 0.0);
    }

    #[test]
    fn test_supplied_reasons_are_kept() {
        let validator = Validator::default();
        let mut input = signals(10.0, 10.0);
        input.reasons.push("No pincode found".to_string());
        let report = validator.validate("bad", input, None);
        assert_eq!(
            report.reasons,
            vec!["No pincode found".to_string(), REASON_INVALID_CODE.to_string()]
        );
    }

    #[test]
    fn test_normalized_scale_is_applied() {
        let validator = Validator::builder().scale(ConfidenceScale::Normalized).build();
        let report = validator.validate("39J438TJC7", signals(40.0, 40.0), None);
        // (16 + 16 + 1) / 36 * 100
        assert_eq!(report.confidence, 91.67);
        assert_eq!(report.decision, Decision::HighConfidence);
    }
}
