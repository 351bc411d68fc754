//! Confidence scoring
//!
//! Combines three bounded sub-scores into a confidence percentage and maps
//! it onto a decision ladder:
//! - rule: 0..=40 (structured address checks)
//! - ml:   0..=40 (text similarity)
//! - geo:  0..=20 (code centroid vs. claimed location)
//!
//! Weighted sum is `0.4*rule + 0.4*ml + 0.2*geo`. How that sum is mapped to
//! a percentage depends on the [`ConfidenceScale`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Upper bound of the rule sub-score
pub const RULE_MAX: f64 = 40.0;
/// Upper bound of the ml sub-score
pub const ML_MAX: f64 = 40.0;
/// Upper bound of the geo sub-score
pub const GEO_MAX: f64 = 20.0;

const RULE_WEIGHT: f64 = 0.4;
const ML_WEIGHT: f64 = 0.4;
const GEO_WEIGHT: f64 = 0.2;

/// Divisor used by [`ConfidenceScale::Weighted`]
const WEIGHTED_DIVISOR: f64 = 40.0;

/// Weighted sum of a perfect vector, divisor of [`ConfidenceScale::Normalized`]
const NORMALIZED_DIVISOR: f64 =
    RULE_WEIGHT * RULE_MAX + ML_WEIGHT * ML_MAX + GEO_WEIGHT * GEO_MAX;

/// Mapping from the weighted sum to a percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceScale {
    /// `(weighted_sum / 40) * 100`; a perfect vector yields 90
    #[default]
    Weighted,

    /// `(weighted_sum / 36) * 100`; same weights, a perfect vector yields 100
    Normalized,
}

impl ConfidenceScale {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceScale::Weighted => "weighted",
            ConfidenceScale::Normalized => "normalized",
        }
    }

    fn divisor(&self) -> f64 {
        match self {
            ConfidenceScale::Weighted => WEIGHTED_DIVISOR,
            ConfidenceScale::Normalized => NORMALIZED_DIVISOR,
        }
    }
}

impl FromStr for ConfidenceScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weighted" => Ok(ConfidenceScale::Weighted),
            "normalized" => Ok(ConfidenceScale::Normalized),
            other => Err(format!(
                "unknown confidence scale '{}' (expected weighted or normalized)",
                other
            )),
        }
    }
}

impl std::fmt::Display for ConfidenceScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision ladder outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    /// confidence >= 95
    #[serde(rename = "Auto Approved")]
    AutoApproved,

    /// confidence >= 85
    #[serde(rename = "High Confidence")]
    HighConfidence,

    /// confidence >= 70
    #[serde(rename = "Verified")]
    Verified,

    /// confidence >= 55
    #[serde(rename = "Needs Attention")]
    NeedsAttention,

    /// Anything below 55
    #[serde(rename = "Physical Verification Required")]
    PhysicalVerificationRequired,

    /// No confidence available
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Decision {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Decision::AutoApproved => "Auto Approved",
            Decision::HighConfidence => "High Confidence",
            Decision::Verified => "Verified",
            Decision::NeedsAttention => "Needs Attention",
            Decision::PhysicalVerificationRequired => "Physical Verification Required",
            Decision::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The three sub-scores of one validation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreVector {
    pub rule: f64,
    pub ml: f64,
    pub geo: f64,
}

/// Confidence percentage with its decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    pub confidence: f64,
    pub decision: Decision,
}

/// Stateless scorer parameterized by its scale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoringEngine {
    scale: ConfidenceScale,
}

impl ScoringEngine {
    pub fn new(scale: ConfidenceScale) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> ConfidenceScale {
        self.scale
    }

    /// Confidence in [0, 100], rounded to 2 decimals
    ///
    /// Absent or non-finite sub-scores count as 0. Sub-scores are weighted
    /// as given, not clamped to their native ranges; inputs outside those
    /// ranges are outside the contract and only the final percentage is
    /// clamped. [`Validator`](crate::Validator) clamps its sub-scores before
    /// scoring.
    pub fn compute_confidence(&self, rule: Option<f64>, ml: Option<f64>, geo: Option<f64>) -> f64 {
        let total = RULE_WEIGHT * finite_or_zero(rule)
            + ML_WEIGHT * finite_or_zero(ml)
            + GEO_WEIGHT * finite_or_zero(geo);

        round2(total / self.scale.divisor() * 100.0).clamp(0.0, 100.0)
    }

    /// Score a full vector
    pub fn score(&self, scores: &ScoreVector) -> ConfidenceResult {
        let confidence = self.compute_confidence(Some(scores.rule), Some(scores.ml), Some(scores.geo));
        ConfidenceResult {
            confidence,
            decision: interpret(Some(confidence)),
        }
    }
}

/// Confidence with the default [`ConfidenceScale::Weighted`]
pub fn compute_confidence(rule: Option<f64>, ml: Option<f64>, geo: Option<f64>) -> f64 {
    ScoringEngine::default().compute_confidence(rule, ml, geo)
}

/// Map a confidence onto the decision ladder
///
/// Bands are inclusive at their lower edge. `None` yields [`Decision::Unknown`].
pub fn interpret(confidence: Option<f64>) -> Decision {
    let Some(c) = confidence else {
        return Decision::Unknown;
    };

    if c >= 95.0 {
        Decision::AutoApproved
    } else if c >= 85.0 {
        Decision::HighConfidence
    } else if c >= 70.0 {
        Decision::Verified
    } else if c >= 55.0 {
        Decision::NeedsAttention
    } else {
        Decision::PhysicalVerificationRequired
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
