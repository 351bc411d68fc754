//! Rule-based address checks
//!
//! Awards points for structural evidence in the parsed address and collects
//! a reason for every check that did not pass. The sub-score is capped at
//! [`RULE_MAX`](crate::scoring::RULE_MAX).

use crate::address::ParsedAddress;
use crate::reference::RegionLookup;
use crate::scoring::RULE_MAX;

const VALID_CODE_POINTS: f64 = 10.0;
const PINCODE_POINTS: f64 = 8.0;
const DISTRICT_POINTS: f64 = 6.0;
const HOUSE_NO_POINTS: f64 = 6.0;
const LOCALITY_POINTS: f64 = 4.0;

pub const REASON_NO_PINCODE: &str = "No pincode found";
pub const REASON_PINCODE_MISMATCH: &str = "Pincode does not match reference data";
pub const REASON_NO_DISTRICT: &str = "No district guess available";
pub const REASON_DISTRICT_MISMATCH: &str = "District mismatch";

/// Rule sub-score with the reasons for points not awarded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleOutcome {
    pub score: f64,
    pub reasons: Vec<String>,
}

/// Scores a parsed address against reference data
pub struct RuleChecker<'a> {
    lookup: &'a dyn RegionLookup,
}

impl<'a> RuleChecker<'a> {
    pub fn new(lookup: &'a dyn RegionLookup) -> Self {
        Self { lookup }
    }

    /// Run all checks
    ///
    /// An invalid grid code short-circuits to a zero score with no reasons;
    /// the caller reports the code failure itself.
    pub fn check(&self, parsed: &ParsedAddress, code_valid: bool) -> RuleOutcome {
        if !code_valid {
            return RuleOutcome::default();
        }

        let mut score = VALID_CODE_POINTS;
        let mut reasons = Vec::new();

        match parsed.pincode.as_deref() {
            Some(pin) if self.lookup.contains_pincode(pin) => score += PINCODE_POINTS,
            Some(_) => reasons.push(REASON_PINCODE_MISMATCH.to_string()),
            None => reasons.push(REASON_NO_PINCODE.to_string()),
        }

        match parsed.district_guess.as_deref() {
            Some(district) if self.lookup.contains_district(district) => score += DISTRICT_POINTS,
            Some(_) => reasons.push(REASON_DISTRICT_MISMATCH.to_string()),
            None => reasons.push(REASON_NO_DISTRICT.to_string()),
        }

        if parsed.house_no.is_some() {
            score += HOUSE_NO_POINTS;
        }
        if parsed.locality_guess.is_some() {
            score += LOCALITY_POINTS;
        }

        RuleOutcome {
            score: score.min(RULE_MAX),
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::parse_address;
    use crate::reference::ReferenceTable;

    #[test]
    fn test_all_checks_pass() {
        let table = ReferenceTable::sample();
        let parsed = parse_address("Flat 4B, Indiranagar, Bengaluru, 560001");
        let outcome = RuleChecker::new(&table).check(&parsed, true);
        // 10 + 8 + 6 + 6 + 4
        assert_eq!(outcome.score, 34.0);
        assert!(outcome.reasons.is_empty());
    }

    #[test]
    fn test_invalid_code_scores_zero() {
        let table = ReferenceTable::sample();
        let parsed = parse_address("Flat 4B, Indiranagar, Bengaluru, 560001");
        let outcome = RuleChecker::new(&table).check(&parsed, false);
        assert_eq!(outcome, RuleOutcome::default());
    }

    #[test]
    fn test_mismatches_are_reported() {
        let table = ReferenceTable::sample();
        let parsed = parse_address("Flat 9, Bandra, Mumbai, 400050");
        let outcome = RuleChecker::new(&table).check(&parsed, true);
        // 10 + house 6 + locality 4
        assert_eq!(outcome.score, 20.0);
        assert_eq!(
            outcome.reasons,
            vec![REASON_PINCODE_MISMATCH.to_string(), REASON_DISTRICT_MISMATCH.to_string()]
        );
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let table = ReferenceTable::sample();
        let outcome = RuleChecker::new(&table).check(&ParsedAddress::default(), true);
        assert_eq!(outcome.score, 10.0);
        assert_eq!(
            outcome.reasons,
            vec![REASON_NO_PINCODE.to_string(), REASON_NO_DISTRICT.to_string()]
        );
    }

    #[test]
    fn test_score_never_exceeds_cap() {
        struct Everything;
        impl RegionLookup for Everything {
            fn contains_pincode(&self, _: &str) -> bool {
                true
            }
            fn contains_district(&self, _: &str) -> bool {
                true
            }
        }
        let parsed = ParsedAddress {
            raw: String::new(),
            pincode: Some("000000".to_string()),
            house_no: Some("1".to_string()),
            sector: None,
            near: None,
            locality_guess: Some("x".to_string()),
            district_guess: Some("y".to_string()),
        };
        let outcome = RuleChecker::new(&Everything).check(&parsed, true);
        assert!(outcome.score <= RULE_MAX);
    }
}
