//! Free-text address parsing
//!
//! Heuristic extraction of the structured fields the rule checker looks at.
//! Nothing here is authoritative: every field is a best-effort guess and
//! may be `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PIN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{6})\b").expect("valid pincode regex"));

static HOUSE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(house|h|flat|apt|apartment|no\.|no|#)\s*[:\-]??\s*([A-Za-z0-9/\-]+)")
        .expect("valid house number regex")
});

static SECTOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bsector\s*(\d+)\b").expect("valid sector regex"));

static NEAR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)near\s+([A-Za-z0-9\s,\-]+)").expect("valid landmark regex"));

static TOKEN_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;\n]+").expect("valid separator regex"));

/// Structured fields guessed from an address string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAddress {
    /// Input with surrounding whitespace removed
    pub raw: String,
    /// Six-digit postal code
    pub pincode: Option<String>,
    pub house_no: Option<String>,
    pub sector: Option<String>,
    /// Landmark following "near"
    pub near: Option<String>,
    pub locality_guess: Option<String>,
    pub district_guess: Option<String>,
}

/// Address parsing capability consumed by the validator
pub trait AddressParser: Send + Sync {
    fn parse(&self, text: &str) -> ParsedAddress;
}

/// Regex-based parser for Indian postal addresses
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexAddressParser;

impl AddressParser for RegexAddressParser {
    fn parse(&self, text: &str) -> ParsedAddress {
        parse_address(text)
    }
}

/// Parse an address with the default heuristics
pub fn parse_address(text: &str) -> ParsedAddress {
    let raw = text.trim();

    let capture = |re: &Regex, group: usize| -> Option<String> {
        re.captures(raw)
            .and_then(|caps| caps.get(group))
            .map(|m| m.as_str().to_string())
    };

    let pincode = capture(&PIN_REGEX, 1);
    let house_no = capture(&HOUSE_REGEX, 2);
    let sector = capture(&SECTOR_REGEX, 1);
    let near = capture(&NEAR_REGEX, 1).map(|s| s.trim().to_string());

    // Trailing comma-separated segments usually hold locality, district, pincode
    let tokens: Vec<&str> = TOKEN_SPLIT.split(raw).collect();
    let from_end = |n: usize| -> Option<String> {
        tokens
            .len()
            .checked_sub(n)
            .map(|i| tokens[i].trim().to_string())
    };
    let locality_guess = if tokens.len() >= 3 {
        from_end(3)
    } else if tokens.len() == 2 {
        from_end(2)
    } else {
        None
    };
    let district_guess = if tokens.len() >= 2 { from_end(2) } else { from_end(1) };

    ParsedAddress {
        raw: raw.to_string(),
        pincode: non_blank(pincode),
        house_no: non_blank(house_no),
        sector: non_blank(sector),
        near: non_blank(near),
        locality_guess: non_blank(locality_guess),
        district_guess: non_blank(district_guess),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_address() {
        let parsed =
            parse_address("House No. 12, Sector 5, Near City Mall, Indiranagar, Bengaluru, 560001");
        assert_eq!(parsed.pincode.as_deref(), Some("560001"));
        // First alternative wins, so "House" captures the following word
        assert_eq!(parsed.house_no.as_deref(), Some("No"));
        assert_eq!(parsed.sector.as_deref(), Some("5"));
        assert_eq!(
            parsed.near.as_deref(),
            Some("City Mall, Indiranagar, Bengaluru, 560001")
        );
        assert_eq!(parsed.locality_guess.as_deref(), Some("Indiranagar"));
        assert_eq!(parsed.district_guess.as_deref(), Some("Bengaluru"));
    }

    #[test]
    fn test_flat_number() {
        let parsed = parse_address("Flat 4B, MG Road, Bengaluru");
        assert_eq!(parsed.house_no.as_deref(), Some("4B"));
        assert_eq!(parsed.pincode, None);
        assert_eq!(parsed.locality_guess.as_deref(), Some("Flat 4B"));
        assert_eq!(parsed.district_guess.as_deref(), Some("MG Road"));
    }

    #[test]
    fn test_house_number_with_separator() {
        let parsed = parse_address("Apt: 7/3-A, Civil Lines, Jaipur 302001");
        assert_eq!(parsed.house_no.as_deref(), Some("7/3-A"));
        assert_eq!(parsed.pincode.as_deref(), Some("302001"));
    }

    #[test]
    fn test_lowercase_keywords() {
        let parsed = parse_address("plot no 45 sector 21, Dwarka, South Delhi, 110002");
        assert_eq!(parsed.house_no.as_deref(), Some("45"));
        assert_eq!(parsed.sector.as_deref(), Some("21"));
        assert_eq!(parsed.locality_guess.as_deref(), Some("Dwarka"));
        assert_eq!(parsed.district_guess.as_deref(), Some("South Delhi"));
    }

    #[test]
    fn test_hash_at_start_is_not_a_house_number() {
        let parsed = parse_address("#221 near railway station");
        assert_eq!(parsed.house_no, None);
        assert_eq!(parsed.near.as_deref(), Some("railway station"));
        assert_eq!(parsed.locality_guess, None);
        assert_eq!(parsed.district_guess.as_deref(), Some("#221 near railway station"));
    }

    #[test]
    fn test_single_token() {
        let parsed = parse_address("Jaipur");
        assert_eq!(parsed.locality_guess, None);
        assert_eq!(parsed.district_guess.as_deref(), Some("Jaipur"));
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert_eq!(parse_address(""), ParsedAddress::default());

        let parsed = parse_address("  ,  , ");
        assert_eq!(parsed.raw, ",  ,");
        assert_eq!(parsed.locality_guess, None);
        assert_eq!(parsed.district_guess, None);
    }

    #[test]
    fn test_seven_digit_number_is_not_a_pincode() {
        let parsed = parse_address("Account 1234567, Jaipur");
        assert_eq!(parsed.pincode, None);
    }
}
