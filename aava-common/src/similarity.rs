//! Text similarity between a claimed address and a reference address
//!
//! Two cosine measures are available:
//! - [`TfIdfCosine`]: TF-IDF weighted, fitted on the two documents being
//!   compared (smoothed IDF, L2-normalized rows)
//! - [`TokenCosine`]: raw token counts
//!
//! Both return a value in [0, 1]; 0 when either side has no tokens.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// Words of two or more characters
static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid word regex"));

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").expect("valid filter regex"));

/// Similarity capability consumed by the validator
pub trait SimilarityScorer: Send + Sync {
    /// Similarity in [0, 1]
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Cosine over token count vectors
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCosine;

impl SimilarityScorer for TokenCosine {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let ta = counts(simple_tokens(a));
        let tb = counts(simple_tokens(b));
        cosine(&ta, &tb, |_| 1.0)
    }
}

/// Cosine over TF-IDF vectors fitted on the pair
///
/// Falls back to [`TokenCosine`] when neither side has a word of two or
/// more characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct TfIdfCosine;

impl SimilarityScorer for TfIdfCosine {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let ta = counts(word_tokens(a));
        let tb = counts(word_tokens(b));

        if ta.is_empty() && tb.is_empty() {
            return TokenCosine.similarity(a, b);
        }

        // Smoothed IDF over a two-document corpus
        let n_docs = 2.0_f64;
        let idf = |term: &str| {
            let df = [&ta, &tb].iter().filter(|doc| doc.contains_key(term)).count() as f64;
            ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
        };

        cosine(&ta, &tb, idf)
    }
}

fn simple_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    NON_ALNUM
        .replace_all(&lowered, " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn word_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_REGEX
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn counts(tokens: Vec<String>) -> BTreeMap<String, f64> {
    let mut map = BTreeMap::new();
    for token in tokens {
        *map.entry(token).or_insert(0.0) += 1.0;
    }
    map
}

/// Cosine of two count vectors with a per-term weight
fn cosine<F>(a: &BTreeMap<String, f64>, b: &BTreeMap<String, f64>, weight: F) -> f64
where
    F: Fn(&str) -> f64,
{
    let terms: BTreeSet<&String> = a.keys().chain(b.keys()).collect();

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for term in terms {
        let w = weight(term);
        let va = a.get(term).copied().unwrap_or(0.0) * w;
        let vb = b.get(term).copied().unwrap_or(0.0) * w;
        dot += va * vb;
        norm_a += va * va;
        norm_b += vb * vb;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}
