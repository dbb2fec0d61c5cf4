// src/core/matcher/mod.rs
use serde::{Deserialize, Serialize};

use crate::core::gallery::{FeatureSample, Gallery};
use crate::utils::error::{EngineError, Result};

mod correlation;
mod embedding;

pub use correlation::CorrelationMatcher;
pub use embedding::EmbeddingMatcher;

/// Which comparison algorithm backs [`FaceMatcher::match_probe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Euclidean distance between dense embedding vectors.
    Embedding,
    /// Pearson correlation between normalized grayscale patches.
    Correlation,
}

/// Outcome of comparing one probe against the gallery.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Matched { identity: String, confidence: f32 },
    NoMatch,
}

/// Comparison strategy behind one interface, so the authorization flow
/// stays agnostic to which algorithm configuration selected.
pub trait FaceMatcher: Send + Sync {
    /// Compares `probe` against every enrolled sample and reports the best
    /// identity clearing `threshold`, or [`MatchResult::NoMatch`].
    fn match_probe(
        &self,
        probe: &FeatureSample,
        gallery: &Gallery,
        threshold: f32,
    ) -> Result<MatchResult>;
}

/// Builds the matcher for the configured strategy.
pub fn build(strategy: MatchStrategy) -> Box<dyn FaceMatcher> {
    match strategy {
        MatchStrategy::Embedding => Box::new(EmbeddingMatcher),
        MatchStrategy::Correlation => Box::new(CorrelationMatcher),
    }
}

/// Admission rules shared by both strategies: a malformed probe is rejected
/// before any comparison, a dimension mismatch is an error rather than a
/// silent skip, and an empty gallery can never match. Returns whether there
/// is anything to compare against.
fn ensure_comparable(probe: &FeatureSample, gallery: &Gallery) -> Result<bool> {
    if probe.is_empty() || probe.values().iter().any(|v| !v.is_finite()) {
        return Err(EngineError::InvalidInput(
            "probe is empty or holds non-finite values".into(),
        ));
    }
    match gallery.dimension() {
        None => Ok(false),
        Some(dimension) if dimension != probe.len() => {
            Err(EngineError::InvalidInput(format!(
                "probe dimension {} does not match gallery dimension {}",
                probe.len(),
                dimension
            )))
        }
        Some(_) => Ok(true),
    }
}
