// src/core/matcher/embedding.rs
use tracing::debug;

use super::{ensure_comparable, FaceMatcher, MatchResult};
use crate::core::gallery::{FeatureSample, Gallery};
use crate::utils::error::Result;

/// Matches dense embedding vectors by Euclidean distance.
///
/// Every reference of every identity competes; the globally closest one
/// wins and the probe is accepted when that distance stays within
/// `1 - threshold`, i.e. when `confidence = 1 - distance` reaches the
/// threshold. The strict `<` in the scan makes distance ties resolve to
/// the earliest enrolled identity.
pub struct EmbeddingMatcher;

impl FaceMatcher for EmbeddingMatcher {
    fn match_probe(
        &self,
        probe: &FeatureSample,
        gallery: &Gallery,
        threshold: f32,
    ) -> Result<MatchResult> {
        if !ensure_comparable(probe, gallery)? {
            return Ok(MatchResult::NoMatch);
        }

        let mut best: Option<(&str, f64)> = None;
        for entry in gallery.iter() {
            for sample in &entry.samples {
                let distance = euclidean_distance(probe.values(), sample.values());
                match best {
                    Some((_, best_distance)) if distance >= best_distance => {}
                    _ => best = Some((entry.name.as_str(), distance)),
                }
            }
        }

        let (identity, distance) = match best {
            Some(found) => found,
            None => return Ok(MatchResult::NoMatch),
        };

        let tolerance = 1.0 - f64::from(threshold);
        if distance <= tolerance {
            let confidence = (1.0 - distance) as f32;
            debug!(
                "Embedding match: {} at distance {:.4} (confidence {:.4})",
                identity, distance, confidence
            );
            Ok(MatchResult::Matched {
                identity: identity.to_string(),
                confidence,
            })
        } else {
            debug!(
                "Embedding minimum distance {:.4} exceeds tolerance {:.4}",
                distance, tolerance
            );
            Ok(MatchResult::NoMatch)
        }
    }
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = f64::from(*x) - f64::from(*y);
            diff * diff
        })
        .sum::<f64>()
        .sqrt()
}
