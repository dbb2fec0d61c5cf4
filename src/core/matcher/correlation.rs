// src/core/matcher/correlation.rs
use tracing::debug;

use super::{ensure_comparable, FaceMatcher, MatchResult};
use crate::core::gallery::{FeatureSample, Gallery};
use crate::utils::error::Result;

/// Matches normalized grayscale patches by Pearson correlation.
///
/// Every sample competes individually; there is no averaging across one
/// identity's samples. The single sample with the highest correlation
/// strictly above the threshold wins, and the strict `>` in the best-so-far
/// update makes ties resolve to the earliest sample in iteration order.
/// A flat (zero-variance) probe or reference has no defined correlation
/// and never matches.
pub struct CorrelationMatcher;

impl FaceMatcher for CorrelationMatcher {
    fn match_probe(
        &self,
        probe: &FeatureSample,
        gallery: &Gallery,
        threshold: f32,
    ) -> Result<MatchResult> {
        if !ensure_comparable(probe, gallery)? {
            return Ok(MatchResult::NoMatch);
        }

        let threshold = f64::from(threshold);
        let mut best: Option<(&str, f64)> = None;
        for entry in gallery.iter() {
            for sample in &entry.samples {
                let correlation = match pearson(probe.values(), sample.values()) {
                    Some(r) => r,
                    None => continue,
                };
                if correlation > threshold
                    && best.map_or(true, |(_, best_r)| correlation > best_r)
                {
                    best = Some((entry.name.as_str(), correlation));
                }
            }
        }

        match best {
            Some((identity, correlation)) => {
                debug!(
                    "Correlation match: {} at r={:.4}",
                    identity, correlation
                );
                Ok(MatchResult::Matched {
                    identity: identity.to_string(),
                    confidence: correlation as f32,
                })
            }
            None => Ok(MatchResult::NoMatch),
        }
    }
}

/// Pearson correlation coefficient, or `None` when either side has zero
/// variance and the coefficient is undefined.
fn pearson(a: &[f32], b: &[f32]) -> Option<f64> {
    let n = a.len() as f64;
    let mean_a = a.iter().map(|v| f64::from(*v)).sum::<f64>() / n;
    let mean_b = b.iter().map(|v| f64::from(*v)).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_a = 0.0;
    let mut variance_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = f64::from(*x) - mean_a;
        let dy = f64::from(*y) - mean_b;
        covariance += dx * dy;
        variance_a += dx * dx;
        variance_b += dy * dy;
    }

    let denominator = (variance_a * variance_b).sqrt();
    if denominator == 0.0 {
        return None;
    }
    Some(covariance / denominator)
}
