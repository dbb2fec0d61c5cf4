// src/core/gallery/types.rs
use serde::{Deserialize, Serialize};

use crate::utils::error::{EngineError, Result};

/// One captured face reduced to a fixed-length numeric vector.
///
/// Under the embedding strategy this is a dense vector in a metric space
/// where Euclidean distance tracks identity; under the correlation strategy
/// it is a normalized, flattened grayscale patch. The two representations
/// never mix inside one deployment, and a gallery enforces one
/// dimensionality across everything it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSample {
    values: Vec<f32>,
}

impl FeatureSample {
    /// Wraps a raw feature vector, rejecting empty and non-finite input.
    pub fn new(values: Vec<f32>) -> Result<Self> {
        if values.is_empty() {
            return Err(EngineError::InvalidInput("feature vector is empty".into()));
        }
        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return Err(EngineError::InvalidInput(format!(
                "feature vector holds a non-finite value at index {}",
                position
            )));
        }
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}
