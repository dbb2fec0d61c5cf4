// src/core/gallery/mod.rs
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::storage::StateStore;
use crate::utils::error::{EngineError, Result};

pub mod types;

pub use types::FeatureSample;

/// One enrolled identity and its reference samples, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub name: String,
    pub samples: Vec<FeatureSample>,
}

/// What a repeat enrollment does to an identity's existing samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentPolicy {
    /// Keep exactly one canonical reference that each enrollment replaces.
    Replace,
    /// Keep up to `cap` references, evicting the oldest once the cap is hit.
    Append { cap: usize },
}

/// Serialized form of the gallery, as written to the backing store.
pub type GallerySnapshot = Vec<GalleryEntry>;

/// The set of identities the matcher searches.
///
/// Entries keep enrollment order, which is also the matcher's tie-break
/// order. All samples share one dimensionality. Every mutation flushes to
/// the backing store before returning; a failed flush leaves the in-memory
/// change in place and surfaces a persistence error so the caller can retry
/// via [`Gallery::flush`].
pub struct Gallery {
    entries: Vec<GalleryEntry>,
    policy: EnrollmentPolicy,
    store: Arc<dyn StateStore<GallerySnapshot>>,
}

impl Gallery {
    /// Loads the gallery from its backing store. An absent snapshot is an
    /// empty gallery, not an error.
    pub fn load(
        store: Arc<dyn StateStore<GallerySnapshot>>,
        policy: EnrollmentPolicy,
    ) -> Result<Self> {
        let entries = store.load()?.unwrap_or_default();
        validate_snapshot(&entries)?;
        info!("Loaded gallery with {} enrolled identities", entries.len());
        Ok(Self {
            entries,
            policy,
            store,
        })
    }

    /// Enrolls `sample` under `name`. Unknown names create a new entry;
    /// known names follow the enrollment policy.
    pub fn enroll(&mut self, name: &str, sample: FeatureSample) -> Result<()> {
        if let Some(dimension) = self.dimension() {
            if sample.len() != dimension {
                return Err(EngineError::InvalidInput(format!(
                    "sample dimension {} does not match gallery dimension {}",
                    sample.len(),
                    dimension
                )));
            }
        }

        let policy = self.policy;
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => {
                match policy {
                    EnrollmentPolicy::Replace => entry.samples = vec![sample],
                    EnrollmentPolicy::Append { cap } => {
                        // The cap can shrink between runs, so trim however
                        // much it takes to land at `cap` after the push.
                        if entry.samples.len() >= cap {
                            let overflow = entry.samples.len() + 1 - cap;
                            entry.samples.drain(..overflow);
                        }
                        entry.samples.push(sample);
                    }
                }
                info!("Updated enrollment for identity: {}", name);
            }
            None => {
                self.entries.push(GalleryEntry {
                    name: name.to_string(),
                    samples: vec![sample],
                });
                info!("Enrolled new identity: {}", name);
            }
        }

        self.flush()
    }

    /// Removes an identity and all its samples. Returns whether it existed.
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.name != name);
        if self.entries.len() == before {
            return Ok(false);
        }
        info!("Removed identity: {}", name);
        self.flush()?;
        Ok(true)
    }

    /// Enrolled names in enrollment order.
    pub fn list_identities(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Dimensionality shared by every sample, or `None` while empty.
    pub fn dimension(&self) -> Option<usize> {
        self.entries
            .first()
            .and_then(|entry| entry.samples.first())
            .map(FeatureSample::len)
    }

    pub fn samples_of(&self, name: &str) -> Option<&[FeatureSample]> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.samples.as_slice())
    }

    /// Iterates entries in enrollment order.
    pub fn iter(&self) -> impl Iterator<Item = &GalleryEntry> {
        self.entries.iter()
    }

    /// Rewrites the backing store from the in-memory state. Mutations call
    /// this automatically; callers retry it after a persistence error.
    pub fn flush(&self) -> Result<()> {
        self.store.save(&self.entries)?;
        Ok(())
    }
}

// The store handle is a trait object, so Debug is spelled out by hand.
impl fmt::Debug for Gallery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gallery")
            .field("entries", &self.entries)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// A snapshot from disk must uphold the same invariants `enroll` maintains,
/// so a hand-edited or corrupt file is caught at load time.
fn validate_snapshot(entries: &GallerySnapshot) -> Result<()> {
    let mut names = HashSet::new();
    let mut dimension = None;
    for entry in entries {
        if !names.insert(entry.name.as_str()) {
            return Err(EngineError::Persistence(format!(
                "gallery snapshot lists identity '{}' more than once",
                entry.name
            )));
        }
        if entry.samples.is_empty() {
            return Err(EngineError::Persistence(format!(
                "gallery snapshot has no samples for identity '{}'",
                entry.name
            )));
        }
        for sample in &entry.samples {
            if sample.is_empty() || sample.values().iter().any(|v| !v.is_finite()) {
                return Err(EngineError::Persistence(format!(
                    "gallery snapshot holds a malformed sample for identity '{}'",
                    entry.name
                )));
            }
            match dimension {
                None => dimension = Some(sample.len()),
                Some(expected) if expected != sample.len() => {
                    return Err(EngineError::Persistence(format!(
                        "gallery snapshot mixes sample dimensions {} and {}",
                        expected,
                        sample.len()
                    )));
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}
