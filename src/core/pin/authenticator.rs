// src/core/pin/authenticator.rs
use std::collections::BTreeMap;
use std::sync::Arc;

use ring::constant_time;
use sha3::{Digest, Sha3_256};
use tracing::info;

use crate::storage::StateStore;
use crate::utils::error::{EngineError, Result};

/// Serialized form of the PIN store: identity name to lowercase hex digest.
pub type PinSnapshot = BTreeMap<String, String>;

/// Salted-digest PIN records for enrolled identities.
///
/// A PIN is 4 to 6 decimal digits. Only `hex(SHA3-256(pin || salt))` is
/// kept, never the PIN itself; one salt covers the whole store and is
/// injected from configuration. Every mutation flushes before returning,
/// and a failed flush keeps the in-memory change so
/// [`PinAuthenticator::flush`] can retry.
pub struct PinAuthenticator {
    salt: String,
    records: BTreeMap<String, String>,
    store: Arc<dyn StateStore<PinSnapshot>>,
}

impl PinAuthenticator {
    /// Loads the PIN records from the backing store. An absent snapshot is
    /// an empty record set.
    pub fn load(
        store: Arc<dyn StateStore<PinSnapshot>>,
        salt: impl Into<String>,
    ) -> Result<Self> {
        let records = store.load()?.unwrap_or_default();
        info!("Loaded {} PIN records", records.len());
        Ok(Self {
            salt: salt.into(),
            records,
            store,
        })
    }

    /// Stores the digest of a new PIN, replacing any previous one.
    pub fn set_pin(&mut self, name: &str, pin: &str) -> Result<()> {
        validate_pin_format(pin)?;
        let digest = self.digest(pin);
        self.records.insert(name.to_string(), digest);
        info!("Stored PIN digest for identity: {}", name);
        self.flush()
    }

    /// Whether `pin` matches the stored digest. Unknown identities verify
    /// false rather than erroring; the candidate is hashed without format
    /// checks so arbitrary input costs the same as a well-formed PIN, and
    /// the digest comparison is constant time.
    pub fn verify_pin(&self, name: &str, pin: &str) -> bool {
        let stored = match self.records.get(name) {
            Some(digest) => digest,
            None => return false,
        };
        let candidate = self.digest(pin);
        constant_time::verify_slices_are_equal(candidate.as_bytes(), stored.as_bytes())
            .is_ok()
    }

    /// Re-keys an identity after proving knowledge of the current PIN.
    pub fn change_pin(&mut self, name: &str, old_pin: &str, new_pin: &str) -> Result<()> {
        if !self.verify_pin(name, old_pin) {
            return Err(EngineError::Auth(format!(
                "current PIN for '{}' did not verify",
                name
            )));
        }
        self.set_pin(name, new_pin)
    }

    /// Drops an identity's record. Returns whether one existed.
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        if self.records.remove(name).is_none() {
            return Ok(false);
        }
        info!("Removed PIN record for identity: {}", name);
        self.flush()?;
        Ok(true)
    }

    pub fn has_pin(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rewrites the backing store from the in-memory records. Mutations
    /// call this automatically; callers retry it after a persistence error.
    pub fn flush(&self) -> Result<()> {
        self.store.save(&self.records)?;
        Ok(())
    }

    fn digest(&self, pin: &str) -> String {
        let mut hasher = Sha3_256::new();
        hasher.update(pin.as_bytes());
        hasher.update(self.salt.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Checks the PIN format used at enrollment: 4 to 6 decimal digits.
pub fn validate_pin_format(pin: &str) -> Result<()> {
    if !(4..=6).contains(&pin.len()) || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(EngineError::InvalidInput(
            "PIN must be 4 to 6 decimal digits".into(),
        ));
    }
    Ok(())
}
