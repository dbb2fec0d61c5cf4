// src/core/services/enrollment.rs
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::core::gallery::{FeatureSample, Gallery};
use crate::core::pin::{validate_pin_format, PinAuthenticator};
use crate::utils::error::Result;

/// Registration and credential maintenance for identities.
///
/// Shares the gallery and PIN stores with the authorization side; all
/// access goes through the stores' own locks.
pub struct EnrollmentService {
    gallery: Arc<RwLock<Gallery>>,
    pins: Arc<RwLock<PinAuthenticator>>,
}

impl EnrollmentService {
    pub fn new(gallery: Arc<RwLock<Gallery>>, pins: Arc<RwLock<PinAuthenticator>>) -> Self {
        Self { gallery, pins }
    }

    /// Registers a user with one face sample and a PIN in a single call.
    ///
    /// The PIN format is checked before the gallery is touched, so a bad
    /// PIN cannot leave a face enrolled without a credential.
    pub fn register(&self, name: &str, sample: FeatureSample, pin: &str) -> Result<()> {
        validate_pin_format(pin)?;
        self.gallery.write().enroll(name, sample)?;
        self.pins.write().set_pin(name, pin)?;
        info!("Registered user: {}", name);
        Ok(())
    }

    /// Adds one more reference sample for an already-known identity, or
    /// starts a new identity with no PIN yet.
    pub fn enroll_sample(&self, name: &str, sample: FeatureSample) -> Result<()> {
        self.gallery.write().enroll(name, sample)
    }

    pub fn set_pin(&self, name: &str, pin: &str) -> Result<()> {
        self.pins.write().set_pin(name, pin)
    }

    pub fn change_pin(&self, name: &str, old_pin: &str, new_pin: &str) -> Result<()> {
        self.pins.write().change_pin(name, old_pin, new_pin)
    }

    /// Removes a user's face samples and PIN record. Returns whether
    /// either existed.
    pub fn remove_user(&self, name: &str) -> Result<bool> {
        let had_face = self.gallery.write().remove(name)?;
        let had_pin = self.pins.write().remove(name)?;
        if had_face || had_pin {
            info!("Removed user: {}", name);
        }
        Ok(had_face || had_pin)
    }

    /// Enrolled names in enrollment order.
    pub fn registered_users(&self) -> Vec<String> {
        self.gallery.read().list_identities()
    }

    /// Retries the gallery and PIN flushes after a persistence error.
    pub fn flush(&self) -> Result<()> {
        self.gallery.read().flush()?;
        self.pins.read().flush()
    }

    pub fn has_pin(&self, name: &str) -> bool {
        self.pins.read().has_pin(name)
    }
}
