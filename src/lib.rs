pub mod capture;
pub mod core;
pub mod storage;
pub mod utils;

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::info;

use crate::{
    core::gallery::{EnrollmentPolicy, Gallery, GallerySnapshot},
    core::matcher,
    core::pin::{PinAuthenticator, PinSnapshot},
    core::services::{AuthorizationService, EnrollmentService},
    core::transaction::{Ledger, LedgerSnapshot},
    storage::{JsonFileStore, StateStore},
    utils::{config::Config, error::Result},
};

/// The assembled engine: one gallery, one PIN store, one ledger, and the
/// two services that share them.
pub struct Engine {
    config: Config,
    enrollment: EnrollmentService,
    authorization: AuthorizationService,
}

impl Engine {
    /// Builds an engine on the file-backed stores named in `config`.
    pub fn new(config: Config) -> Result<Self> {
        let gallery_store: Arc<dyn StateStore<GallerySnapshot>> =
            Arc::new(JsonFileStore::new(config.storage.gallery_path()));
        let pin_store: Arc<dyn StateStore<PinSnapshot>> =
            Arc::new(JsonFileStore::new(config.storage.pin_path()));
        let ledger_store: Arc<dyn StateStore<LedgerSnapshot>> =
            Arc::new(JsonFileStore::new(config.storage.ledger_path()));
        Self::with_stores(config, gallery_store, pin_store, ledger_store)
    }

    /// Builds an engine on caller-supplied stores. Tests and embedded
    /// callers use this to run without touching durable files.
    pub fn with_stores(
        config: Config,
        gallery_store: Arc<dyn StateStore<GallerySnapshot>>,
        pin_store: Arc<dyn StateStore<PinSnapshot>>,
        ledger_store: Arc<dyn StateStore<LedgerSnapshot>>,
    ) -> Result<Self> {
        config.validate()?;

        info!("Loading stores...");
        let policy = if config.matcher.max_samples_per_identity <= 1 {
            EnrollmentPolicy::Replace
        } else {
            EnrollmentPolicy::Append {
                cap: config.matcher.max_samples_per_identity,
            }
        };
        let gallery = Arc::new(RwLock::new(Gallery::load(gallery_store, policy)?));
        let pins = Arc::new(RwLock::new(PinAuthenticator::load(
            pin_store,
            config.pin.salt.clone(),
        )?));
        let ledger = Arc::new(Mutex::new(Ledger::load(ledger_store)?));

        info!("Initializing services...");
        let enrollment = EnrollmentService::new(gallery.clone(), pins.clone());
        let authorization = AuthorizationService::new(
            matcher::build(config.matcher.strategy),
            config.matcher.threshold,
            gallery,
            pins,
            ledger,
        );

        info!(
            "Engine ready with {:?} matching at threshold {}",
            config.matcher.strategy, config.matcher.threshold
        );
        Ok(Self {
            config,
            enrollment,
            authorization,
        })
    }

    pub fn enrollment(&self) -> &EnrollmentService {
        &self.enrollment
    }

    pub fn authorization(&self) -> &AuthorizationService {
        &self.authorization
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

// The services hold trait objects, so Debug is spelled out by hand.
impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
