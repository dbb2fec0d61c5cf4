// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use facepay::core::gallery::{FeatureSample, GallerySnapshot};
use facepay::core::pin::PinSnapshot;
use facepay::core::transaction::LedgerSnapshot;
use facepay::storage::{MemoryStore, StateStore, StorageError, StorageResult};
use facepay::utils::config::Config;
use facepay::Engine;

/// An engine wired to in-memory stores, with the store handles kept so
/// tests can inspect what was flushed.
pub struct TestContext {
    pub engine: Engine,
    pub gallery_store: Arc<MemoryStore<GallerySnapshot>>,
    pub pin_store: Arc<MemoryStore<PinSnapshot>>,
    pub ledger_store: Arc<MemoryStore<LedgerSnapshot>>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let gallery_store = Arc::new(MemoryStore::new());
        let pin_store = Arc::new(MemoryStore::new());
        let ledger_store = Arc::new(MemoryStore::new());
        let engine = Engine::with_stores(
            config,
            gallery_store.clone(),
            pin_store.clone(),
            ledger_store.clone(),
        )
        .expect("Failed to build engine");

        Self {
            engine,
            gallery_store,
            pin_store,
            ledger_store,
        }
    }
}

pub fn sample(values: &[f32]) -> FeatureSample {
    FeatureSample::new(values.to_vec()).expect("Failed to build sample")
}

/// Registers the standard demo users: alice near the origin, bob away
/// from it, so probes can be aimed at either.
pub fn register_demo_users(ctx: &TestContext) {
    ctx.engine
        .enrollment()
        .register("alice", sample(&[0.1, 0.2]), "1234")
        .expect("Failed to register alice");
    ctx.engine
        .enrollment()
        .register("bob", sample(&[0.9, 0.8]), "5678")
        .expect("Failed to register bob");
}

/// In-memory store that can be told to refuse writes, for exercising the
/// flush-failure path end to end.
pub struct FlakyStore<T> {
    inner: MemoryStore<T>,
    failing: AtomicBool,
}

impl<T> FlakyStore<T> {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl<T: Clone + Send> StateStore<T> for FlakyStore<T> {
    fn load(&self) -> StorageResult<Option<T>> {
        self.inner.load()
    }

    fn save(&self, state: &T) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "write refused",
            )));
        }
        self.inner.save(state)
    }
}
