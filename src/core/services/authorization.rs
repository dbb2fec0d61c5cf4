// src/core/services/authorization.rs
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::core::gallery::{FeatureSample, Gallery};
use crate::core::matcher::{FaceMatcher, MatchResult};
use crate::core::pin::PinAuthenticator;
use crate::core::transaction::{
    AuthState, AuthorizationFlow, Ledger, LedgerStats, TransactionId, TransactionRecord,
};
use crate::utils::error::{EngineError, Result};

/// Drives one point-of-sale lane from opened amount to ledger record.
///
/// The flow lock serializes the lane; probe and PIN deliveries may arrive
/// from whatever thread the capture side runs on. Lock order: flow before
/// ledger or pins, and the gallery read is never taken while the flow lock
/// is held.
pub struct AuthorizationService {
    matcher: Box<dyn FaceMatcher>,
    threshold: f32,
    gallery: Arc<RwLock<Gallery>>,
    pins: Arc<RwLock<PinAuthenticator>>,
    ledger: Arc<Mutex<Ledger>>,
    flow: Mutex<AuthorizationFlow>,
}

impl AuthorizationService {
    pub fn new(
        matcher: Box<dyn FaceMatcher>,
        threshold: f32,
        gallery: Arc<RwLock<Gallery>>,
        pins: Arc<RwLock<PinAuthenticator>>,
        ledger: Arc<Mutex<Ledger>>,
    ) -> Self {
        Self {
            matcher,
            threshold,
            gallery,
            pins,
            ledger,
            flow: Mutex::new(AuthorizationFlow::new()),
        }
    }

    /// Opens a transaction for the given decimal amount.
    pub fn begin_transaction(&self, amount: &str) -> Result<TransactionId> {
        self.flow.lock().open(amount)
    }

    /// Matches a captured probe against the gallery and, on a match,
    /// records the identified user on the active transaction.
    ///
    /// Requires an opened transaction; a no-match leaves the flow at
    /// `AmountSet` so the operator can retry the capture, cancel, or
    /// complete the attempt as failed.
    pub fn submit_probe(&self, probe: &FeatureSample) -> Result<MatchResult> {
        {
            let flow = self.flow.lock();
            if flow.state() != AuthState::AmountSet {
                return Err(EngineError::InvalidState(format!(
                    "cannot identify a user from state {:?}",
                    flow.state()
                )));
            }
        }

        let result = {
            let gallery = self.gallery.read();
            self.matcher.match_probe(probe, &gallery, self.threshold)?
        };

        match &result {
            MatchResult::Matched {
                identity,
                confidence,
            } => {
                self.flow.lock().set_user(identity)?;
                info!("Identified {} with confidence {:.4}", identity, confidence);
            }
            MatchResult::NoMatch => {
                warn!("Probe matched no enrolled identity");
            }
        }
        Ok(result)
    }

    /// Marks the lane as waiting for PIN input.
    pub fn begin_pin_entry(&self) -> Result<()> {
        self.flow.lock().begin_pin_entry()
    }

    /// Verifies the PIN for the identified user and records the outcome on
    /// the flow. Returns whether the PIN verified.
    pub fn submit_pin(&self, pin: &str) -> Result<bool> {
        let mut flow = self.flow.lock();
        if !matches!(
            flow.state(),
            AuthState::UserIdentified | AuthState::PinPending
        ) {
            return Err(EngineError::InvalidState(format!(
                "cannot verify a PIN from state {:?}",
                flow.state()
            )));
        }
        let user = flow
            .identified_user()
            .map(str::to_string)
            .ok_or_else(|| {
                EngineError::InvalidState("no identified user on the active transaction".into())
            })?;

        let verified = self.pins.read().verify_pin(&user, pin);
        flow.record_pin_result(verified)?;
        Ok(verified)
    }

    /// Completes the active transaction, appending its ledger record. A
    /// repeat call returns `None` without writing anything.
    pub fn complete(&self) -> Result<Option<TransactionRecord>> {
        let mut flow = self.flow.lock();
        let mut ledger = self.ledger.lock();
        flow.complete(&mut ledger)
    }

    /// Abandons the active transaction with no ledger record.
    pub fn cancel(&self) {
        self.flow.lock().reset();
    }

    pub fn current_state(&self) -> AuthState {
        self.flow.lock().state()
    }

    pub fn transaction_summary(&self) -> String {
        self.flow.lock().summary()
    }

    /// The last `limit` ledger records, oldest first.
    pub fn recent_transactions(&self, limit: usize) -> Vec<TransactionRecord> {
        self.ledger.lock().recent(limit).to_vec()
    }

    pub fn stats(&self) -> LedgerStats {
        self.ledger.lock().stats()
    }

    /// Retries the ledger flush after a persistence error.
    pub fn flush_ledger(&self) -> Result<()> {
        self.ledger.lock().flush()
    }
}
