// src/core/transaction/state.rs
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::ledger::Ledger;
use super::types::{TransactionId, TransactionRecord, TransactionStatus};
use crate::utils::error::{EngineError, Result};

/// Where an authorization attempt currently stands.
///
/// `Completed` is terminal for the transaction; the next [`open`] starts a
/// fresh one from there.
///
/// [`open`]: AuthorizationFlow::open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Init,
    AmountSet,
    UserIdentified,
    PinPending,
    Authorized,
    Declined,
    Completed,
}

struct PendingTransaction {
    id: TransactionId,
    amount: Decimal,
    opened_at: DateTime<Utc>,
    user: Option<String>,
    pin_verified: bool,
}

/// The authorization state machine for one point-of-sale lane.
///
/// Exactly one transaction is in flight at a time. Status is derived, not
/// assigned: a transaction completes as success only when a user was
/// identified and the PIN verified, every other path collapses to failed.
pub struct AuthorizationFlow {
    state: AuthState,
    current: Option<PendingTransaction>,
}

impl AuthorizationFlow {
    pub fn new() -> Self {
        Self {
            state: AuthState::Init,
            current: None,
        }
    }

    /// Opens a transaction for a positive decimal amount.
    ///
    /// Valid from `Init` or `Completed`; an unparsable or non-positive
    /// amount is rejected with no state change.
    pub fn open(&mut self, amount: &str) -> Result<TransactionId> {
        if !matches!(self.state, AuthState::Init | AuthState::Completed) {
            return Err(EngineError::InvalidState(format!(
                "cannot open a transaction from state {:?}",
                self.state
            )));
        }
        let amount = parse_amount(amount)?;
        let id = TransactionId::generate();
        info!("Opened transaction {} for amount {}", id, amount);
        self.current = Some(PendingTransaction {
            id: id.clone(),
            amount,
            opened_at: Utc::now(),
            user: None,
            pin_verified: false,
        });
        self.state = AuthState::AmountSet;
        Ok(id)
    }

    /// Records the biometrically identified user. Valid only from
    /// `AmountSet`.
    pub fn set_user(&mut self, name: &str) -> Result<()> {
        if self.state != AuthState::AmountSet {
            return Err(EngineError::InvalidState(format!(
                "cannot set a user from state {:?}",
                self.state
            )));
        }
        let txn = self.current_mut()?;
        txn.user = Some(name.to_string());
        info!("Transaction user identified: {}", name);
        self.state = AuthState::UserIdentified;
        Ok(())
    }

    /// Marks the flow as waiting on PIN input. Valid only from
    /// `UserIdentified`.
    pub fn begin_pin_entry(&mut self) -> Result<()> {
        if self.state != AuthState::UserIdentified {
            return Err(EngineError::InvalidState(format!(
                "cannot begin PIN entry from state {:?}",
                self.state
            )));
        }
        self.state = AuthState::PinPending;
        Ok(())
    }

    /// Records the PIN verification outcome, deciding authorized versus
    /// declined. This is the only path to `Authorized`, and it is reachable
    /// only after `set_user`.
    pub fn record_pin_result(&mut self, success: bool) -> Result<()> {
        if !matches!(
            self.state,
            AuthState::UserIdentified | AuthState::PinPending
        ) {
            return Err(EngineError::InvalidState(format!(
                "cannot record a PIN result from state {:?}",
                self.state
            )));
        }
        let txn = self.current_mut()?;
        txn.pin_verified = success;
        info!(
            "PIN verification {}",
            if success { "succeeded" } else { "failed" }
        );
        self.state = if success {
            AuthState::Authorized
        } else {
            AuthState::Declined
        };
        Ok(())
    }

    /// Closes the active transaction and appends its audit record.
    ///
    /// Callable from any state: a flow abandoned before identification or
    /// PIN entry is still persisted, as a failed attempt. The transaction
    /// is consumed before the ledger write, so a persistence error cannot
    /// double-book the record when the caller retries. Returns `None` when
    /// no transaction was active, which makes a second call a no-op.
    pub fn complete(&mut self, ledger: &mut Ledger) -> Result<Option<TransactionRecord>> {
        let txn = match self.current.take() {
            Some(txn) => txn,
            None => return Ok(None),
        };

        let status = if txn.user.is_some() && txn.pin_verified {
            TransactionStatus::Success
        } else {
            TransactionStatus::Failed
        };
        let record = TransactionRecord {
            transaction_id: txn.id,
            amount: txn.amount,
            user_name: txn.user,
            timestamp: txn.opened_at,
            status,
            pin_verified: txn.pin_verified,
        };
        self.state = AuthState::Completed;

        if status == TransactionStatus::Failed {
            warn!("Transaction {} completed as failed", record.transaction_id);
        }
        ledger.append(record.clone())?;
        Ok(Some(record))
    }

    /// Abandons any in-flight transaction and returns to `Init`. Writes
    /// nothing to the ledger, unlike completing a declined transaction.
    pub fn reset(&mut self) {
        if let Some(txn) = self.current.take() {
            info!("Abandoned transaction {}", txn.id);
        }
        self.state = AuthState::Init;
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Identifier and amount of the in-flight transaction, if any.
    pub fn current(&self) -> Option<(&TransactionId, Decimal)> {
        self.current.as_ref().map(|txn| (&txn.id, txn.amount))
    }

    /// The user recorded by `set_user` on the in-flight transaction.
    pub fn identified_user(&self) -> Option<&str> {
        self.current.as_ref().and_then(|txn| txn.user.as_deref())
    }

    /// One-line operator view of the flow.
    pub fn summary(&self) -> String {
        match &self.current {
            Some(txn) => format!(
                "{} | amount {} | user {} | state {:?}",
                txn.id,
                txn.amount,
                txn.user.as_deref().unwrap_or("-"),
                self.state
            ),
            None => format!("no active transaction | state {:?}", self.state),
        }
    }

    fn current_mut(&mut self) -> Result<&mut PendingTransaction> {
        self.current
            .as_mut()
            .ok_or_else(|| EngineError::InvalidState("no active transaction".into()))
    }
}

impl Default for AuthorizationFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    let amount = Decimal::from_str(raw.trim()).map_err(|e| {
        EngineError::InvalidInput(format!("unparsable amount '{}': {}", raw, e))
    })?;
    if amount <= Decimal::ZERO {
        return Err(EngineError::InvalidInput(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(amount)
}
