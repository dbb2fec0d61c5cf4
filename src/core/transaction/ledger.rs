// src/core/transaction/ledger.rs
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::types::{TransactionRecord, TransactionStatus};
use crate::storage::StateStore;
use crate::utils::error::Result;

/// Serialized form of the ledger, as written to the backing store.
pub type LedgerSnapshot = Vec<TransactionRecord>;

/// Aggregate view over the whole ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Sum of amounts over successful records only, rounded to cents.
    pub total_amount: Decimal,
}

/// Append-only record of completed transactions, oldest first.
///
/// Records are immutable once appended. Every append flushes to the
/// backing store; a failed flush keeps the in-memory record, which is then
/// logically committed but of uncertain durability until
/// [`Ledger::flush`] succeeds.
pub struct Ledger {
    records: Vec<TransactionRecord>,
    store: Arc<dyn StateStore<LedgerSnapshot>>,
}

impl Ledger {
    /// Loads the ledger from its backing store. An absent snapshot is an
    /// empty ledger.
    pub fn load(store: Arc<dyn StateStore<LedgerSnapshot>>) -> Result<Self> {
        let records = store.load()?.unwrap_or_default();
        info!("Loaded ledger with {} transaction records", records.len());
        Ok(Self { records, store })
    }

    /// Appends one immutable record and flushes.
    pub fn append(&mut self, record: TransactionRecord) -> Result<()> {
        info!(
            "Recording transaction {} with status {:?}",
            record.transaction_id, record.status
        );
        self.records.push(record);
        self.flush()
    }

    /// The last `limit` records in append order, oldest first.
    pub fn recent(&self, limit: usize) -> &[TransactionRecord] {
        let start = self.records.len().saturating_sub(limit);
        &self.records[start..]
    }

    pub fn stats(&self) -> LedgerStats {
        let successful = self
            .records
            .iter()
            .filter(|record| record.status == TransactionStatus::Success)
            .count();
        let total_amount: Decimal = self
            .records
            .iter()
            .filter(|record| record.status == TransactionStatus::Success)
            .map(|record| record.amount)
            .sum();

        LedgerStats {
            total: self.records.len(),
            successful,
            failed: self.records.len() - successful,
            total_amount: total_amount.round_dp(2),
        }
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rewrites the backing store from the in-memory records. Appends call
    /// this automatically; callers retry it after a persistence error.
    pub fn flush(&self) -> Result<()> {
        self.store.save(&self.records)?;
        Ok(())
    }
}
