// src/core/transaction/types.rs
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Ledger-unique transaction identifier.
///
/// Time-derived so operators can eyeball when a transaction happened, with
/// a process-wide sequence suffix so identifiers minted within the same
/// second stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Mints the next identifier, e.g. `TXN20260824143015-42`.
    pub fn generate() -> Self {
        let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!(
            "TXN{}-{}",
            Utc::now().format("%Y%m%d%H%M%S"),
            sequence
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Final disposition of a completed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Failed,
}

/// One immutable ledger entry.
///
/// `timestamp` is when the transaction was opened. `user_name` is `None`
/// when the flow never identified anyone, which is itself a meaningful
/// audit entry. Biometric and PIN failures are not distinguished in
/// `status`; `pin_verified` narrows it down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: TransactionId,
    pub amount: Decimal,
    pub user_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    pub pin_verified: bool,
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.status {
            TransactionStatus::Success => "success",
            TransactionStatus::Failed => "failed",
        };
        write!(
            f,
            "{} | {} | {} | {}",
            self.transaction_id,
            self.amount,
            self.user_name.as_deref().unwrap_or("<unidentified>"),
            status
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn sequential_ids_never_collide() {
        let ids: HashSet<String> = (0..100)
            .map(|_| TransactionId::generate().as_str().to_string())
            .collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn ids_carry_the_txn_prefix_and_a_sequence() {
        let id = TransactionId::generate();
        assert!(id.as_str().starts_with("TXN"));
        assert!(id.as_str().contains('-'));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Success).unwrap(),
            "\"success\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Failed).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn record_roundtrips_through_json() {
        let record = TransactionRecord {
            transaction_id: TransactionId::generate(),
            amount: dec!(12.50),
            user_name: Some("alice".into()),
            timestamp: Utc::now(),
            status: TransactionStatus::Success,
            pin_verified: true,
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: TransactionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn display_names_unidentified_attempts() {
        let record = TransactionRecord {
            transaction_id: TransactionId::generate(),
            amount: dec!(5),
            user_name: None,
            timestamp: Utc::now(),
            status: TransactionStatus::Failed,
            pin_verified: false,
        };

        let line = record.to_string();
        assert!(line.contains("<unidentified>"));
        assert!(line.contains("failed"));
    }
}
