// src/core/transaction/mod.rs
mod ledger;
mod state;
mod types;

pub use ledger::{Ledger, LedgerSnapshot, LedgerStats};
pub use state::{AuthState, AuthorizationFlow};
pub use types::{TransactionId, TransactionRecord, TransactionStatus};
