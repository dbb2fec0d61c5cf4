// src/utils/error.rs
use thiserror::Error;

/// Crate-wide error type.
///
/// A biometric non-match and a failed PIN verdict are ordinary return values,
/// never errors; only malformed input, out-of-sequence calls, failed durable
/// flushes and bad configuration surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed amount, PIN format or feature vector. Raised before any
    /// state is mutated.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// State-machine operation called out of sequence. A caller bug, not a
    /// user-facing condition.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A durable flush failed after the in-memory mutation was applied. The
    /// mutation is logically committed; callers may retry the flush.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// PIN mismatch while changing an existing PIN.
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
