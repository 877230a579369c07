//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent caller-input problems detected by the engine.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid root: expected a mapping, found {kind}")]
    InvalidRoot { kind: &'static str },

    #[error("delimiter must not be empty")]
    EmptyDelimiter,

    #[error("unsupported mapping key: {0}")]
    UnsupportedKey(String),

    #[error("invalid {kind}: {value}")]
    InvalidOption { kind: &'static str, value: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
