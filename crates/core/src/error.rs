//! Errors raised while interpreting backend values.

use thiserror::Error;

/// Failures detectable from a value alone. Transport and storage failures
/// live in the client crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Unknown label or malformed field, e.g. a priority other than
    /// `Low`/`Medium`/`High` when parsed strictly.
    #[error("invalid value: {0}")]
    Validation(String),

    /// Record id that is not an integer.
    #[error("invalid id: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
