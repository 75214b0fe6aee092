//! Token error model.

use thiserror::Error;

/// Result type used across the token domain.
pub type TokenResult<T> = Result<T, TokenError>;

/// Token-level error. Deterministic, operation-aborting, no partial effects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Caller lacks the required role for the operation.
    #[error("authorization failed: {0}")]
    Authorization(String),

    /// Holder balance too small for the requested transfer/burn.
    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),

    /// Checked supply/balance arithmetic would overflow.
    #[error("arithmetic overflow: {0}")]
    Overflow(String),
}

impl TokenError {
    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn insufficient_balance(msg: impl Into<String>) -> Self {
        Self::InsufficientBalance(msg.into())
    }

    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::Overflow(msg.into())
    }
}
