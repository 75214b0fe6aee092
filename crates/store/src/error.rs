//! Store error model.

use thiserror::Error;

/// Result type used across the store domain.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error.
///
/// Every kind is a deterministic, operation-aborting business failure with a
/// human-readable reason. Validation precedes all mutation, so a raised error
/// guarantees the pre-call state is unchanged. Retry, if any, is host policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Caller lacks the required role for the operation.
    #[error("authorization failed: {0}")]
    Authorization(String),

    /// Attempted re-registration of an existing product id.
    #[error("product duplication: {0}")]
    ProductDuplication(String),

    /// Invalid quantity supplied to product creation.
    #[error("product quantity: {0}")]
    ProductQuantity(String),

    /// Reference to a product that was never added — or, for purchases, one
    /// with nothing left to sell (the two are indistinguishable to buyers).
    #[error("product missing: {0}")]
    ProductMissing(String),

    /// Violation of the one-active-order-per-customer-per-product rule.
    #[error("order rejected: {0}")]
    Order(String),

    /// Return attempted with no matching active order, or after the
    /// eligibility window elapsed.
    #[error("return rejected: {0}")]
    Return(String),
}

impl StoreError {
    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn product_duplication(msg: impl Into<String>) -> Self {
        Self::ProductDuplication(msg.into())
    }

    pub fn product_quantity(msg: impl Into<String>) -> Self {
        Self::ProductQuantity(msg.into())
    }

    pub fn product_missing(msg: impl Into<String>) -> Self {
        Self::ProductMissing(msg.into())
    }

    pub fn order(msg: impl Into<String>) -> Self {
        Self::Order(msg.into())
    }

    pub fn return_rejected(msg: impl Into<String>) -> Self {
        Self::Return(msg.into())
    }
}
