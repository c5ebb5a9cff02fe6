//! Store error types.

use common::OrderId;
use domain::Version;
use thiserror::Error;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A version-checked write lost to a concurrent update.
    /// The caller must re-read the order and retry.
    #[error("Version conflict for order {order_id}: expected version {expected}, found {actual}")]
    VersionConflict {
        order_id: OrderId,
        expected: Version,
        actual: Version,
    },

    /// The order was not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The pagination cursor could not be decoded.
    #[error("Invalid pagination cursor: {0}")]
    InvalidCursor(String),

    /// The store backend could not be reached.
    #[error("Order store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
