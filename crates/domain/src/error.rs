//! Domain error types.

use thiserror::Error;

use crate::order::OrderStatus;

/// Errors produced by domain rules.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The requested status change is not in the transition table.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// A business validation rule was violated.
    #[error("{0}")]
    Validation(String),
}

impl DomainError {
    /// Creates a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}
