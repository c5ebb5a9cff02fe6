//! Orchestration error types.

use common::{IngredientId, OrderId};
use domain::{DomainError, OrderStatus};
use rust_decimal::Decimal;
use stock::StockError;
use store::StoreError;
use thiserror::Error;

/// Caller-visible errors for order orchestration operations.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// A business validation rule was violated.
    #[error("{0}")]
    Validation(String),

    /// The order does not exist.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The requested status change is not in the transition table.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// A concurrent update won the version check; re-read and retry.
    #[error("Order {0} was updated concurrently; please refresh and retry")]
    Conflict(OrderId),

    /// Available stock does not cover a reservation.
    #[error(
        "Insufficient stock for ingredient {ingredient_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        ingredient_id: IngredientId,
        requested: Decimal,
        available: Decimal,
    },

    /// Reserved stock does not cover a release.
    #[error(
        "Insufficient reserved stock for ingredient {ingredient_id}: requested {requested}, reserved {reserved}"
    )]
    InsufficientReservedStock {
        ingredient_id: IngredientId,
        requested: Decimal,
        reserved: Decimal,
    },

    /// The order's quotation is missing or past its validity window.
    #[error("Quotation for order {0} has expired")]
    ExpiredQuotation(OrderId),

    /// The billing collaborator could not produce the invoice.
    #[error("Failed to generate invoice: {0}")]
    InvoiceFailed(String),

    /// The order is completed and admits no further changes.
    #[error("Order {0} is completed and cannot be changed")]
    Immutable(OrderId),

    /// An infrastructure failure with no business meaning.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for OrchestrationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::VersionConflict { order_id, .. } => OrchestrationError::Conflict(order_id),
            StoreError::OrderNotFound(order_id) => OrchestrationError::NotFound(order_id),
            StoreError::InvalidCursor(msg) => {
                OrchestrationError::Validation(format!("Invalid pagination cursor: {msg}"))
            }
            StoreError::Unavailable(msg) => OrchestrationError::Internal(msg),
        }
    }
}

impl From<StockError> for OrchestrationError {
    fn from(e: StockError) -> Self {
        match e {
            StockError::InsufficientStock {
                ingredient_id,
                requested,
                available,
            } => OrchestrationError::InsufficientStock {
                ingredient_id,
                requested,
                available,
            },
            StockError::InsufficientReservedStock {
                ingredient_id,
                requested,
                reserved,
            } => OrchestrationError::InsufficientReservedStock {
                ingredient_id,
                requested,
                reserved,
            },
            StockError::UnknownIngredient(id) => {
                OrchestrationError::Internal(format!("no stock record for ingredient {id}"))
            }
            StockError::InvalidQuantity {
                ingredient_id,
                quantity,
            } => OrchestrationError::Internal(format!(
                "invalid stock quantity {quantity} for ingredient {ingredient_id}"
            )),
            StockError::Unavailable(msg) => OrchestrationError::Internal(msg),
        }
    }
}

impl From<DomainError> for OrchestrationError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidTransition { from, to } => {
                OrchestrationError::InvalidTransition { from, to }
            }
            DomainError::Validation(msg) => OrchestrationError::Validation(msg),
        }
    }
}

/// Result type for orchestration operations.
pub type Result<T> = std::result::Result<T, OrchestrationError>;
