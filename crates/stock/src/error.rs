//! Stock ledger error types.

use common::IngredientId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur during stock ledger operations.
#[derive(Debug, Error)]
pub enum StockError {
    /// The ingredient has no stock record.
    #[error("No stock record for ingredient {0}")]
    UnknownIngredient(IngredientId),

    /// Not enough available stock to satisfy a reservation or consumption.
    #[error(
        "Insufficient stock for ingredient {ingredient_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        ingredient_id: IngredientId,
        requested: Decimal,
        available: Decimal,
    },

    /// Not enough reserved stock to satisfy a release.
    #[error(
        "Insufficient reserved stock for ingredient {ingredient_id}: requested {requested}, reserved {reserved}"
    )]
    InsufficientReservedStock {
        ingredient_id: IngredientId,
        requested: Decimal,
        reserved: Decimal,
    },

    /// The requested quantity is not usable for the operation.
    #[error("Invalid quantity {quantity} for ingredient {ingredient_id}")]
    InvalidQuantity {
        ingredient_id: IngredientId,
        quantity: Decimal,
    },

    /// The ledger backend could not be reached.
    #[error("Stock ledger unavailable: {0}")]
    Unavailable(String),
}

/// Result type for stock ledger operations.
pub type Result<T> = std::result::Result<T, StockError>;
