//! Stock reservation rows.

use chrono::{DateTime, Utc};
use common::{IngredientId, OrderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The exact quantity of one ingredient reserved for one order.
///
/// These rows are the ledger used for release on cancellation. Releasing
/// always reads them back rather than recomputing from recipes, which may
/// have changed since confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReservation {
    pub id: Uuid,
    pub order_id: OrderId,
    pub ingredient_id: IngredientId,
    pub reserved_quantity: Decimal,
    pub created_at: DateTime<Utc>,
}

impl StockReservation {
    /// Creates a reservation row stamped with the current time.
    pub fn new(order_id: OrderId, ingredient_id: IngredientId, reserved_quantity: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            ingredient_id,
            reserved_quantity,
            created_at: Utc::now(),
        }
    }
}
