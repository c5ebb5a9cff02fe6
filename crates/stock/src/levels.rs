//! Stock level counters and adjustment kinds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Available and reserved quantities for a single ingredient.
///
/// Both counters are independently non-negative. Reserved stock is still
/// owned by the kitchen but earmarked for confirmed orders; it is not
/// part of what can be promised to new orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StockLevels {
    /// Quantity on hand and not held for any order.
    pub available: Decimal,
    /// Quantity held for confirmed orders.
    pub reserved: Decimal,
}

impl StockLevels {
    /// Creates levels with the given available quantity and nothing reserved.
    pub fn with_available(available: Decimal) -> Self {
        Self {
            available,
            reserved: Decimal::ZERO,
        }
    }
}

impl std::fmt::Display for StockLevels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "available={}, reserved={}", self.available, self.reserved)
    }
}

/// The kind of a stock adjustment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// New stock purchased; adds to available.
    Purchase,
    /// Stock consumed in the kitchen; subtracts from available.
    Consumption,
    /// Stock spoiled or discarded; subtracts from available.
    Wastage,
    /// Manual count correction; sets available to an exact value.
    Manual,
}

impl AdjustmentKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentKind::Purchase => "purchase",
            AdjustmentKind::Consumption => "consumption",
            AdjustmentKind::Wastage => "wastage",
            AdjustmentKind::Manual => "manual",
        }
    }
}

impl std::fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
