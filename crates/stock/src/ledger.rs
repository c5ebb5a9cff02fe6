//! Stock ledger trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::IngredientId;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::error::{Result, StockError};
use crate::levels::{AdjustmentKind, StockLevels};

/// Per-ingredient stock counters with atomic conditional updates.
///
/// Implementations must apply each operation atomically for the targeted
/// ingredient: the condition check and the counter update happen as one
/// step, so two concurrent reservations can never both succeed on stock
/// that only covers one of them.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Returns the current levels for an ingredient.
    async fn levels(&self, ingredient_id: IngredientId) -> Result<StockLevels>;

    /// Moves `quantity` from available to reserved.
    ///
    /// Fails with [`StockError::InsufficientStock`] if available stock
    /// does not cover the quantity; the levels are left unchanged.
    async fn reserve(&self, ingredient_id: IngredientId, quantity: Decimal) -> Result<StockLevels>;

    /// Moves `quantity` from reserved back to available.
    ///
    /// Fails with [`StockError::InsufficientReservedStock`] if the
    /// reserved counter does not cover the quantity.
    async fn release(&self, ingredient_id: IngredientId, quantity: Decimal) -> Result<StockLevels>;

    /// Records a stock transaction against the available counter.
    ///
    /// Purchases add, consumption and wastage subtract (failing when
    /// available stock is short), and manual adjustments set the counter
    /// to an exact value. The reserved counter is never touched.
    async fn adjust(
        &self,
        ingredient_id: IngredientId,
        quantity: Decimal,
        kind: AdjustmentKind,
    ) -> Result<StockLevels>;
}

#[derive(Debug, Default)]
struct LedgerState {
    levels: HashMap<IngredientId, StockLevels>,
    fail_on_reserve: bool,
    fail_on_release: bool,
}

/// In-memory stock ledger.
///
/// All arithmetic happens under a single write lock, which makes every
/// operation atomic per ingredient. Failure toggles let tests simulate an
/// unreachable stock service.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStockLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryStockLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an ingredient with zero stock.
    pub async fn add_ingredient(&self, ingredient_id: IngredientId) {
        self.state
            .write()
            .await
            .levels
            .entry(ingredient_id)
            .or_default();
    }

    /// Registers an ingredient with the given available quantity.
    pub async fn seed(&self, ingredient_id: IngredientId, available: Decimal) {
        self.state
            .write()
            .await
            .levels
            .insert(ingredient_id, StockLevels::with_available(available));
    }

    /// Makes subsequent reserve calls fail as if the service were down.
    pub async fn set_fail_on_reserve(&self, fail: bool) {
        self.state.write().await.fail_on_reserve = fail;
    }

    /// Makes subsequent release calls fail as if the service were down.
    pub async fn set_fail_on_release(&self, fail: bool) {
        self.state.write().await.fail_on_release = fail;
    }

    /// Sum of reserved quantities across all ingredients.
    pub async fn total_reserved(&self) -> Decimal {
        self.state
            .read()
            .await
            .levels
            .values()
            .map(|l| l.reserved)
            .sum()
    }
}

fn require_positive(ingredient_id: IngredientId, quantity: Decimal) -> Result<()> {
    if quantity <= Decimal::ZERO {
        return Err(StockError::InvalidQuantity {
            ingredient_id,
            quantity,
        });
    }
    Ok(())
}

#[async_trait]
impl StockLedger for InMemoryStockLedger {
    async fn levels(&self, ingredient_id: IngredientId) -> Result<StockLevels> {
        self.state
            .read()
            .await
            .levels
            .get(&ingredient_id)
            .copied()
            .ok_or(StockError::UnknownIngredient(ingredient_id))
    }

    async fn reserve(&self, ingredient_id: IngredientId, quantity: Decimal) -> Result<StockLevels> {
        require_positive(ingredient_id, quantity)?;

        let mut state = self.state.write().await;
        if state.fail_on_reserve {
            return Err(StockError::Unavailable("reserve failed".to_string()));
        }

        let levels = state
            .levels
            .get_mut(&ingredient_id)
            .ok_or(StockError::UnknownIngredient(ingredient_id))?;

        if levels.available < quantity {
            return Err(StockError::InsufficientStock {
                ingredient_id,
                requested: quantity,
                available: levels.available,
            });
        }

        levels.available -= quantity;
        levels.reserved += quantity;
        tracing::debug!(%ingredient_id, %quantity, %levels, "stock reserved");
        Ok(*levels)
    }

    async fn release(&self, ingredient_id: IngredientId, quantity: Decimal) -> Result<StockLevels> {
        require_positive(ingredient_id, quantity)?;

        let mut state = self.state.write().await;
        if state.fail_on_release {
            return Err(StockError::Unavailable("release failed".to_string()));
        }

        let levels = state
            .levels
            .get_mut(&ingredient_id)
            .ok_or(StockError::UnknownIngredient(ingredient_id))?;

        if levels.reserved < quantity {
            return Err(StockError::InsufficientReservedStock {
                ingredient_id,
                requested: quantity,
                reserved: levels.reserved,
            });
        }

        levels.reserved -= quantity;
        levels.available += quantity;
        tracing::debug!(%ingredient_id, %quantity, %levels, "stock released");
        Ok(*levels)
    }

    async fn adjust(
        &self,
        ingredient_id: IngredientId,
        quantity: Decimal,
        kind: AdjustmentKind,
    ) -> Result<StockLevels> {
        let mut state = self.state.write().await;
        let levels = state
            .levels
            .get_mut(&ingredient_id)
            .ok_or(StockError::UnknownIngredient(ingredient_id))?;

        match kind {
            AdjustmentKind::Purchase => {
                require_positive(ingredient_id, quantity)?;
                levels.available += quantity;
            }
            AdjustmentKind::Consumption | AdjustmentKind::Wastage => {
                require_positive(ingredient_id, quantity)?;
                if levels.available < quantity {
                    return Err(StockError::InsufficientStock {
                        ingredient_id,
                        requested: quantity,
                        available: levels.available,
                    });
                }
                levels.available -= quantity;
            }
            AdjustmentKind::Manual => {
                if quantity < Decimal::ZERO {
                    return Err(StockError::InvalidQuantity {
                        ingredient_id,
                        quantity,
                    });
                }
                levels.available = quantity;
            }
        }

        tracing::debug!(%ingredient_id, %quantity, kind = %kind, %levels, "stock adjusted");
        Ok(*levels)
    }
}
