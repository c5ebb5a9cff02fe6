//! Cost predictor trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::MenuItemId;
use domain::Money;

use super::ServiceError;

/// Per-item unit cost prediction, typically an ML pricing model.
#[async_trait]
pub trait CostPredictor: Send + Sync {
    /// Predicts the unit price for a menu item given the order context.
    async fn predict(
        &self,
        menu_item_id: MenuItemId,
        quantity: u32,
        event_date: NaiveDate,
    ) -> Result<Money, ServiceError>;
}

#[derive(Debug, Default)]
struct PredictorState {
    prices: HashMap<MenuItemId, Money>,
    /// Fail this many upcoming calls before answering again.
    fail_next: u32,
    fail_always: bool,
    call_count: u32,
}

/// In-memory cost predictor for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCostPredictor {
    state: Arc<RwLock<PredictorState>>,
    delay: Arc<RwLock<Option<Duration>>>,
}

impl InMemoryCostPredictor {
    /// Creates a new in-memory predictor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the predicted unit price for a menu item.
    pub fn set_price(&self, menu_item_id: MenuItemId, price: Money) {
        self.state.write().unwrap().prices.insert(menu_item_id, price);
    }

    /// Fails the next `n` calls, then recovers.
    pub fn fail_next(&self, n: u32) {
        self.state.write().unwrap().fail_next = n;
    }

    /// Makes every call fail until reset.
    pub fn set_fail_always(&self, fail: bool) {
        self.state.write().unwrap().fail_always = fail;
    }

    /// Delays every call, for exercising per-attempt timeouts.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().unwrap() = delay;
    }

    /// Total number of prediction calls received.
    pub fn call_count(&self) -> u32 {
        self.state.read().unwrap().call_count
    }
}

#[async_trait]
impl CostPredictor for InMemoryCostPredictor {
    async fn predict(
        &self,
        menu_item_id: MenuItemId,
        _quantity: u32,
        _event_date: NaiveDate,
    ) -> Result<Money, ServiceError> {
        let delay = *self.delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.write().unwrap();
        state.call_count += 1;

        if state.fail_always {
            return Err(ServiceError::Unavailable("prediction model down".to_string()));
        }
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(ServiceError::Unavailable(
                "prediction model briefly down".to_string(),
            ));
        }

        state
            .prices
            .get(&menu_item_id)
            .copied()
            .ok_or_else(|| ServiceError::NotFound(format!("menu item {menu_item_id}")))
    }
}
