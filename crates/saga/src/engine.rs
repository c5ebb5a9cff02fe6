//! Quotation engine: per-item cost prediction and quotation commit.

use chrono::NaiveDate;
use common::{ActorId, OrderId};
use domain::{CostBreakdown, Money, OrderItem, OrderStatus};
use stock::StockLedger;
use store::OrderStore;

use crate::error::{OrchestrationError, Result};
use crate::orchestrator::{OrderDetails, OrderOrchestrator};
use crate::retry::retry_with_policy;
use crate::services::{
    BillingService, CostPredictor, MenuCatalog, NotificationSink, ServiceError,
};

impl<S, L, B, P, N, M> OrderOrchestrator<S, L, B, P, N, M>
where
    S: OrderStore + 'static,
    L: StockLedger + 'static,
    B: BillingService + 'static,
    P: CostPredictor + 'static,
    N: NotificationSink + 'static,
    M: MenuCatalog + 'static,
{
    /// Prices a draft order and moves it to `quoted`.
    ///
    /// Each item's unit cost comes from the predictor, retried within
    /// the configured policy and falling back to the last unit price
    /// with the configured markup once attempts are exhausted. Corrected
    /// item prices, the quotation, and the status advance commit as one
    /// unit; a billing failure aborts the whole operation with no
    /// partial writes.
    #[tracing::instrument(skip(self))]
    pub async fn generate_quotation(
        &self,
        order_id: OrderId,
        actor: ActorId,
    ) -> Result<OrderDetails> {
        let order = self.load_order(order_id).await?;
        if order.status != OrderStatus::Draft {
            return Err(OrchestrationError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Quoted,
            });
        }

        let mut items = self.store.items_for_order(order_id).await?;
        if items.is_empty() {
            return Err(OrchestrationError::Validation(
                "Order has no items to quote".to_string(),
            ));
        }

        for item in &mut items {
            let unit_price = self.predict_unit_price(item, order.event_date).await;
            item.reprice(unit_price);
        }

        let subtotal: Money = items.iter().map(|item| item.total_price).sum();
        let breakdown = CostBreakdown::from_subtotal(subtotal, &self.rates);

        // Billing collaborator first: if the quotation cannot be
        // registered there, nothing is persisted locally either.
        let quotation = match tokio::time::timeout(
            self.call_timeout,
            self.billing.create_quotation(order_id, &breakdown),
        )
        .await
        {
            Ok(Ok(quotation)) => quotation,
            Ok(Err(e)) => {
                return Err(OrchestrationError::Internal(format!(
                    "billing quotation failed: {e}"
                )));
            }
            Err(_) => {
                return Err(OrchestrationError::Internal(
                    "billing quotation call timed out".to_string(),
                ));
            }
        };

        let updated = self
            .store
            .commit_quotation(order_id, order.version, items.clone(), quotation)
            .await?;

        self.log_history(
            order_id,
            order.status,
            updated.status,
            actor,
            "Quotation generated automatically",
        )
        .await;
        self.notify(
            updated.customer_id,
            &format!("Order {order_id} has been quoted"),
        )
        .await;
        metrics::counter!("quotations_generated_total").increment(1);
        tracing::info!(%order_id, grand_total = %updated.total_amount, "quotation generated");

        Ok(OrderDetails {
            order: updated,
            items,
        })
    }

    /// Predicts one item's unit price, falling back to a markup on its
    /// last known price when attempts are exhausted.
    async fn predict_unit_price(&self, item: &OrderItem, event_date: NaiveDate) -> Money {
        let menu_item_id = item.menu_item_id;
        let quantity = item.quantity;
        let predictor = self.predictor.clone();

        let predicted = retry_with_policy(self.retry, || {
            let predictor = predictor.clone();
            async move {
                let price = predictor.predict(menu_item_id, quantity, event_date).await?;
                if !price.is_positive() {
                    // A broken model must not zero out a quotation.
                    return Err(ServiceError::InvalidResponse(format!(
                        "non-positive unit price {price}"
                    )));
                }
                Ok(price)
            }
        })
        .await;

        match predicted {
            Ok(price) => price,
            Err(error) => {
                let fallback = self.rates.fallback_price(item.unit_price);
                tracing::warn!(
                    %menu_item_id,
                    %error,
                    %fallback,
                    "cost prediction exhausted; falling back to markup"
                );
                metrics::counter!("prediction_fallbacks_total").increment(1);
                fallback
            }
        }
    }
}
