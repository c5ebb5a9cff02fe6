//! Cancellation compensator: release held stock, cancel the invoice,
//! commit the status.

use common::{ActorId, OrderId};
use domain::{OrderStatus, PaymentStatus};
use stock::StockLedger;
use store::OrderStore;
use uuid::Uuid;

use crate::error::{OrchestrationError, Result};
use crate::orchestrator::{OrderDetails, OrderOrchestrator};
use crate::services::{BillingService, CostPredictor, MenuCatalog, NotificationSink};

impl<S, L, B, P, N, M> OrderOrchestrator<S, L, B, P, N, M>
where
    S: OrderStore + 'static,
    L: StockLedger + 'static,
    B: BillingService + 'static,
    P: CostPredictor + 'static,
    N: NotificationSink + 'static,
    M: MenuCatalog + 'static,
{
    /// Cancels a non-terminal order.
    ///
    /// For confirmed and preparing orders the exact quantities recorded
    /// in the order's reservation rows are released, never a
    /// recomputation from current recipes. Release failures are logged
    /// as critical but never block the cancellation: once authorized it
    /// always completes. A failed release leaves the ledger
    /// under-reporting available stock until reconciliation.
    #[tracing::instrument(skip(self, reason))]
    pub async fn cancel(
        &self,
        order_id: OrderId,
        actor: ActorId,
        reason: &str,
    ) -> Result<OrderDetails> {
        let order = self.load_order(order_id).await?;

        // Idempotency: cancelling a cancelled order is a success with no
        // side effects.
        if order.status == OrderStatus::Cancelled {
            return self.details(order_id).await;
        }
        if order.status == OrderStatus::Completed {
            return Err(OrchestrationError::Immutable(order_id));
        }

        if matches!(
            order.status,
            OrderStatus::Confirmed | OrderStatus::Preparing
        ) {
            let rows = self.store.reservations_for_order(order_id).await?;
            for row in &rows {
                let released = match tokio::time::timeout(
                    self.call_timeout,
                    self.ledger.release(row.ingredient_id, row.reserved_quantity),
                )
                .await
                {
                    Ok(result) => result.map_err(OrchestrationError::from),
                    Err(_) => Err(OrchestrationError::Internal(
                        "stock release call timed out".to_string(),
                    )),
                };
                if let Err(error) = released {
                    tracing::error!(
                        %order_id,
                        ingredient_id = %row.ingredient_id,
                        quantity = %row.reserved_quantity,
                        %error,
                        "failed to release reserved stock during cancellation"
                    );
                    metrics::counter!("cancellation_release_failures_total").increment(1);
                }
            }

            let row_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
            self.store.delete_reservations(&row_ids).await?;
            self.store
                .update_invoice_status(order_id, PaymentStatus::Cancelled)
                .await?;
        }

        let updated = self
            .store
            .commit_status(order_id, order.version, OrderStatus::Cancelled)
            .await?;

        self.log_history(order_id, order.status, OrderStatus::Cancelled, actor, reason)
            .await;
        self.notify(
            order.customer_id,
            &format!("Order {order_id} has been cancelled: {reason}"),
        )
        .await;
        metrics::counter!("order_cancellations_total").increment(1);
        tracing::info!(%order_id, from = %order.status, "order cancelled");

        let items = self.store.items_for_order(order_id).await?;
        Ok(OrderDetails {
            order: updated,
            items,
        })
    }
}
