//! Confirmation saga: reserve stock, persist the reservation ledger,
//! raise the invoice, then commit the status.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use common::{ActorId, OrderId};
use domain::{aggregate_requirements, Invoice, OrderStatus, StockReservation};
use stock::StockLedger;
use store::OrderStore;
use uuid::Uuid;

use crate::error::{OrchestrationError, Result};
use crate::orchestrator::{OrderDetails, OrderOrchestrator};
use crate::runner::Saga;
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
    /// Confirms a quoted order.
    ///
    /// Stock is reserved strictly before invoicing: releasing holds is
    /// the cheaper recovery compared to retracting an already-created
    /// invoice. Any step failure unwinds the completed steps in reverse
    /// order, so no ingredient is ever left partially reserved. The
    /// final status write is version-checked; the loser of a concurrent
    /// confirm race undoes its own reservations and reports a conflict.
    #[tracing::instrument(skip(self))]
    pub async fn confirm(&self, order_id: OrderId, actor: ActorId) -> Result<OrderDetails> {
        let saga_start = std::time::Instant::now();
        let order = self.load_order(order_id).await?;

        // Idempotency: confirming a confirmed order is a success with no
        // side effects.
        if order.status == OrderStatus::Confirmed {
            return self.details(order_id).await;
        }
        if order.status != OrderStatus::Quoted {
            return Err(OrchestrationError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Confirmed,
            });
        }

        let quotation = self
            .store
            .quotation_for_order(order_id)
            .await?
            .ok_or(OrchestrationError::ExpiredQuotation(order_id))?;
        if quotation.is_expired(Utc::now()) {
            return Err(OrchestrationError::ExpiredQuotation(order_id));
        }

        metrics::counter!("order_confirmations_total").increment(1);

        // Aggregate per-ingredient requirements from the current
        // recipes, merging duplicates across items.
        let items = self.store.items_for_order(order_id).await?;
        let mut recipes = Vec::with_capacity(items.len());
        for item in &items {
            let recipe = self.menu.recipe(item.menu_item_id).await.map_err(|e| {
                OrchestrationError::Internal(format!("recipe lookup failed: {e}"))
            })?;
            recipes.push((item.quantity, recipe));
        }
        let requirements =
            aggregate_requirements(recipes.iter().map(|(qty, lines)| (*qty, lines.as_slice())));

        // The reservation rows this call will persist. Releases on
        // cancellation read these exact quantities back, so they are
        // written once and never recomputed.
        let rows: Vec<StockReservation> = requirements
            .iter()
            .map(|req| StockReservation::new(order_id, req.ingredient_id, req.quantity))
            .collect();
        let row_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

        let mut saga: Saga<OrchestrationError> = Saga::new("order_confirmation");

        let call_timeout = self.call_timeout;
        for requirement in &requirements {
            let reserve_ledger = self.ledger.clone();
            let release_ledger = self.ledger.clone();
            let ingredient_id = requirement.ingredient_id;
            let quantity = requirement.quantity;
            saga.step(
                format!("reserve:{ingredient_id}"),
                move || async move {
                    match tokio::time::timeout(
                        call_timeout,
                        reserve_ledger.reserve(ingredient_id, quantity),
                    )
                    .await
                    {
                        Ok(result) => result.map(|_| ()).map_err(Into::into),
                        Err(_) => Err(OrchestrationError::Internal(format!(
                            "stock reserve for ingredient {ingredient_id} timed out"
                        ))),
                    }
                },
                move || async move {
                    match tokio::time::timeout(
                        call_timeout,
                        release_ledger.release(ingredient_id, quantity),
                    )
                    .await
                    {
                        Ok(result) => result.map(|_| ()).map_err(Into::into),
                        Err(_) => Err(OrchestrationError::Internal(format!(
                            "stock release for ingredient {ingredient_id} timed out"
                        ))),
                    }
                },
            );
        }

        {
            let insert_store = self.store.clone();
            let delete_store = self.store.clone();
            let rows = rows.clone();
            let row_ids = row_ids.clone();
            saga.step(
                "persist_reservations",
                move || async move { insert_store.insert_reservations(rows).await.map_err(Into::into) },
                move || async move {
                    delete_store
                        .delete_reservations(&row_ids)
                        .await
                        .map_err(Into::into)
                },
            );
        }

        // The invoice is the last step and needs no compensation of its
        // own: if it fails nothing was created, and in the confirm race
        // the surviving confirmation owns the identical invoice row.
        let invoice_slot: Arc<Mutex<Option<Invoice>>> = Arc::new(Mutex::new(None));
        {
            let billing = self.billing.clone();
            let slot = invoice_slot.clone();
            let total_amount = order.total_amount;
            let customer_id = order.customer_id;
            saga.step_without_compensation("create_invoice", move || async move {
                let invoice = match tokio::time::timeout(
                    call_timeout,
                    billing.create_invoice(order_id, total_amount, customer_id),
                )
                .await
                {
                    Ok(result) => {
                        result.map_err(|e| OrchestrationError::InvoiceFailed(e.to_string()))?
                    }
                    Err(_) => {
                        return Err(OrchestrationError::InvoiceFailed(
                            "billing invoice call timed out".to_string(),
                        ));
                    }
                };
                *slot.lock().unwrap() = Some(invoice);
                Ok(())
            });
        }

        let completed = match saga.execute().await {
            Ok(completed) => completed,
            Err(failure) => {
                metrics::counter!("order_confirmation_failures_total").increment(1);
                tracing::warn!(%order_id, step = %failure.step, error = %failure.error, "confirmation saga failed");
                return Err(failure.error);
            }
        };

        // Final version-checked commit. Exactly one of two racing
        // confirms lands here first; the other detects the conflict and
        // compensates the stock it already holds.
        let updated = match self
            .store
            .commit_status(order_id, order.version, OrderStatus::Confirmed)
            .await
        {
            Ok(updated) => updated,
            Err(error) => {
                tracing::warn!(%order_id, %error, "confirm lost the version race; releasing reservations");
                completed.compensate().await;
                metrics::counter!("order_confirmation_failures_total").increment(1);
                return Err(error.into());
            }
        };

        // Mirror the collaborator's invoice locally. The invoice itself
        // already exists in billing, so a mirror failure is logged
        // rather than unwinding a confirmed order.
        let invoice = invoice_slot.lock().unwrap().take();
        if let Some(invoice) = invoice {
            if let Err(error) = self.store.insert_invoice(invoice).await {
                tracing::error!(%order_id, %error, "failed to store invoice row");
            }
        }

        self.log_history(
            order_id,
            OrderStatus::Quoted,
            OrderStatus::Confirmed,
            actor,
            "Order confirmed",
        )
        .await;
        self.notify(
            order.customer_id,
            &format!("Your order {order_id} has been confirmed!"),
        )
        .await;
        metrics::histogram!("confirmation_saga_duration_seconds")
            .record(saga_start.elapsed().as_secs_f64());
        tracing::info!(%order_id, reserved_ingredients = rows.len(), "order confirmed");

        Ok(OrderDetails {
            order: updated,
            items,
        })
    }
}
