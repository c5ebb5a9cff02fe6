//! The exposed order orchestration facade.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::{ActorId, CustomerId, OrderId};
use domain::{
    Money, NewOrder, Order, OrderItem, OrderStatus, PaymentStatus, PricingRates,
    StatusHistoryEntry, Version,
};
use serde::Serialize;
use stock::StockLedger;
use store::{OrderListQuery, OrderPage, OrderStore};

use crate::error::{OrchestrationError, Result};
use crate::retry::RetryPolicy;
use crate::services::{
    BillingService, CostPredictor, MenuCatalog, NotificationSink, ServiceError,
};

/// Tunables for the orchestration layer.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Quotation pricing rates.
    pub rates: PricingRates,
    /// Retry policy for the cost predictor.
    pub retry: RetryPolicy,
    /// Budget for each stock and billing call.
    pub call_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            rates: PricingRates::default(),
            retry: RetryPolicy::default(),
            call_timeout: Duration::from_secs(2),
        }
    }
}

impl OrchestratorConfig {
    /// Loads pricing rates from the environment, keeping the default
    /// retry policy and call timeout.
    pub fn from_env() -> Self {
        Self {
            rates: PricingRates::from_env(),
            ..Self::default()
        }
    }
}

/// An order together with its items.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Coordinates order lifecycle operations across the store, the stock
/// ledger, and the billing/predictor/notification collaborators.
///
/// Every state-changing operation is atomic from the caller's view: it
/// lands in the new state with all side effects applied, or it reports
/// an error with the order left in its prior state (plus any
/// compensations already executed).
pub struct OrderOrchestrator<S, L, B, P, N, M> {
    pub(crate) store: Arc<S>,
    pub(crate) ledger: Arc<L>,
    pub(crate) billing: Arc<B>,
    pub(crate) predictor: Arc<P>,
    pub(crate) notifier: Arc<N>,
    pub(crate) menu: Arc<M>,
    pub(crate) rates: PricingRates,
    pub(crate) retry: RetryPolicy,
    pub(crate) call_timeout: Duration,
}

impl<S, L, B, P, N, M> OrderOrchestrator<S, L, B, P, N, M>
where
    S: OrderStore + 'static,
    L: StockLedger + 'static,
    B: BillingService + 'static,
    P: CostPredictor + 'static,
    N: NotificationSink + 'static,
    M: MenuCatalog + 'static,
{
    /// Creates an orchestrator with default pricing rates and retry
    /// policy.
    pub fn new(store: S, ledger: L, billing: B, predictor: P, notifier: N, menu: M) -> Self {
        Self::with_config(
            store,
            ledger,
            billing,
            predictor,
            notifier,
            menu,
            OrchestratorConfig::default(),
        )
    }

    /// Creates an orchestrator with explicit configuration.
    pub fn with_config(
        store: S,
        ledger: L,
        billing: B,
        predictor: P,
        notifier: N,
        menu: M,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store: Arc::new(store),
            ledger: Arc::new(ledger),
            billing: Arc::new(billing),
            predictor: Arc::new(predictor),
            notifier: Arc::new(notifier),
            menu: Arc::new(menu),
            rates: config.rates,
            retry: config.retry,
            call_timeout: config.call_timeout,
        }
    }

    /// Creates a draft order with server-side prices from the menu
    /// catalog.
    #[tracing::instrument(skip(self, new_order), fields(customer_id = %new_order.customer_id))]
    pub async fn create_order(&self, new_order: NewOrder) -> Result<OrderDetails> {
        new_order.validate(Utc::now().date_naive())?;

        let order_id = OrderId::new();
        let mut items = Vec::with_capacity(new_order.items.len());
        let mut total = Money::zero();

        for input in &new_order.items {
            let unit_price = self
                .menu
                .unit_price(input.menu_item_id)
                .await
                .map_err(map_menu_error)?;
            let item = OrderItem::new(
                order_id,
                input.menu_item_id,
                input.quantity,
                unit_price,
                input.customizations.clone(),
            );
            total += item.total_price;
            items.push(item);
        }

        let now = Utc::now();
        let order = Order {
            id: order_id,
            customer_id: new_order.customer_id,
            event_date: new_order.event_date,
            event_time: new_order.event_time,
            guest_count: new_order.guest_count,
            venue_address: new_order.venue_address,
            status: OrderStatus::Draft,
            total_amount: total,
            version: Version::initial(),
            created_at: now,
            updated_at: now,
        };

        self.store.insert_order(order.clone(), items.clone()).await?;
        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(%order_id, total = %total, "draft order created");

        Ok(OrderDetails { order, items })
    }

    /// Loads an order with its items.
    pub async fn get_order(&self, order_id: OrderId) -> Result<OrderDetails> {
        self.details(order_id).await
    }

    /// Lists orders with filtering, sorting, and cursor pagination.
    pub async fn list_orders(&self, query: OrderListQuery) -> Result<OrderPage> {
        Ok(self.store.list_orders(query).await?)
    }

    /// Hard-deletes a draft order.
    #[tracing::instrument(skip(self))]
    pub async fn delete_draft(&self, order_id: OrderId) -> Result<()> {
        let order = self.load_order(order_id).await?;
        if order.status != OrderStatus::Draft {
            return Err(OrchestrationError::Validation(
                "Only draft orders can be deleted".to_string(),
            ));
        }
        self.store.delete_order(order_id).await?;
        Ok(())
    }

    /// Moves an order to `target`, running the transition-specific
    /// logic: quotation generation, the confirmation saga, or the
    /// cancellation compensator.
    #[tracing::instrument(skip(self, notes))]
    pub async fn transition(
        &self,
        order_id: OrderId,
        target: OrderStatus,
        actor: ActorId,
        notes: &str,
    ) -> Result<OrderDetails> {
        match target {
            OrderStatus::Quoted => self.generate_quotation(order_id, actor).await,
            OrderStatus::Confirmed => self.confirm(order_id, actor).await,
            OrderStatus::Cancelled => self.cancel(order_id, actor, notes).await,
            OrderStatus::Preparing | OrderStatus::Completed => {
                self.plain_transition(order_id, target, actor, notes).await
            }
            OrderStatus::Draft => {
                // Nothing transitions back into draft.
                let order = self.load_order(order_id).await?;
                Err(OrchestrationError::InvalidTransition {
                    from: order.status,
                    to: OrderStatus::Draft,
                })
            }
        }
    }

    /// A guarded, version-checked status write with no saga side.
    async fn plain_transition(
        &self,
        order_id: OrderId,
        target: OrderStatus,
        actor: ActorId,
        notes: &str,
    ) -> Result<OrderDetails> {
        let order = self.load_order(order_id).await?;
        if !order.status.can_transition_to(target) {
            return Err(OrchestrationError::InvalidTransition {
                from: order.status,
                to: target,
            });
        }

        let updated = self
            .store
            .commit_status(order_id, order.version, target)
            .await?;

        if target == OrderStatus::Completed {
            // A served event settles its invoice.
            self.store
                .update_invoice_status(order_id, PaymentStatus::Paid)
                .await?;
        }

        self.log_history(order_id, order.status, target, actor, notes)
            .await;
        self.notify(
            order.customer_id,
            &format!("Order {order_id} status changed to {target}"),
        )
        .await;
        metrics::counter!("order_transitions_total", "target" => target.as_str()).increment(1);

        let items = self.store.items_for_order(order_id).await?;
        Ok(OrderDetails {
            order: updated,
            items,
        })
    }

    pub(crate) async fn load_order(&self, order_id: OrderId) -> Result<Order> {
        self.store
            .find_order(order_id)
            .await?
            .ok_or(OrchestrationError::NotFound(order_id))
    }

    pub(crate) async fn details(&self, order_id: OrderId) -> Result<OrderDetails> {
        let order = self.load_order(order_id).await?;
        let items = self.store.items_for_order(order_id).await?;
        Ok(OrderDetails { order, items })
    }

    /// Appends an audit entry; failures are logged and swallowed.
    pub(crate) async fn log_history(
        &self,
        order_id: OrderId,
        old_status: OrderStatus,
        new_status: OrderStatus,
        actor: ActorId,
        notes: &str,
    ) {
        let entry = StatusHistoryEntry::new(order_id, old_status, new_status, actor, notes);
        if let Err(error) = self.store.append_history(entry).await {
            tracing::warn!(%order_id, %error, "failed to append status history");
        }
    }

    /// Fire-and-forget customer notification.
    pub(crate) async fn notify(&self, customer_id: CustomerId, message: &str) {
        self.notifier.notify(customer_id, message).await;
    }
}

fn map_menu_error(e: ServiceError) -> OrchestrationError {
    match e {
        ServiceError::NotFound(what) => {
            OrchestrationError::Validation(format!("Unknown menu item: {what}"))
        }
        ServiceError::Rejected(msg) => OrchestrationError::Validation(msg),
        other => OrchestrationError::Internal(other.to_string()),
    }
}
