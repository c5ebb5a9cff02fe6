//! Billing service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::{CustomerId, OrderId};
use domain::{CostBreakdown, Invoice, Money, Quotation};

use super::ServiceError;

/// Billing collaborator: quotations and invoices.
#[async_trait]
pub trait BillingService: Send + Sync {
    /// Registers a quotation for the given cost breakdown and returns
    /// the priced quotation record.
    async fn create_quotation(
        &self,
        order_id: OrderId,
        breakdown: &CostBreakdown,
    ) -> Result<Quotation, ServiceError>;

    /// Raises an invoice for a confirmed order.
    async fn create_invoice(
        &self,
        order_id: OrderId,
        total_amount: Money,
        customer_id: CustomerId,
    ) -> Result<Invoice, ServiceError>;
}

#[derive(Debug, Default)]
struct BillingState {
    quotations: HashMap<OrderId, Quotation>,
    invoices: HashMap<OrderId, Invoice>,
    fail_on_quotation: bool,
    fail_on_invoice: bool,
    invoice_delay: Option<Duration>,
}

/// In-memory billing service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBillingService {
    state: Arc<RwLock<BillingState>>,
}

impl InMemoryBillingService {
    /// Creates a new in-memory billing service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent quotation calls fail.
    pub fn set_fail_on_quotation(&self, fail: bool) {
        self.state.write().unwrap().fail_on_quotation = fail;
    }

    /// Makes subsequent invoice calls fail.
    pub fn set_fail_on_invoice(&self, fail: bool) {
        self.state.write().unwrap().fail_on_invoice = fail;
    }

    /// Delays invoice calls, for interleaving tests.
    pub fn set_invoice_delay(&self, delay: Option<Duration>) {
        self.state.write().unwrap().invoice_delay = delay;
    }

    /// Number of quotations registered.
    pub fn quotation_count(&self) -> usize {
        self.state.read().unwrap().quotations.len()
    }

    /// Number of invoices raised.
    pub fn invoice_count(&self) -> usize {
        self.state.read().unwrap().invoices.len()
    }
}

#[async_trait]
impl BillingService for InMemoryBillingService {
    async fn create_quotation(
        &self,
        order_id: OrderId,
        breakdown: &CostBreakdown,
    ) -> Result<Quotation, ServiceError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_quotation {
            return Err(ServiceError::Unavailable(
                "billing quotation endpoint down".to_string(),
            ));
        }

        let quotation = Quotation::from_breakdown(order_id, breakdown);
        state.quotations.insert(order_id, quotation.clone());
        Ok(quotation)
    }

    async fn create_invoice(
        &self,
        order_id: OrderId,
        total_amount: Money,
        customer_id: CustomerId,
    ) -> Result<Invoice, ServiceError> {
        let delay = self.state.read().unwrap().invoice_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.write().unwrap();
        if state.fail_on_invoice {
            return Err(ServiceError::Unavailable(
                "billing invoice endpoint down".to_string(),
            ));
        }

        let invoice = Invoice::pending(order_id, customer_id, total_amount);
        state.invoices.insert(order_id, invoice.clone());
        Ok(invoice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::PricingRates;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn quotation_reflects_breakdown() {
        let billing = InMemoryBillingService::new();
        let order_id = OrderId::new();
        let breakdown =
            CostBreakdown::from_subtotal(Money::new(dec!(1250)), &PricingRates::default());

        let quotation = billing.create_quotation(order_id, &breakdown).await.unwrap();

        assert_eq!(quotation.order_id, order_id);
        assert_eq!(quotation.grand_total.amount(), dec!(1640.6250));
        assert_eq!(billing.quotation_count(), 1);
    }

    #[tokio::test]
    async fn invoice_starts_pending_for_full_amount() {
        let billing = InMemoryBillingService::new();
        let invoice = billing
            .create_invoice(OrderId::new(), Money::new(dec!(900)), CustomerId::new())
            .await
            .unwrap();

        assert_eq!(invoice.total_amount.amount(), dec!(900));
        assert_eq!(billing.invoice_count(), 1);
    }

    #[tokio::test]
    async fn failure_toggles() {
        let billing = InMemoryBillingService::new();
        billing.set_fail_on_invoice(true);

        let result = billing
            .create_invoice(OrderId::new(), Money::new(dec!(10)), CustomerId::new())
            .await;

        assert!(matches!(result, Err(ServiceError::Unavailable(_))));
        assert_eq!(billing.invoice_count(), 0);
    }
}
