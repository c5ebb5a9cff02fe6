//! Quotation and invoice records.

use chrono::{DateTime, Duration, Utc};
use common::{CustomerId, OrderId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::order::Money;
use crate::pricing::CostBreakdown;

/// How long a quotation stays valid.
pub const QUOTATION_VALIDITY_DAYS: i64 = 7;

/// A priced quotation for an order.
///
/// Exactly one quotation exists per order; re-quoting replaces the
/// amounts and extends `valid_until`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: Uuid,
    pub order_id: OrderId,
    pub subtotal: Money,
    pub labor_cost: Money,
    pub overhead_cost: Money,
    pub tax_amount: Money,
    pub grand_total: Money,
    pub valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Quotation {
    /// Builds a quotation from a cost breakdown, valid for
    /// [`QUOTATION_VALIDITY_DAYS`] from now.
    pub fn from_breakdown(order_id: OrderId, breakdown: &CostBreakdown) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            order_id,
            subtotal: breakdown.subtotal,
            labor_cost: breakdown.labor_cost,
            overhead_cost: breakdown.overhead_cost,
            tax_amount: breakdown.tax_amount,
            grand_total: breakdown.grand_total,
            valid_until: now + Duration::days(QUOTATION_VALIDITY_DAYS),
            created_at: now,
        }
    }

    /// Returns true if the quotation has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until < now
    }
}

/// Payment state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
}

impl PaymentStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An invoice raised when an order is confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub total_amount: Money,
    pub paid_amount: Money,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates a pending invoice for the full order amount.
    pub fn pending(order_id: OrderId, customer_id: CustomerId, total_amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            customer_id,
            total_amount,
            paid_amount: Money::zero(),
            payment_status: PaymentStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
