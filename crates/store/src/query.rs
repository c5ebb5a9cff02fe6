//! Order listing queries and pages.

use chrono::NaiveDate;
use common::CustomerId;
use domain::{Order, OrderStatus};
use serde::{Deserialize, Serialize};

use crate::cursor::{SortField, SortOrder};

/// Default page size for order listing.
pub const DEFAULT_LIMIT: usize = 20;
/// Upper bound on page size.
pub const MAX_LIMIT: usize = 100;

/// Filters, sorting, and paging for order listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<CustomerId>,
    /// Inclusive lower bound on the event date.
    pub event_from: Option<NaiveDate>,
    /// Inclusive upper bound on the event date.
    pub event_to: Option<NaiveDate>,
    #[serde(default)]
    pub sort_by: SortField,
    #[serde(default)]
    pub sort_order: SortOrder,
    pub limit: Option<usize>,
    /// Opaque cursor from a previous page.
    pub cursor: Option<String>,
}

impl OrderListQuery {
    /// Creates an unfiltered query with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by status.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filters by customer.
    pub fn customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    /// Restricts to events on or after the given date.
    pub fn event_from(mut self, date: NaiveDate) -> Self {
        self.event_from = Some(date);
        self
    }

    /// Restricts to events on or before the given date.
    pub fn event_to(mut self, date: NaiveDate) -> Self {
        self.event_to = Some(date);
        self
    }

    /// Sets the sort column.
    pub fn sort_by(mut self, field: SortField) -> Self {
        self.sort_by = field;
        self
    }

    /// Sets the sort direction.
    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    /// Sets the page size.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resumes after the given cursor.
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// The effective page size, clamped to `1..=MAX_LIMIT`.
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Returns true if an order passes the query's filters.
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.status
            && order.status != status
        {
            return false;
        }
        if let Some(customer_id) = self.customer_id
            && order.customer_id != customer_id
        {
            return false;
        }
        if let Some(from) = self.event_from
            && order.event_date < from
        {
            return false;
        }
        if let Some(to) = self.event_to
            && order.event_date > to
        {
            return false;
        }
        true
    }
}

/// One page of an order listing.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub data: Vec<Order>,
    /// Cursor resuming after the last row, present when `has_more`.
    pub next_cursor: Option<String>,
    pub has_more: bool,
}
