//! The order store port.

use async_trait::async_trait;
use common::OrderId;
use domain::{
    Invoice, Order, OrderItem, OrderStatus, PaymentStatus, Quotation, StatusHistoryEntry,
    StockReservation, Version,
};
use uuid::Uuid;

use crate::error::Result;
use crate::query::{OrderListQuery, OrderPage};

/// Persistence port for orders and their satellite rows.
///
/// State-changing methods are composite: everything a single §-operation
/// persists goes through one call, and implementations must apply that
/// call atomically. Status writes are conditional on the version the
/// caller read (`expected`); a concurrent writer makes them fail with
/// [`crate::StoreError::VersionConflict`] and no effect.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a new draft order with its items.
    async fn insert_order(&self, order: Order, items: Vec<OrderItem>) -> Result<()>;

    /// Loads an order by id.
    async fn find_order(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Loads the items of an order.
    async fn items_for_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>>;

    /// Hard-deletes an order and its items. Callers must only do this
    /// for drafts.
    async fn delete_order(&self, order_id: OrderId) -> Result<()>;

    /// Writes a new status, conditioned on `expected` matching the
    /// stored version. Bumps the version and returns the updated order.
    async fn commit_status(
        &self,
        order_id: OrderId,
        expected: Version,
        new_status: OrderStatus,
    ) -> Result<Order>;

    /// Commits a quotation in one unit: replaces the order's items with
    /// their corrected prices, sets the order total to the quotation's
    /// grand total, upserts the quotation row, and moves the order to
    /// [`OrderStatus::Quoted`] under the same version check.
    async fn commit_quotation(
        &self,
        order_id: OrderId,
        expected: Version,
        repriced_items: Vec<OrderItem>,
        quotation: Quotation,
    ) -> Result<Order>;

    /// Loads the order's quotation, if one was generated.
    async fn quotation_for_order(&self, order_id: OrderId) -> Result<Option<Quotation>>;

    /// Persists reservation rows for a confirmed order.
    async fn insert_reservations(&self, rows: Vec<StockReservation>) -> Result<()>;

    /// Loads the reservation rows of an order.
    async fn reservations_for_order(&self, order_id: OrderId) -> Result<Vec<StockReservation>>;

    /// Deletes reservation rows by id.
    async fn delete_reservations(&self, ids: &[Uuid]) -> Result<()>;

    /// Persists an invoice row.
    async fn insert_invoice(&self, invoice: Invoice) -> Result<()>;

    /// Loads the order's invoice, if one was created.
    async fn invoice_for_order(&self, order_id: OrderId) -> Result<Option<Invoice>>;

    /// Updates the payment status of the order's invoice. A missing
    /// invoice is a no-op, matching the billing workflow where drafts
    /// have none.
    async fn update_invoice_status(&self, order_id: OrderId, status: PaymentStatus) -> Result<()>;

    /// Appends a status history entry. Callers treat failures as
    /// non-fatal.
    async fn append_history(&self, entry: StatusHistoryEntry) -> Result<()>;

    /// Loads the history of an order, oldest first.
    async fn history_for_order(&self, order_id: OrderId) -> Result<Vec<StatusHistoryEntry>>;

    /// Lists orders with filtering, whitelisted sorting, and cursor
    /// pagination.
    async fn list_orders(&self, query: OrderListQuery) -> Result<OrderPage>;
}
