//! In-memory order store implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::OrderId;
use domain::{
    Invoice, Order, OrderItem, OrderStatus, PaymentStatus, Quotation, StatusHistoryEntry,
    StockReservation, Version,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cursor::PageCursor;
use crate::error::{Result, StoreError};
use crate::query::{OrderListQuery, OrderPage};
use crate::store::OrderStore;

#[derive(Debug, Default)]
struct StoreState {
    orders: HashMap<OrderId, Order>,
    items: HashMap<OrderId, Vec<OrderItem>>,
    quotations: HashMap<OrderId, Quotation>,
    invoices: HashMap<OrderId, Invoice>,
    reservations: Vec<StockReservation>,
    history: Vec<StatusHistoryEntry>,
    fail_on_history: bool,
}

impl StoreState {
    fn cas(&mut self, order_id: OrderId, expected: Version) -> Result<&mut Order> {
        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or(StoreError::OrderNotFound(order_id))?;
        if order.version != expected {
            return Err(StoreError::VersionConflict {
                order_id,
                expected,
                actual: order.version,
            });
        }
        Ok(order)
    }
}

/// In-memory order store.
///
/// All composite operations run under a single write lock, which gives
/// them the same all-or-nothing behavior a database transaction would.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryOrderStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent history appends fail, to exercise best-effort
    /// audit logging.
    pub async fn set_fail_on_history(&self, fail: bool) {
        self.state.write().await.fail_on_history = fail;
    }

    /// Number of reservation rows currently stored.
    pub async fn reservation_row_count(&self) -> usize {
        self.state.read().await.reservations.len()
    }

    /// Rewrites a quotation's validity deadline, for expiry tests.
    pub async fn set_quotation_validity(
        &self,
        order_id: OrderId,
        valid_until: chrono::DateTime<Utc>,
    ) {
        if let Some(quotation) = self.state.write().await.quotations.get_mut(&order_id) {
            quotation.valid_until = valid_until;
        }
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert_order(&self, order: Order, items: Vec<OrderItem>) -> Result<()> {
        let mut state = self.state.write().await;
        state.items.insert(order.id, items);
        state.orders.insert(order.id, order);
        Ok(())
    }

    async fn find_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&order_id).cloned())
    }

    async fn items_for_order(&self, order_id: OrderId) -> Result<Vec<OrderItem>> {
        Ok(self
            .state
            .read()
            .await
            .items
            .get(&order_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .orders
            .remove(&order_id)
            .ok_or(StoreError::OrderNotFound(order_id))?;
        state.items.remove(&order_id);
        state.quotations.remove(&order_id);
        Ok(())
    }

    async fn commit_status(
        &self,
        order_id: OrderId,
        expected: Version,
        new_status: OrderStatus,
    ) -> Result<Order> {
        let mut state = self.state.write().await;
        let order = state.cas(order_id, expected)?;
        order.status = new_status;
        order.version = order.version.next();
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn commit_quotation(
        &self,
        order_id: OrderId,
        expected: Version,
        repriced_items: Vec<OrderItem>,
        quotation: Quotation,
    ) -> Result<Order> {
        let mut state = self.state.write().await;
        // The version check runs before any write so a conflict leaves
        // items, quotation, and status untouched.
        let order = state.cas(order_id, expected)?;
        order.status = OrderStatus::Quoted;
        order.total_amount = quotation.grand_total;
        order.version = order.version.next();
        order.updated_at = Utc::now();
        let updated = order.clone();

        state.items.insert(order_id, repriced_items);
        state.quotations.insert(order_id, quotation);
        Ok(updated)
    }

    async fn quotation_for_order(&self, order_id: OrderId) -> Result<Option<Quotation>> {
        Ok(self.state.read().await.quotations.get(&order_id).cloned())
    }

    async fn insert_reservations(&self, rows: Vec<StockReservation>) -> Result<()> {
        self.state.write().await.reservations.extend(rows);
        Ok(())
    }

    async fn reservations_for_order(&self, order_id: OrderId) -> Result<Vec<StockReservation>> {
        Ok(self
            .state
            .read()
            .await
            .reservations
            .iter()
            .filter(|r| r.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn delete_reservations(&self, ids: &[Uuid]) -> Result<()> {
        self.state
            .write()
            .await
            .reservations
            .retain(|r| !ids.contains(&r.id));
        Ok(())
    }

    async fn insert_invoice(&self, invoice: Invoice) -> Result<()> {
        self.state
            .write()
            .await
            .invoices
            .insert(invoice.order_id, invoice);
        Ok(())
    }

    async fn invoice_for_order(&self, order_id: OrderId) -> Result<Option<Invoice>> {
        Ok(self.state.read().await.invoices.get(&order_id).cloned())
    }

    async fn update_invoice_status(&self, order_id: OrderId, status: PaymentStatus) -> Result<()> {
        if let Some(invoice) = self.state.write().await.invoices.get_mut(&order_id) {
            invoice.payment_status = status;
        }
        Ok(())
    }

    async fn append_history(&self, entry: StatusHistoryEntry) -> Result<()> {
        let mut state = self.state.write().await;
        if state.fail_on_history {
            return Err(StoreError::Unavailable("history append failed".to_string()));
        }
        state.history.push(entry);
        Ok(())
    }

    async fn history_for_order(&self, order_id: OrderId) -> Result<Vec<StatusHistoryEntry>> {
        Ok(self
            .state
            .read()
            .await
            .history
            .iter()
            .filter(|h| h.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn list_orders(&self, query: OrderListQuery) -> Result<OrderPage> {
        use crate::cursor::SortOrder;

        let after = match &query.cursor {
            Some(encoded) => {
                let cursor = PageCursor::decode(encoded)?;
                let key = query.sort_by.parse_value(&cursor.sort_value)?;
                Some((key, cursor.id))
            }
            None => None,
        };

        let state = self.state.read().await;
        let mut rows: Vec<&Order> = state
            .orders
            .values()
            .filter(|order| query.matches(order))
            .collect();

        rows.sort_by_key(|order| (query.sort_by.key_of(order), order.id));
        if query.sort_order == SortOrder::Desc {
            rows.reverse();
        }

        // Resume strictly after the cursor position under the same
        // ordering, so duplicate sort values neither skip nor repeat.
        if let Some(position) = after {
            rows.retain(|order| {
                let key = (query.sort_by.key_of(order), order.id);
                match query.sort_order {
                    SortOrder::Asc => key > position,
                    SortOrder::Desc => key < position,
                }
            });
        }

        let limit = query.effective_limit();
        let has_more = rows.len() > limit;
        let data: Vec<Order> = rows.into_iter().take(limit).cloned().collect();

        let next_cursor = if has_more {
            data.last()
                .map(|last| PageCursor::from_order(query.sort_by, last).encode())
        } else {
            None
        };

        Ok(OrderPage {
            data,
            next_cursor,
            has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{SortField, SortOrder};
    use chrono::{NaiveDate, NaiveTime};
    use common::CustomerId;
    use domain::{Customizations, Money};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn order_with(
        customer_id: CustomerId,
        event_date: NaiveDate,
        total: Money,
    ) -> Order {
        Order {
            id: OrderId::new(),
            customer_id,
            event_date,
            event_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            guest_count: 25,
            venue_address: "9 Garden Road".to_string(),
            status: OrderStatus::Draft,
            total_amount: total,
            version: Version::initial(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_order() -> Order {
        order_with(
            CustomerId::new(),
            NaiveDate::from_ymd_opt(2026, 6, 15).unwrap(),
            Money::new(dec!(1000)),
        )
    }

    #[tokio::test]
    async fn insert_and_find_order() {
        let store = InMemoryOrderStore::new();
        let order = sample_order();
        let id = order.id;

        store.insert_order(order.clone(), vec![]).await.unwrap();

        let found = store.find_order(id).await.unwrap().unwrap();
        assert_eq!(found, order);
        assert!(store.find_order(OrderId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn commit_status_bumps_version() {
        let store = InMemoryOrderStore::new();
        let order = sample_order();
        let id = order.id;
        store.insert_order(order, vec![]).await.unwrap();

        let updated = store
            .commit_status(id, Version::initial(), OrderStatus::Quoted)
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Quoted);
        assert_eq!(updated.version, Version::initial().next());
    }

    #[tokio::test]
    async fn commit_status_with_stale_version_conflicts() {
        let store = InMemoryOrderStore::new();
        let order = sample_order();
        let id = order.id;
        store.insert_order(order, vec![]).await.unwrap();

        store
            .commit_status(id, Version::initial(), OrderStatus::Quoted)
            .await
            .unwrap();

        // Second writer still holds the stale initial version.
        let err = store
            .commit_status(id, Version::initial(), OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));

        let order = store.find_order(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Quoted);
    }

    #[tokio::test]
    async fn commit_quotation_is_all_or_nothing() {
        let store = InMemoryOrderStore::new();
        let order = sample_order();
        let id = order.id;
        let item = OrderItem::new(
            id,
            common::MenuItemId::new(),
            2,
            Money::new(dec!(100)),
            Customizations::empty(),
        );
        store.insert_order(order, vec![item.clone()]).await.unwrap();

        let breakdown = domain::CostBreakdown::from_subtotal(
            Money::new(dec!(260)),
            &domain::PricingRates::default(),
        );
        let quotation = Quotation::from_breakdown(id, &breakdown);

        // Conflicting commit leaves everything untouched.
        let mut repriced = item.clone();
        repriced.reprice(Money::new(dec!(130)));
        let err = store
            .commit_quotation(id, Version::new(9), vec![repriced.clone()], quotation.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));
        assert!(store.quotation_for_order(id).await.unwrap().is_none());
        assert_eq!(store.items_for_order(id).await.unwrap()[0], item);

        // Matching commit applies items, quotation, total, and status.
        let updated = store
            .commit_quotation(id, Version::initial(), vec![repriced], quotation.clone())
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Quoted);
        assert_eq!(updated.total_amount, quotation.grand_total);
        assert!(store.quotation_for_order(id).await.unwrap().is_some());
        assert_eq!(
            store.items_for_order(id).await.unwrap()[0].unit_price,
            Money::new(dec!(130))
        );
    }

    #[tokio::test]
    async fn second_quotation_commit_replaces_the_first() {
        let store = InMemoryOrderStore::new();
        let order = sample_order();
        let id = order.id;
        store.insert_order(order, vec![]).await.unwrap();

        let rates = domain::PricingRates::default();
        let first = Quotation::from_breakdown(
            id,
            &domain::CostBreakdown::from_subtotal(Money::new(dec!(100)), &rates),
        );
        store
            .commit_quotation(id, Version::initial(), vec![], first.clone())
            .await
            .unwrap();

        let mut second = Quotation::from_breakdown(
            id,
            &domain::CostBreakdown::from_subtotal(Money::new(dec!(900)), &rates),
        );
        second.valid_until = first.valid_until + chrono::Duration::days(3);
        store
            .commit_quotation(id, Version::initial().next(), vec![], second.clone())
            .await
            .unwrap();

        // Exactly one live quotation per order, with the new amounts and
        // the extended validity.
        let stored = store.quotation_for_order(id).await.unwrap().unwrap();
        assert_eq!(stored.grand_total, second.grand_total);
        assert_eq!(stored.valid_until, second.valid_until);
    }

    #[tokio::test]
    async fn reservations_roundtrip_and_delete_by_id() {
        let store = InMemoryOrderStore::new();
        let order_id = OrderId::new();
        let rows = vec![
            StockReservation::new(order_id, common::IngredientId::new(), dec!(2.5)),
            StockReservation::new(order_id, common::IngredientId::new(), dec!(4)),
        ];
        let first_id = rows[0].id;

        store.insert_reservations(rows).await.unwrap();
        assert_eq!(store.reservations_for_order(order_id).await.unwrap().len(), 2);

        store.delete_reservations(&[first_id]).await.unwrap();
        let remaining = store.reservations_for_order(order_id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_ne!(remaining[0].id, first_id);
    }

    #[tokio::test]
    async fn invoice_status_update_is_silent_when_missing() {
        let store = InMemoryOrderStore::new();
        store
            .update_invoice_status(OrderId::new(), PaymentStatus::Cancelled)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn history_append_can_fail_on_demand() {
        let store = InMemoryOrderStore::new();
        let entry = StatusHistoryEntry::new(
            OrderId::new(),
            OrderStatus::Draft,
            OrderStatus::Quoted,
            common::ActorId::new(),
            "quoted",
        );

        store.set_fail_on_history(true).await;
        assert!(store.append_history(entry.clone()).await.is_err());

        store.set_fail_on_history(false).await;
        store.append_history(entry.clone()).await.unwrap();
        assert_eq!(
            store.history_for_order(entry.order_id).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn listing_filters_by_status_and_customer() {
        let store = InMemoryOrderStore::new();
        let customer = CustomerId::new();
        let date = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();

        let mut mine = order_with(customer, date, Money::new(dec!(10)));
        mine.status = OrderStatus::Quoted;
        let other = order_with(CustomerId::new(), date, Money::new(dec!(20)));
        store.insert_order(mine.clone(), vec![]).await.unwrap();
        store.insert_order(other, vec![]).await.unwrap();

        let page = store
            .list_orders(
                OrderListQuery::new()
                    .status(OrderStatus::Quoted)
                    .customer(customer),
            )
            .await
            .unwrap();

        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, mine.id);
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn paging_never_skips_or_repeats_under_duplicate_sort_values() {
        let store = InMemoryOrderStore::new();
        let date = NaiveDate::from_ymd_opt(2026, 8, 20).unwrap();

        // Nine orders sharing one total_amount and a few distinct ones:
        // the tie-break on id has to do all the work.
        for i in 0..12u32 {
            let total = if i < 9 { dec!(500) } else { dec!(100) + Decimal::from(i) };
            let order = order_with(CustomerId::new(), date, Money::new(total));
            store.insert_order(order, vec![]).await.unwrap();
        }

        let base = OrderListQuery::new()
            .sort_by(SortField::TotalAmount)
            .sort_order(SortOrder::Asc)
            .limit(100);
        let all = store.list_orders(base).await.unwrap().data;
        assert_eq!(all.len(), 12);

        let mut paged = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut query = OrderListQuery::new()
                .sort_by(SortField::TotalAmount)
                .sort_order(SortOrder::Asc)
                .limit(5);
            if let Some(c) = &cursor {
                query = query.after(c.clone());
            }
            let page = store.list_orders(query).await.unwrap();
            paged.extend(page.data);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        let all_ids: Vec<OrderId> = all.iter().map(|o| o.id).collect();
        let paged_ids: Vec<OrderId> = paged.iter().map(|o| o.id).collect();
        assert_eq!(paged_ids, all_ids);
    }

    #[tokio::test]
    async fn listing_rejects_malformed_cursor() {
        let store = InMemoryOrderStore::new();
        let err = store
            .list_orders(OrderListQuery::new().after("@@@"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidCursor(_)));
    }
}
