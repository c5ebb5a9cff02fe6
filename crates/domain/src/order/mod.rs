//! Order entities and creation rules.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use common::{ActorId, CustomerId, MenuItemId, OrderId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

pub mod status;
pub mod value_objects;

pub use status::OrderStatus;
pub use value_objects::{Customizations, Money, Version};

/// Minimum lead time between placing an order and the event.
pub const MIN_LEAD_DAYS: i64 = 7;
/// Maximum scheduling horizon for an event.
pub const MAX_LEAD_DAYS: i64 = 365;

/// A catering order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub guest_count: u32,
    pub venue_address: String,
    pub status: OrderStatus,
    pub total_amount: Money,
    /// Bumped on every persisted status change; see [`Version`].
    pub version: Version,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item on an order.
///
/// Price fields are authoritative server-side values; caller-supplied
/// prices are never trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: OrderId,
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
    pub unit_price: Money,
    pub total_price: Money,
    pub customizations: Customizations,
}

impl OrderItem {
    /// Creates an item with server-side pricing.
    pub fn new(
        order_id: OrderId,
        menu_item_id: MenuItemId,
        quantity: u32,
        unit_price: Money,
        customizations: Customizations,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            menu_item_id,
            quantity,
            unit_price,
            total_price: unit_price.multiply(quantity),
            customizations,
        }
    }

    /// Replaces the item's pricing with a corrected unit price.
    pub fn reprice(&mut self, unit_price: Money) {
        self.unit_price = unit_price;
        self.total_price = unit_price.multiply(self.quantity);
    }
}

/// Input for creating a draft order.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub guest_count: u32,
    pub venue_address: String,
    pub items: Vec<NewOrderItem>,
}

/// Input for a single item on a new order.
///
/// Deliberately carries no price fields.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderItem {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
    #[serde(default)]
    pub customizations: Customizations,
}

impl NewOrder {
    /// Validates the business rules that gate draft creation.
    ///
    /// The event date must leave at least [`MIN_LEAD_DAYS`] of preparation
    /// time and lie within [`MAX_LEAD_DAYS`] of `today`.
    pub fn validate(&self, today: NaiveDate) -> Result<(), DomainError> {
        let lead = (self.event_date - today).num_days();
        if lead < MIN_LEAD_DAYS {
            return Err(DomainError::validation(format!(
                "Event date must be at least {MIN_LEAD_DAYS} days from today to allow for preparation"
            )));
        }
        if lead > MAX_LEAD_DAYS {
            return Err(DomainError::validation(
                "Orders cannot be scheduled more than 1 year in advance",
            ));
        }
        if self.guest_count == 0 {
            return Err(DomainError::validation("Guest count must be positive"));
        }
        if self.items.is_empty() {
            return Err(DomainError::validation("An order needs at least one item"));
        }
        if self.items.iter().any(|item| item.quantity == 0) {
            return Err(DomainError::validation("Item quantities must be positive"));
        }
        Ok(())
    }
}

/// Append-only audit record of a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: Uuid,
    pub order_id: OrderId,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    pub changed_by: ActorId,
    pub notes: String,
    pub changed_at: DateTime<Utc>,
}

impl StatusHistoryEntry {
    /// Creates a history entry stamped with the current time.
    pub fn new(
        order_id: OrderId,
        old_status: OrderStatus,
        new_status: OrderStatus,
        changed_by: ActorId,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            old_status,
            new_status,
            changed_by,
            notes: notes.into(),
            changed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn new_order(event_date: NaiveDate) -> NewOrder {
        NewOrder {
            customer_id: CustomerId::new(),
            event_date,
            event_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            guest_count: 40,
            venue_address: "12 Harbour Lane".to_string(),
            items: vec![NewOrderItem {
                menu_item_id: MenuItemId::new(),
                quantity: 2,
                customizations: Customizations::empty(),
            }],
        }
    }

    #[test]
    fn accepts_event_inside_window() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let order = new_order(today + Duration::days(14));
        assert!(order.validate(today).is_ok());
    }

    #[test]
    fn rejects_event_too_soon() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let order = new_order(today + Duration::days(3));
        assert!(matches!(
            order.validate(today),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn rejects_event_too_far_out() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let order = new_order(today + Duration::days(400));
        assert!(order.validate(today).is_err());
    }

    #[test]
    fn rejects_zero_guests_and_empty_items() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        let mut order = new_order(today + Duration::days(30));
        order.guest_count = 0;
        assert!(order.validate(today).is_err());

        let mut order = new_order(today + Duration::days(30));
        order.items.clear();
        assert!(order.validate(today).is_err());

        let mut order = new_order(today + Duration::days(30));
        order.items[0].quantity = 0;
        assert!(order.validate(today).is_err());
    }

    #[test]
    fn item_pricing_is_derived() {
        let item = OrderItem::new(
            OrderId::new(),
            MenuItemId::new(),
            3,
            Money::new(dec!(150)),
            Customizations::empty(),
        );
        assert_eq!(item.total_price.amount(), dec!(450));
    }

    #[test]
    fn reprice_updates_both_fields() {
        let mut item = OrderItem::new(
            OrderId::new(),
            MenuItemId::new(),
            4,
            Money::new(dec!(100)),
            Customizations::empty(),
        );
        item.reprice(Money::new(dec!(130)));
        assert_eq!(item.unit_price.amount(), dec!(130));
        assert_eq!(item.total_price.amount(), dec!(520));
    }
}
