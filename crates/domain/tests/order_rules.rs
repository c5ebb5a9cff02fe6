//! Cross-module checks of the domain rules: lifecycle table, pricing
//! rollup, and ingredient aggregation working together.

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use common::{CustomerId, IngredientId, MenuItemId, OrderId};
use domain::{
    aggregate_requirements, CostBreakdown, Customizations, Money, NewOrder, NewOrderItem,
    OrderItem, OrderStatus, PricingRates, Quotation, RecipeLine,
};
use rust_decimal_macros::dec;

fn draft_input(event_date: NaiveDate) -> NewOrder {
    NewOrder {
        customer_id: CustomerId::new(),
        event_date,
        event_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
        guest_count: 80,
        venue_address: "2 Quayside Walk".to_string(),
        items: vec![NewOrderItem {
            menu_item_id: MenuItemId::new(),
            quantity: 4,
            customizations: Customizations::empty(),
        }],
    }
}

#[test]
fn lifecycle_follows_the_table_from_draft_to_completed() {
    let mut status = OrderStatus::Draft;
    for next in [
        OrderStatus::Quoted,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Completed,
    ] {
        assert!(status.can_transition_to(next), "{status} -> {next}");
        status = next;
    }
    assert!(status.is_terminal());

    // Every non-terminal status can also bail out to cancelled.
    for status in [
        OrderStatus::Draft,
        OrderStatus::Quoted,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
    ] {
        assert!(status.can_transition_to(OrderStatus::Cancelled));
    }
}

#[test]
fn quoting_an_order_reprices_items_and_rolls_up() {
    let order_id = OrderId::new();
    let mut items = vec![
        OrderItem::new(
            order_id,
            MenuItemId::new(),
            10,
            Money::new(dec!(90)),
            Customizations::empty(),
        ),
        OrderItem::new(
            order_id,
            MenuItemId::new(),
            5,
            Money::new(dec!(45)),
            Customizations::empty(),
        ),
    ];

    // Corrected predictor prices arrive.
    items[0].reprice(Money::new(dec!(100)));
    items[1].reprice(Money::new(dec!(50)));

    let subtotal: Money = items.iter().map(|item| item.total_price).sum();
    assert_eq!(subtotal.amount(), dec!(1250));

    let breakdown = CostBreakdown::from_subtotal(subtotal, &PricingRates::default());
    assert_eq!(breakdown.grand_total.amount(), dec!(1640.6250));

    let quotation = Quotation::from_breakdown(order_id, &breakdown);
    assert_eq!(quotation.grand_total, breakdown.grand_total);
    assert!(!quotation.is_expired(Utc::now()));
    assert!(quotation.is_expired(quotation.valid_until + Duration::seconds(1)));
}

#[test]
fn requirements_merge_across_items_with_wastage() {
    let shared = IngredientId::new();
    let rice = IngredientId::new();

    let biryani = [
        RecipeLine::new(rice, dec!(0.25), dec!(1.1)),
        RecipeLine::new(shared, dec!(0.05), dec!(1.0)),
    ];
    let curry = [RecipeLine::new(shared, dec!(0.1), dec!(1.2))];

    let requirements =
        aggregate_requirements([(8, biryani.as_slice()), (10, curry.as_slice())]);

    assert_eq!(requirements.len(), 2);
    let of = |id| {
        requirements
            .iter()
            .find(|r| r.ingredient_id == id)
            .unwrap()
            .quantity
    };
    // 0.25 * 1.1 * 8
    assert_eq!(of(rice), dec!(2.2));
    // 0.05 * 1.0 * 8 + 0.1 * 1.2 * 10
    assert_eq!(of(shared), dec!(1.6));
}

#[test]
fn draft_creation_window_is_enforced() {
    let today = Utc::now().date_naive();

    assert!(draft_input(today + Duration::days(7)).validate(today).is_ok());
    assert!(draft_input(today + Duration::days(6)).validate(today).is_err());
    assert!(draft_input(today + Duration::days(365)).validate(today).is_ok());
    assert!(draft_input(today + Duration::days(366)).validate(today).is_err());
}
