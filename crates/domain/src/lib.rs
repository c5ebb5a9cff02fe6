//! Domain layer for the order fulfillment system.
//!
//! This crate provides the core domain types and rules:
//! - the order status state machine and its transition table
//! - order, item, and status history entities
//! - quotation pricing math and billing records
//! - recipe lines and ingredient requirement aggregation
//!
//! Everything here is pure data and rules; persistence and external
//! collaborators live in the `store` and `saga` crates.

pub mod billing;
pub mod error;
pub mod order;
pub mod pricing;
pub mod recipe;
pub mod reservation;

pub use billing::{Invoice, PaymentStatus, Quotation, QUOTATION_VALIDITY_DAYS};
pub use error::DomainError;
pub use order::{
    Customizations, Money, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus,
    StatusHistoryEntry, Version,
};
pub use pricing::{CostBreakdown, PricingRates};
pub use recipe::{aggregate_requirements, IngredientRequirement, RecipeLine};
pub use reservation::StockReservation;
