//! Shared identifier types used across the order fulfillment crates.

pub mod ids;

pub use ids::{ActorId, CustomerId, IngredientId, MenuItemId, OrderId};
