//! Ingredient stock ledger.
//!
//! This crate provides per-ingredient available/reserved counters with
//! atomic conditional operations:
//! - `reserve` moves quantity from available to reserved,
//! - `release` moves quantity from reserved back to available,
//! - `adjust` records purchases, consumption, wastage, and manual counts.
//!
//! Every operation is atomic for a single ingredient. There is no
//! cross-ingredient atomicity; multi-ingredient consistency is the
//! responsibility of the confirmation saga that calls this ledger.

pub mod error;
pub mod ledger;
pub mod levels;

pub use error::{Result, StockError};
pub use ledger::{InMemoryStockLedger, StockLedger};
pub use levels::{AdjustmentKind, StockLevels};
