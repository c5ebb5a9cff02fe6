//! Order orchestration layer.
//!
//! This crate coordinates the order lifecycle across the store, the
//! stock ledger, and the external billing/predictor/notification
//! collaborators:
//! - quotation generation with bounded-retry cost prediction,
//! - the confirmation saga (reserve stock per ingredient, persist the
//!   reservation ledger, raise the invoice) with compensating actions
//!   run in reverse order on failure,
//! - the cancellation compensator that releases exactly what an order
//!   reserved,
//! - version-checked status transitions with best-effort audit history.

pub mod cancellation;
pub mod confirmation;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod retry;
pub mod runner;
pub mod services;

pub use error::{OrchestrationError, Result};
pub use orchestrator::{OrderDetails, OrchestratorConfig, OrderOrchestrator};
pub use retry::{retry_with_policy, RetryError, RetryPolicy};
pub use runner::{CompletedSaga, Saga, SagaFailure};
pub use services::{
    BillingService, CostPredictor, InMemoryBillingService, InMemoryCostPredictor,
    InMemoryMenuCatalog, InMemoryNotificationSink, MenuCatalog, NotificationSink, ServiceError,
};
