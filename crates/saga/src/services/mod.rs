//! External collaborator interfaces and in-memory test doubles.

pub mod billing;
pub mod menu;
pub mod notifier;
pub mod predictor;

pub use billing::{BillingService, InMemoryBillingService};
pub use menu::{InMemoryMenuCatalog, MenuCatalog};
pub use notifier::{InMemoryNotificationSink, NotificationSink};
pub use predictor::{CostPredictor, InMemoryCostPredictor};

use thiserror::Error;

/// Errors surfaced by external collaborators.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The collaborator could not be reached or failed internally.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The collaborator does not know the requested entity.
    #[error("not found: {0}")]
    NotFound(String),

    /// The collaborator rejected the request.
    #[error("{0}")]
    Rejected(String),

    /// The collaborator answered with something unusable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
