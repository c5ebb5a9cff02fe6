//! Notification sink trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::CustomerId;

/// Fire-and-forget customer notifications.
///
/// Deliberately infallible from the caller's view: a notification
/// problem must never fail or block an order operation.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Sends a message to a customer.
    async fn notify(&self, customer_id: CustomerId, message: &str);
}

/// In-memory notification sink that records messages for assertions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationSink {
    messages: Arc<RwLock<Vec<(CustomerId, String)>>>,
}

impl InMemoryNotificationSink {
    /// Creates a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages sent so far.
    pub fn messages(&self) -> Vec<(CustomerId, String)> {
        self.messages.read().unwrap().clone()
    }

    /// Number of messages sent.
    pub fn message_count(&self) -> usize {
        self.messages.read().unwrap().len()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn notify(&self, customer_id: CustomerId, message: &str) {
        self.messages
            .write()
            .unwrap()
            .push((customer_id, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_messages() {
        let sink = InMemoryNotificationSink::new();
        let customer = CustomerId::new();

        sink.notify(customer, "your order is confirmed").await;

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, customer);
        assert!(messages[0].1.contains("confirmed"));
    }
}
