//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Status transitions:
/// ```text
/// Draft ──► Quoted ──► Confirmed ──► Preparing ──► Completed
///   │          │            │             │
///   └──────────┴────────────┴─────────────┴──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order is being assembled; items and details can still change.
    #[default]
    Draft,

    /// A quotation has been generated and priced.
    Quoted,

    /// Stock is reserved and an invoice exists.
    Confirmed,

    /// The kitchen is preparing the order.
    Preparing,

    /// The event was served (terminal state).
    Completed,

    /// The order was cancelled (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns the statuses reachable from this one.
    pub fn allowed_targets(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Draft => &[OrderStatus::Quoted, OrderStatus::Cancelled],
            OrderStatus::Quoted => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
            OrderStatus::Confirmed => &[OrderStatus::Preparing, OrderStatus::Cancelled],
            OrderStatus::Preparing => &[OrderStatus::Completed, OrderStatus::Cancelled],
            OrderStatus::Completed => &[],
            OrderStatus::Cancelled => &[],
        }
    }

    /// Returns true if the transition to `target` is in the table.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Returns true if items and order details can still be modified.
    pub fn can_modify(&self) -> bool {
        matches!(self, OrderStatus::Draft)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Quoted => "quoted",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// All statuses, for exhaustive table checks.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Draft,
        OrderStatus::Quoted,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_draft() {
        assert_eq!(OrderStatus::default(), OrderStatus::Draft);
    }

    #[test]
    fn transition_table_matches_lifecycle() {
        use OrderStatus::*;

        assert!(Draft.can_transition_to(Quoted));
        assert!(Draft.can_transition_to(Cancelled));
        assert!(!Draft.can_transition_to(Confirmed));
        assert!(!Draft.can_transition_to(Completed));

        assert!(Quoted.can_transition_to(Confirmed));
        assert!(Quoted.can_transition_to(Cancelled));
        assert!(!Quoted.can_transition_to(Preparing));

        assert!(Confirmed.can_transition_to(Preparing));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Confirmed.can_transition_to(Completed));

        assert!(Preparing.can_transition_to(Completed));
        assert!(Preparing.can_transition_to(Cancelled));
        assert!(!Preparing.can_transition_to(Quoted));
    }

    #[test]
    fn terminal_statuses_have_no_targets() {
        assert!(OrderStatus::Completed.allowed_targets().is_empty());
        assert!(OrderStatus::Cancelled.allowed_targets().is_empty());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Preparing.is_terminal());
    }

    #[test]
    fn only_draft_can_modify() {
        for status in OrderStatus::ALL {
            assert_eq!(status.can_modify(), status == OrderStatus::Draft);
        }
    }

    #[test]
    fn no_transition_escapes_the_table() {
        use OrderStatus::*;
        // Every pair not listed in the table must be rejected.
        let allowed = [
            (Draft, Quoted),
            (Draft, Cancelled),
            (Quoted, Confirmed),
            (Quoted, Cancelled),
            (Confirmed, Preparing),
            (Confirmed, Cancelled),
            (Preparing, Completed),
            (Preparing, Cancelled),
        ];
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let expected = allowed.contains(&(from, to));
                assert_eq!(from.can_transition_to(to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn display_uses_snake_case() {
        assert_eq!(OrderStatus::Draft.to_string(), "draft");
        assert_eq!(OrderStatus::Preparing.to_string(), "preparing");
    }

    #[test]
    fn serialization_roundtrip() {
        let status = OrderStatus::Confirmed;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"confirmed\"");
        let deserialized: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, deserialized);
    }
}
