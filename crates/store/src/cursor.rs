//! Opaque pagination cursor codec.
//!
//! A cursor encodes the sort value and id of the last row of a page.
//! Paging resumes strictly after that `(sort_value, id)` position using
//! the same comparator that ordered the listing, so rows are never
//! skipped or repeated even when many rows share a sort value.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use common::OrderId;
use domain::Order;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// Whitelisted sort columns for order listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    EventDate,
    TotalAmount,
}

impl SortField {
    /// Returns the field name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::EventDate => "event_date",
            SortField::TotalAmount => "total_amount",
        }
    }

    /// Extracts the comparable sort key from an order.
    pub(crate) fn key_of(&self, order: &Order) -> SortKey {
        match self {
            SortField::CreatedAt => SortKey::Timestamp(order.created_at),
            SortField::EventDate => SortKey::Date(order.event_date),
            SortField::TotalAmount => SortKey::Amount(order.total_amount.amount()),
        }
    }

    /// Renders an order's sort value for embedding in a cursor.
    pub(crate) fn value_of(&self, order: &Order) -> String {
        match self {
            SortField::CreatedAt => order.created_at.to_rfc3339(),
            SortField::EventDate => order.event_date.to_string(),
            SortField::TotalAmount => order.total_amount.amount().to_string(),
        }
    }

    /// Parses a cursor sort value back into a comparable key.
    pub(crate) fn parse_value(&self, value: &str) -> Result<SortKey, StoreError> {
        match self {
            SortField::CreatedAt => DateTime::parse_from_rfc3339(value)
                .map(|dt| SortKey::Timestamp(dt.with_timezone(&Utc)))
                .map_err(|e| StoreError::InvalidCursor(format!("bad timestamp: {e}"))),
            SortField::EventDate => value
                .parse::<NaiveDate>()
                .map(SortKey::Date)
                .map_err(|e| StoreError::InvalidCursor(format!("bad date: {e}"))),
            SortField::TotalAmount => value
                .parse::<Decimal>()
                .map(SortKey::Amount)
                .map_err(|e| StoreError::InvalidCursor(format!("bad amount: {e}"))),
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Listing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// A typed sort value, comparable with the listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum SortKey {
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Amount(Decimal),
}

/// Decoded pagination cursor: the last-seen sort value and row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub sort_value: String,
    pub id: OrderId,
}

impl PageCursor {
    /// Builds the cursor for the last row of a page.
    pub fn from_order(field: SortField, order: &Order) -> Self {
        Self {
            sort_value: field.value_of(order),
            id: order.id,
        }
    }

    /// Encodes the cursor as an opaque string.
    pub fn encode(&self) -> String {
        BASE64.encode(format!("{}|{}", self.sort_value, self.id))
    }

    /// Decodes an opaque cursor string.
    pub fn decode(encoded: &str) -> Result<Self, StoreError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| StoreError::InvalidCursor(format!("bad encoding: {e}")))?;
        let raw = String::from_utf8(bytes)
            .map_err(|_| StoreError::InvalidCursor("cursor is not utf-8".to_string()))?;

        let (sort_value, id) = raw
            .rsplit_once('|')
            .ok_or_else(|| StoreError::InvalidCursor("missing separator".to_string()))?;
        let id: Uuid = id
            .parse()
            .map_err(|_| StoreError::InvalidCursor("bad row id".to_string()))?;

        Ok(Self {
            sort_value: sort_value.to_string(),
            id: OrderId::from_uuid(id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let cursor = PageCursor {
            sort_value: "2026-05-01T10:00:00+00:00".to_string(),
            id: OrderId::new(),
        };

        let decoded = PageCursor::decode(&cursor.encode()).unwrap();
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            PageCursor::decode("not base64!!"),
            Err(StoreError::InvalidCursor(_))
        ));
    }

    #[test]
    fn decode_rejects_missing_separator() {
        let encoded = BASE64.encode("no-separator-here");
        assert!(matches!(
            PageCursor::decode(&encoded),
            Err(StoreError::InvalidCursor(_))
        ));
    }

    #[test]
    fn decode_rejects_bad_id() {
        let encoded = BASE64.encode("2026-05-01|not-a-uuid");
        assert!(matches!(
            PageCursor::decode(&encoded),
            Err(StoreError::InvalidCursor(_))
        ));
    }

    #[test]
    fn sort_value_parsing_roundtrips() {
        let field = SortField::TotalAmount;
        let key = field.parse_value("1640.625").unwrap();
        assert_eq!(key, SortKey::Amount("1640.625".parse().unwrap()));

        let field = SortField::EventDate;
        let key = field.parse_value("2026-05-01").unwrap();
        assert_eq!(
            key,
            SortKey::Date(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap())
        );

        assert!(SortField::CreatedAt.parse_value("yesterday").is_err());
    }
}
