//! Value objects for the order domain.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A money amount backed by a decimal.
///
/// Quotation math produces fractional amounts (tax on a rolled-up
/// subtotal), so amounts are kept as exact decimals rather than integer
/// cents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a money amount from a decimal value.
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the underlying decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Multiplies by a decimal rate.
    pub fn scale(&self, rate: Decimal) -> Money {
        Self(self.0 * rate)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}", self.0)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Monotonic version counter for optimistic concurrency control.
///
/// Every persisted status change bumps the version; writers pass the
/// version they read and lose with a conflict if it moved underneath them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the version a freshly created order carries.
    pub fn initial() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum number of customization entries per order item.
const MAX_CUSTOMIZATION_ENTRIES: usize = 16;
/// Maximum length of a customization key.
const MAX_KEY_LEN: usize = 64;
/// Maximum length of a customization value.
const MAX_VALUE_LEN: usize = 256;

/// Per-item customization notes as a bounded key/value document.
///
/// Validated once at the boundary; stored and passed around opaquely
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Customizations(BTreeMap<String, String>);

impl Customizations {
    /// Returns an empty customization document.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validates and wraps a key/value document.
    pub fn new(entries: BTreeMap<String, String>) -> Result<Self, DomainError> {
        if entries.len() > MAX_CUSTOMIZATION_ENTRIES {
            return Err(DomainError::validation(format!(
                "At most {MAX_CUSTOMIZATION_ENTRIES} customization entries are allowed"
            )));
        }
        for (key, value) in &entries {
            if key.is_empty() || key.len() > MAX_KEY_LEN {
                return Err(DomainError::validation(format!(
                    "Customization key {key:?} must be 1..={MAX_KEY_LEN} characters"
                )));
            }
            if value.len() > MAX_VALUE_LEN {
                return Err(DomainError::validation(format!(
                    "Customization value for {key:?} exceeds {MAX_VALUE_LEN} characters"
                )));
            }
        }
        Ok(Self(entries))
    }

    /// Returns the entries as a map.
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
