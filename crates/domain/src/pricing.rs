//! Quotation pricing rates and cost rollup.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::Money;

/// Rates applied when rolling an order's subtotal up into a quotation.
///
/// Reads overrides from environment variables, falling back to the
/// standard rates:
/// - `PRICING_LABOR_RATE` (default `0.15`)
/// - `PRICING_OVERHEAD_RATE` (default `0.10`)
/// - `PRICING_TAX_RATE` (default `0.05`)
/// - `PRICING_FALLBACK_MARKUP` (default `1.3`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRates {
    /// Labor cost as a fraction of the subtotal.
    pub labor_rate: Decimal,
    /// Overhead cost as a fraction of the subtotal.
    pub overhead_rate: Decimal,
    /// Tax on subtotal + labor + overhead.
    pub tax_rate: Decimal,
    /// Markup on the last known unit price when the predictor is
    /// unreachable.
    pub fallback_markup: Decimal,
}

impl Default for PricingRates {
    fn default() -> Self {
        Self {
            labor_rate: Decimal::new(15, 2),      // 0.15
            overhead_rate: Decimal::new(10, 2),   // 0.10
            tax_rate: Decimal::new(5, 2),         // 0.05
            fallback_markup: Decimal::new(13, 1), // 1.3
        }
    }
}

impl PricingRates {
    /// Loads rates from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            labor_rate: env_rate("PRICING_LABOR_RATE", defaults.labor_rate),
            overhead_rate: env_rate("PRICING_OVERHEAD_RATE", defaults.overhead_rate),
            tax_rate: env_rate("PRICING_TAX_RATE", defaults.tax_rate),
            fallback_markup: env_rate("PRICING_FALLBACK_MARKUP", defaults.fallback_markup),
        }
    }

    /// Unit price used when prediction attempts are exhausted.
    pub fn fallback_price(&self, last_unit_price: Money) -> Money {
        last_unit_price.scale(self.fallback_markup)
    }
}

fn env_rate(key: &str, default: Decimal) -> Decimal {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// The rolled-up cost of a quotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub subtotal: Money,
    pub labor_cost: Money,
    pub overhead_cost: Money,
    pub tax_amount: Money,
    pub grand_total: Money,
}

impl CostBreakdown {
    /// Derives labor, overhead, tax, and grand total from a subtotal.
    pub fn from_subtotal(subtotal: Money, rates: &PricingRates) -> Self {
        let labor_cost = subtotal.scale(rates.labor_rate);
        let overhead_cost = subtotal.scale(rates.overhead_rate);
        let taxable = subtotal + labor_cost + overhead_cost;
        let tax_amount = taxable.scale(rates.tax_rate);
        let grand_total = taxable + tax_amount;

        Self {
            subtotal,
            labor_cost,
            overhead_cost,
            tax_amount,
            grand_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn default_rates() {
        let rates = PricingRates::default();
        assert_eq!(rates.labor_rate, dec!(0.15));
        assert_eq!(rates.overhead_rate, dec!(0.10));
        assert_eq!(rates.tax_rate, dec!(0.05));
        assert_eq!(rates.fallback_markup, dec!(1.3));
    }

    #[test]
    fn rollup_of_worked_example() {
        // Items (qty 10 x $100) + (qty 5 x $50) give a 1250 subtotal.
        let breakdown = CostBreakdown::from_subtotal(Money::new(dec!(1250)), &PricingRates::default());

        assert_eq!(breakdown.subtotal.amount(), dec!(1250));
        assert_eq!(breakdown.labor_cost.amount(), dec!(187.50));
        assert_eq!(breakdown.overhead_cost.amount(), dec!(125.00));
        assert_eq!(breakdown.tax_amount.amount(), dec!(78.1250));
        assert_eq!(breakdown.grand_total.amount(), dec!(1640.6250));
    }

    #[test]
    fn fallback_price_applies_markup() {
        let rates = PricingRates::default();
        assert_eq!(
            rates.fallback_price(Money::new(dec!(100))).amount(),
            dec!(130.0)
        );
    }

    #[test]
    fn zero_subtotal_rolls_up_to_zero() {
        let breakdown = CostBreakdown::from_subtotal(Money::zero(), &PricingRates::default());
        assert!(breakdown.grand_total.is_zero());
    }
}
