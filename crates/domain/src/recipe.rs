//! Recipe lines and ingredient requirement aggregation.

use std::collections::BTreeMap;

use common::IngredientId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One ingredient line of a menu item's recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub ingredient_id: IngredientId,
    /// Quantity needed per base unit of the menu item.
    pub quantity_per_base_unit: Decimal,
    /// Multiplier covering trim and preparation loss, `>= 1`.
    pub wastage_factor: Decimal,
}

impl RecipeLine {
    /// Creates a recipe line.
    pub fn new(
        ingredient_id: IngredientId,
        quantity_per_base_unit: Decimal,
        wastage_factor: Decimal,
    ) -> Self {
        Self {
            ingredient_id,
            quantity_per_base_unit,
            wastage_factor,
        }
    }
}

/// Total quantity of one ingredient an order needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientRequirement {
    pub ingredient_id: IngredientId,
    pub quantity: Decimal,
}

/// Aggregates ingredient requirements across an order's items.
///
/// Each element pairs an item quantity with that item's recipe lines.
/// Requirements are `quantity_per_base_unit x wastage_factor x item
/// quantity`, merged by ingredient id and returned sorted by ingredient
/// id so reservation order is deterministic.
pub fn aggregate_requirements<'a>(
    items: impl IntoIterator<Item = (u32, &'a [RecipeLine])>,
) -> Vec<IngredientRequirement> {
    let mut totals: BTreeMap<IngredientId, Decimal> = BTreeMap::new();

    for (item_quantity, lines) in items {
        for line in lines {
            let required =
                line.quantity_per_base_unit * line.wastage_factor * Decimal::from(item_quantity);
            *totals.entry(line.ingredient_id).or_default() += required;
        }
    }

    totals
        .into_iter()
        .map(|(ingredient_id, quantity)| IngredientRequirement {
            ingredient_id,
            quantity,
        })
        .collect()
}
