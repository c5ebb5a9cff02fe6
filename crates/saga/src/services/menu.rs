//! Menu catalog trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::MenuItemId;
use domain::{Money, RecipeLine};

use super::ServiceError;

/// Read-only menu catalog: authoritative prices and recipes.
///
/// Menu management itself lives elsewhere; the orchestration layer only
/// ever reads from it.
#[async_trait]
pub trait MenuCatalog: Send + Sync {
    /// Returns the current unit price of an active menu item.
    async fn unit_price(&self, menu_item_id: MenuItemId) -> Result<Money, ServiceError>;

    /// Returns the recipe lines of a menu item. Items without a stored
    /// recipe yield an empty list.
    async fn recipe(&self, menu_item_id: MenuItemId) -> Result<Vec<RecipeLine>, ServiceError>;
}

#[derive(Debug, Clone)]
struct MenuEntry {
    unit_price: Money,
    active: bool,
    recipe: Vec<RecipeLine>,
}

/// In-memory menu catalog for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMenuCatalog {
    entries: Arc<RwLock<HashMap<MenuItemId, MenuEntry>>>,
}

impl InMemoryMenuCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an active item without a recipe.
    pub fn add_item(&self, menu_item_id: MenuItemId, unit_price: Money) {
        self.add_item_with_recipe(menu_item_id, unit_price, Vec::new());
    }

    /// Adds an active item with its recipe lines.
    pub fn add_item_with_recipe(
        &self,
        menu_item_id: MenuItemId,
        unit_price: Money,
        recipe: Vec<RecipeLine>,
    ) {
        self.entries.write().unwrap().insert(
            menu_item_id,
            MenuEntry {
                unit_price,
                active: true,
                recipe,
            },
        );
    }

    /// Replaces an item's recipe, e.g. after a kitchen reformulation.
    pub fn set_recipe(&self, menu_item_id: MenuItemId, recipe: Vec<RecipeLine>) {
        if let Some(entry) = self.entries.write().unwrap().get_mut(&menu_item_id) {
            entry.recipe = recipe;
        }
    }

    /// Activates or deactivates an item.
    pub fn set_active(&self, menu_item_id: MenuItemId, active: bool) {
        if let Some(entry) = self.entries.write().unwrap().get_mut(&menu_item_id) {
            entry.active = active;
        }
    }
}

#[async_trait]
impl MenuCatalog for InMemoryMenuCatalog {
    async fn unit_price(&self, menu_item_id: MenuItemId) -> Result<Money, ServiceError> {
        let entries = self.entries.read().unwrap();
        let entry = entries
            .get(&menu_item_id)
            .ok_or_else(|| ServiceError::NotFound(format!("menu item {menu_item_id}")))?;

        if !entry.active {
            return Err(ServiceError::Rejected(format!(
                "Menu item {menu_item_id} is currently unavailable"
            )));
        }
        Ok(entry.unit_price)
    }

    async fn recipe(&self, menu_item_id: MenuItemId) -> Result<Vec<RecipeLine>, ServiceError> {
        Ok(self
            .entries
            .read()
            .unwrap()
            .get(&menu_item_id)
            .map(|entry| entry.recipe.clone())
            .unwrap_or_default())
    }
}
