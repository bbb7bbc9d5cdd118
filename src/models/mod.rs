//! Data models
//!
//! Ingredient, recipe and webhook records plus their SQLite persistence.

mod ingredient;
mod inventory;
mod nutrition;
mod recipe;
mod webhook;

pub use ingredient::{Ingredient, CatalogSnapshot};
pub use inventory::{InventoryLines, RecipeInventory};
pub use nutrition::{NutrientProfile, NutrientQuantity, NutritionFacts};
pub use recipe::Recipe;
pub use webhook::{Webhook, EVENT_INGREDIENTS, EVENT_RECIPES};
