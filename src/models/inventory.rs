//! Recipe inventory view
//!
//! What a pantry covers for a recipe, what it lacks, and what is left over
//! after cooking it.

use serde::{Deserialize, Serialize};

use super::Ingredient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryLines {
    /// Pantry items used by the recipe, expressed in the recipe's terms
    pub have: Vec<Ingredient>,
    /// Recipe lines the pantry has nothing for
    pub missing: Vec<Ingredient>,
    /// Pantry items after the recipe's amounts are subtracted.
    /// A negative quantity means there is not enough in stock.
    pub remaining: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeInventory {
    #[serde(rename = "recipeName")]
    pub recipe_name: String,
    pub ingredients: InventoryLines,
}

impl RecipeInventory {
    /// True when some pantry item falls short of what the recipe needs
    pub fn has_shortfall(&self) -> bool {
        self.ingredients.remaining.iter().any(|i| i.quantity < 0.0)
    }
}
