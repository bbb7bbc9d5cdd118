//! Inventory Tools
//!
//! Checks a pantry against a recipe: what is on hand, what is missing, and
//! what is left after cooking.

use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::models::{Ingredient, InventoryLines, RecipeInventory};
use crate::nutrition::{remaining, resolve_spoon_equivalent, IngredientCatalog, NutrientScaler, Unit};
use crate::tools::ingredients::{normalize_name, parse_unit};
use crate::tools::recipes::load_with_catalog;

/// One pantry item. Without a unit the ingredient's registered unit is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryEntry {
    pub name: String,
    pub quantity: f64,
    pub unit: Option<Unit>,
}

/// Parse `name|quantity|unit` entries.
///
/// A missing or unreadable quantity counts as 1; zero or negative amounts
/// are rejected. The unit may be left out, but a unit that is given must be
/// a known one.
pub fn parse_ingredient_list(entries: &[String]) -> Result<Vec<PantryEntry>, String> {
    let mut pantry: Vec<PantryEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        let mut parts = entry.split('|').map(str::trim);
        let name = normalize_name(parts.next().unwrap_or_default());
        if name.is_empty() {
            return Err(format!("Pantry entry '{}' has no ingredient name", entry));
        }

        let quantity = parts
            .next()
            .and_then(|q| q.parse::<f64>().ok())
            .filter(|q| q.is_finite())
            .unwrap_or(1.0);
        if quantity <= 0.0 {
            return Err(format!("Quantity in pantry entry '{}' must be greater than 0", entry));
        }

        let unit = match parts.next().filter(|u| !u.is_empty()) {
            Some(u) => Some(parse_unit(u)?),
            None => None,
        };

        if pantry.iter().any(|p| p.name == name) {
            return Err(format!("Ingredient {} is listed more than once", name));
        }
        pantry.push(PantryEntry { name, quantity, unit });
    }

    Ok(pantry)
}

/// Compare a pantry with a stored recipe.
///
/// Stock is tracked per ingredient across the whole recipe, so two lines
/// drawing on the same pantry item both come out of the same amount. Stock
/// that runs out is reported as a negative remaining quantity.
pub fn check_recipe(
    db: &Database,
    scaler: &NutrientScaler,
    recipe_name: &str,
    pantry: &[PantryEntry],
) -> Result<RecipeInventory, String> {
    let (recipe, catalog) = load_with_catalog(db, recipe_name)?
        .ok_or_else(|| format!("Recipe \"{}\" not found", recipe_name.trim()))?;

    let mut lines = InventoryLines::default();
    // Calorie density of each pantry item, kept beside the running stock so
    // spoon lines still resolve once the stock is used up
    let mut reference: Vec<Ingredient> = Vec::new();
    let mut stock: Vec<Ingredient> = Vec::new();

    for line in &recipe.ingredients {
        let canonical = catalog
            .by_name(&line.name)
            .map_err(|e| format!("Failed to get ingredient: {}", e))?;
        let need = scaler
            .scale(&canonical, line.quantity, line.unit)
            .map_err(|e| format!("Failed to scale {}: {}", line.name, e))?;

        let position = match stock.iter().position(|s| s.name == line.name) {
            Some(position) => position,
            None => match pantry.iter().find(|p| p.name == line.name) {
                Some(entry) => {
                    let unit = entry.unit.unwrap_or(canonical.unit);
                    let scaled = scaler
                        .scale(&canonical, entry.quantity, unit)
                        .map_err(|e| format!("Failed to scale pantry {}: {}", entry.name, e))?;
                    let density = if entry.quantity > 0.0 {
                        scaled.clone()
                    } else {
                        scaler
                            .scale(&canonical, 1.0, unit)
                            .map_err(|e| format!("Failed to scale pantry {}: {}", entry.name, e))?
                    };
                    reference.push(density);
                    stock.push(scaled);
                    stock.len() - 1
                }
                None => {
                    lines.missing.push(need);
                    continue;
                }
            },
        };

        let need = if need.unit.is_spoon() && need.unit != reference[position].unit {
            resolve_spoon_equivalent(&reference[position], &need)
                .map_err(|e| format!("Cannot compare {}: {}", line.name, e))?
        } else {
            need
        };

        let have = remaining(&stock[position], &need, false)
            .map_err(|e| format!("Cannot compare {}: {}", line.name, e))?;
        let left = remaining(&stock[position], &need, true)
            .map_err(|e| format!("Cannot compare {}: {}", line.name, e))?;

        lines.have.push(have);
        stock[position] = left;
    }
    lines.remaining = stock;

    let inventory = RecipeInventory {
        recipe_name: recipe.name,
        ingredients: lines,
    };

    tracing::info!(
        "Checked {} against {} pantry items: {} missing{}",
        inventory.recipe_name,
        pantry.len(),
        inventory.ingredients.missing.len(),
        if inventory.has_shortfall() { ", short on stock" } else { "" }
    );

    Ok(inventory)
}
