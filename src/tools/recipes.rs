//! Recipe Tools
//!
//! Registering, reading and deleting recipes. Nutrients are aggregated on
//! every read.

use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::models::{CatalogSnapshot, Ingredient, Recipe, EVENT_RECIPES};
use crate::nutrition::{aggregate, families_compatible, NutrientScaler};
use crate::tools::ingredients::{normalize_name, parse_unit};
use crate::tools::webhooks;

/// One line of a recipe as submitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeLineInput {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

/// Recipe summary for listing
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub ingredient_count: usize,
    pub ingredients: Vec<String>,
}

/// Response for list_recipes
#[derive(Debug, Serialize)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub total: usize,
}

/// Response for successful delete
#[derive(Debug, Serialize)]
pub struct RecipeDeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

fn parse_lines(lines: &[RecipeLineInput]) -> Result<Vec<Ingredient>, String> {
    lines
        .iter()
        .map(|line| {
            let name = normalize_name(&line.name);
            if name.is_empty() {
                return Err("Ingredient name cannot be empty".to_string());
            }
            if !(line.quantity > 0.0) || !line.quantity.is_finite() {
                return Err(format!("Quantity for {} must be greater than 0", name));
            }
            Ok(Ingredient::line(&name, line.quantity, parse_unit(&line.unit)?))
        })
        .collect()
}

/// Register a recipe.
///
/// Every line must name a registered ingredient in a compatible unit, and
/// the whole recipe must aggregate before anything is stored.
pub fn register_recipe(
    db: &Database,
    scaler: &NutrientScaler,
    name: &str,
    lines: &[RecipeLineInput],
    description: Vec<String>,
) -> Result<Recipe, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Recipe name cannot be empty".to_string());
    }
    if lines.is_empty() {
        return Err("A recipe needs at least one ingredient".to_string());
    }
    let lines = parse_lines(lines)?;

    let catalog = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

        let existing = Recipe::get_by_name(&conn, name)
            .map_err(|e| format!("Failed to check recipe: {}", e))?;
        if existing.is_some() {
            return Err("Cannot save recipe, name already in use".to_string());
        }

        CatalogSnapshot::load(&conn, lines.iter().map(|l| l.name.as_str()))
            .map_err(|e| format!("Failed to get ingredients: {}", e))?
    };

    let mut missing: Vec<&str> = Vec::new();
    for line in &lines {
        match catalog.get(&line.name) {
            Some(canonical) if !families_compatible(line.unit, canonical.unit) => {
                return Err(format!(
                    "Couldn't save recipe due to unit mismatch: {} has unit {} in database, and can not be saved with {}",
                    line.name, canonical.unit, line.unit
                ));
            }
            Some(_) => {}
            None if missing.contains(&line.name.as_str()) => {}
            None => missing.push(&line.name),
        }
    }
    if !missing.is_empty() {
        return Err(format!(
            "Cannot save recipe, missing ingredient(s) in database: {}",
            missing.join(", ")
        ));
    }

    let mut recipe = Recipe::new(name, lines, description);
    aggregate(&mut recipe, &catalog, scaler)
        .map_err(|e| format!("Could not get nutrients for recipe: {}", e))?;

    let stored = db
        .with_conn(|conn| Recipe::create(conn, &recipe))
        .map_err(|e| format!("Failed to save recipe: {}", e))?;
    recipe.id = stored.id;

    tracing::info!(
        "Registered recipe {} with {} ingredients",
        recipe.name,
        recipe.ingredients.len()
    );
    webhooks::dispatch(db, EVENT_RECIPES, &recipe);

    Ok(recipe)
}

/// A stored recipe together with the canonical records its lines refer to.
/// The connection is released before returning.
pub(crate) fn load_with_catalog(
    db: &Database,
    name: &str,
) -> Result<Option<(Recipe, CatalogSnapshot)>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = Recipe::get_by_name(&conn, name.trim())
        .map_err(|e| format!("Failed to get recipe: {}", e))?;
    let Some(recipe) = recipe else {
        return Ok(None);
    };

    let catalog = CatalogSnapshot::load(&conn, recipe.ingredients.iter().map(|l| l.name.as_str()))
        .map_err(|e| format!("Failed to get ingredients: {}", e))?;
    Ok(Some((recipe, catalog)))
}

/// Get a recipe by name with per-line and total nutrients
pub fn get_recipe(db: &Database, scaler: &NutrientScaler, name: &str) -> Result<Option<Recipe>, String> {
    let Some((mut recipe, catalog)) = load_with_catalog(db, name)? else {
        return Ok(None);
    };

    aggregate(&mut recipe, &catalog, scaler)
        .map_err(|e| format!("Could not get nutrients for recipe: {}", e))?;
    Ok(Some(recipe))
}

pub fn list_recipes(db: &Database) -> Result<ListRecipesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let recipes = Recipe::list(&conn).map_err(|e| format!("Failed to list recipes: {}", e))?;

    let recipes: Vec<RecipeSummary> = recipes
        .into_iter()
        .map(|r| RecipeSummary {
            id: r.id,
            ingredient_count: r.ingredients.len(),
            ingredients: r.ingredients.into_iter().map(|i| i.name).collect(),
            name: r.name,
        })
        .collect();

    Ok(ListRecipesResponse {
        total: recipes.len(),
        recipes,
    })
}

pub fn delete_recipe(db: &Database, name: &str) -> Result<RecipeDeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recipe = Recipe::get_by_name(&conn, name.trim())
        .map_err(|e| format!("Failed to get recipe: {}", e))?
        .ok_or_else(|| format!("Recipe \"{}\" not found", name.trim()))?;

    Recipe::delete(&conn, recipe.id).map_err(|e| format!("Failed to delete recipe: {}", e))?;

    tracing::info!("Deleted recipe {}", recipe.name);
    Ok(RecipeDeleteResponse {
        success: true,
        deleted_id: recipe.id,
    })
}
