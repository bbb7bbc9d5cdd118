//! Ingredient Tools
//!
//! Registering, reading and deleting canonical ingredients, plus ad-hoc
//! scaling and conversion.

use serde::Serialize;

use crate::db::Database;
use crate::models::{Ingredient, EVENT_INGREDIENTS};
use crate::nutrition::{convert, NutrientScaler, Unit, UnitFamily};
use crate::tools::webhooks;

/// Response for list_ingredients
#[derive(Debug, Serialize)]
pub struct ListIngredientsResponse {
    pub ingredients: Vec<Ingredient>,
    pub total: usize,
}

/// Response for delete blocked
#[derive(Debug, Serialize)]
pub struct IngredientDeleteBlockedResponse {
    pub error: String,
}

/// Response for successful delete
#[derive(Debug, Serialize)]
pub struct IngredientDeleteSuccessResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Response for convert_quantity
#[derive(Debug, Serialize)]
pub struct ConvertQuantityResponse {
    pub quantity: f64,
    pub unit: Unit,
}

/// Parse a unit name, listing the accepted ones on failure
pub fn parse_unit(unit: &str) -> Result<Unit, String> {
    unit.parse::<Unit>()
        .map_err(|_| format!("Unit '{}' has to be one of: {}", unit.trim(), Unit::allowed_list()))
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Register a canonical ingredient.
///
/// The record is stored per one unit of the unit's basis (1 g for mass,
/// 1 l for volume, 1 pc, or one spoon) with nutrients from the external
/// lookup. Nothing is stored when the lookup is incomplete.
pub fn register_ingredient(
    db: &Database,
    scaler: &NutrientScaler,
    name: &str,
    unit: &str,
) -> Result<Ingredient, String> {
    let name = normalize_name(name);
    if name.is_empty() {
        return Err("Ingredient name cannot be empty".to_string());
    }
    let unit = parse_unit(unit)?;

    if get_ingredient(db, &name)?.is_some() {
        return Err(format!("Ingredient \"{}\" already in database", name));
    }

    // No pooled connection is held during the lookup
    let basis = unit.basis();
    let facts = scaler.lookup(&name, basis).map_err(|e| {
        format!("Failed to get nutrients for ingredient; ingredient was not saved: {}", e)
    })?;

    let ingredient = db
        .with_conn(|conn| Ingredient::create(conn, &Ingredient::canonical(&name, basis, facts)))
        .map_err(|e| format!("Failed to save ingredient: {}", e))?;

    tracing::info!("Registered ingredient {} per 1 {}", ingredient.name, ingredient.unit);
    webhooks::dispatch(db, EVENT_INGREDIENTS, &ingredient);

    Ok(ingredient)
}

/// Get a canonical ingredient by name
pub fn get_ingredient(db: &Database, name: &str) -> Result<Option<Ingredient>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Ingredient::get_by_name(&conn, &normalize_name(name))
        .map_err(|e| format!("Failed to get ingredient: {}", e))
}

pub fn list_ingredients(db: &Database) -> Result<ListIngredientsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let ingredients = Ingredient::list(&conn)
        .map_err(|e| format!("Failed to list ingredients: {}", e))?;

    Ok(ListIngredientsResponse {
        total: ingredients.len(),
        ingredients,
    })
}

/// Delete an ingredient (only allowed if no recipe uses it)
pub fn delete_ingredient(
    db: &Database,
    name: &str,
) -> Result<Result<IngredientDeleteSuccessResponse, IngredientDeleteBlockedResponse>, String> {
    let name = normalize_name(name);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let ingredient = Ingredient::get_by_name(&conn, &name)
        .map_err(|e| format!("Failed to get ingredient: {}", e))?
        .ok_or_else(|| format!("Ingredient \"{}\" not found", name))?;

    let in_use = Ingredient::is_used_in_recipe(&conn, &name)
        .map_err(|e| format!("Failed to check recipe usage: {}", e))?;
    if in_use {
        return Ok(Err(IngredientDeleteBlockedResponse {
            error: format!("Can't delete ingredient {} because it is used in a recipe", name),
        }));
    }

    Ingredient::delete(&conn, ingredient.id)
        .map_err(|e| format!("Failed to delete ingredient: {}", e))?;

    tracing::info!("Deleted ingredient {}", name);
    Ok(Ok(IngredientDeleteSuccessResponse {
        success: true,
        deleted_id: ingredient.id,
    }))
}

/// Nutrient content of an amount of a registered ingredient
pub fn scale_ingredient(
    db: &Database,
    scaler: &NutrientScaler,
    name: &str,
    quantity: f64,
    unit: &str,
) -> Result<Ingredient, String> {
    if !(quantity > 0.0) || !quantity.is_finite() {
        return Err("quantity must be greater than 0".to_string());
    }
    let unit = parse_unit(unit)?;
    let canonical = get_ingredient(db, name)?
        .ok_or_else(|| format!("Ingredient \"{}\" not found", normalize_name(name)))?;

    scaler
        .scale(&canonical, quantity, unit)
        .map_err(|e| format!("Failed to scale ingredient: {}", e))
}

/// Convert a quantity between two units of the same mass or volume family
pub fn convert_quantity(quantity: f64, from: &str, to: &str) -> Result<ConvertQuantityResponse, String> {
    let from = parse_unit(from)?;
    let to = parse_unit(to)?;

    let convertible = from == to
        || (from.family() == to.family()
            && matches!(from.family(), UnitFamily::Mass | UnitFamily::Volume));
    if !convertible {
        return Err(format!("Cannot convert {} to {}", from, to));
    }

    let mut item = Ingredient::line("", quantity, from);
    convert(&mut item, to);

    Ok(ConvertQuantityResponse {
        quantity: item.quantity,
        unit: item.unit,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{NutritionFacts, Recipe};
    use crate::nutrition::scaler::tests::{profile, DownSource, FixedSource};

    fn test_db() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn per_gram_scaler() -> NutrientScaler {
        NutrientScaler::new(Arc::new(FixedSource::new(NutritionFacts {
            calories: 3.64,
            weight: 1.0,
            nutrients: profile(3.64, 0.01, 0.1, 0.76, 0.0),
        })))
    }

    #[test]
    fn test_register_normalizes() {
        let db = test_db();
        let flour = register_ingredient(&db, &per_gram_scaler(), "  Flour ", "kg").unwrap();
        assert_eq!(flour.name, "flour");
        assert_eq!(flour.unit, Unit::G);
        assert_eq!(flour.quantity, 1.0);
        assert_eq!(flour.calories, 3.64);

        let fetched = get_ingredient(&db, "FLOUR").unwrap().unwrap();
        assert_eq!(fetched.id, flour.id);
    }

    #[test]
    fn test_register_volume_and_spoon_basis() {
        let db = test_db();
        let milk = register_ingredient(&db, &per_gram_scaler(), "milk", "dl").unwrap();
        assert_eq!(milk.unit, Unit::L);
        let honey = register_ingredient(&db, &per_gram_scaler(), "honey", "teaspoon").unwrap();
        assert_eq!(honey.unit, Unit::Teaspoon);
    }

    #[test]
    fn test_register_rejections() {
        let db = test_db();
        let scaler = per_gram_scaler();

        let err = register_ingredient(&db, &scaler, "flour", "cups").unwrap_err();
        assert!(err.contains("tablespoon"));
        assert!(register_ingredient(&db, &scaler, "  ", "g").is_err());

        register_ingredient(&db, &scaler, "flour", "g").unwrap();
        assert!(register_ingredient(&db, &scaler, "flour", "kg").unwrap_err().contains("already"));
    }

    #[test]
    fn test_register_lookup_failure_stores_nothing() {
        let db = test_db();
        let scaler = NutrientScaler::new(Arc::new(DownSource));
        assert!(register_ingredient(&db, &scaler, "flour", "g").is_err());
        assert!(get_ingredient(&db, "flour").unwrap().is_none());

        let mut facts = NutritionFacts::default();
        facts.calories = 1.0;
        let incomplete = NutrientScaler::new(Arc::new(FixedSource::new(facts)));
        assert!(register_ingredient(&db, &incomplete, "flour", "g").is_err());
        assert_eq!(list_ingredients(&db).unwrap().total, 0);
    }

    #[test]
    fn test_delete_blocked_while_in_recipe() {
        let db = test_db();
        let scaler = per_gram_scaler();
        register_ingredient(&db, &scaler, "flour", "g").unwrap();
        register_ingredient(&db, &scaler, "salt", "g").unwrap();

        db.with_conn(|conn| {
            Recipe::create(
                conn,
                &Recipe::new("bread", vec![Ingredient::line("flour", 500.0, Unit::G)], Vec::new()),
            )
        })
        .unwrap();

        assert!(delete_ingredient(&db, "flour").unwrap().is_err());
        assert!(delete_ingredient(&db, "salt").unwrap().is_ok());
        assert!(delete_ingredient(&db, "salt").is_err());
    }

    #[test]
    fn test_scale_ingredient() {
        let db = test_db();
        let scaler = per_gram_scaler();
        register_ingredient(&db, &scaler, "flour", "g").unwrap();
        let scaled = scale_ingredient(&db, &scaler, "flour", 200.0, "g").unwrap();
        assert!((scaled.calories - 728.0).abs() < 1e-9);
        assert!(scale_ingredient(&db, &scaler, "flour", 0.0, "g").is_err());
        assert!(scale_ingredient(&db, &scaler, "flour", 1.0, "ml").is_err());
    }

    #[test]
    fn test_convert_quantity() {
        let converted = convert_quantity(200.0, "g", "kg").unwrap();
        assert_eq!(converted.unit, Unit::Kg);
        assert!((converted.quantity - 0.2).abs() < 1e-12);
        assert!(convert_quantity(1.0, "kg", "ml").is_err());
        assert!(convert_quantity(1.0, "pc", "g").is_err());
        assert_eq!(convert_quantity(3.0, "pc", "pc").unwrap().quantity, 3.0);
    }
}
