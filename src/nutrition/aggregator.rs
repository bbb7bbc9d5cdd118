//! Recipe nutrient aggregation

use crate::models::{Ingredient, NutrientProfile, Recipe};

use super::error::NutritionResult;
use super::scaler::NutrientScaler;

/// Lookup of stored canonical ingredients by name
pub trait IngredientCatalog {
    fn by_name(&self, name: &str) -> NutritionResult<Ingredient>;
}

/// Recompute a recipe's per-line nutrients and its total.
///
/// Every line is scaled against its canonical record before anything is
/// written back, so a failing line leaves the recipe exactly as it was.
pub fn aggregate(
    recipe: &mut Recipe,
    catalog: &dyn IngredientCatalog,
    scaler: &NutrientScaler,
) -> NutritionResult<()> {
    let scaled_lines = recipe
        .ingredients
        .iter()
        .map(|line| {
            let canonical = catalog.by_name(&line.name)?;
            scaler.scale(&canonical, line.quantity, line.unit)
        })
        .collect::<NutritionResult<Vec<_>>>()?;

    let mut total = NutrientProfile::recipe_totals();
    for (line, scaled) in recipe.ingredients.iter_mut().zip(&scaled_lines) {
        total.add_quantities(&scaled.nutrients);

        line.id = scaled.id;
        line.calories = scaled.nutrients.energy.quantity;
        line.weight = scaled.weight;
        line.nutrients = scaled.nutrients.clone();
    }
    recipe.all_nutrients = total;

    tracing::debug!(
        "Aggregated {} lines of {}: {:.1} kcal",
        recipe.ingredients.len(),
        recipe.name,
        recipe.all_nutrients.energy.quantity
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::nutrition::scaler::tests::{flour, profile, DownSource, FixedSource};
    use crate::nutrition::{NutritionError, Unit};
    use crate::models::NutritionFacts;

    struct MapCatalog(HashMap<String, Ingredient>);

    impl IngredientCatalog for MapCatalog {
        fn by_name(&self, name: &str) -> NutritionResult<Ingredient> {
            self.0
                .get(name)
                .cloned()
                .ok_or_else(|| NutritionError::IngredientNotFound(name.to_string()))
        }
    }

    fn canonical(id: i64, name: &str, unit: Unit, per_unit: NutrientProfile) -> Ingredient {
        Ingredient {
            id,
            name: name.to_string(),
            quantity: 1.0,
            unit,
            calories: per_unit.energy.quantity,
            weight: 1.0,
            nutrients: per_unit,
        }
    }

    fn catalog() -> MapCatalog {
        let mut map = HashMap::new();
        map.insert("flour".to_string(), flour());
        map.insert(
            "egg".to_string(),
            canonical(2, "egg", Unit::Pc, profile(72.0, 4.8, 6.3, 0.4, 0.2)),
        );
        map.insert(
            "milk".to_string(),
            canonical(3, "milk", Unit::L, profile(640.0, 35.0, 33.0, 49.0, 52.0)),
        );
        map.insert(
            "sugar".to_string(),
            canonical(4, "sugar", Unit::G, profile(3.87, 0.0, 0.0, 1.0, 1.0)),
        );
        MapCatalog(map)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    fn pancakes() -> Recipe {
        Recipe::new(
            "pancakes",
            vec![
                Ingredient::line("flour", 200.0, Unit::G),
                Ingredient::line("egg", 2.0, Unit::Pc),
                Ingredient::line("milk", 5.0, Unit::Dl),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn test_totals_and_write_back() {
        let scaler = NutrientScaler::new(Arc::new(DownSource));
        let mut recipe = pancakes();
        aggregate(&mut recipe, &catalog(), &scaler).unwrap();

        // 728 + 144 + 320
        assert!(approx(recipe.all_nutrients.energy.quantity, 1192.0));
        assert_eq!(recipe.all_nutrients.energy.label, "Energy");
        assert_eq!(recipe.all_nutrients.carbohydrate.label, "Carbs");
        assert_eq!(recipe.all_nutrients.fat.unit, "g");

        let egg = &recipe.ingredients[1];
        assert_eq!(egg.id, 2);
        assert!(approx(egg.calories, 144.0));
        assert!(approx(egg.nutrients.protein.quantity, 12.6));

        // Lines keep the amounts they were written with
        assert_eq!(recipe.ingredients[2].unit, Unit::Dl);
        assert_eq!(recipe.ingredients[2].quantity, 5.0);
    }

    #[test]
    fn test_two_lines_sum() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), canonical(1, "a", Unit::Pc, profile(50.0, 0.0, 0.0, 0.0, 0.0)));
        map.insert("b".to_string(), canonical(2, "b", Unit::G, profile(1.0, 0.0, 0.0, 0.0, 0.0)));
        let mut recipe = Recipe::new(
            "pair",
            vec![Ingredient::line("a", 2.0, Unit::Pc), Ingredient::line("b", 100.0, Unit::G)],
            Vec::new(),
        );
        let scaler = NutrientScaler::new(Arc::new(DownSource));
        aggregate(&mut recipe, &MapCatalog(map), &scaler).unwrap();
        assert!(approx(recipe.all_nutrients.energy.quantity, 200.0));
    }

    #[test]
    fn test_order_independent() {
        let scaler = NutrientScaler::new(Arc::new(DownSource));
        let mut forward = pancakes();
        aggregate(&mut forward, &catalog(), &scaler).unwrap();

        let mut reversed = pancakes();
        reversed.ingredients.reverse();
        aggregate(&mut reversed, &catalog(), &scaler).unwrap();

        let (a, b) = (&forward.all_nutrients, &reversed.all_nutrients);
        assert!(approx(a.energy.quantity, b.energy.quantity));
        assert!(approx(a.fat.quantity, b.fat.quantity));
        assert!(approx(a.protein.quantity, b.protein.quantity));
        assert!(approx(a.carbohydrate.quantity, b.carbohydrate.quantity));
        assert!(approx(a.sugar.quantity, b.sugar.quantity));
    }

    #[test]
    fn test_spoon_line_uses_lookup() {
        let source = FixedSource::new(NutritionFacts {
            calories: 48.0,
            weight: 12.5,
            nutrients: profile(48.0, 0.0, 0.0, 12.5, 12.5),
        });
        let scaler = NutrientScaler::new(Arc::new(source));
        let mut recipe = Recipe::new(
            "sweet",
            vec![Ingredient::line("sugar", 2.0, Unit::Tablespoon)],
            Vec::new(),
        );
        aggregate(&mut recipe, &catalog(), &scaler).unwrap();
        assert!(approx(recipe.all_nutrients.energy.quantity, 96.0));
        assert!(approx(recipe.ingredients[0].weight, 25.0));
    }

    #[test]
    fn test_failure_is_all_or_nothing() {
        let scaler = NutrientScaler::new(Arc::new(DownSource));
        let mut recipe = pancakes();
        recipe.ingredients.push(Ingredient::line("sugar", 1.0, Unit::Teaspoon));
        let before = recipe.clone();

        let err = aggregate(&mut recipe, &catalog(), &scaler).unwrap_err();
        assert!(matches!(err, NutritionError::NutrientLookup(_)));
        assert_eq!(recipe, before);
    }

    #[test]
    fn test_unknown_ingredient_propagates() {
        let scaler = NutrientScaler::new(Arc::new(DownSource));
        let mut recipe = pancakes();
        recipe.ingredients.insert(0, Ingredient::line("saffron", 1.0, Unit::G));
        assert!(matches!(
            aggregate(&mut recipe, &catalog(), &scaler),
            Err(NutritionError::IngredientNotFound(name)) if name == "saffron"
        ));
    }
}
