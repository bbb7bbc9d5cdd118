//! Remaining-stock calculation
//!
//! Expresses an available (`have`) ingredient in the terms of a required
//! (`need`) one and optionally subtracts the required amount. Both inputs
//! must already be scaled, i.e. carry calories and nutrients for their
//! quantity.

use crate::models::Ingredient;

use super::converter::convert;
use super::error::{NutritionError, NutritionResult};
use super::units::UnitFamily;

/// Rewrite a spoon-measured `need` into `have`'s unit.
///
/// A spoon has no fixed size, so the conversion factor is inferred from
/// calorie density: how many spoons' worth of calories `have` holds, and
/// therefore how many of `have`'s units one spoon stands for. This is a
/// heuristic and only as good as the two calorie figures; both must be
/// resolved before calling.
pub fn resolve_spoon_equivalent(have: &Ingredient, need: &Ingredient) -> NutritionResult<Ingredient> {
    if need.quantity == 0.0 {
        return Err(NutritionError::DivisionByZero(format!(
            "{} is needed in a quantity of zero",
            need.name
        )));
    }
    if !(need.calories > 0.0) {
        return Err(NutritionError::UndefinedRatio(format!(
            "calories for {} {} of {} are not resolved",
            need.quantity, need.unit, need.name
        )));
    }
    // Stock that has gone negative still has a usable calorie density
    if have.calories == 0.0 || !have.calories.is_finite() {
        return Err(NutritionError::UndefinedRatio(format!(
            "calories for available {} are not resolved",
            have.name
        )));
    }

    let calories_per_spoon = need.calories / need.quantity;
    let spoons_in_have = have.calories / calories_per_spoon;
    let units_per_spoon = have.quantity / spoons_in_have;

    if !units_per_spoon.is_finite() {
        return Err(NutritionError::UndefinedRatio(format!(
            "cannot relate {} to {}",
            need.unit, have.unit
        )));
    }

    let mut resolved = need.clone();
    resolved.quantity *= units_per_spoon;
    resolved.unit = have.unit;
    Ok(resolved)
}

/// What `have` looks like in `need`'s terms, after removing `need`'s
/// quantity when `subtract` is set.
///
/// The result's calories, weight and nutrients are re-derived from `need`'s
/// per-unit values, so it carries `need`'s nutrient labels. A negative
/// quantity means there is not enough in stock; that is for the caller to
/// interpret.
pub fn remaining(have: &Ingredient, need: &Ingredient, subtract: bool) -> NutritionResult<Ingredient> {
    let mut have = have.clone();
    let mut need = need.clone();

    if have.unit != need.unit {
        if need.unit.is_spoon() {
            need = resolve_spoon_equivalent(&have, &need)?;
        } else if have.unit.family() == need.unit.family()
            && matches!(need.unit.family(), UnitFamily::Mass | UnitFamily::Volume)
        {
            convert(&mut have, need.unit);
        } else {
            return Err(NutritionError::UnitMismatch {
                ingredient: have.name.clone(),
                registered: have.unit,
                requested: need.unit,
            });
        }
    }

    if need.quantity == 0.0 {
        return Err(NutritionError::DivisionByZero(format!(
            "{} is needed in a quantity of zero",
            need.name
        )));
    }

    if subtract {
        have.quantity -= need.quantity;
    }

    have.calories = (need.calories / need.quantity) * have.quantity;
    have.weight = (need.weight / need.quantity) * have.quantity;
    have.nutrients = need.nutrients.rebase(need.quantity, have.quantity);

    tracing::debug!(
        "{}: {} {} after {} {}",
        have.name,
        have.quantity,
        have.unit,
        if subtract { "using" } else { "comparing with" },
        need.quantity
    );

    Ok(have)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::scaler::tests::profile;
    use crate::nutrition::Unit;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    fn stock(name: &str, quantity: f64, unit: Unit, calories: f64) -> Ingredient {
        Ingredient {
            id: 0,
            name: name.to_string(),
            quantity,
            unit,
            calories,
            weight: quantity,
            nutrients: profile(calories, 0.0, 0.0, calories / 4.0, 0.0),
        }
    }

    #[test]
    fn test_subtract_same_unit() {
        let have = stock("flour", 500.0, Unit::G, 1820.0);
        let need = stock("flour", 200.0, Unit::G, 728.0);
        let left = remaining(&have, &need, true).unwrap();
        assert!(approx(left.quantity, 300.0));
        assert!(approx(left.calories, 1092.0));
        assert!(approx(left.nutrients.energy.quantity, 1092.0));
        assert!(approx(left.weight, 300.0));
    }

    #[test]
    fn test_without_subtract_keeps_quantity() {
        let have = stock("flour", 500.0, Unit::G, 1820.0);
        let need = stock("flour", 200.0, Unit::G, 728.0);
        let view = remaining(&have, &need, false).unwrap();
        assert!(approx(view.quantity, 500.0));
        assert!(approx(view.calories, 1820.0));
    }

    #[test]
    fn test_negative_stock_is_not_an_error() {
        let have = stock("flour", 100.0, Unit::G, 364.0);
        let need = stock("flour", 150.0, Unit::G, 546.0);
        let left = remaining(&have, &need, true).unwrap();
        assert!(approx(left.quantity, -50.0));
        assert!(left.calories < 0.0);
    }

    #[test]
    fn test_converts_have_into_need_unit() {
        let have = stock("flour", 1.0, Unit::Kg, 3640.0);
        let need = stock("flour", 200.0, Unit::G, 728.0);
        let left = remaining(&have, &need, true).unwrap();
        assert_eq!(left.unit, Unit::G);
        assert!(approx(left.quantity, 800.0));
        assert!(approx(left.calories, 2912.0));
    }

    #[test]
    fn test_inherits_need_labels() {
        let mut have = stock("milk", 1.0, Unit::L, 640.0);
        have.nutrients.energy.label = "stale".to_string();
        let need = stock("milk", 3.0, Unit::Dl, 192.0);
        let left = remaining(&have, &need, true).unwrap();
        assert_eq!(left.nutrients.energy.label, "Energy");
        assert_eq!(left.unit, Unit::Dl);
        assert!(approx(left.quantity, 7.0));
    }

    #[test]
    fn test_spoon_heuristic() {
        // 500 g sugar at 3.87 kcal/g; two tablespoons at 48 kcal each
        let have = stock("sugar", 500.0, Unit::G, 1935.0);
        let need = stock("sugar", 2.0, Unit::Tablespoon, 96.0);

        let resolved = resolve_spoon_equivalent(&have, &need).unwrap();
        assert_eq!(resolved.unit, Unit::G);
        assert!(approx(resolved.quantity, 2.0 * 500.0 * 48.0 / 1935.0));

        let left = remaining(&have, &need, true).unwrap();
        assert_eq!(left.unit, Unit::G);
        assert!(approx(left.quantity, 500.0 - resolved.quantity));
        assert!(approx(left.calories, 1935.0 - 96.0));
    }

    #[test]
    fn test_spoon_heuristic_needs_calories() {
        let have = stock("sugar", 500.0, Unit::G, 1935.0);
        let unresolved = stock("sugar", 2.0, Unit::Tablespoon, 0.0);
        assert!(matches!(
            remaining(&have, &unresolved, true),
            Err(NutritionError::UndefinedRatio(_))
        ));

        let empty_have = stock("sugar", 500.0, Unit::G, 0.0);
        let need = stock("sugar", 2.0, Unit::Tablespoon, 96.0);
        assert!(matches!(
            remaining(&empty_have, &need, true),
            Err(NutritionError::UndefinedRatio(_))
        ));
    }

    #[test]
    fn test_spoon_heuristic_on_overdrawn_stock() {
        // 10 g of sugar already overdrawn by 10 g
        let overdrawn = stock("sugar", -10.0, Unit::G, -38.7);
        let need = stock("sugar", 1.0, Unit::Teaspoon, 38.7);

        let resolved = resolve_spoon_equivalent(&overdrawn, &need).unwrap();
        assert!(approx(resolved.quantity, 10.0));

        let left = remaining(&overdrawn, &need, true).unwrap();
        assert!(approx(left.quantity, -20.0));
        assert!(approx(left.calories, -77.4));
    }

    #[test]
    fn test_zero_need_quantity() {
        let have = stock("flour", 500.0, Unit::G, 1820.0);
        let need = stock("flour", 0.0, Unit::G, 0.0);
        assert!(matches!(
            remaining(&have, &need, true),
            Err(NutritionError::DivisionByZero(_))
        ));

        let spoon = stock("flour", 0.0, Unit::Teaspoon, 10.0);
        assert!(matches!(
            remaining(&have, &spoon, false),
            Err(NutritionError::DivisionByZero(_))
        ));
    }

    #[test]
    fn test_incompatible_units_rejected() {
        let have = stock("milk", 1.0, Unit::L, 640.0);
        let need = stock("milk", 200.0, Unit::G, 130.0);
        assert!(matches!(
            remaining(&have, &need, true),
            Err(NutritionError::UnitMismatch { .. })
        ));

        let spoon_have = stock("sugar", 3.0, Unit::Tablespoon, 144.0);
        let grams = stock("sugar", 10.0, Unit::G, 38.7);
        assert!(remaining(&spoon_have, &grams, true).is_err());
    }
}
