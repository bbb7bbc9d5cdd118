//! Unit conversion functions
//!
//! Converts ingredient quantities between units of the same family and
//! decides which units may stand in for each other.

use crate::models::Ingredient;

use super::units::{Unit, UnitFamily};

/// Convert an ingredient's quantity and unit in place.
///
/// Only mass-to-mass and volume-to-volume conversions are performed. Any
/// other pairing (count, spoon, or across families) leaves the ingredient
/// untouched; callers must check compatibility first rather than rely on
/// this to catch misuse.
///
/// - "200 g" to kg -> "0.2 kg"
/// - "3 dl" to ml -> "300 ml"
pub fn convert(ingredient: &mut Ingredient, target: Unit) {
    let source = ingredient.unit;
    if source == target {
        return;
    }

    let same_family = source.family() == target.family()
        && matches!(source.family(), UnitFamily::Mass | UnitFamily::Volume);

    match (same_family, source.scale_factor(), target.scale_factor()) {
        (true, Some(from), Some(to)) => {
            // Multiply first: every factor is a whole number, so one rounding step
            ingredient.quantity = ingredient.quantity * from / to;
            ingredient.unit = target;
        }
        _ => {
            tracing::trace!(
                "No conversion from '{}' to '{}' for {}; left unchanged",
                source,
                target,
                ingredient.name
            );
        }
    }
}

/// Whether a quantity in `a` may be bound to an ingredient measured in `b`.
///
/// Mass pairs with mass, volume with volume, count with count. A spoon can
/// hold a solid or a liquid, so spoon units pair with anything.
pub fn families_compatible(a: Unit, b: Unit) -> bool {
    if a.is_spoon() || b.is_spoon() {
        return true;
    }
    a.family() == b.family()
}
