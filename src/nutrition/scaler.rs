//! Nutrient scaling
//!
//! Turns a canonical (per-one-unit) ingredient into the nutrient content of
//! an arbitrary requested amount.

use std::sync::Arc;

use crate::models::{Ingredient, NutritionFacts};

use super::converter::convert;
use super::error::{NutritionError, NutritionResult};
use super::units::{Unit, UnitFamily};

/// External nutrition data for one unit of an ingredient.
///
/// One blocking round trip per call; retry and timeout policy belong to the
/// implementation.
pub trait NutrientSource: Send + Sync {
    fn fetch(&self, name: &str, unit: Unit) -> NutritionResult<NutritionFacts>;
}

/// Scales canonical ingredient profiles to requested quantities
#[derive(Clone)]
pub struct NutrientScaler {
    source: Arc<dyn NutrientSource>,
}

impl NutrientScaler {
    pub fn new(source: Arc<dyn NutrientSource>) -> Self {
        Self { source }
    }

    /// Fetch facts for one unit of an ingredient, rejecting incomplete records
    pub fn lookup(&self, name: &str, unit: Unit) -> NutritionResult<NutritionFacts> {
        let facts = self.source.fetch(name, unit)?;
        if !facts.nutrients.is_complete() {
            return Err(NutritionError::NutrientLookup(format!(
                "incomplete nutrient record for '{}' per {}",
                name, unit
            )));
        }
        Ok(facts)
    }

    /// Nutrient content of `quantity` `unit` of a canonical ingredient.
    ///
    /// Mass and volume requests are first expressed in the canonical's unit,
    /// then every value is multiplied by the quantity. Spoon requests are
    /// priced from a direct lookup of one spoon of the ingredient, since a
    /// spoon's weight depends on what is in it.
    pub fn scale(
        &self,
        canonical: &Ingredient,
        quantity: f64,
        unit: Unit,
    ) -> NutritionResult<Ingredient> {
        let mut scaled = Ingredient {
            id: canonical.id,
            name: canonical.name.clone(),
            quantity,
            unit,
            calories: 0.0,
            weight: 0.0,
            nutrients: canonical.nutrients.clone(),
        };

        if unit.is_spoon() {
            tracing::debug!("Looking up one {} of {}", unit, canonical.name);
            let per_spoon = self.lookup(&canonical.name, unit)?;
            scaled.calories = per_spoon.calories * quantity;
            scaled.weight = per_spoon.weight * quantity;
            scaled.nutrients = per_spoon.nutrients.scale(quantity);
            return Ok(scaled);
        }

        if unit != canonical.unit {
            let convertible = unit.family() == canonical.unit.family()
                && matches!(unit.family(), UnitFamily::Mass | UnitFamily::Volume);
            if !convertible {
                return Err(NutritionError::UnitMismatch {
                    ingredient: canonical.name.clone(),
                    registered: canonical.unit,
                    requested: unit,
                });
            }
            convert(&mut scaled, canonical.unit);
        }

        // Canonical values are per one unit, so the quantity is the multiplier
        let multiplier = scaled.quantity;
        scaled.calories = canonical.calories * multiplier;
        scaled.weight = canonical.weight * multiplier;
        scaled.nutrients = canonical.nutrients.scale(multiplier);

        Ok(scaled)
    }
}
