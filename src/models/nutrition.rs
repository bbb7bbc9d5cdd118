//! Shared nutrient data structures
//!
//! Used by ingredients, recipe lines, and recipe totals. Field names follow
//! the Edamam nutrient codes so records round-trip with that API.

use serde::{Deserialize, Serialize};

/// A single nutrient amount, e.g. `Fat 12.5 g`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutrientQuantity {
    pub label: String,
    pub quantity: f64,
    pub unit: String,
}

impl NutrientQuantity {
    pub fn new(label: &str, unit: &str) -> Self {
        Self {
            label: label.to_string(),
            quantity: 0.0,
            unit: unit.to_string(),
        }
    }

    fn with_quantity(&self, quantity: f64) -> Self {
        Self {
            label: self.label.clone(),
            quantity,
            unit: self.unit.clone(),
        }
    }
}

/// The five tracked nutrients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutrientProfile {
    #[serde(rename = "FAT")]
    pub fat: NutrientQuantity,
    #[serde(rename = "PROCNT")]
    pub protein: NutrientQuantity,
    #[serde(rename = "CHOCDF")]
    pub carbohydrate: NutrientQuantity,
    #[serde(rename = "SUGAR")]
    pub sugar: NutrientQuantity,
    #[serde(rename = "ENERC_KCAL")]
    pub energy: NutrientQuantity,
}

impl NutrientProfile {
    /// Zeroed totals with the fixed labels used for recipe-level sums
    pub fn recipe_totals() -> Self {
        Self {
            fat: NutrientQuantity::new("Fat", "g"),
            protein: NutrientQuantity::new("Protein", "g"),
            carbohydrate: NutrientQuantity::new("Carbs", "g"),
            sugar: NutrientQuantity::new("Sugar", "g"),
            energy: NutrientQuantity::new("Energy", "kcal"),
        }
    }

    /// A lookup that came back without an Energy label is incomplete
    pub fn is_complete(&self) -> bool {
        !self.energy.label.is_empty()
    }

    /// Apply `f` to every quantity, keeping labels and units
    pub fn map_quantities(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            fat: self.fat.with_quantity(f(self.fat.quantity)),
            protein: self.protein.with_quantity(f(self.protein.quantity)),
            carbohydrate: self.carbohydrate.with_quantity(f(self.carbohydrate.quantity)),
            sugar: self.sugar.with_quantity(f(self.sugar.quantity)),
            energy: self.energy.with_quantity(f(self.energy.quantity)),
        }
    }

    /// Scale every quantity by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        self.map_quantities(|q| q * multiplier)
    }

    /// Re-express quantities measured for `from_quantity` units as the
    /// amount for `to_quantity` units: `(q / from) * to`
    pub fn rebase(&self, from_quantity: f64, to_quantity: f64) -> Self {
        self.map_quantities(|q| (q / from_quantity) * to_quantity)
    }

    /// Add another profile's quantities into this one, keeping our labels
    pub fn add_quantities(&mut self, other: &NutrientProfile) {
        self.fat.quantity += other.fat.quantity;
        self.protein.quantity += other.protein.quantity;
        self.carbohydrate.quantity += other.carbohydrate.quantity;
        self.sugar.quantity += other.sugar.quantity;
        self.energy.quantity += other.energy.quantity;
    }
}

/// Nutrition facts for one unit of an ingredient, as returned by the
/// external lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionFacts {
    pub calories: f64,
    #[serde(rename = "totalWeight")]
    pub weight: f64,
    #[serde(rename = "totalNutrients")]
    pub nutrients: NutrientProfile,
}
