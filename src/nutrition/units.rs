//! Unit types and conversion constants
//!
//! The closed set of measurement units an ingredient may be expressed in,
//! and the family each one belongs to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::NutritionError;

/// A measurement unit accepted for ingredients and recipe lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    G,
    L,
    Dl,
    Cl,
    Ml,
    Pc,
    Tablespoon,
    Teaspoon,
}

/// Family a unit belongs to. Conversion only happens inside Mass and Volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitFamily {
    Mass,
    Volume,
    Count,
    /// Spoon measures: nutrient content comes from the external lookup
    Spoon,
}

// ============================================================================
// Conversion Constants
// ============================================================================

/// Grams per kilogram
pub const G_PER_KG: f64 = 1000.0;
/// Milliliters per liter
pub const ML_PER_L: f64 = 1000.0;
/// Milliliters per deciliter
pub const ML_PER_DL: f64 = 100.0;
/// Milliliters per centiliter
pub const ML_PER_CL: f64 = 10.0;

impl Unit {
    /// Every accepted unit, in the order they are listed to users
    pub const ALL: [Unit; 9] = [
        Unit::Kg,
        Unit::G,
        Unit::L,
        Unit::Dl,
        Unit::Cl,
        Unit::Ml,
        Unit::Pc,
        Unit::Tablespoon,
        Unit::Teaspoon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::G => "g",
            Unit::L => "l",
            Unit::Dl => "dl",
            Unit::Cl => "cl",
            Unit::Ml => "ml",
            Unit::Pc => "pc",
            Unit::Tablespoon => "tablespoon",
            Unit::Teaspoon => "teaspoon",
        }
    }

    pub fn family(&self) -> UnitFamily {
        match self {
            Unit::Kg | Unit::G => UnitFamily::Mass,
            Unit::L | Unit::Dl | Unit::Cl | Unit::Ml => UnitFamily::Volume,
            Unit::Pc => UnitFamily::Count,
            Unit::Tablespoon | Unit::Teaspoon => UnitFamily::Spoon,
        }
    }

    pub fn is_spoon(&self) -> bool {
        self.family() == UnitFamily::Spoon
    }

    /// Size of this unit measured in the smallest unit of its family
    /// (grams for mass, milliliters for volume). None outside those families.
    pub fn scale_factor(&self) -> Option<f64> {
        match self {
            Unit::Kg => Some(G_PER_KG),
            Unit::G => Some(1.0),
            Unit::L => Some(ML_PER_L),
            Unit::Dl => Some(ML_PER_DL),
            Unit::Cl => Some(ML_PER_CL),
            Unit::Ml => Some(1.0),
            Unit::Pc | Unit::Tablespoon | Unit::Teaspoon => None,
        }
    }

    /// The unit a canonical ingredient of this family is stored per
    pub fn basis(&self) -> Unit {
        match self.family() {
            UnitFamily::Mass => Unit::G,
            UnitFamily::Volume => Unit::L,
            UnitFamily::Count => Unit::Pc,
            UnitFamily::Spoon => *self,
        }
    }

    /// Comma separated list of accepted unit names
    pub fn allowed_list() -> String {
        Self::ALL
            .iter()
            .map(|u| u.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = NutritionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|u| u.as_str() == trimmed)
            .ok_or_else(|| NutritionError::InvalidUnit(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_table() {
        assert_eq!(Unit::Kg.family(), UnitFamily::Mass);
        assert_eq!(Unit::G.family(), UnitFamily::Mass);
        assert_eq!(Unit::Dl.family(), UnitFamily::Volume);
        assert_eq!(Unit::Pc.family(), UnitFamily::Count);
        assert_eq!(Unit::Tablespoon.family(), UnitFamily::Spoon);
        assert_eq!(Unit::Teaspoon.family(), UnitFamily::Spoon);
    }

    #[test]
    fn test_parse_exact_names_only() {
        assert_eq!("kg".parse::<Unit>().unwrap(), Unit::Kg);
        assert_eq!(" ml ".parse::<Unit>().unwrap(), Unit::Ml);
        assert_eq!("teaspoon".parse::<Unit>().unwrap(), Unit::Teaspoon);
        // "kgs" contains "g" but is not a unit
        assert!(matches!("kgs".parse::<Unit>(), Err(NutritionError::InvalidUnit(_))));
        assert!("tbsp".parse::<Unit>().is_err());
        assert!("".parse::<Unit>().is_err());
    }

    #[test]
    fn test_basis() {
        assert_eq!(Unit::Kg.basis(), Unit::G);
        assert_eq!(Unit::Ml.basis(), Unit::L);
        assert_eq!(Unit::Pc.basis(), Unit::Pc);
        assert_eq!(Unit::Teaspoon.basis(), Unit::Teaspoon);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Unit::Tablespoon).unwrap(), "\"tablespoon\"");
        let unit: Unit = serde_json::from_str("\"cl\"").unwrap();
        assert_eq!(unit, Unit::Cl);
    }

    #[test]
    fn test_allowed_list() {
        assert_eq!(
            Unit::allowed_list(),
            "kg, g, l, dl, cl, ml, pc, tablespoon, teaspoon"
        );
    }
}
