//! Nutrition calculation module
//!
//! Unit conversion, nutrient scaling, recipe aggregation and remaining-stock
//! arithmetic. Everything here is synchronous and works only on the values
//! passed in; storage and the external lookup come in through traits.

pub mod aggregator;
pub mod converter;
pub mod error;
pub mod remaining;
pub mod scaler;
pub mod units;

pub use aggregator::{aggregate, IngredientCatalog};
pub use converter::{convert, families_compatible};
pub use error::{NutritionError, NutritionResult};
pub use remaining::{remaining, resolve_spoon_equivalent};
pub use scaler::{NutrientScaler, NutrientSource};
pub use units::{Unit, UnitFamily};
