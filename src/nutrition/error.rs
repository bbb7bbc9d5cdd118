//! Error type for the calculation core

use thiserror::Error;

use crate::db::DbError;

use super::units::Unit;

#[derive(Debug, Error)]
pub enum NutritionError {
    #[error("Invalid unit '{0}'")]
    InvalidUnit(String),

    #[error("Unit mismatch: {ingredient} is registered in {registered} and cannot be used with {requested}")]
    UnitMismatch {
        ingredient: String,
        registered: Unit,
        requested: Unit,
    },

    #[error("Nutrient lookup failed: {0}")]
    NutrientLookup(String),

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Undefined ratio: {0}")]
    UndefinedRatio(String),

    #[error("Ingredient '{0}' not found")]
    IngredientNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] DbError),
}

pub type NutritionResult<T> = Result<T, NutritionError>;
