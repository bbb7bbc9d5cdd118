//! Ingredient model
//!
//! Canonical ingredients are stored once, normalised to one unit of their
//! basis (1 g, 1 l, 1 pc or one spoon). Request and recipe-line
//! ingredients share the same shape but carry the amount called for.

use std::collections::HashMap;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::nutrition::{IngredientCatalog, NutritionError, NutritionResult, Unit};
use super::{NutrientProfile, NutritionFacts};

fn default_quantity() -> f64 {
    1.0
}

/// An ingredient, canonical or scaled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    pub unit: Unit,
    #[serde(default)]
    pub calories: f64,
    #[serde(rename = "totalWeight", default)]
    pub weight: f64,
    #[serde(rename = "totalNutrients", default)]
    pub nutrients: NutrientProfile,
}

impl Ingredient {
    /// An unscaled request line: just name, amount and unit
    pub fn line(name: &str, quantity: f64, unit: Unit) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            quantity,
            unit,
            calories: 0.0,
            weight: 0.0,
            nutrients: NutrientProfile::default(),
        }
    }

    /// A canonical record (quantity 1) built from per-unit lookup facts
    pub fn canonical(name: &str, unit: Unit, facts: NutritionFacts) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            quantity: 1.0,
            unit,
            calories: facts.calories,
            weight: facts.weight,
            nutrients: facts.nutrients,
        }
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let nutrients_json: String = row.get("nutrients")?;
        let nutrients = serde_json::from_str(&nutrients_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
        })?;

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            quantity: row.get("quantity")?,
            unit: row.get("unit")?,
            calories: row.get("calories")?,
            weight: row.get("weight")?,
            nutrients,
        })
    }

    /// Insert a canonical ingredient
    pub fn create(conn: &Connection, data: &Ingredient) -> DbResult<Self> {
        let nutrients_json = serde_json::to_string(&data.nutrients).map_err(|e| {
            rusqlite::Error::ToSqlConversionFailure(Box::new(e))
        })?;

        conn.execute(
            r#"
            INSERT INTO ingredients (name, quantity, unit, calories, weight, nutrients)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.name,
                data.quantity,
                data.unit,
                data.calories,
                data.weight,
                nutrients_json,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredients WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_by_name(conn: &Connection, name: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredients WHERE name = ?1")?;

        match stmt.query_row([name], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All canonical ingredients ordered by name
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredients ORDER BY name")?;

        let items = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM ingredients WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Whether any recipe line refers to this ingredient name
    pub fn is_used_in_recipe(conn: &Connection, name: &str) -> DbResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM recipe_ingredients WHERE name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM ingredients", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl ToSql for Unit {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Unit {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: NutritionError| FromSqlError::Other(Box::new(e)))
    }
}

/// Canonical ingredients read from the database up front, so nutrient
/// scaling can run after the connection is back in the pool
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    ingredients: HashMap<String, Ingredient>,
}

impl CatalogSnapshot {
    /// Load the canonical records for `names`; unregistered names are skipped
    pub fn load<'n>(conn: &Connection, names: impl IntoIterator<Item = &'n str>) -> DbResult<Self> {
        let mut ingredients = HashMap::new();
        for name in names {
            if ingredients.contains_key(name) {
                continue;
            }
            if let Some(ingredient) = Ingredient::get_by_name(conn, name)? {
                ingredients.insert(name.to_string(), ingredient);
            }
        }
        Ok(Self { ingredients })
    }

    pub fn get(&self, name: &str) -> Option<&Ingredient> {
        self.ingredients.get(name)
    }
}

impl IngredientCatalog for CatalogSnapshot {
    fn by_name(&self, name: &str) -> NutritionResult<Ingredient> {
        self.get(name)
            .cloned()
            .ok_or_else(|| NutritionError::IngredientNotFound(name.to_string()))
    }
}
