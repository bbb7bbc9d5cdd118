//! Recipe model
//!
//! A recipe is a named, ordered list of ingredient lines. Only the lines are
//! persisted; `all_nutrients` and the per-line nutrients are recomputed by
//! the aggregator whenever a recipe is read.

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::{Ingredient, NutrientProfile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "recipeName")]
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(rename = "allNutrients", alias = "AllNutrients", default)]
    pub all_nutrients: NutrientProfile,
}

impl Recipe {
    pub fn new(name: &str, ingredients: Vec<Ingredient>, description: Vec<String>) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            ingredients,
            description,
            all_nutrients: NutrientProfile::default(),
        }
    }

    /// Header columns only; lines are loaded separately
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let description_json: String = row.get("description")?;
        let description = serde_json::from_str(&description_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
        })?;

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            ingredients: Vec::new(),
            description,
            all_nutrients: NutrientProfile::default(),
        })
    }

    fn line_from_row(row: &Row) -> rusqlite::Result<Ingredient> {
        let name: String = row.get("name")?;
        Ok(Ingredient::line(&name, row.get("quantity")?, row.get("unit")?))
    }

    fn load_lines(conn: &Connection, recipe_id: i64) -> DbResult<Vec<Ingredient>> {
        let mut stmt = conn.prepare(
            "SELECT name, quantity, unit FROM recipe_ingredients WHERE recipe_id = ?1 ORDER BY position",
        )?;

        let lines = stmt
            .query_map([recipe_id], Self::line_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(lines)
    }

    /// Insert a recipe and its lines in one transaction
    pub fn create(conn: &Connection, data: &Recipe) -> DbResult<Self> {
        let description_json = serde_json::to_string(&data.description).map_err(|e| {
            rusqlite::Error::ToSqlConversionFailure(Box::new(e))
        })?;

        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO recipes (name, description) VALUES (?1, ?2)",
            params![data.name, description_json],
        )?;
        let recipe_id = tx.last_insert_rowid();

        for (position, line) in data.ingredients.iter().enumerate() {
            tx.execute(
                r#"
                INSERT INTO recipe_ingredients (recipe_id, position, name, quantity, unit)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![recipe_id, position as i64, line.name, line.quantity, line.unit],
            )?;
        }
        tx.commit()?;

        Self::get_by_id(conn, recipe_id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE id = ?1")?;

        let recipe = match stmt.query_row([id], Self::from_row) {
            Ok(recipe) => recipe,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(Self {
            ingredients: Self::load_lines(conn, recipe.id)?,
            ..recipe
        }))
    }

    pub fn get_by_name(conn: &Connection, name: &str) -> DbResult<Option<Self>> {
        let id: Option<i64> = match conn.query_row(
            "SELECT id FROM recipes WHERE name = ?1",
            [name],
            |row| row.get(0),
        ) {
            Ok(id) => Some(id),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };

        match id {
            Some(id) => Self::get_by_id(conn, id),
            None => Ok(None),
        }
    }

    /// All recipes with their lines, ordered by name
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes ORDER BY name")?;
        let headers = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        headers
            .into_iter()
            .map(|recipe| {
                Ok(Self {
                    ingredients: Self::load_lines(conn, recipe.id)?,
                    ..recipe
                })
            })
            .collect()
    }

    /// Delete a recipe (lines cascade)
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM recipes WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
        Ok(count)
    }
}
