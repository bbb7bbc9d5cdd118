//! Webhook model
//!
//! A registered URL that is POSTed to when an ingredient or recipe is saved.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// Event fired after a new ingredient is stored
pub const EVENT_INGREDIENTS: &str = "ingredients";
/// Event fired after a new recipe is stored
pub const EVENT_RECIPES: &str = "recipes";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: i64,
    pub event: String,
    pub url: String,
    pub time: String,
}

impl Webhook {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            event: row.get("event")?,
            url: row.get("url")?,
            time: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, event: &str, url: &str) -> DbResult<Self> {
        let time = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        conn.execute(
            "INSERT INTO webhooks (event, url, created_at) VALUES (?1, ?2, ?3)",
            params![event, url, time],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM webhooks WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(hook) => Ok(Some(hook)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM webhooks ORDER BY id")?;
        let hooks = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(hooks)
    }

    pub fn list_for_event(conn: &Connection, event: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM webhooks WHERE event = ?1 ORDER BY id")?;
        let hooks = stmt
            .query_map([event], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(hooks)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM webhooks WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
