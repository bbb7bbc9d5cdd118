//! Cravings Status Tool
//!
//! Provides runtime status information about the Cravings service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::Database;
use crate::models::{Ingredient, Recipe};

/// Status information returned by the cravings_status tool
#[derive(Debug, Serialize)]
pub struct CravingsStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub database_ok: bool,
    pub ingredient_count: i64,
    pub recipe_count: i64,

    /// Whether nutrient lookups can reach Edamam
    pub edamam_configured: bool,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    edamam_configured: bool,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, edamam_configured: bool) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            edamam_configured,
        }
    }

    /// Get the current status
    pub fn get_status(&self, db: &Database) -> CravingsStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let counts = db.with_conn(|conn| Ok((Ingredient::count(conn)?, Recipe::count(conn)?)));
        let (database_ok, (ingredient_count, recipe_count)) = match counts {
            Ok(counts) => (true, counts),
            Err(e) => {
                tracing::warn!("Status could not read the database: {}", e);
                (false, (0, 0))
            }
        };

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        CravingsStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            database_ok,
            ingredient_count,
            recipe_count,
            edamam_configured: self.edamam_configured,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
