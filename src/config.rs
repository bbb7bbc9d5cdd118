//! Runtime configuration
//!
//! Read once at startup from the environment and handed to the components
//! that need it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Default Edamam API host
pub const DEFAULT_EDAMAM_BASE_URL: &str = "https://api.edamam.com";
/// Default timeout for outbound HTTP calls, in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read credentials file {path}: {source}")]
    CredentialsFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Credentials file {0} must hold the app id and app key on two lines")]
    IncompleteCredentials(PathBuf),

    #[error("Invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },
}

/// Edamam nutrition-data API settings
#[derive(Debug, Clone)]
pub struct EdamamConfig {
    pub app_id: String,
    pub app_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl EdamamConfig {
    pub fn has_credentials(&self) -> bool {
        !self.app_id.is_empty() && !self.app_key.is_empty()
    }
}

impl Default for EdamamConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_key: String::new(),
            base_url: DEFAULT_EDAMAM_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub edamam: EdamamConfig,
}

impl Config {
    /// Build configuration from environment variables:
    ///
    /// - `CRAVINGS_DATABASE_PATH` - SQLite file (default `data/cravings.db`)
    /// - `EDAMAM_APP_ID` / `EDAMAM_APP_KEY` - API credentials
    /// - `CRAVINGS_CREDENTIALS_FILE` - file with app id and key on two lines,
    ///   used when the variables above are unset
    /// - `EDAMAM_BASE_URL` - API host override
    /// - `CRAVINGS_HTTP_TIMEOUT_SECS` - outbound request timeout
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_path = std::env::var("CRAVINGS_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());

        let mut edamam = EdamamConfig::default();

        if let Ok(url) = std::env::var("EDAMAM_BASE_URL") {
            edamam.base_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(raw) = std::env::var("CRAVINGS_HTTP_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: "CRAVINGS_HTTP_TIMEOUT_SECS",
                value: raw.clone(),
            })?;
            edamam.timeout = Duration::from_secs(secs);
        }

        match (std::env::var("EDAMAM_APP_ID"), std::env::var("EDAMAM_APP_KEY")) {
            (Ok(id), Ok(key)) => {
                edamam.app_id = id;
                edamam.app_key = key;
            }
            _ => {
                if let Ok(path) = std::env::var("CRAVINGS_CREDENTIALS_FILE") {
                    let (id, key) = read_credentials_file(Path::new(&path))?;
                    edamam.app_id = id;
                    edamam.app_key = key;
                }
            }
        }

        if !edamam.has_credentials() {
            tracing::warn!("Edamam credentials not configured; registration and spoon lookups will fail");
        }

        Ok(Self {
            database_path,
            edamam,
        })
    }
}

/// Read an app id and key from the first two lines of a file
pub fn read_credentials_file(path: &Path) -> Result<(String, String), ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::CredentialsFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_credentials(&contents).ok_or_else(|| ConfigError::IncompleteCredentials(path.to_path_buf()))
}

fn parse_credentials(contents: &str) -> Option<(String, String)> {
    let mut lines = contents.lines().map(str::trim);
    let id = lines.next().filter(|s| !s.is_empty())?;
    let key = lines.next().filter(|s| !s.is_empty())?;
    Some((id.to_string(), key.to_string()))
}

/// `data/cravings.db` beside the project root (or beside the executable)
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("cravings.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credentials() {
        assert_eq!(
            parse_credentials("abc123\nkey456\n"),
            Some(("abc123".to_string(), "key456".to_string()))
        );
        assert_eq!(parse_credentials("only-id\n"), None);
        assert_eq!(parse_credentials("\nkey"), None);
    }

    #[test]
    fn test_missing_credentials_file() {
        let err = read_credentials_file(Path::new("/nonexistent/appIdAndKey.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::CredentialsFile { .. }));
    }

    #[test]
    fn test_default_edamam_config() {
        let config = EdamamConfig::default();
        assert!(!config.has_credentials());
        assert_eq!(config.base_url, DEFAULT_EDAMAM_BASE_URL);
    }
}
