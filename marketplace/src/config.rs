//! Configuration
//!
//! Runtime settings for the marketplace service. The binary fills this in from
//! command-line flags and environment variables; everything has a default so
//! `Config::default()` gives a self-contained in-memory service.
//!
//! ## Configuration Variables
//!
//! - `DATABASE_URL`: SQLite connection string (default: `sqlite::memory:`)
//! - `BIND_ADDRESS`: HTTP server bind address (default: `127.0.0.1:8000`)
//! - `DATA_DIR`: Directory holding `users.json`, `orders.json`, `offers.json` (default: `data`)
//! - `SKIP_FIXTURES`: Start with empty collections (default: `false`)
//! - `MAX_CONNECTIONS`: Pool size for file-backed databases (default: `5`)

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub data_dir: PathBuf,
    pub seed_fixtures: bool,
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            bind_address: "127.0.0.1:8000".to_string(),
            data_dir: PathBuf::from("data"),
            seed_fixtures: true,
            max_connections: 5,
        }
    }
}

impl Config {
    /// An in-memory SQLite database only exists for as long as its connection does.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_in_memory() {
        let config = Config::default();
        assert!(config.is_in_memory());
        assert!(config.seed_fixtures);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_file_database_is_not_in_memory() {
        let config = Config {
            database_url: "sqlite://marketplace.db".to_string(),
            ..Config::default()
        };
        assert!(!config.is_in_memory());
    }
}
