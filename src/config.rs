//! Database configuration
//!
//! A `DbConfig` names the directory holding relation and index files. It is
//! built with a small fluent API, or read from the environment.

use std::path::{Path, PathBuf};

/// Environment variable naming the database directory
pub const DATA_DIR_ENV: &str = "HEAPSQL_DATA_DIR";

/// Default database directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default name of the shell history file inside the data directory
pub const DEFAULT_HISTORY_FILE: &str = ".heapsql_history";

/// Database configuration
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Directory holding `<relation>.db` and `<table>-<index>.idx` files
    pub data_dir: PathBuf,
    /// Shell history file, relative to `data_dir` unless absolute
    pub history_file: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            history_file: PathBuf::from(DEFAULT_HISTORY_FILE),
        }
    }
}

impl DbConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config from `HEAPSQL_DATA_DIR`, falling back to defaults
    pub fn from_env() -> Self {
        match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self::default().data_dir(dir),
            _ => Self::default(),
        }
    }

    /// Set the data directory
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the history file
    pub fn history_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.history_file = file.into();
        self
    }

    /// Path of the file backing the named relation
    pub fn relation_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.db", name))
    }

    /// Path of the file backing an index
    pub fn index_path(&self, table_name: &str, index_name: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}-{}.idx", table_name, index_name))
    }

    /// Resolved shell history path
    pub fn history_path(&self) -> PathBuf {
        if self.history_file.is_absolute() {
            self.history_file.clone()
        } else {
            self.data_dir.join(&self.history_file)
        }
    }

    /// Borrow the data directory
    pub fn dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let config = DbConfig::new().data_dir("/tmp/db");
        assert_eq!(config.relation_path("goober"), PathBuf::from("/tmp/db/goober.db"));
        assert_eq!(
            config.index_path("goober", "fx"),
            PathBuf::from("/tmp/db/goober-fx.idx")
        );
        assert_eq!(
            config.history_path(),
            PathBuf::from("/tmp/db/.heapsql_history")
        );
    }

    #[test]
    fn test_absolute_history_file() {
        let config = DbConfig::new()
            .data_dir("/tmp/db")
            .history_file("/home/me/.hist");
        assert_eq!(config.history_path(), PathBuf::from("/home/me/.hist"));
    }
}
