//! TOML-based configuration for the provider directory.

use crate::error::{DirectoryError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration, deserialized from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    pub directory: DirectorySection,
    #[serde(default)]
    pub console: ConsoleConfig,
}

/// Core instance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorySection {
    pub instance_name: String,
    pub data_dir: String,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path.
    pub path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Maximum lifetime of a pooled connection before it is recycled.
    #[serde(default = "default_pool_recycle_seconds")]
    pub pool_recycle_seconds: u64,
    #[serde(default)]
    pub delete_policy: DeletePolicy,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "/var/lib/provdir/provdir.db".into(),
            max_connections: default_max_connections(),
            pool_recycle_seconds: default_pool_recycle_seconds(),
            delete_policy: DeletePolicy::default(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_pool_recycle_seconds() -> u64 {
    299
}

/// What `delete` does when other rows still reference the target row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Refuse the delete with a referential integrity error.
    #[default]
    Restrict,
    /// Delete dependents with a required reference, null out optional ones.
    Cascade,
}

/// Web console settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_session_hours")]
    pub session_hours: i64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            session_hours: default_session_hours(),
        }
    }
}

/// Longest allowed console session: one year.
pub const MAX_SESSION_HOURS: i64 = 24 * 365;

fn default_session_hours() -> i64 {
    24
}

impl DirectoryConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| DirectoryError::Config(format!("failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Validate the configuration, returning an error for invalid values.
    pub fn validate(&self) -> Result<()> {
        if self.directory.instance_name.is_empty() {
            return Err(DirectoryError::Config(
                "directory.instance_name must not be empty".into(),
            ));
        }

        if self.directory.data_dir.is_empty() {
            return Err(DirectoryError::Config(
                "directory.data_dir must not be empty".into(),
            ));
        }

        if self.directory.database.path.is_empty() {
            return Err(DirectoryError::Config(
                "directory.database.path must not be empty".into(),
            ));
        }

        if self.directory.database.max_connections == 0 {
            return Err(DirectoryError::Config(
                "directory.database.max_connections must be at least 1".into(),
            ));
        }

        if self.console.session_hours < 1 {
            return Err(DirectoryError::Config(
                "console.session_hours must be at least 1".into(),
            ));
        }

        if self.console.session_hours > MAX_SESSION_HOURS {
            return Err(DirectoryError::Config(format!(
                "console.session_hours must be at most {MAX_SESSION_HOURS}"
            )));
        }

        Ok(())
    }

    /// Generate a sensible default configuration.
    pub fn generate_default() -> Self {
        Self {
            directory: DirectorySection {
                instance_name: "Provider Directory".into(),
                data_dir: "/var/lib/provdir".into(),
                database: DatabaseConfig::default(),
            },
            console: ConsoleConfig::default(),
        }
    }
}
