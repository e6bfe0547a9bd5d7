use crate::config::default_database_path;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Command store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// SQLite database holding the `actions` table.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}
