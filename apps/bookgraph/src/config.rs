//! # Configuration
//!
//! Connection settings for the Neo4j store, resolved once at startup from
//! the environment (optionally seeded from a `.env` file).
//!
//! | Variable         | Required | Default |
//! |------------------|----------|---------|
//! | `NEO4J_URI`      | yes      |         |
//! | `NEO4J_USER`     | yes      |         |
//! | `NEO4J_PASSWORD` | yes      |         |
//! | `NEO4J_DATABASE` | no       | `neo4j` |

use bookgraph_core::LoaderError;
use bookgraph_core::primitives::DEFAULT_DATABASE;
use std::fmt;
use std::path::{Path, PathBuf};

pub const ENV_URI: &str = "NEO4J_URI";
pub const ENV_USER: &str = "NEO4J_USER";
pub const ENV_PASSWORD: &str = "NEO4J_PASSWORD";
pub const ENV_DATABASE: &str = "NEO4J_DATABASE";

/// Neo4j connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    /// Logical database the load transaction runs against.
    pub database: String,
}

impl fmt::Debug for Neo4jConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neo4jConfig")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

impl Neo4jConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> Result<Self, LoaderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve through `lookup`, which maps a variable name to its value.
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoaderError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                LoaderError::ConfigError(format!("environment variable {} is not set", key))
            })
        };

        Ok(Self {
            uri: require(ENV_URI)?,
            user: require(ENV_USER)?,
            password: require(ENV_PASSWORD)?,
            database: get(ENV_DATABASE).unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        })
    }

    /// Replace the database when `database` is given and non-empty.
    #[must_use]
    pub fn with_database(mut self, database: Option<&str>) -> Self {
        if let Some(db) = database.filter(|db| !db.trim().is_empty()) {
            self.database = db.to_string();
        }
        self
    }
}

/// Load variables from a `.env` file without overriding the real
/// environment.
///
/// With an explicit `path` the file must exist. Without one, `.env` is
/// searched from the working directory upward and its absence is fine.
/// Returns the file that was loaded, if any.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, LoaderError> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .map(|()| Some(path.to_path_buf()))
            .map_err(|e| {
                LoaderError::ConfigError(format!("cannot load '{}': {}", path.display(), e))
            }),
        None => match dotenvy::dotenv() {
            Ok(found) => Ok(Some(found)),
            Err(e) if e.not_found() => Ok(None),
            Err(e) => Err(LoaderError::ConfigError(format!("cannot load .env: {}", e))),
        },
    }
}
