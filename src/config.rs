//! Process-wide configuration for the store, the renderer and the accepted
//! location set.
//!
//! Configuration is fixed when the engine is built and shared read-only by
//! every request. It can be loaded from TOML and overridden from the
//! environment:
//!
//! ```toml
//! locations = ["Africa", "Europe", "World"]
//!
//! [store]
//! database = "/var/lib/epichart/covid.duckdb"
//! table = "covid_data"
//! query_timeout_secs = 30
//!
//! [render]
//! bar = [1000, 600]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ReportError, Result};
use crate::models::Continent;

pub const DEFAULT_TABLE: &str = "covid_data";
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

pub const ENV_DATABASE: &str = "EPICHART_DATABASE";
pub const ENV_TABLE: &str = "EPICHART_TABLE";
pub const ENV_QUERY_TIMEOUT_SECS: &str = "EPICHART_QUERY_TIMEOUT_SECS";

pub fn default_database_path() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("epichart").join("covid.duckdb")
    } else {
        PathBuf::from(".epichart/covid.duckdb")
    }
}

/// The locations a ranking request may name: the six continents and `World`.
pub fn default_locations() -> Vec<String> {
    Continent::ALL
        .iter()
        .map(|c| c.name().to_string())
        .chain(std::iter::once("World".to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Where the dataset lives and how long a single query may take.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database: PathBuf,
    pub table: String,
    /// `None` (or `0` in TOML) disables the timeout.
    pub query_timeout_secs: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            table: DEFAULT_TABLE.to_string(),
            query_timeout_secs: Some(DEFAULT_QUERY_TIMEOUT_SECS),
        }
    }
}

impl StoreConfig {
    pub fn query_timeout(&self) -> Option<Duration> {
        match self.query_timeout_secs {
            Some(0) | None => None,
            Some(secs) => Some(Duration::from_secs(secs)),
        }
    }
}

// ---------------------------------------------------------------------------
// RenderConfig
// ---------------------------------------------------------------------------

/// Pixel sizes per chart kind, as `(width, height)`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub bar: (u32, u32),
    pub line: (u32, u32),
    pub pie: (u32, u32),
    pub scatter: (u32, u32),
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bar: (1000, 600),
            line: (900, 500),
            pie: (640, 480),
            scatter: (1000, 600),
        }
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub store: StoreConfig,
    pub render: RenderConfig,
    pub locations: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            render: RenderConfig::default(),
            locations: default_locations(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Override store settings from `EPICHART_*` environment variables.
    pub fn apply_env(mut self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db) = lookup(ENV_DATABASE) {
            self.store.database = PathBuf::from(db);
        }
        if let Some(table) = lookup(ENV_TABLE) {
            self.store.table = table;
        }
        if let Some(raw) = lookup(ENV_QUERY_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                ReportError::Validation(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    ENV_QUERY_TIMEOUT_SECS, raw
                ))
            })?;
            self.store.query_timeout_secs = Some(secs);
        }
        Ok(())
    }
}
