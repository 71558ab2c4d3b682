//! Catalog configuration loading
//!
//! Configuration is resolved in priority order:
//! 1. Environment variables (`CINEDEX_CONFIG` names the file;
//!    `CINEDEX_DATABASE` and `CINEDEX_LINK_MODE` override single fields)
//! 2. TOML configuration file (`<config_dir>/cinedex/config.toml`)
//! 3. Built-in defaults

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// Default cap on title-search results
pub const DEFAULT_SEARCH_LIMIT: i64 = 25;

/// How entity references are stored inside a movie document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkMode {
    /// Rewrite external ids to storage guids before the document is saved
    #[default]
    ResolvedId,
    /// Keep the external numeric ids as stored references
    NaturalKey,
}

impl FromStr for LinkMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "resolved-id" => Ok(LinkMode::ResolvedId),
            "natural-key" => Ok(LinkMode::NaturalKey),
            other => Err(Error::Config(format!(
                "Unknown link mode '{}', expected 'resolved-id' or 'natural-key'",
                other
            ))),
        }
    }
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkMode::ResolvedId => write!(f, "resolved-id"),
            LinkMode::NaturalKey => write!(f, "natural-key"),
        }
    }
}

/// Bootstrap configuration loaded from TOML
///
/// These settings cannot change during runtime; reopen the catalog to pick
/// up changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to the SQLite database file (relative or absolute)
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Reference representation written into movie documents
    #[serde(default)]
    pub link_mode: LinkMode,

    /// Worst fuzzy-match score still accepted by title search (0.0 = exact)
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Maximum number of hits returned by a title search
    #[serde(default = "default_search_limit")]
    pub search_limit: i64,
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("cinedex").join("catalog.db"))
        .unwrap_or_else(|| PathBuf::from("cinedex.db"))
}

fn default_similarity_threshold() -> f64 {
    1.0
}

fn default_search_limit() -> i64 {
    DEFAULT_SEARCH_LIMIT
}

/// Platform config file path: `<config_dir>/cinedex/config.toml`
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cinedex").join("config.toml"))
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            link_mode: LinkMode::default(),
            similarity_threshold: default_similarity_threshold(),
            search_limit: default_search_limit(),
        }
    }
}

impl CatalogConfig {
    /// Parse and validate a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: CatalogConfig = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration following the priority order
    ///
    /// 1. File named by `CINEDEX_CONFIG` (missing file is a hard error)
    /// 2. Platform config file, when present
    /// 3. Built-in defaults
    ///
    /// `CINEDEX_DATABASE` and `CINEDEX_LINK_MODE` override single fields
    /// regardless of where the rest of the configuration came from.
    pub fn resolve() -> Result<Self> {
        let mut config = if let Ok(path) = std::env::var("CINEDEX_CONFIG") {
            info!("Loading configuration from CINEDEX_CONFIG={}", path);
            Self::load(Path::new(&path))?
        } else if let Some(path) = default_config_file().filter(|p| p.exists()) {
            info!("Loading configuration from {:?}", path);
            Self::load(&path)?
        } else {
            CatalogConfig::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("CINEDEX_DATABASE") {
            self.database_path = PathBuf::from(path);
        }
        if let Ok(mode) = std::env::var("CINEDEX_LINK_MODE") {
            self.link_mode = mode.parse()?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(Error::Config(format!(
                "similarity_threshold must be within 0.0..=1.0, got {}",
                self.similarity_threshold
            )));
        }
        if self.search_limit <= 0 {
            return Err(Error::Config(format!(
                "search_limit must be positive, got {}",
                self.search_limit
            )));
        }
        Ok(())
    }
}
