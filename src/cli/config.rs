//! TOML configuration file support.
//!
//! Settings that would otherwise be repeated on every invocation:
//!
//! ```toml
//! # nexafs.toml
//! [database]
//! path = "/data/nexafs.db"
//!
//! [search]
//! limit = 50
//! match_registry = true
//! match_external_id = false
//!
//! [ingest]
//! identifier_attempts = 10
//! ```
//!
//! Command-line flags take precedence over file values.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use nexafs::ingest::IngestConfig;
use nexafs::search::SearchConfig;

/// Root configuration structure for nexafs.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Search defaults.
    #[serde(default)]
    pub search: SearchSection,

    /// Ingest settings.
    #[serde(default)]
    pub ingest: IngestSection,
}

/// Database location.
#[derive(Debug, Default, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path.
    pub path: Option<PathBuf>,
}

/// Defaults for the search command.
#[derive(Debug, Default, Deserialize)]
pub struct SearchSection {
    /// Default page size.
    pub limit: Option<usize>,

    /// Match CAS registry numbers.
    pub match_registry: Option<bool>,

    /// Match PubChem ids.
    pub match_external_id: Option<bool>,
}

/// Settings for the ingest and bulk-load commands.
#[derive(Debug, Default, Deserialize)]
pub struct IngestSection {
    /// Generated sample identifiers tried before accepting a collision.
    pub identifier_attempts: Option<usize>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Search configuration with file overrides applied.
    pub fn search_config(&self) -> SearchConfig {
        let mut config = SearchConfig::default();
        if let Some(limit) = self.search.limit {
            config.default_limit = limit;
        }
        config
    }

    /// Ingest configuration with file overrides applied.
    pub fn ingest_config(&self) -> IngestConfig {
        let mut config = IngestConfig::default();
        if let Some(attempts) = self.ingest.identifier_attempts {
            config.identifier_attempts = attempts;
        }
        config
    }
}
