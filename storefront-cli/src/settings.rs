//! Layered settings.
//!
//! Built-in defaults, then the TOML file, then the environment (including a
//! `.env` file), then command-line flags. The binaries apply flags
//! themselves after [`Settings::load`].

use crate::logging::LoggingConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use storefront_agent::AgentConfig;
use storefront_data::GeneratorConfig;
use storefront_error::{Error, Result};
use storefront_llm::LlmConfig;

/// Config file read when `--config` is not given, if it exists
pub const DEFAULT_CONFIG_FILE: &str = "storefront.toml";

/// Environment variable naming the database file
pub const DB_PATH_ENV: &str = "STOREFRONT_DB_PATH";

pub const DEFAULT_DB_PATH: &str = "data/storefront.db";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Database file; `STOREFRONT_DB_PATH` and `--db-file` override it
    pub db_path: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub generator: GeneratorConfig,
    pub agent: AgentConfig,
    pub llm: LlmConfig,
}

impl Settings {
    pub fn parse_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            Error::config_invalid(format!("invalid config: {}", e.message()))
                .with_operation("settings::parse_toml")
                .set_source(e)
        })
    }

    /// Load `path`, or `storefront.toml` when no path is given.
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::from(e)
                .with_operation("settings::load")
                .with_context("path", path.display().to_string())
        })?;
        Self::parse_toml(&content)
    }

    /// Resolve the database path from the process environment.
    pub fn db_path(&self, flag: Option<PathBuf>) -> PathBuf {
        self.db_path_with(flag, |key| std::env::var(key).ok())
    }

    /// Flag, then environment, then file, then the built-in default.
    pub fn db_path_with(&self, flag: Option<PathBuf>, lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
        flag.or_else(|| lookup(DB_PATH_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
            .or_else(|| self.db_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH))
    }
}
