//! # Storefront CLI
//!
//! Shared plumbing for the `storefront-gen`, `storefront-ask` and
//! `storefront-live` binaries: layered settings, logging and console output.

pub mod logging;
pub mod output;
pub mod settings;

pub use logging::LoggingConfig;
pub use settings::{Settings, DB_PATH_ENV, DEFAULT_CONFIG_FILE, DEFAULT_DB_PATH};
