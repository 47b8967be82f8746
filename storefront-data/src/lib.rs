//! # Storefront Data
//!
//! Synthetic retail chain dataset: stores, products, inventory, sales and
//! customer feedback, generated with referential integrity and written to a
//! single SQLite file.
//!
//! ## Core Concepts
//! - **Dimensions**: stores and products, generated first
//! - **Facts**: inventory, sales and feedback, which reference dimensions
//! - **Dataset**: the whole in-memory population, verified before it is written
//! - **Store**: SQLite persistence, one transaction per write
//! - **Simulator**: appends live sales to an existing database

pub mod catalog;
pub mod config;
pub mod generator;
pub mod model;
pub mod simulate;
pub mod store;

pub use config::{GeneratorConfig, PolarityWeights, Window};
pub use model::{Catalog, Dataset, Feedback, InventoryRow, Polarity, Product, Sale, Store};
pub use simulate::LiveSimulator;
pub use store::{WriteSummary, TABLES};

pub use storefront_error::{Error, ErrorKind, Result};

/// Timestamp layout used for every `Date` column (SQLite `DATE()` friendly)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date layout used for `LastRestockDate`
pub const DATE_FORMAT: &str = "%Y-%m-%d";
