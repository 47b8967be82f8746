//! # Storefront Agent
//!
//! Answers natural-language questions about the storefront database:
//! 1. The question is routed to an intent (KPI, sentiment, general)
//! 2. The schema and a few sample rows are rendered into the prompt
//! 3. The model replies with one SELECT, which is checked and run read-only
//! 4. Execution errors go back to the model for a bounded number of repairs
//! 5. The rows land in a CSV and, when the shape allows, an SVG chart
//!
//! The model only ever proposes SQL; the executor decides what runs.

pub mod capability;
pub mod chart;
pub mod config;
pub mod executor;
pub mod export;
pub mod intent;
pub mod prompt;
pub mod runner;
pub mod schema;
pub mod sql;
pub mod table;

#[cfg(any(test, feature = "testkit"))]
pub mod testing;

pub use capability::{provider_error, Answer, DirectSql, LlmSqlAgent, SqlCapability};
pub use chart::{plan_chart, render_svg, ChartKind, ChartPlan};
pub use config::AgentConfig;
pub use executor::QueryExecutor;
pub use export::write_csv;
pub use intent::Intent;
pub use runner::{run, RunReport, DEFAULT_QUESTION};
pub use schema::{ColumnInfo, DatabaseSchema, TableInfo};
pub use sql::{extract_sql, sanitize, NO_QUERY_MARKER};
pub use table::{Cell, ResultTable};

pub use storefront_error::{Error, ErrorKind, Result};
