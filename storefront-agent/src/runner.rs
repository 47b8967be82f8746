//! One question, end to end: schema, capability, CSV, chart.

use crate::capability::SqlCapability;
use crate::chart::{self, ChartKind};
use crate::config::AgentConfig;
use crate::executor::QueryExecutor;
use crate::export;
use crate::intent::Intent;
use crate::table::ResultTable;
use std::fmt;
use std::path::{Path, PathBuf};
use storefront_error::{Error, Result};
use tracing::{info, warn};

/// Default question when none is given
pub const DEFAULT_QUESTION: &str = "Show revenue trend for the last 30 days";

const PREVIEW_ROWS: usize = 5;

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub question: String,
    pub intent: Intent,
    pub sql: String,
    pub table: ResultTable,
    pub attempts: u32,
    pub csv_path: PathBuf,
    pub chart_path: Option<PathBuf>,
    pub chart_kind: Option<ChartKind>,
    /// Usage summary line, when a model was called
    pub usage: Option<String>,
}

/// Answer `question` and write the artifacts.
///
/// Nothing is written unless the capability returns a result. An empty or
/// unchartable result removes any chart left by an earlier run.
pub async fn run<C: SqlCapability>(
    capability: &mut C,
    executor: &QueryExecutor,
    question: &str,
    config: &AgentConfig,
) -> Result<RunReport> {
    let question = match question.trim() {
        "" => DEFAULT_QUESTION,
        q => q,
    };
    let intent = Intent::classify(question);
    info!(question, %intent, "answering question");

    let schema = executor.schema(config.sample_rows)?;
    let answer = capability.answer(question, &schema, executor).await?;

    // The chart is fully rendered before either artifact is committed
    let csv_path = config.csv_path();
    let chart_path = config.chart_path();
    let plan = chart::plan_chart(&answer.table);
    let staged_chart = match &plan {
        Some(plan) => {
            let tmp = export::staging_file(&chart_path, "runner::run")?;
            chart::render_svg(
                plan,
                question,
                tmp.path(),
                (config.chart_width, config.chart_height),
            )?;
            Some(tmp)
        }
        None => None,
    };

    match staged_chart {
        Some(tmp) => export::commit(tmp, &chart_path, "runner::run", |msg| Error::chart_failed(msg))?,
        None => remove_stale_chart(&chart_path),
    }
    if let Err(e) = export::write_csv(&answer.table, &csv_path) {
        remove_stale_chart(&chart_path);
        return Err(e);
    }
    let chart_kind = plan.as_ref().map(|p| p.kind);

    info!(
        rows = answer.table.row_count(),
        chart = chart_kind.map(|k| k.as_str()).unwrap_or("none"),
        "run complete"
    );

    Ok(RunReport {
        question: question.to_string(),
        intent,
        sql: answer.sql,
        table: answer.table,
        attempts: answer.attempts,
        csv_path,
        chart_path: chart_kind.map(|_| chart_path),
        chart_kind,
        usage: capability.usage().map(|u| u.summary()),
    })
}

fn remove_stale_chart(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "could not remove stale chart");
        }
    }
}

/// Console summary
impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Question: {}", self.question)?;
        writeln!(f, "Intent:   {}", self.intent)?;
        writeln!(f, "SQL:      {}", self.sql)?;
        if self.attempts > 1 {
            writeln!(f, "Attempts: {}", self.attempts)?;
        }

        let rows = self.table.row_count();
        write!(f, "Rows:     {}", rows)?;
        if self.table.truncated {
            write!(f, " (truncated)")?;
        }
        writeln!(f)?;

        if rows == 0 {
            writeln!(f, "No rows matched; wrote header-only CSV.")?;
        } else {
            writeln!(f)?;
            writeln!(f, "{}", self.table.columns.join(" | "))?;
            for row in self.table.rows.iter().take(PREVIEW_ROWS) {
                let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
                writeln!(f, "{}", cells.join(" | "))?;
            }
            if rows > PREVIEW_ROWS {
                writeln!(f, "... {} more", rows - PREVIEW_ROWS)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Saved {}", self.csv_path.display())?;
        if let (Some(path), Some(kind)) = (&self.chart_path, self.chart_kind) {
            writeln!(f, "Saved {} ({} chart)", path.display(), kind.as_str())?;
        }
        if let Some(usage) = &self.usage {
            writeln!(f, "Usage:    {}", usage)?;
        }
        Ok(())
    }
}
