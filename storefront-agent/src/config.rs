//! Agent configuration, the `[agent]` section of the TOML config.

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// LLM round trips allowed per question, repairs included. Defaults to 3.
    pub max_attempts: u32,

    /// Extra tries for a retryable provider failure. Defaults to 2.
    pub provider_retries: u32,

    /// Backoff step between provider retries; the n-th retry waits n steps.
    pub retry_backoff_ms: u64,

    /// Rows kept from a result. Defaults to 10000.
    pub max_rows: usize,

    /// Sample rows per table shown to the model. Defaults to 2.
    pub sample_rows: usize,

    /// Directory for `result.csv` and `chart.svg`. Defaults to `outputs`.
    pub out_dir: PathBuf,

    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            provider_retries: 2,
            retry_backoff_ms: 500,
            max_rows: 10_000,
            sample_rows: 2,
            out_dir: PathBuf::from("outputs"),
            chart_width: 900,
            chart_height: 450,
        }
    }
}

impl AgentConfig {
    pub fn csv_path(&self) -> PathBuf {
        self.out_dir.join("result.csv")
    }

    pub fn chart_path(&self) -> PathBuf {
        self.out_dir.join("chart.svg")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml() {
        let config: AgentConfig = toml::from_str("max_attempts = 5\nout_dir = \"/tmp/x\"").unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.max_rows, 10_000);
        assert_eq!(config.csv_path(), PathBuf::from("/tmp/x/result.csv"));
        assert_eq!(config.chart_path(), PathBuf::from("/tmp/x/chart.svg"));
    }
}
