//! Ask a question about the storefront database.
//!
//! Usage:
//!   storefront-ask
//!   storefront-ask "Top 5 products by revenue"
//!   storefront-ask --provider anthropic "Which stores get the most complaints?"
//!   storefront-ask --sql "SELECT Region, COUNT(*) FROM stores GROUP BY Region"

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use storefront_agent::{provider_error, run, DirectSql, LlmSqlAgent, QueryExecutor, RunReport};
use storefront_cli::{output, Settings};
use storefront_error::Result;
use storefront_llm::{AnthropicProvider, LlmProvider, OpenAIProvider, ProviderType};

#[derive(Parser)]
#[command(name = "storefront-ask")]
#[command(version, about = "Answer a question about the storefront data with SQL")]
struct Cli {
    /// Question in plain language
    question: Option<String>,

    /// Database file to query
    #[arg(long)]
    db_file: Option<PathBuf>,

    /// Directory for result.csv and chart.svg
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// LLM provider (openai, anthropic, local)
    #[arg(long)]
    provider: Option<ProviderType>,

    /// Model name
    #[arg(long)]
    model: Option<String>,

    /// Run this SELECT instead of asking a model
    #[arg(long)]
    sql: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => return output::fail(&e),
    };
    settings.logging.init();

    match ask(cli, settings).await {
        Ok(report) => {
            print!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => output::fail(&e),
    }
}

async fn ask(cli: Cli, mut settings: Settings) -> Result<RunReport> {
    if let Some(dir) = cli.out_dir {
        settings.agent.out_dir = dir;
    }
    if let Some(provider) = cli.provider {
        settings.llm.provider = provider;
    }
    if cli.model.is_some() {
        settings.llm.model = cli.model;
    }

    let executor = QueryExecutor::open(settings.db_path(cli.db_file))?;
    let question = cli.question.unwrap_or_default();

    if let Some(sql) = cli.sql {
        let mut direct = DirectSql::new(sql, settings.agent.max_rows);
        return run(&mut direct, &executor, &question, &settings.agent).await;
    }

    let provider_config = settings.llm.resolve()?;
    match settings.llm.provider {
        ProviderType::Anthropic => {
            let provider = AnthropicProvider::new(provider_config).map_err(provider_error)?;
            ask_model(provider, &executor, &question, &settings).await
        }
        ProviderType::OpenAI | ProviderType::Local => {
            let provider = OpenAIProvider::new(provider_config).map_err(provider_error)?;
            ask_model(provider, &executor, &question, &settings).await
        }
    }
}

async fn ask_model<P: LlmProvider>(
    provider: P,
    executor: &QueryExecutor,
    question: &str,
    settings: &Settings,
) -> Result<RunReport> {
    let mut agent = LlmSqlAgent::new(provider, settings.agent.clone()).with_llm_config(&settings.llm);
    let pb = output::spinner("Asking the model for SQL...");
    let result = run(&mut agent, executor, question, &settings.agent).await;
    pb.finish_and_clear();
    result
}
