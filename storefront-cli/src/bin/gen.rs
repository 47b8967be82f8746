//! Generate the synthetic storefront database.
//!
//! Usage:
//!   storefront-gen
//!   storefront-gen --stores 5 --products 40 --sales 2000 --seed 7
//!   storefront-gen --end-date 2024-03-31 --days 30 --db-file /tmp/shop.db

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use storefront_cli::{output, Settings};
use storefront_data::{store, Dataset, WriteSummary};
use storefront_error::Result;
use tracing::info;

#[derive(Parser)]
#[command(name = "storefront-gen")]
#[command(version, about = "Generate the synthetic storefront database")]
struct Cli {
    /// Number of stores
    #[arg(long)]
    stores: Option<usize>,

    /// Number of products
    #[arg(long)]
    products: Option<usize>,

    /// Number of sales transactions
    #[arg(long)]
    sales: Option<usize>,

    /// Number of customer feedback rows
    #[arg(long)]
    feedback: Option<usize>,

    /// Days of history ending at --end-date
    #[arg(long)]
    days: Option<u32>,

    /// RNG seed for a reproducible dataset
    #[arg(long)]
    seed: Option<u64>,

    /// Last day of the window (YYYY-MM-DD, default today)
    #[arg(long)]
    end_date: Option<NaiveDate>,

    /// Relative revenue noise, e.g. 0.05 for +/-5%
    #[arg(long)]
    price_noise: Option<f64>,

    /// Database file to (re)create
    #[arg(long)]
    db_file: Option<PathBuf>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => return output::fail(&e),
    };
    settings.logging.init();

    match generate(cli, settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => output::fail(&e),
    }
}

fn generate(cli: Cli, settings: Settings) -> Result<()> {
    let db_path = settings.db_path(cli.db_file);
    let mut config = settings.generator;
    if let Some(n) = cli.stores {
        config.stores = n;
    }
    if let Some(n) = cli.products {
        config.products = n;
    }
    if let Some(n) = cli.sales {
        config.sales = n;
    }
    if let Some(n) = cli.feedback {
        config.feedback = n;
    }
    if let Some(days) = cli.days {
        config.history_days = days;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.end_date.is_some() {
        config.end_date = cli.end_date;
    }
    if let Some(noise) = cli.price_noise {
        config.price_noise = noise;
    }

    info!(path = %db_path.display(), seed = ?config.seed, "generating dataset");
    let dataset = Dataset::generate(&config)?;
    let summary = store::create_database(&db_path, &dataset)?;
    print_summary(&db_path, &summary);
    Ok(())
}

fn print_summary(path: &std::path::Path, summary: &WriteSummary) {
    println!("Created {}", path.display());
    for (table, rows) in &summary.rows {
        println!("  {:<18} {:>7} rows", table, rows);
    }
    println!("  total revenue      {:>12.2}", summary.total_revenue);
}
