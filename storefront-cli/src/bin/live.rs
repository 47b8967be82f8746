//! Append simulated sales to an existing storefront database.
//!
//! Usage:
//!   storefront-live
//!   storefront-live --interval 0.5 --count 20

use chrono::Utc;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use storefront_cli::{output, Settings};
use storefront_data::{store, LiveSimulator};
use storefront_error::{Error, Result};
use tracing::info;

#[derive(Parser)]
#[command(name = "storefront-live")]
#[command(version, about = "Append a stream of simulated sales until Ctrl-C")]
struct Cli {
    /// Mean seconds between sales
    #[arg(long, default_value_t = 2.0)]
    interval: f64,

    /// Stop after this many sales
    #[arg(long)]
    count: Option<u64>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Database file to append to
    #[arg(long)]
    db_file: Option<PathBuf>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
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

    match simulate(cli, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => output::fail(&e),
    }
}

async fn simulate(cli: Cli, settings: Settings) -> Result<()> {
    let interval = Duration::try_from_secs_f64(cli.interval).map_err(|e| {
        Error::invalid_argument(format!("--interval {}: {}", cli.interval, e)).with_operation("live::simulate")
    })?;

    let db_path = settings.db_path(cli.db_file);
    let conn = store::open_existing(&db_path)?;
    let catalog = store::load_catalog(&conn)?;
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut sim = LiveSimulator::new(catalog, rng)?;
    let done = |produced: u64| cli.count.is_some_and(|max| produced >= max);

    info!(path = %db_path.display(), interval_secs = cli.interval, "live simulation started");
    while !done(sim.produced()) {
        let sale = sim.next_sale(Utc::now().naive_utc());
        store::insert_sale(&conn, &sale)?;
        println!(
            "{} {} {} x{} = {:.2}",
            sale.timestamp.format(storefront_data::TIMESTAMP_FORMAT),
            sale.store_id,
            sale.product_name,
            sale.units_sold,
            sale.total_revenue
        );

        if done(sim.produced()) {
            break;
        }
        let delay = sim.next_delay(interval);
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    info!(sales = sim.produced(), "live simulation stopped");
    Ok(())
}
