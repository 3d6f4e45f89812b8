use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use nba_stats_fetcher::cli::{open_store, CommonArgs};
use nba_stats_fetcher::logging::initialize_logging;
use nba_stats_fetcher::{refresh_players, NbaStatsClient};
use std::time::Instant;
use tracing::info;

/// Refresh season, last 7 and last 14 day player stats
#[derive(Parser)]
#[command(name = "fetch-players")]
#[command(about = "Refresh player season and trailing-window stats")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Evaluate trailing windows as of this date (YYYY-MM-DD); defaults to today in UTC
    #[arg(long)]
    today: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.common.load_config()?;
    initialize_logging(&config.logging.level)?;

    let start = Instant::now();
    info!("Fetching season {} player stats", config.api.season);

    let client = NbaStatsClient::new(&config)?;
    let store = open_store(&config).await?;
    let today = cli.today.unwrap_or_else(|| Utc::now().date_naive());

    refresh_players(&client, &store, &config.api.season, today).await?;

    info!("Completed in {:.2?}", start.elapsed());
    Ok(())
}
