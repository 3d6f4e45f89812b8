use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use nba_stats_fetcher::cli::{open_store, CommonArgs};
use nba_stats_fetcher::logging::initialize_logging;
use nba_stats_fetcher::{refresh_players, refresh_schedule, NbaStatsClient, ScheduleFeed};
use tracing::{error, info};

/// Run a full refresh: players, then the weekly game counts
#[derive(Parser)]
#[command(name = "nba-stats-fetcher")]
#[command(about = "Refresh player stats and the weekly schedule")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.common.load_config()?;
    initialize_logging(&config.logging.level)?;

    info!("Starting NBA stats refresh for {}", config.api.season);
    info!("Loaded configuration: {:?}", config);

    let client = NbaStatsClient::new(&config)?;
    let store = open_store(&config).await?;
    let today = Utc::now().date_naive();

    refresh_players(&client, &store, &config.api.season, today).await?;

    if let Err(e) = refresh_schedule(&client, &store, &config.api.season, ScheduleFeed::GameLog).await {
        error!("Schedule refresh failed: {:#}", e);
        return Err(e);
    }

    info!("Refresh complete");
    Ok(())
}
