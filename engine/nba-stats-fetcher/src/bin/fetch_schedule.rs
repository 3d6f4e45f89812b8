use anyhow::Result;
use clap::Parser;
use nba_stats_fetcher::cli::{open_store, CommonArgs};
use nba_stats_fetcher::logging::initialize_logging;
use nba_stats_fetcher::{refresh_schedule, NbaStatsClient, ScheduleFeed};
use std::time::Instant;
use tracing::info;

/// Group the season's games into Monday-anchored weeks per team
#[derive(Parser)]
#[command(name = "fetch-schedule")]
#[command(about = "Build weekly per-team schedule artifacts")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// game-log counts games per team; league-schedule lists opponents
    #[arg(long, value_enum, default_value = "game-log")]
    feed: ScheduleFeed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.common.load_config()?;
    initialize_logging(&config.logging.level)?;

    let start = Instant::now();
    info!("Fetching NBA schedule for {} ({:?})", config.api.season, cli.feed);

    let client = NbaStatsClient::new(&config)?;
    let store = open_store(&config).await?;

    refresh_schedule(&client, &store, &config.api.season, cli.feed).await?;

    info!(
        "Saved {:?} in {:.2?}",
        config.store.path_for(cli.feed.artifact_kind()),
        start.elapsed()
    );
    Ok(())
}
