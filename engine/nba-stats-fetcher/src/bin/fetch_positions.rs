use anyhow::Result;
use clap::Parser;
use nba_stats_fetcher::cli::{open_store, CommonArgs};
use nba_stats_fetcher::logging::initialize_logging;
use nba_stats_fetcher::{refresh_positions, NbaStatsClient};
use tracing::info;

/// Record every active player's listed position
#[derive(Parser)]
#[command(name = "fetch-positions")]
#[command(about = "Fetch positions for all active players")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.common.load_config()?;
    initialize_logging(&config.logging.level)?;

    let client = NbaStatsClient::new(&config)?;
    let store = open_store(&config).await?;

    let artifact = refresh_positions(&client, &store, &config.api.season).await?;

    info!(
        "Wrote {} positions ({} unknown after failures)",
        artifact.players.len(),
        artifact.meta.failed_players.len()
    );
    Ok(())
}
