use anyhow::{Context, Result};
use artifact_store::{ArtifactKind, ArtifactStore};
use box_score_engine::{Category, Metric, PlayerRater, Window};
use clap::{Parser, ValueEnum};
use nba_stats_fetcher::cli::{open_store, CommonArgs};
use nba_stats_fetcher::logging::initialize_logging;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WindowArg {
    Season,
    Last7,
    Last14,
}

impl From<WindowArg> for Window {
    fn from(arg: WindowArg) -> Self {
        match arg {
            WindowArg::Season => Window::Season,
            WindowArg::Last7 => Window::Last7,
            WindowArg::Last14 => Window::Last14,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MetricArg {
    Totals,
    Averages,
}

impl From<MetricArg> for Metric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Totals => Metric::Totals,
            MetricArg::Averages => Metric::Averages,
        }
    }
}

/// Rank players from the last players artifact by category z-scores
#[derive(Parser)]
#[command(name = "rank-players")]
#[command(about = "Rank players by capped category z-scores")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[arg(long, value_enum, default_value = "season")]
    window: WindowArg,

    #[arg(long, value_enum, default_value = "averages")]
    metric: MetricArg,

    /// Number of players to print
    #[arg(long, default_value = "25")]
    top: usize,

    /// Categories to ignore (e.g., --punt ft_pct,tov)
    #[arg(long, value_delimiter = ',')]
    punt: Vec<String>,
}

fn parse_category(key: &str) -> Result<Category> {
    let wanted = key.trim().to_lowercase();
    Category::ALL
        .iter()
        .copied()
        .find(|category| category.key() == wanted)
        .with_context(|| format!("Unknown category: {}", key))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.common.load_config()?;
    initialize_logging(&config.logging.level)?;

    let store = open_store(&config).await?;
    let artifact = store.load_players().await?.with_context(|| {
        format!(
            "No players artifact at {:?}; run fetch-players first",
            config.store.path_for(ArtifactKind::Players)
        )
    })?;

    let mut rater = PlayerRater::new();
    for key in &cli.punt {
        rater = rater.with_weight(parse_category(key)?, 0.0);
    }

    let window = Window::from(cli.window);
    let metric = Metric::from(cli.metric);
    let ratings = rater.rate(&artifact.players, window, metric);

    println!(
        "{} players, {} {:?}, fetched {}",
        ratings.len(),
        window.key(),
        metric,
        artifact.meta.fetched_at.format("%Y-%m-%d %H:%M UTC")
    );
    println!("{:>4}  {:<28} {:<4} {:>7}", "Rank", "Player", "Team", "Rating");
    for rating in ratings.iter().take(cli.top) {
        println!("{:>4}  {:<28} {:<4} {:>7.3}", rating.rank, rating.name, rating.team, rating.rating);
    }

    Ok(())
}
