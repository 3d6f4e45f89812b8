//! NBA Stats Fetcher
//!
//! Pulls season totals, player game logs, the league game log, the league
//! schedule and player positions from the NBA stats provider, runs them
//! through the box score engine and writes the resulting JSON artifacts.
//! Player game logs are only re-fetched for players whose games-played count
//! changed since the last run.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod retry;
pub mod source;

pub use client::NbaStatsClient;
pub use config::FetcherConfig;
pub use error::{FetchError, Result};
pub use models::*;
pub use pipeline::{
    build_game_counts, build_opponent_lists, load_player_cache, refresh_players, refresh_positions,
    refresh_schedule, PlayersRefresh, ScheduleFeed,
};
pub use source::{RosterSource, ScheduleSource, StatsSource};
