//! Capabilities the refresh pipelines need from the provider

use crate::error::Result;
use crate::models::{ActivePlayer, RosterEntry, ScheduledGame, TeamGame};
use async_trait::async_trait;
use box_score_engine::{EventRecord, PlayerId};

/// Season roster and per-player game logs
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Every player with season totals; failure aborts the run
    async fn fetch_roster(&self, season: &str) -> Result<Vec<RosterEntry>>;

    /// The player's game log for the season; windows are cut by the caller
    async fn fetch_events(&self, player_id: PlayerId, season: &str) -> Result<Vec<EventRecord>>;
}

/// League-wide game data for weekly bucketing
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// One row per team per game played
    async fn fetch_team_games(&self, season: &str) -> Result<Vec<TeamGame>>;

    /// Every scheduled game, all season phases included
    async fn fetch_league_schedule(&self) -> Result<Vec<ScheduledGame>>;
}

/// Active players and their listed positions
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn fetch_active_players(&self, season: &str) -> Result<Vec<ActivePlayer>>;

    /// `None` when the provider lists no position
    async fn fetch_player_position(&self, player_id: PlayerId) -> Result<Option<String>>;
}
