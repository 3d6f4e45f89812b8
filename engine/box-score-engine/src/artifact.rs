//! Players artifact written at the end of each run

use crate::indexer::{MinMaxIndexer, PopulationIndexSet};
use crate::models::{EntitySnapshot, FailedEntity, PlayerId};
use crate::reconciler::PlayerCache;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Run metadata written alongside the players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    pub season: String,
    /// Players returned by the league roster feed
    pub total_players: usize,
    pub players_loaded: usize,
    pub players_failed: usize,
    pub fetched_at: DateTime<Utc>,
}

/// The players document handed to the presentation layer
///
/// Also the cache read by the next run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayersArtifact {
    #[serde(rename = "_meta")]
    pub meta: RunMeta,
    pub players: Vec<EntitySnapshot>,
    #[serde(default)]
    pub failed_players: Vec<FailedEntity>,
    #[serde(default)]
    pub population_index: PopulationIndexSet,
}

impl PlayersArtifact {
    /// Assemble the artifact and compute the population index over `players`
    pub fn assemble(
        season: impl Into<String>,
        total_players: usize,
        players: Vec<EntitySnapshot>,
        failed_players: Vec<FailedEntity>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let population_index = MinMaxIndexer::index_all(&players);
        let meta = RunMeta {
            season: season.into(),
            total_players,
            players_loaded: players.len(),
            players_failed: failed_players.len(),
            fetched_at,
        };
        Self { meta, players, failed_players, population_index }
    }

    /// Turn this artifact into the next run's read-only cache
    ///
    /// Players listed under `failed_players` carry zero fallback windows and
    /// are left out so the next run recomputes them.
    pub fn into_cache(self) -> PlayerCache {
        let failed: HashSet<PlayerId> = self.failed_players.iter().map(|failed| failed.id).collect();
        PlayerCache::from_snapshots(self.players.into_iter().filter(|snapshot| !failed.contains(&snapshot.id)))
    }
}
