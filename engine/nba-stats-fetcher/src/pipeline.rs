//! Refresh runs: fetch, aggregate and replace the artifacts

use crate::models::{PlayerPosition, PositionsArtifact, ScheduledGame, TeamGame, UNKNOWN_POSITION};
use crate::source::{RosterSource, ScheduleSource, StatsSource};
use anyhow::{Context, Result};
use artifact_store::{ArtifactKind, ArtifactStore};
use box_score_engine::{
    CacheReconciler, EntitySnapshot, FailedEntity, Matchup, OpponentLists, PlayerCache,
    PlayersArtifact, RecentWindows, RollingWindowAggregate, ScheduleCounts, ScheduleEntry,
    StatAggregator, TeamId, WeekBucketizer,
};
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use tracing::{error, info, warn};

/// Which schedule feed drives the weekly buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ScheduleFeed {
    /// Games per team per week from the league game log
    GameLog,
    /// Opponents per team per week from the published league schedule
    LeagueSchedule,
}

impl ScheduleFeed {
    pub fn artifact_kind(self) -> ArtifactKind {
        match self {
            ScheduleFeed::GameLog => ArtifactKind::Schedule,
            ScheduleFeed::LeagueSchedule => ArtifactKind::Opponents,
        }
    }
}

/// What a players refresh did
#[derive(Debug, Clone)]
pub struct PlayersRefresh {
    pub artifact: PlayersArtifact,
    /// Players whose cached windows were carried over
    pub reused: usize,
    /// Players whose game logs were fetched again
    pub recomputed: usize,
}

/// Load last run's players artifact as a cache
///
/// A missing artifact means a cold start. An unreadable one is logged and
/// also treated as a cold start so the run can still replace it.
pub async fn load_player_cache<A>(store: &A) -> PlayerCache
where
    A: ArtifactStore + ?Sized,
{
    match store.load_players().await {
        Ok(Some(artifact)) => {
            let cache = artifact.into_cache();
            info!("Loaded {} cached players", cache.len());
            cache
        }
        Ok(None) => {
            info!("No cached players, computing every player");
            PlayerCache::empty()
        }
        Err(e) => {
            warn!("Ignoring unreadable players cache: {}", e);
            PlayerCache::empty()
        }
    }
}

/// Refresh every player's windows and replace the players artifact
///
/// A roster failure aborts the run before anything is written. A game log
/// failure only affects that player: their trailing windows are zero and
/// they are listed under `failed_players`.
pub async fn refresh_players<S, A>(
    source: &S,
    store: &A,
    season: &str,
    today: NaiveDate,
) -> Result<PlayersRefresh>
where
    S: StatsSource + ?Sized,
    A: ArtifactStore + ?Sized,
{
    let cache = load_player_cache(store).await;

    let roster = source
        .fetch_roster(season)
        .await
        .with_context(|| format!("Failed to fetch league roster for {}", season))?;

    let aggregator = StatAggregator::new(today);
    let mut players = Vec::with_capacity(roster.len());
    let mut failed = Vec::new();
    let mut reused = 0;
    let mut recomputed = 0;

    for entry in &roster {
        let player_id = entry.id;
        let gp = entry.totals.gp;

        let reconciliation =
            CacheReconciler::reconcile_async(player_id, gp, cache.get(player_id), move || async move {
                source
                    .fetch_events(player_id, season)
                    .await
                    .map(|events| aggregator.recent_windows(&events))
            })
            .await;

        let windows = match reconciliation {
            Ok(reconciliation) => {
                if reconciliation.is_reused() {
                    reused += 1;
                } else {
                    recomputed += 1;
                }
                reconciliation.into_owned()
            }
            Err(e) => {
                error!("Failed for {}: {}", entry.name, e);
                failed.push(FailedEntity { id: player_id, name: entry.name.clone(), reason: e.to_string() });
                RecentWindows::zero()
            }
        };

        players.push(EntitySnapshot {
            id: player_id,
            name: entry.name.clone(),
            team_id: entry.team_id,
            team: entry.team.clone(),
            season: RollingWindowAggregate::from_totals(entry.totals.clone()),
            last7: windows.last7,
            last14: windows.last14,
        });
        info!("Added {}", entry.name);
    }

    let artifact = PlayersArtifact::assemble(season, roster.len(), players, failed, Utc::now());
    store.replace_players(&artifact).await.context("Failed to write players artifact")?;

    info!(
        "Finished! {}/{} players loaded ({} reused, {} recomputed, {} failed)",
        artifact.meta.players_loaded,
        artifact.meta.total_players,
        reused,
        recomputed,
        artifact.meta.players_failed
    );

    Ok(PlayersRefresh { artifact, reused, recomputed })
}

/// Tricode for a team id, falling back to the id itself
fn team_code(lookup: &HashMap<TeamId, String>, id: &TeamId) -> String {
    lookup.get(id).cloned().unwrap_or_else(|| id.to_string())
}

/// Games per team per week, keyed by tricode
pub fn build_game_counts(games: &[TeamGame]) -> ScheduleCounts<String> {
    let lookup: HashMap<TeamId, String> = games
        .iter()
        .filter_map(|game| game.team.clone().map(|code| (game.team_id, code)))
        .collect();

    let entries: Vec<ScheduleEntry<TeamId>> = games
        .iter()
        .map(|game| ScheduleEntry { game_date: game.game_date, team: game.team_id, opponent: None })
        .collect();

    WeekBucketizer::for_game_counts()
        .count_games(&entries)
        .with_team_keys(|id| team_code(&lookup, id))
}

/// Opponents per team per week over regular season games, keyed by tricode
pub fn build_opponent_lists(games: &[ScheduledGame]) -> OpponentLists<String> {
    let regular_season: Vec<&ScheduledGame> = games.iter().filter(|game| game.is_regular_season()).collect();

    let lookup: HashMap<TeamId, String> = regular_season
        .iter()
        .flat_map(|game| [&game.home, &game.away])
        .filter_map(|team| team.code.clone().map(|code| (team.id, code)))
        .collect();

    let matchups: Vec<Matchup<TeamId>> = regular_season
        .iter()
        .map(|game| Matchup { game_date: game.game_date, home: game.home.id, away: game.away.id })
        .collect();

    WeekBucketizer::for_opponent_lists()
        .collect_opponents(&matchups)
        .with_team_keys(|id| team_code(&lookup, id))
}

/// Rebuild one weekly schedule artifact; returns the number of weeks written
pub async fn refresh_schedule<S, A>(source: &S, store: &A, season: &str, feed: ScheduleFeed) -> Result<usize>
where
    S: ScheduleSource + ?Sized,
    A: ArtifactStore + ?Sized,
{
    let (document, weeks) = match feed {
        ScheduleFeed::GameLog => {
            let games = source
                .fetch_team_games(season)
                .await
                .with_context(|| format!("Failed to fetch league game log for {}", season))?;
            let counts = build_game_counts(&games);
            (serde_json::to_value(&counts)?, counts.len())
        }
        ScheduleFeed::LeagueSchedule => {
            let games = source.fetch_league_schedule().await.context("Failed to fetch league schedule")?;
            let opponents = build_opponent_lists(&games);
            (serde_json::to_value(&opponents)?, opponents.len())
        }
    };

    store
        .replace_document(feed.artifact_kind(), &document)
        .await
        .context("Failed to write schedule artifact")?;

    info!("Finished! {} weeks written for {:?}", weeks, feed);
    Ok(weeks)
}

/// Look up every active player's position and replace the positions artifact
///
/// A failed lookup records the player as unknown and lists the id under
/// `meta.failed_players`.
pub async fn refresh_positions<R, A>(source: &R, store: &A, season: &str) -> Result<PositionsArtifact>
where
    R: RosterSource + ?Sized,
    A: ArtifactStore + ?Sized,
{
    let active = source
        .fetch_active_players(season)
        .await
        .with_context(|| format!("Failed to fetch players for {}", season))?;

    let mut artifact = PositionsArtifact::default();
    for player in &active {
        let position = match source.fetch_player_position(player.id).await {
            Ok(Some(position)) => {
                info!("{} loaded", player.id);
                position
            }
            Ok(None) => UNKNOWN_POSITION.to_string(),
            Err(e) => {
                warn!("Failed to fetch position for player {}: {}", player.id, e);
                artifact.meta.failed_players.push(player.id);
                UNKNOWN_POSITION.to_string()
            }
        };
        artifact.players.push(PlayerPosition { player_id: player.id, position });
    }

    let document = serde_json::to_value(&artifact)?;
    store
        .replace_document(ArtifactKind::Positions, &document)
        .await
        .context("Failed to write positions artifact")?;

    info!("Fetched {} active players", artifact.players.len());
    if !artifact.meta.failed_players.is_empty() {
        warn!(
            "Failed to fetch position for {} players: {:?}",
            artifact.meta.failed_players.len(),
            artifact.meta.failed_players
        );
    }
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, Result as FetchResult};
    use crate::models::{ActivePlayer, RosterEntry, TeamRef};
    use artifact_store::{InMemoryArtifactStore, StoreConfig};
    use async_trait::async_trait;
    use box_score_engine::{EventRecord, PlayerId, StatTotals};
    use chrono::Duration;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 11, 20)
    }

    fn roster_entry(id: PlayerId, gp: u32, pts: u32) -> RosterEntry {
        RosterEntry {
            id,
            name: format!("Player {id}"),
            team_id: 1610612738,
            team: "BOS".to_string(),
            totals: StatTotals { gp, pts, ..Default::default() },
        }
    }

    fn game(days_ago: i64, pts: u32) -> EventRecord {
        let mut event = EventRecord::on(today() - Duration::days(days_ago));
        event.pts = pts;
        event
    }

    #[derive(Default)]
    struct MockStats {
        roster: Vec<RosterEntry>,
        events: HashMap<PlayerId, Vec<EventRecord>>,
        failing: HashSet<PlayerId>,
        roster_fails: bool,
        calls: Mutex<Vec<PlayerId>>,
    }

    impl MockStats {
        fn calls(&self) -> Vec<PlayerId> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatsSource for MockStats {
        async fn fetch_roster(&self, _season: &str) -> FetchResult<Vec<RosterEntry>> {
            if self.roster_fails {
                return Err(FetchError::status("leaguedashplayerstats", 500));
            }
            Ok(self.roster.clone())
        }

        async fn fetch_events(&self, player_id: PlayerId, _season: &str) -> FetchResult<Vec<EventRecord>> {
            self.calls.lock().unwrap().push(player_id);
            if self.failing.contains(&player_id) {
                return Err(FetchError::status("playergamelog", 503));
            }
            Ok(self.events.get(&player_id).cloned().unwrap_or_default())
        }
    }

    async fn memory_store() -> InMemoryArtifactStore {
        let mut store = InMemoryArtifactStore::new(StoreConfig::default());
        store.initialize().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_cold_start_fetches_every_player() {
        let store = memory_store().await;
        let source = MockStats {
            roster: vec![roster_entry(1, 3, 60), roster_entry(2, 1, 8)],
            events: HashMap::from([(1, vec![game(0, 10), game(3, 20), game(10, 30)]), (2, vec![game(20, 8)])]),
            ..Default::default()
        };

        let refresh = refresh_players(&source, &store, "2025-26", today()).await.unwrap();

        assert_eq!(refresh.recomputed, 2);
        assert_eq!(refresh.reused, 0);
        let player = &refresh.artifact.players[0];
        assert_eq!(player.season.totals.pts, 60);
        assert_eq!(player.last7.totals.pts, 30);
        assert_eq!(player.last14.totals.pts, 60);
        assert_eq!(refresh.artifact.players[1].last14, RollingWindowAggregate::zero());

        let written = store.load_players().await.unwrap().unwrap();
        assert_eq!(written, refresh.artifact);
    }

    #[tokio::test]
    async fn test_unchanged_games_played_reuses_cache() {
        let store = memory_store().await;
        let first = MockStats {
            roster: vec![roster_entry(1, 3, 60), roster_entry(2, 5, 40)],
            events: HashMap::from([(1, vec![game(1, 20)]), (2, vec![game(2, 8)])]),
            ..Default::default()
        };
        refresh_players(&first, &store, "2025-26", today()).await.unwrap();

        // Player 2 played again; player 1 did not
        let second = MockStats {
            roster: vec![roster_entry(1, 3, 60), roster_entry(2, 6, 52)],
            events: HashMap::from([(1, vec![game(1, 99)]), (2, vec![game(0, 12), game(2, 8)])]),
            ..Default::default()
        };
        let refresh = refresh_players(&second, &store, "2025-26", today()).await.unwrap();

        assert_eq!(second.calls(), vec![2]);
        assert_eq!(refresh.reused, 1);
        assert_eq!(refresh.recomputed, 1);
        assert_eq!(refresh.artifact.players[0].last7.totals.pts, 20);
        assert_eq!(refresh.artifact.players[1].last7.totals.pts, 20);
    }

    #[tokio::test]
    async fn test_player_failure_is_isolated() {
        let store = memory_store().await;
        let source = MockStats {
            roster: vec![roster_entry(1, 3, 60), roster_entry(2, 2, 10)],
            events: HashMap::from([(2, vec![game(1, 10)])]),
            failing: HashSet::from([1]),
            ..Default::default()
        };

        let refresh = refresh_players(&source, &store, "2025-26", today()).await.unwrap();
        let artifact = refresh.artifact;

        assert_eq!(artifact.players.len(), 2);
        assert_eq!(artifact.players[0].last7, RollingWindowAggregate::zero());
        assert_eq!(artifact.players[0].season.totals.pts, 60);
        assert_eq!(artifact.players[1].last7.totals.pts, 10);
        assert_eq!(artifact.failed_players.len(), 1);
        assert_eq!(artifact.failed_players[0].id, 1);
        assert_eq!(artifact.meta.players_failed, 1);
        // Not retried
        assert_eq!(source.calls(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_failed_player_recomputed_next_run() {
        let store = memory_store().await;
        let first = MockStats {
            roster: vec![roster_entry(1, 41, 820)],
            failing: HashSet::from([1]),
            ..Default::default()
        };
        let refresh = refresh_players(&first, &store, "2025-26", today()).await.unwrap();
        assert_eq!(refresh.artifact.failed_players.len(), 1);

        // Same games played, source healthy again
        let second = MockStats {
            roster: vec![roster_entry(1, 41, 820)],
            events: HashMap::from([(1, vec![game(2, 25)])]),
            ..Default::default()
        };
        let refresh = refresh_players(&second, &store, "2025-26", today()).await.unwrap();

        assert_eq!(second.calls(), vec![1]);
        assert_eq!(refresh.reused, 0);
        assert_eq!(refresh.recomputed, 1);
        assert!(refresh.artifact.failed_players.is_empty());
        assert_eq!(refresh.artifact.players[0].last7.totals.gp, 1);
        assert_eq!(refresh.artifact.players[0].last7.totals.pts, 25);
    }

    #[tokio::test]
    async fn test_roster_failure_aborts_without_writing() {
        let store = memory_store().await;
        let source = MockStats { roster_fails: true, ..Default::default() };

        assert!(refresh_players(&source, &store, "2025-26", today()).await.is_err());
        assert!(store.load_document(ArtifactKind::Players).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_cache_starts_cold() {
        let store = memory_store().await;
        store.seed(ArtifactKind::Players, json!({"players": "not a list"})).await;
        let source = MockStats {
            roster: vec![roster_entry(1, 3, 60)],
            events: HashMap::from([(1, vec![game(1, 20)])]),
            ..Default::default()
        };

        let refresh = refresh_players(&source, &store, "2025-26", today()).await.unwrap();
        assert_eq!(refresh.recomputed, 1);
        assert!(store.load_players().await.unwrap().is_some());
    }

    fn team_game(game_date: NaiveDate, team_id: TeamId, team: Option<&str>) -> TeamGame {
        TeamGame { game_id: "0022500001".to_string(), game_date, team_id, team: team.map(str::to_string) }
    }

    #[test]
    fn test_game_counts_use_tricodes_with_id_fallback() {
        // 2025-10-21 is a Tuesday; week 1 starts Monday 2025-10-20
        let games = vec![
            team_game(date(2025, 10, 21), 1610612738, Some("BOS")),
            team_game(date(2025, 10, 23), 1610612738, Some("BOS")),
            team_game(date(2025, 10, 21), 1610612752, None),
            team_game(date(2025, 10, 28), 1610612738, Some("BOS")),
        ];

        let counts = build_game_counts(&games);
        let json = serde_json::to_value(&counts).unwrap();

        assert_eq!(json["1"]["start_date"], "2025-10-20");
        assert_eq!(json["1"]["end_date"], "2025-10-26");
        assert_eq!(json["1"]["BOS"], 2);
        assert_eq!(json["1"]["1610612752"], 1);
        assert_eq!(json["2"]["BOS"], 1);
    }

    fn scheduled(game_id: &str, game_date: NaiveDate, home: (TeamId, &str), away: (TeamId, &str)) -> ScheduledGame {
        ScheduledGame {
            game_id: game_id.to_string(),
            game_date,
            home: TeamRef { id: home.0, code: Some(home.1.to_string()) },
            away: TeamRef { id: away.0, code: Some(away.1.to_string()) },
        }
    }

    #[test]
    fn test_opponent_lists_skip_preseason_and_anchor_forward() {
        let games = vec![
            scheduled("0012500001", date(2025, 10, 4), (1, "LAL"), (2, "GSW")),
            // Tuesday opener; the week 1 anchor rounds forward to Monday 2025-10-27
            scheduled("0022500001", date(2025, 10, 21), (1, "LAL"), (2, "GSW")),
            scheduled("0022500002", date(2025, 10, 28), (1, "LAL"), (3, "BOS")),
            scheduled("0022500003", date(2025, 10, 30), (2, "GSW"), (1, "LAL")),
        ];

        let opponents = build_opponent_lists(&games);
        let json = serde_json::to_value(&opponents).unwrap();

        assert_eq!(json["1"]["start_date"], "2025-10-27");
        assert_eq!(json["1"]["LAL"], json!(["BOS", "GSW"]));
        assert_eq!(json["1"]["GSW"], json!(["LAL"]));
        assert_eq!(json["1"]["BOS"], json!(["LAL"]));
        assert!(json.get("0").is_none());
    }

    struct MockSchedule {
        team_games: Vec<TeamGame>,
    }

    #[async_trait]
    impl ScheduleSource for MockSchedule {
        async fn fetch_team_games(&self, _season: &str) -> FetchResult<Vec<TeamGame>> {
            Ok(self.team_games.clone())
        }

        async fn fetch_league_schedule(&self) -> FetchResult<Vec<ScheduledGame>> {
            Err(FetchError::status("scheduleLeagueV2", 404))
        }
    }

    #[tokio::test]
    async fn test_refresh_schedule_writes_feed_artifact() {
        let store = memory_store().await;
        let source = MockSchedule { team_games: vec![team_game(date(2025, 10, 22), 1610612738, Some("BOS"))] };

        let weeks = refresh_schedule(&source, &store, "2025-26", ScheduleFeed::GameLog).await.unwrap();
        assert_eq!(weeks, 1);

        let written = store.load_document(ArtifactKind::Schedule).await.unwrap().unwrap();
        assert_eq!(written["1"]["BOS"], 1);

        assert!(refresh_schedule(&source, &store, "2025-26", ScheduleFeed::LeagueSchedule).await.is_err());
        assert!(store.load_document(ArtifactKind::Opponents).await.unwrap().is_none());
    }

    struct MockRoster {
        positions: HashMap<PlayerId, Option<String>>,
    }

    #[async_trait]
    impl RosterSource for MockRoster {
        async fn fetch_active_players(&self, _season: &str) -> FetchResult<Vec<ActivePlayer>> {
            Ok([1, 2, 3].into_iter().map(|id| ActivePlayer { id, name: format!("Player {id}") }).collect())
        }

        async fn fetch_player_position(&self, player_id: PlayerId) -> FetchResult<Option<String>> {
            match self.positions.get(&player_id) {
                Some(position) => Ok(position.clone()),
                None => Err(FetchError::status("commonplayerinfo", 500)),
            }
        }
    }

    #[tokio::test]
    async fn test_refresh_positions_marks_failures_unknown() {
        let store = memory_store().await;
        let source = MockRoster { positions: HashMap::from([(1, Some("Guard".to_string())), (2, None)]) };

        let artifact = refresh_positions(&source, &store, "2025-26").await.unwrap();

        let positions: Vec<&str> = artifact.players.iter().map(|p| p.position.as_str()).collect();
        assert_eq!(positions, vec!["Guard", "Unknown", "Unknown"]);
        assert_eq!(artifact.meta.failed_players, vec![3]);

        let written = store.load_document(ArtifactKind::Positions).await.unwrap().unwrap();
        assert_eq!(written["meta"]["failed_players"], json!([3]));
        assert_eq!(written["players"][0]["player_id"], 1);
    }
}
