//! HTTP client for stats.nba.com and the league schedule CDN

use crate::config::{ApiConfig, FetcherConfig, RetryConfig};
use crate::error::{FetchError, Result};
use crate::models::*;
use crate::retry::run_with_retry;
use crate::source::{RosterSource, ScheduleSource, StatsSource};
use anyhow::Context;
use async_trait::async_trait;
use box_score_engine::{EventRecord, PlayerId};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ORIGIN, REFERER, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const LEAGUE_DASH_PLAYER_STATS: &str = "leaguedashplayerstats";
const PLAYER_GAME_LOG: &str = "playergamelog";
const LEAGUE_GAME_LOG: &str = "leaguegamelog";
const COMMON_ALL_PLAYERS: &str = "commonallplayers";
const COMMON_PLAYER_INFO: &str = "commonplayerinfo";
const LEAGUE_SCHEDULE: &str = "scheduleLeagueV2";

/// HTTP client for stats.nba.com and the CDN schedule
pub struct NbaStatsClient {
    api: ApiConfig,
    retry: RetryConfig,
    client: Client,
}

impl NbaStatsClient {
    /// Create a new client instance
    pub fn new(config: &FetcherConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.api.timeout())
            .default_headers(Self::default_headers())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { api: config.api.clone(), retry: config.retry.clone(), client })
    }

    /// stats.nba.com rejects requests that do not look like they came from nba.com
    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
            ),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
        headers.insert(HeaderName::from_static("x-nba-stats-origin"), HeaderValue::from_static("stats"));
        headers.insert(HeaderName::from_static("x-nba-stats-token"), HeaderValue::from_static("true"));
        headers
    }

    fn stats_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api.stats_base_url.trim_end_matches('/'), endpoint)
    }

    /// GET and decode a JSON document, retrying transient failures
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        run_with_retry(|| self.get_once(endpoint, url, params), &self.retry).await
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        debug!("GET {} {:?}", url, params);

        let response = self.client.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(endpoint, status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::decode(endpoint, e.to_string()))
    }

    async fn get_stats(&self, endpoint: &str, params: &[(&str, String)]) -> Result<StatsResponse> {
        let url = self.stats_url(endpoint);
        self.get_json(endpoint, &url, params).await
    }

    fn season_params(&self, season: &str) -> Vec<(&'static str, String)> {
        vec![("Season", season.to_string()), ("SeasonType", self.api.season_type.clone())]
    }
}

#[async_trait]
impl StatsSource for NbaStatsClient {
    async fn fetch_roster(&self, season: &str) -> Result<Vec<RosterEntry>> {
        info!("Fetching season {} totals", season);

        let mut params = self.season_params(season);
        params.extend(
            [
                ("PerMode", "Totals"),
                ("MeasureType", "Base"),
                ("LeagueID", "00"),
                ("LastNGames", "0"),
                ("Month", "0"),
                ("OpponentTeamID", "0"),
                ("PaceAdjust", "N"),
                ("Period", "0"),
                ("PlusMinus", "N"),
                ("Rank", "N"),
                ("TeamID", "0"),
            ]
            .into_iter()
            .map(|(key, value)| (key, value.to_string())),
        );

        let response = self.get_stats(LEAGUE_DASH_PLAYER_STATS, &params).await?;
        let rows: Vec<LeagueDashRow> = response.table(LEAGUE_DASH_PLAYER_STATS, "LeagueDashPlayerStats")?;

        info!("Total players returned: {}", rows.len());
        Ok(rows.into_iter().map(RosterEntry::from).collect())
    }

    async fn fetch_events(&self, player_id: PlayerId, season: &str) -> Result<Vec<EventRecord>> {
        let mut params = self.season_params(season);
        params.push(("PlayerID", player_id.to_string()));

        let response = self.get_stats(PLAYER_GAME_LOG, &params).await;

        // Throttle whether or not the request succeeded
        sleep(self.api.game_log_delay()).await;

        let rows: Vec<GameLogRow> = response?.table(PLAYER_GAME_LOG, "PlayerGameLog")?;
        let events = rows
            .iter()
            .filter_map(|row| match row.to_event() {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!("Dropping game log row for player {}: {}", player_id, e);
                    None
                }
            })
            .collect();
        Ok(events)
    }
}

#[async_trait]
impl ScheduleSource for NbaStatsClient {
    async fn fetch_team_games(&self, season: &str) -> Result<Vec<TeamGame>> {
        info!("Fetching league game log for {}", season);

        let mut params = self.season_params(season);
        params.extend(
            [("PlayerOrTeam", "T"), ("LeagueID", "00"), ("Direction", "ASC"), ("Sorter", "DATE"), ("Counter", "0")]
                .into_iter()
                .map(|(key, value)| (key, value.to_string())),
        );

        let response = self.get_stats(LEAGUE_GAME_LOG, &params).await?;
        let rows: Vec<TeamGameRow> = response.table(LEAGUE_GAME_LOG, "LeagueGameLog")?;

        let games: Vec<TeamGame> = rows
            .iter()
            .filter_map(|row| match row.to_team_game() {
                Ok(game) => Some(game),
                Err(e) => {
                    warn!("Dropping game {} for team {}: {}", row.game_id, row.team_id, e);
                    None
                }
            })
            .collect();

        info!("Fetched {} team-game rows", games.len());
        Ok(games)
    }

    async fn fetch_league_schedule(&self) -> Result<Vec<ScheduledGame>> {
        info!("Fetching league schedule from {}", self.api.schedule_url);

        let response: LeagueScheduleResponse =
            self.get_json(LEAGUE_SCHEDULE, &self.api.schedule_url, &[]).await?;

        let games: Vec<ScheduledGame> = response
            .league_schedule
            .game_dates
            .iter()
            .flat_map(|date| date.games.iter())
            .filter_map(|game| match game.to_scheduled_game() {
                Ok(scheduled) => Some(scheduled),
                Err(e) => {
                    warn!("Dropping scheduled game {}: {}", game.game_id, e);
                    None
                }
            })
            .collect();

        info!(
            "Fetched {} scheduled games for {}",
            games.len(),
            response.league_schedule.season_year.as_deref().unwrap_or("unknown season")
        );
        Ok(games)
    }
}

#[async_trait]
impl RosterSource for NbaStatsClient {
    async fn fetch_active_players(&self, season: &str) -> Result<Vec<ActivePlayer>> {
        info!("Fetching players listed for {}", season);

        let params = vec![
            ("LeagueID", "00".to_string()),
            ("Season", season.to_string()),
            ("IsOnlyCurrentSeason", "1".to_string()),
        ];
        let response = self.get_stats(COMMON_ALL_PLAYERS, &params).await?;
        let rows: Vec<CommonPlayerRow> = response.table(COMMON_ALL_PLAYERS, "CommonAllPlayers")?;

        let active: Vec<ActivePlayer> = rows
            .into_iter()
            .filter(|row| row.is_active())
            .map(|row| ActivePlayer {
                id: row.person_id,
                name: row.display_first_last.unwrap_or_else(|| row.person_id.to_string()),
            })
            .collect();

        info!("{} active players", active.len());
        Ok(active)
    }

    async fn fetch_player_position(&self, player_id: PlayerId) -> Result<Option<String>> {
        let params = vec![("PlayerID", player_id.to_string()), ("LeagueID", "00".to_string())];
        let response = self.get_stats(COMMON_PLAYER_INFO, &params).await;

        sleep(self.api.position_delay()).await;

        let rows: Vec<PlayerInfoRow> = response?.table(COMMON_PLAYER_INFO, "CommonPlayerInfo")?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.position)
            .filter(|position| !position.trim().is_empty()))
    }
}
