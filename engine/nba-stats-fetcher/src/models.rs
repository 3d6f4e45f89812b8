//! Provider response types and their conversions

use crate::error::{FetchError, Result};
use box_score_engine::{parse_game_date, EventRecord, PlayerId, StatTotals, TeamId};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tabular response shape shared by the stats endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    #[serde(rename = "resultSets")]
    pub result_sets: Vec<ResultSet>,
}

/// One named table: column headers plus positional rows
#[derive(Debug, Clone, Deserialize)]
pub struct ResultSet {
    pub name: String,
    pub headers: Vec<String>,
    #[serde(rename = "rowSet")]
    pub row_set: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Decode every row into `T` by pairing values with headers
    pub fn rows_as<T: DeserializeOwned>(&self) -> std::result::Result<Vec<T>, serde_json::Error> {
        self.row_set
            .iter()
            .map(|row| {
                let object: Map<String, Value> =
                    self.headers.iter().cloned().zip(row.iter().cloned()).collect();
                serde_json::from_value(Value::Object(object))
            })
            .collect()
    }
}

impl StatsResponse {
    pub fn result_set(&self, name: &str) -> Option<&ResultSet> {
        self.result_sets.iter().find(|set| set.name == name)
    }

    /// Decode the rows of the result set called `name`
    pub fn table<T: DeserializeOwned>(&self, endpoint: &str, name: &str) -> Result<Vec<T>> {
        let set = self
            .result_set(name)
            .ok_or_else(|| FetchError::missing_result_set(endpoint, name))?;
        set.rows_as().map_err(|e| FetchError::decode(endpoint, e.to_string()))
    }
}

/// Provider counts arrive as JSON numbers, sometimes null
fn count(value: Option<f64>) -> u32 {
    value.unwrap_or(0.0).max(0.0).round() as u32
}

/// Season totals row from the league dashboard (PerMode=Totals)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct LeagueDashRow {
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_id: TeamId,
    pub team_abbreviation: String,
    pub gp: Option<f64>,
    pub min: Option<f64>,
    pub pts: Option<f64>,
    pub reb: Option<f64>,
    pub ast: Option<f64>,
    pub stl: Option<f64>,
    pub blk: Option<f64>,
    pub tov: Option<f64>,
    pub fgm: Option<f64>,
    pub fga: Option<f64>,
    pub ftm: Option<f64>,
    pub fta: Option<f64>,
    pub fg3m: Option<f64>,
    pub fg3a: Option<f64>,
}

/// A tracked player with the season totals the provider reports
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub id: PlayerId,
    pub name: String,
    pub team_id: TeamId,
    pub team: String,
    pub totals: StatTotals,
}

impl From<LeagueDashRow> for RosterEntry {
    fn from(row: LeagueDashRow) -> Self {
        let totals = StatTotals {
            gp: count(row.gp),
            min: row.min.unwrap_or(0.0),
            pts: count(row.pts),
            reb: count(row.reb),
            ast: count(row.ast),
            stl: count(row.stl),
            blk: count(row.blk),
            tov: count(row.tov),
            fgm: count(row.fgm),
            fga: count(row.fga),
            ftm: count(row.ftm),
            fta: count(row.fta),
            fg3m: count(row.fg3m),
            fg3a: count(row.fg3a),
        };
        Self {
            id: row.player_id,
            name: row.player_name,
            team_id: row.team_id,
            team: row.team_abbreviation,
            totals,
        }
    }
}

/// One row of a player's game log
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GameLogRow {
    pub game_date: Option<String>,
    pub min: Option<f64>,
    pub pts: Option<f64>,
    pub reb: Option<f64>,
    pub ast: Option<f64>,
    pub stl: Option<f64>,
    pub blk: Option<f64>,
    pub tov: Option<f64>,
    pub fgm: Option<f64>,
    pub fga: Option<f64>,
    pub ftm: Option<f64>,
    pub fta: Option<f64>,
    pub fg3m: Option<f64>,
    pub fg3a: Option<f64>,
}

impl GameLogRow {
    /// Convert to an event; rows without a parseable date are rejected
    pub fn to_event(&self) -> box_score_engine::Result<EventRecord> {
        let game_date = parse_game_date(self.game_date.as_deref().unwrap_or_default())?;
        Ok(EventRecord {
            game_date,
            min: self.min.unwrap_or(0.0),
            pts: count(self.pts),
            reb: count(self.reb),
            ast: count(self.ast),
            stl: count(self.stl),
            blk: count(self.blk),
            tov: count(self.tov),
            fgm: count(self.fgm),
            fga: count(self.fga),
            ftm: count(self.ftm),
            fta: count(self.fta),
            fg3m: count(self.fg3m),
            fg3a: count(self.fg3a),
        })
    }
}

/// One team's line in the league game log (PlayerOrTeam=T)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TeamGameRow {
    pub team_id: TeamId,
    pub team_abbreviation: Option<String>,
    pub game_id: String,
    pub game_date: Option<String>,
}

/// A dated game played by one team
#[derive(Debug, Clone, PartialEq)]
pub struct TeamGame {
    pub game_id: String,
    pub game_date: NaiveDate,
    pub team_id: TeamId,
    pub team: Option<String>,
}

impl TeamGameRow {
    pub fn to_team_game(&self) -> box_score_engine::Result<TeamGame> {
        Ok(TeamGame {
            game_id: self.game_id.clone(),
            game_date: parse_game_date(self.game_date.as_deref().unwrap_or_default())?,
            team_id: self.team_id,
            team: self.team_abbreviation.clone().filter(|code| !code.trim().is_empty()),
        })
    }
}

/// League schedule document published on the CDN
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueScheduleResponse {
    pub league_schedule: LeagueSchedule,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueSchedule {
    #[serde(default)]
    pub season_year: Option<String>,
    #[serde(default)]
    pub game_dates: Vec<ScheduleGameDate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleGameDate {
    #[serde(default)]
    pub games: Vec<ScheduleGame>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleGame {
    pub game_id: String,
    #[serde(default)]
    pub game_date_est: Option<String>,
    #[serde(default, rename = "gameDateTimeUTC")]
    pub game_date_time_utc: Option<String>,
    pub home_team: ScheduleTeam,
    pub away_team: ScheduleTeam,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTeam {
    pub team_id: TeamId,
    #[serde(default)]
    pub team_tricode: Option<String>,
}

/// A team as it appears on the schedule
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRef {
    pub id: TeamId,
    pub code: Option<String>,
}

/// One scheduled game between two teams
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledGame {
    pub game_id: String,
    pub game_date: NaiveDate,
    pub home: TeamRef,
    pub away: TeamRef,
}

impl ScheduledGame {
    /// Regular season game ids start with "002"
    pub fn is_regular_season(&self) -> bool {
        self.game_id.starts_with("002")
    }
}

impl ScheduleTeam {
    fn to_team_ref(&self) -> TeamRef {
        TeamRef {
            id: self.team_id,
            code: self.team_tricode.clone().filter(|code| !code.trim().is_empty()),
        }
    }
}

impl ScheduleGame {
    /// The Eastern calendar date is preferred; the UTC timestamp can roll over
    /// to the next day for evening tip-offs.
    pub fn to_scheduled_game(&self) -> box_score_engine::Result<ScheduledGame> {
        let raw = self
            .game_date_est
            .as_deref()
            .or(self.game_date_time_utc.as_deref())
            .unwrap_or_default();
        Ok(ScheduledGame {
            game_id: self.game_id.clone(),
            game_date: parse_game_date(raw)?,
            home: self.home_team.to_team_ref(),
            away: self.away_team.to_team_ref(),
        })
    }
}

/// Row from the all-players listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CommonPlayerRow {
    pub person_id: PlayerId,
    pub display_first_last: Option<String>,
    pub rosterstatus: Option<Value>,
}

impl CommonPlayerRow {
    /// Roster status arrives as 1/0, occasionally as a string
    pub fn is_active(&self) -> bool {
        match &self.rosterstatus {
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            Some(Value::String(s)) => s.trim() == "1",
            _ => false,
        }
    }
}

/// Row from the player info table
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PlayerInfoRow {
    #[serde(default)]
    pub position: Option<String>,
}

/// An active player from the league listing
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePlayer {
    pub id: PlayerId,
    pub name: String,
}

/// Position recorded when the provider has none or the lookup failed
pub const UNKNOWN_POSITION: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPosition {
    pub player_id: PlayerId,
    pub position: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionsMeta {
    /// Players whose lookup failed and were recorded as unknown
    pub failed_players: Vec<PlayerId>,
}

/// The positions document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionsArtifact {
    pub players: Vec<PlayerPosition>,
    pub meta: PositionsMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn league_dash_response() -> StatsResponse {
        serde_json::from_value(json!({
            "resource": "leaguedashplayerstats",
            "resultSets": [{
                "name": "LeagueDashPlayerStats",
                "headers": ["PLAYER_ID", "PLAYER_NAME", "TEAM_ID", "TEAM_ABBREVIATION", "GP", "MIN",
                            "PTS", "REB", "AST", "STL", "BLK", "TOV", "FGM", "FGA", "FTM", "FTA",
                            "FG3M", "FG3A", "FG_PCT"],
                "rowSet": [
                    [1628983, "Shai Gilgeous-Alexander", 1610612760, "OKC", 12, 398.5,
                     385, 60, 72, 24, 10, 25, 130, 250, 100, 110, 25, 70, 0.52]
                ]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_table_pairs_headers_with_rows() {
        let rows: Vec<LeagueDashRow> =
            league_dash_response().table("leaguedashplayerstats", "LeagueDashPlayerStats").unwrap();
        let entry = RosterEntry::from(rows[0].clone());

        assert_eq!(entry.id, 1628983);
        assert_eq!(entry.team, "OKC");
        assert_eq!(entry.totals.gp, 12);
        assert_eq!(entry.totals.pts, 385);
        assert_eq!(entry.totals.min, 398.5);
    }

    #[test]
    fn test_missing_result_set() {
        let result: Result<Vec<LeagueDashRow>> =
            league_dash_response().table("leaguedashplayerstats", "Other");
        assert!(matches!(result, Err(FetchError::MissingResultSet { .. })));
    }

    #[test]
    fn test_game_log_row_to_event() {
        let row: GameLogRow = serde_json::from_value(json!({
            "GAME_DATE": "NOV 18, 2025", "MIN": 34, "PTS": 31, "REB": 5, "AST": 7,
            "STL": 2, "BLK": 1, "TOV": 3, "FGM": 11, "FGA": 20, "FTM": 7, "FTA": 8,
            "FG3M": 2, "FG3A": 5
        }))
        .unwrap();

        let event = row.to_event().unwrap();
        assert_eq!(event.game_date, NaiveDate::from_ymd_opt(2025, 11, 18).unwrap());
        assert_eq!(event.pts, 31);
        assert_eq!(event.min, 34.0);
    }

    #[test]
    fn test_game_log_row_without_date_is_rejected() {
        let row: GameLogRow = serde_json::from_value(json!({"GAME_DATE": null, "PTS": 10})).unwrap();
        assert!(row.to_event().is_err());
    }

    #[test]
    fn test_null_counts_become_zero() {
        let row: GameLogRow =
            serde_json::from_value(json!({"GAME_DATE": "2025-11-18", "PTS": null})).unwrap();
        assert_eq!(row.to_event().unwrap().pts, 0);
    }

    #[test]
    fn test_schedule_game_prefers_eastern_date() {
        let game: ScheduleGame = serde_json::from_value(json!({
            "gameId": "0022500001",
            "gameDateEst": "2025-10-21T00:00:00Z",
            "gameDateTimeUTC": "2025-10-22T02:30:00Z",
            "homeTeam": {"teamId": 1610612747, "teamTricode": "LAL"},
            "awayTeam": {"teamId": 1610612744, "teamTricode": "GSW"}
        }))
        .unwrap();

        let scheduled = game.to_scheduled_game().unwrap();
        assert_eq!(scheduled.game_date, NaiveDate::from_ymd_opt(2025, 10, 21).unwrap());
        assert_eq!(scheduled.home.code.as_deref(), Some("LAL"));
        assert!(scheduled.is_regular_season());
    }

    #[test]
    fn test_preseason_ids_are_not_regular_season() {
        let game = ScheduledGame {
            game_id: "0012500010".to_string(),
            game_date: NaiveDate::from_ymd_opt(2025, 10, 5).unwrap(),
            home: TeamRef { id: 1, code: None },
            away: TeamRef { id: 2, code: None },
        };
        assert!(!game.is_regular_season());
    }

    #[test]
    fn test_roster_status() {
        let active: CommonPlayerRow =
            serde_json::from_value(json!({"PERSON_ID": 1, "DISPLAY_FIRST_LAST": "A", "ROSTERSTATUS": 1})).unwrap();
        let inactive: CommonPlayerRow =
            serde_json::from_value(json!({"PERSON_ID": 2, "DISPLAY_FIRST_LAST": "B", "ROSTERSTATUS": 0})).unwrap();
        assert!(active.is_active());
        assert!(!inactive.is_active());
    }
}
