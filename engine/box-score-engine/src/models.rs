//! Stat categories, game events and per-player window snapshots

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// NBA person id
pub type PlayerId = i64;

/// NBA team id
pub type TeamId = i64;

/// Box score categories tracked per game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Min,
    Pts,
    Reb,
    Ast,
    Stl,
    Blk,
    Tov,
    Fgm,
    Fga,
    Ftm,
    Fta,
    Fg3m,
    Fg3a,
    FgPct,
    FtPct,
    Fg3Pct,
}

impl Category {
    /// Categories that are summed game by game
    pub const COUNTING: [Category; 13] = [
        Category::Min,
        Category::Pts,
        Category::Reb,
        Category::Ast,
        Category::Stl,
        Category::Blk,
        Category::Tov,
        Category::Fgm,
        Category::Fga,
        Category::Ftm,
        Category::Fta,
        Category::Fg3m,
        Category::Fg3a,
    ];

    /// Every category, counting first
    pub const ALL: [Category; 16] = [
        Category::Min,
        Category::Pts,
        Category::Reb,
        Category::Ast,
        Category::Stl,
        Category::Blk,
        Category::Tov,
        Category::Fgm,
        Category::Fga,
        Category::Ftm,
        Category::Fta,
        Category::Fg3m,
        Category::Fg3a,
        Category::FgPct,
        Category::FtPct,
        Category::Fg3Pct,
    ];

    /// Attempts category backing a ratio category
    pub fn attempts(self) -> Option<Category> {
        match self {
            Category::FgPct => Some(Category::Fga),
            Category::FtPct => Some(Category::Fta),
            Category::Fg3Pct => Some(Category::Fg3a),
            _ => None,
        }
    }

    /// Key used in serialized documents (e.g. "fg3m", "fg_pct")
    pub fn key(self) -> &'static str {
        match self {
            Category::Min => "min",
            Category::Pts => "pts",
            Category::Reb => "reb",
            Category::Ast => "ast",
            Category::Stl => "stl",
            Category::Blk => "blk",
            Category::Tov => "tov",
            Category::Fgm => "fgm",
            Category::Fga => "fga",
            Category::Ftm => "ftm",
            Category::Fta => "fta",
            Category::Fg3m => "fg3m",
            Category::Fg3a => "fg3a",
            Category::FgPct => "fg_pct",
            Category::FtPct => "ft_pct",
            Category::Fg3Pct => "fg3_pct",
        }
    }
}

/// Made over attempted, 0 when nothing was attempted
pub fn ratio(made: u32, attempted: u32) -> f64 {
    if attempted == 0 {
        0.0
    } else {
        made as f64 / attempted as f64
    }
}

/// One game's box score line for a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Game date, normalized to UTC
    pub game_date: NaiveDate,
    pub min: f64,
    pub pts: u32,
    pub reb: u32,
    pub ast: u32,
    pub stl: u32,
    pub blk: u32,
    pub tov: u32,
    pub fgm: u32,
    pub fga: u32,
    pub ftm: u32,
    pub fta: u32,
    pub fg3m: u32,
    pub fg3a: u32,
}

impl EventRecord {
    /// Create an event with every stat at zero
    pub fn on(game_date: NaiveDate) -> Self {
        Self {
            game_date,
            min: 0.0,
            pts: 0,
            reb: 0,
            ast: 0,
            stl: 0,
            blk: 0,
            tov: 0,
            fgm: 0,
            fga: 0,
            ftm: 0,
            fta: 0,
            fg3m: 0,
            fg3a: 0,
        }
    }
}

/// Summed stats over a window plus the number of games that contributed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatTotals {
    pub gp: u32,
    pub min: f64,
    pub pts: u32,
    pub reb: u32,
    pub ast: u32,
    pub stl: u32,
    pub blk: u32,
    pub tov: u32,
    pub fgm: u32,
    pub fga: u32,
    pub ftm: u32,
    pub fta: u32,
    pub fg3m: u32,
    pub fg3a: u32,
}

impl StatTotals {
    /// Fold one game into the running totals
    pub fn add(&mut self, event: &EventRecord) {
        self.gp += 1;
        self.min += event.min;
        self.pts += event.pts;
        self.reb += event.reb;
        self.ast += event.ast;
        self.stl += event.stl;
        self.blk += event.blk;
        self.tov += event.tov;
        self.fgm += event.fgm;
        self.fga += event.fga;
        self.ftm += event.ftm;
        self.fta += event.fta;
        self.fg3m += event.fg3m;
        self.fg3a += event.fg3a;
    }

    /// Value of a category; ratios come from the summed makes and attempts
    pub fn value(&self, category: Category) -> f64 {
        match category {
            Category::Min => self.min,
            Category::Pts => self.pts as f64,
            Category::Reb => self.reb as f64,
            Category::Ast => self.ast as f64,
            Category::Stl => self.stl as f64,
            Category::Blk => self.blk as f64,
            Category::Tov => self.tov as f64,
            Category::Fgm => self.fgm as f64,
            Category::Fga => self.fga as f64,
            Category::Ftm => self.ftm as f64,
            Category::Fta => self.fta as f64,
            Category::Fg3m => self.fg3m as f64,
            Category::Fg3a => self.fg3a as f64,
            Category::FgPct => ratio(self.fgm, self.fga),
            Category::FtPct => ratio(self.ftm, self.fta),
            Category::Fg3Pct => ratio(self.fg3m, self.fg3a),
        }
    }
}

/// Per-game averages over a window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatAverages {
    pub min: f64,
    pub pts: f64,
    pub reb: f64,
    pub ast: f64,
    pub stl: f64,
    pub blk: f64,
    pub tov: f64,
    pub fgm: f64,
    pub fga: f64,
    pub ftm: f64,
    pub fta: f64,
    pub fg3m: f64,
    pub fg3a: f64,
    pub fg_pct: f64,
    pub ft_pct: f64,
    pub fg3_pct: f64,
}

impl StatAverages {
    /// Derive averages from totals; all zero when no games were played
    pub fn from_totals(totals: &StatTotals) -> Self {
        if totals.gp == 0 {
            return Self::default();
        }

        let gp = totals.gp as f64;
        let per_game = |category: Category| totals.value(category) / gp;

        Self {
            min: per_game(Category::Min),
            pts: per_game(Category::Pts),
            reb: per_game(Category::Reb),
            ast: per_game(Category::Ast),
            stl: per_game(Category::Stl),
            blk: per_game(Category::Blk),
            tov: per_game(Category::Tov),
            fgm: per_game(Category::Fgm),
            fga: per_game(Category::Fga),
            ftm: per_game(Category::Ftm),
            fta: per_game(Category::Fta),
            fg3m: per_game(Category::Fg3m),
            fg3a: per_game(Category::Fg3a),
            fg_pct: ratio(totals.fgm, totals.fga),
            ft_pct: ratio(totals.ftm, totals.fta),
            fg3_pct: ratio(totals.fg3m, totals.fg3a),
        }
    }

    pub fn value(&self, category: Category) -> f64 {
        match category {
            Category::Min => self.min,
            Category::Pts => self.pts,
            Category::Reb => self.reb,
            Category::Ast => self.ast,
            Category::Stl => self.stl,
            Category::Blk => self.blk,
            Category::Tov => self.tov,
            Category::Fgm => self.fgm,
            Category::Fga => self.fga,
            Category::Ftm => self.ftm,
            Category::Fta => self.fta,
            Category::Fg3m => self.fg3m,
            Category::Fg3a => self.fg3a,
            Category::FgPct => self.fg_pct,
            Category::FtPct => self.ft_pct,
            Category::Fg3Pct => self.fg3_pct,
        }
    }
}

/// Totals and averages for one window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingWindowAggregate {
    pub totals: StatTotals,
    pub averages: StatAverages,
}

impl RollingWindowAggregate {
    /// The absorbing aggregate for a window with no games
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_totals(totals: StatTotals) -> Self {
        let averages = StatAverages::from_totals(&totals);
        Self { totals, averages }
    }

    pub fn gp(&self) -> u32 {
        self.totals.gp
    }

    pub fn value(&self, metric: Metric, category: Category) -> f64 {
        match metric {
            Metric::Totals => self.totals.value(category),
            Metric::Averages => self.averages.value(category),
        }
    }
}

/// Time range a window aggregates over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    Season,
    Last7,
    Last14,
}

impl Window {
    pub const ALL: [Window; 3] = [Window::Season, Window::Last7, Window::Last14];

    pub fn key(self) -> &'static str {
        match self {
            Window::Season => "season",
            Window::Last7 => "last7",
            Window::Last14 => "last14",
        }
    }

    /// Trailing day count, `None` for the whole season
    pub fn lookback_days(self) -> Option<i64> {
        match self {
            Window::Season => None,
            Window::Last7 => Some(7),
            Window::Last14 => Some(14),
        }
    }

    /// Earliest game date included when the window is evaluated on `today`
    pub fn cutoff(self, today: NaiveDate) -> Option<NaiveDate> {
        self.lookback_days().map(|days| today - Duration::days(days))
    }

    pub fn contains(self, today: NaiveDate, game_date: NaiveDate) -> bool {
        match self.cutoff(today) {
            Some(cutoff) => game_date >= cutoff,
            None => true,
        }
    }
}

/// Which side of an aggregate a value is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Totals,
    Averages,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Totals, Metric::Averages];
}

/// The two trailing windows that depend on game logs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecentWindows {
    pub last7: RollingWindowAggregate,
    pub last14: RollingWindowAggregate,
}

impl RecentWindows {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// One tracked player with every window aggregated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: PlayerId,
    pub name: String,
    pub team_id: TeamId,
    /// Team tricode (e.g. "BOS")
    pub team: String,
    pub season: RollingWindowAggregate,
    pub last7: RollingWindowAggregate,
    pub last14: RollingWindowAggregate,
}

impl EntitySnapshot {
    pub fn window(&self, window: Window) -> &RollingWindowAggregate {
        match window {
            Window::Season => &self.season,
            Window::Last7 => &self.last7,
            Window::Last14 => &self.last14,
        }
    }

    pub fn value(&self, window: Window, metric: Metric, category: Category) -> f64 {
        self.window(window).value(metric, category)
    }

    /// Games played this season, the counter the cache is keyed on
    pub fn season_gp(&self) -> u32 {
        self.season.totals.gp
    }
}

/// An entity whose aggregation failed during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedEntity {
    pub id: PlayerId,
    pub name: String,
    pub reason: String,
}
