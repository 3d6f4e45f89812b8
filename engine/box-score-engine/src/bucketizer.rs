//! Weekly schedule buckets per team
//!
//! Game dates are grouped into Monday-anchored weeks. The game-log feed counts
//! games per team per week; the league schedule feed lists each team's
//! opponents per week in the order the games were presented.

use crate::calendar::{AnchorAlignment, SeasonCalendar};
use crate::error::{Result, StatsError};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// One team-game row: the team that played and, when the feed has it, its opponent
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry<K> {
    pub game_date: NaiveDate,
    pub team: K,
    pub opponent: Option<K>,
}

/// One game between two teams
#[derive(Debug, Clone, PartialEq)]
pub struct Matchup<K> {
    pub game_date: NaiveDate,
    pub home: K,
    pub away: K,
}

/// Per-team payload that can be combined across shards
pub trait BucketValue: Default {
    fn absorb(&mut self, other: Self);
}

impl BucketValue for u32 {
    fn absorb(&mut self, other: Self) {
        *self += other;
    }
}

impl<K> BucketValue for Vec<K> {
    fn absorb(&mut self, other: Self) {
        self.extend(other);
    }
}

/// One week of the season and what each team did in it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekBucket<K: Ord, V> {
    #[serde(skip)]
    pub week: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(flatten)]
    pub teams: BTreeMap<K, V>,
}

impl<K: Ord, V> WeekBucket<K, V> {
    pub fn team(&self, key: &K) -> Option<&V> {
        self.teams.get(key)
    }
}

/// Week number -> bucket, in week order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WeekBuckets<K: Ord, V> {
    #[serde(skip)]
    calendar: Option<SeasonCalendar>,
    weeks: BTreeMap<u32, WeekBucket<K, V>>,
}

/// Games per team per week
pub type ScheduleCounts<K> = WeekBuckets<K, u32>;

/// Opponents per team per week
pub type OpponentLists<K> = WeekBuckets<K, Vec<K>>;

impl<K: Ord + Clone, V: BucketValue> WeekBuckets<K, V> {
    pub fn new(calendar: Option<SeasonCalendar>) -> Self {
        Self { calendar, weeks: BTreeMap::new() }
    }

    pub fn calendar(&self) -> Option<SeasonCalendar> {
        self.calendar
    }

    pub fn weeks(&self) -> &BTreeMap<u32, WeekBucket<K, V>> {
        &self.weeks
    }

    pub fn week(&self, week: u32) -> Option<&WeekBucket<K, V>> {
        self.weeks.get(&week)
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Payload slot for a team in a week, creating the bucket on first touch
    fn slot(&mut self, calendar: SeasonCalendar, week: u32, team: K) -> &mut V {
        let bucket = self.weeks.entry(week).or_insert_with(|| {
            let (start_date, end_date) = calendar.week_range(week);
            WeekBucket { week, start_date, end_date, teams: BTreeMap::new() }
        });
        bucket.teams.entry(team).or_default()
    }

    /// Additively merge buckets built against the same anchor
    pub fn merge(&mut self, other: WeekBuckets<K, V>) -> Result<()> {
        match (self.calendar, other.calendar) {
            (Some(left), Some(right)) if left != right => {
                return Err(StatsError::AnchorMismatch {
                    left: left.anchor(),
                    right: right.anchor(),
                });
            }
            (None, right) => self.calendar = right,
            _ => {}
        }

        for (week, bucket) in other.weeks {
            match self.weeks.get_mut(&week) {
                Some(existing) => {
                    for (team, value) in bucket.teams {
                        existing.teams.entry(team).or_default().absorb(value);
                    }
                }
                None => {
                    self.weeks.insert(week, bucket);
                }
            }
        }
        Ok(())
    }

    fn remap<K2, V2, F, G>(self, key_fn: F, value_fn: G) -> WeekBuckets<K2, V2>
    where
        K2: Ord + Clone,
        V2: BucketValue,
        F: Fn(&K) -> K2,
        G: Fn(V) -> V2,
    {
        let weeks = self
            .weeks
            .into_iter()
            .map(|(week, bucket)| {
                let mut teams: BTreeMap<K2, V2> = BTreeMap::new();
                for (team, value) in bucket.teams {
                    teams.entry(key_fn(&team)).or_default().absorb(value_fn(value));
                }
                let remapped = WeekBucket {
                    week,
                    start_date: bucket.start_date,
                    end_date: bucket.end_date,
                    teams,
                };
                (week, remapped)
            })
            .collect();
        WeekBuckets { calendar: self.calendar, weeks }
    }
}

impl<K: Ord + Clone> WeekBuckets<K, u32> {
    /// Replace internal team keys (e.g. numeric ids) with output keys (e.g. tricodes)
    pub fn with_team_keys<K2, F>(self, key_fn: F) -> WeekBuckets<K2, u32>
    where
        K2: Ord + Clone,
        F: Fn(&K) -> K2,
    {
        self.remap(key_fn, |count| count)
    }
}

impl<K: Ord + Clone> WeekBuckets<K, Vec<K>> {
    /// Replace team keys, including the opponents inside each list
    pub fn with_team_keys<K2, F>(self, key_fn: F) -> WeekBuckets<K2, Vec<K2>>
    where
        K2: Ord + Clone,
        F: Fn(&K) -> K2,
    {
        self.remap(&key_fn, |opponents: Vec<K>| opponents.iter().map(&key_fn).collect())
    }
}

/// Assigns dated games to Monday-anchored weeks
#[derive(Debug, Clone, Copy)]
pub struct WeekBucketizer {
    alignment: AnchorAlignment,
}

impl WeekBucketizer {
    pub fn new(alignment: AnchorAlignment) -> Self {
        Self { alignment }
    }

    /// Alignment used by the per-team game-log feed
    pub fn for_game_counts() -> Self {
        Self::new(AnchorAlignment::MondayOnOrBefore)
    }

    /// Alignment used by the league schedule feed
    pub fn for_opponent_lists() -> Self {
        Self::new(AnchorAlignment::MondayOnOrAfter)
    }

    /// Calendar anchored on the earliest of `dates`
    pub fn calendar_for<I>(&self, dates: I) -> Option<SeasonCalendar>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        SeasonCalendar::from_dates(dates, self.alignment)
    }

    /// Count games per team per week, anchoring on the earliest entry
    pub fn count_games<K: Ord + Clone>(&self, entries: &[ScheduleEntry<K>]) -> ScheduleCounts<K> {
        let calendar = self.calendar_for(entries.iter().map(|entry| entry.game_date));
        Self::count_games_with(calendar, entries)
    }

    /// Count games per team per week against a known calendar
    pub fn count_games_with<K: Ord + Clone>(
        calendar: Option<SeasonCalendar>,
        entries: &[ScheduleEntry<K>],
    ) -> ScheduleCounts<K> {
        let mut buckets = WeekBuckets::new(calendar);
        let Some(calendar) = calendar else {
            return buckets;
        };

        for entry in entries {
            let Some(week) = Self::week_or_skip(&calendar, entry.game_date) else {
                continue;
            };
            *buckets.slot(calendar, week, entry.team.clone()) += 1;
            if let Some(opponent) = &entry.opponent {
                *buckets.slot(calendar, week, opponent.clone()) += 1;
            }
        }
        buckets
    }

    /// List each team's opponents per week, anchoring on the earliest game
    pub fn collect_opponents<K: Ord + Clone>(&self, games: &[Matchup<K>]) -> OpponentLists<K> {
        let calendar = self.calendar_for(games.iter().map(|game| game.game_date));
        Self::collect_opponents_with(calendar, games)
    }

    /// List each team's opponents per week against a known calendar
    pub fn collect_opponents_with<K: Ord + Clone>(
        calendar: Option<SeasonCalendar>,
        games: &[Matchup<K>],
    ) -> OpponentLists<K> {
        let mut buckets = WeekBuckets::new(calendar);
        let Some(calendar) = calendar else {
            return buckets;
        };

        for game in games {
            let Some(week) = Self::week_or_skip(&calendar, game.game_date) else {
                continue;
            };
            buckets.slot(calendar, week, game.home.clone()).push(game.away.clone());
            buckets.slot(calendar, week, game.away.clone()).push(game.home.clone());
        }
        buckets
    }

    /// Callers filter pre-anchor games; anything that slips through is skipped
    fn week_or_skip(calendar: &SeasonCalendar, game_date: NaiveDate) -> Option<u32> {
        let week = calendar.week_of(game_date);
        if week.is_none() {
            warn!(
                "Skipping game on {} before season anchor {}",
                game_date,
                calendar.anchor()
            );
        }
        week
    }
}
