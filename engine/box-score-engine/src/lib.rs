//! Box Score Engine
//!
//! Pure aggregation core for per-player basketball box scores. It turns game
//! logs into season and trailing-window aggregates, decides when cached
//! trailing windows can be reused, computes population bounds for
//! normalization and groups schedule data into Monday-anchored weeks.
//!
//! ## Architecture
//!
//! - **StatAggregator**: totals and per-game averages over a window
//! - **CacheReconciler**: reuse or recompute trailing windows from games played
//! - **MinMaxIndexer**: per category min/max (and weighted ratio bounds)
//! - **WeekBucketizer**: games or opponents per team per week
//! - **PlayerRater**: capped z-score ratings and ranks
//!
//! Nothing in this crate performs I/O.

pub mod aggregator;
pub mod artifact;
pub mod bucketizer;
pub mod calendar;
pub mod error;
pub mod indexer;
pub mod models;
pub mod rating;
pub mod reconciler;

pub use aggregator::StatAggregator;
pub use artifact::{PlayersArtifact, RunMeta};
pub use bucketizer::{
    Matchup, OpponentLists, ScheduleCounts, ScheduleEntry, WeekBucket, WeekBucketizer, WeekBuckets,
};
pub use calendar::{parse_game_date, AnchorAlignment, SeasonCalendar};
pub use error::{Result, StatsError};
pub use indexer::{CategoryBounds, MinMaxIndexer, PopulationIndex, PopulationIndexSet};
pub use models::*;
pub use rating::{PlayerRater, PlayerRating};
pub use reconciler::{CacheEntry, CacheReconciler, PlayerCache, Reconciliation};
