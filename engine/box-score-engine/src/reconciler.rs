//! Games-played keyed reuse of last run's player windows

use crate::error::{Result, StatsError};
use crate::models::{EntitySnapshot, PlayerId, RecentWindows, RollingWindowAggregate};
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use tracing::debug;

/// A previously persisted snapshot and the games-played count it was built against
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub snapshot: EntitySnapshot,
    pub gp: u32,
}

impl CacheEntry {
    pub fn from_snapshot(snapshot: EntitySnapshot) -> Self {
        let gp = snapshot.season_gp();
        Self { snapshot, gp }
    }
}

/// Read-only lookup of the prior run's snapshots by player id
///
/// Loaded once at the start of a run and never mutated; the next run reads
/// whatever artifact replaced it.
#[derive(Debug, Clone, Default)]
pub struct PlayerCache {
    entries: HashMap<PlayerId, CacheEntry>,
}

impl PlayerCache {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_snapshots<I>(snapshots: I) -> Self
    where
        I: IntoIterator<Item = EntitySnapshot>,
    {
        let entries = snapshots
            .into_iter()
            .map(|snapshot| (snapshot.id, CacheEntry::from_snapshot(snapshot)))
            .collect();
        Self { entries }
    }

    pub fn get(&self, id: PlayerId) -> Option<&CacheEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of reconciling one entity against the cache
#[derive(Debug, PartialEq)]
pub enum Reconciliation<'a> {
    /// Games played unchanged; the cached windows are handed back untouched
    Reused { last7: &'a RollingWindowAggregate, last14: &'a RollingWindowAggregate },
    /// Windows rebuilt from fresh game logs
    Recomputed(RecentWindows),
}

impl Reconciliation<'_> {
    pub fn is_reused(&self) -> bool {
        matches!(self, Reconciliation::Reused { .. })
    }

    pub fn into_owned(self) -> RecentWindows {
        match self {
            Reconciliation::Reused { last7, last14 } => {
                RecentWindows { last7: last7.clone(), last14: last14.clone() }
            }
            Reconciliation::Recomputed(windows) => windows,
        }
    }
}

/// Decides whether cached trailing windows are still valid for an entity
///
/// Equal games played is taken to mean no new games since the cache was built.
/// A provider correction that edits a past game without changing the count
/// goes unnoticed until the next game is played.
pub struct CacheReconciler;

impl CacheReconciler {
    /// True unless the cache holds an entry with exactly `current_gp` games
    pub fn needs_recompute(current_gp: u32, cache: Option<&CacheEntry>) -> bool {
        !matches!(cache, Some(entry) if entry.gp == current_gp)
    }

    /// Reuse the cached windows or call `recompute` exactly once
    pub fn reconcile<'a, F, E>(
        entity_id: PlayerId,
        current_gp: u32,
        cache: Option<&'a CacheEntry>,
        recompute: F,
    ) -> Result<Reconciliation<'a>>
    where
        F: FnOnce() -> std::result::Result<RecentWindows, E>,
        E: Display,
    {
        if let Some(entry) = cache.filter(|entry| entry.gp == current_gp) {
            debug!("Player {} unchanged at {} games, reusing cached windows", entity_id, current_gp);
            return Ok(Self::reused(entry));
        }

        Self::log_recompute(entity_id, current_gp, cache);
        recompute()
            .map(Reconciliation::Recomputed)
            .map_err(|e| StatsError::recompute_failed(entity_id, e.to_string()))
    }

    /// Same decision as [`CacheReconciler::reconcile`] with an async recompute
    pub async fn reconcile_async<'a, F, Fut, E>(
        entity_id: PlayerId,
        current_gp: u32,
        cache: Option<&'a CacheEntry>,
        recompute: F,
    ) -> Result<Reconciliation<'a>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<RecentWindows, E>>,
        E: Display,
    {
        if let Some(entry) = cache.filter(|entry| entry.gp == current_gp) {
            debug!("Player {} unchanged at {} games, reusing cached windows", entity_id, current_gp);
            return Ok(Self::reused(entry));
        }

        Self::log_recompute(entity_id, current_gp, cache);
        recompute()
            .await
            .map(Reconciliation::Recomputed)
            .map_err(|e| StatsError::recompute_failed(entity_id, e.to_string()))
    }

    fn reused(entry: &CacheEntry) -> Reconciliation<'_> {
        Reconciliation::Reused { last7: &entry.snapshot.last7, last14: &entry.snapshot.last14 }
    }

    fn log_recompute(entity_id: PlayerId, current_gp: u32, cache: Option<&CacheEntry>) {
        match cache {
            None => debug!("Player {} not cached, recomputing", entity_id),
            Some(entry) if current_gp < entry.gp => debug!(
                "Player {} games played dropped from {} to {}, recomputing",
                entity_id, entry.gp, current_gp
            ),
            Some(entry) => debug!(
                "Player {} games played {} -> {}, recomputing",
                entity_id, entry.gp, current_gp
            ),
        }
    }
}
