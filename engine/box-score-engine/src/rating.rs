//! Z-score ratings for category leagues

use crate::models::{Category, EntitySnapshot, Metric, PlayerId, Window};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Categories that feed the rating
pub const RATED_CATEGORIES: [Category; 9] = [
    Category::Pts,
    Category::Reb,
    Category::Ast,
    Category::FgPct,
    Category::FtPct,
    Category::Fg3m,
    Category::Stl,
    Category::Blk,
    Category::Tov,
];

/// Absolute cap applied to every category z-score
pub const Z_SCORE_CAP: f64 = 3.0;

/// A player's rating for one window and metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRating {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
    pub rating: f64,
    /// 1 = best; tied ratings share a rank
    pub rank: u32,
    pub z_scores: BTreeMap<Category, f64>,
}

/// Population mean and standard deviation for one category
#[derive(Debug, Clone, Copy, PartialEq)]
struct PoolStats {
    mean: f64,
    std: f64,
}

impl PoolStats {
    fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self { mean: 0.0, std: 1.0 };
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        // A flat category contributes nothing instead of dividing by zero
        Self { mean, std: if std == 0.0 { 1.0 } else { std } }
    }

    fn z_score(&self, value: f64) -> f64 {
        (value - self.mean) / self.std
    }
}

/// Ranks players by the weighted mean of their capped category z-scores
#[derive(Debug, Clone, Default)]
pub struct PlayerRater {
    weights: HashMap<Category, f64>,
}

impl PlayerRater {
    /// Create a rater with every category weighted 1
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weight(mut self, category: Category, weight: f64) -> Self {
        self.weights.insert(category, weight);
        self
    }

    pub fn weight(&self, category: Category) -> f64 {
        self.weights.get(&category).copied().unwrap_or(1.0)
    }

    /// Rate and rank `entities`, best first
    pub fn rate(&self, entities: &[EntitySnapshot], window: Window, metric: Metric) -> Vec<PlayerRating> {
        let league_fg_pct = Self::league_ratio(entities, window, metric, Category::Fgm, Category::Fga);
        let league_ft_pct = Self::league_ratio(entities, window, metric, Category::Ftm, Category::Fta);

        // Percentages are rated as distance from the league rate
        let rated_value = |entity: &EntitySnapshot, category: Category| {
            let value = entity.value(window, metric, category);
            match category {
                Category::FgPct => value - league_fg_pct,
                Category::FtPct => value - league_ft_pct,
                _ => value,
            }
        };

        let pools: HashMap<Category, PoolStats> = RATED_CATEGORIES
            .iter()
            .map(|&category| {
                let values: Vec<f64> =
                    entities.iter().map(|entity| rated_value(entity, category)).collect();
                (category, PoolStats::from_values(&values))
            })
            .collect();

        let mut ratings: Vec<PlayerRating> = entities
            .iter()
            .map(|entity| {
                let mut z_scores = BTreeMap::new();
                let mut weighted_sum = 0.0;
                let mut total_weight = 0.0;

                for category in RATED_CATEGORIES {
                    let mut z = pools[&category].z_score(rated_value(entity, category));
                    if category == Category::Tov {
                        z = -z;
                    }
                    let z = z.clamp(-Z_SCORE_CAP, Z_SCORE_CAP);

                    let weight = self.weight(category);
                    weighted_sum += z * weight;
                    total_weight += weight;
                    z_scores.insert(category, z);
                }

                let rating = if total_weight > 0.0 { weighted_sum / total_weight } else { 0.0 };

                PlayerRating {
                    id: entity.id,
                    name: entity.name.clone(),
                    team: entity.team.clone(),
                    rating,
                    rank: 0,
                    z_scores,
                }
            })
            .collect();

        ratings.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        Self::assign_ranks(&mut ratings);
        ratings
    }

    /// Competition ranking over ratings sorted best first
    fn assign_ranks(ratings: &mut [PlayerRating]) {
        let mut last_rating = f64::INFINITY;
        let mut rank = 0;
        for (index, rating) in ratings.iter_mut().enumerate() {
            if rating.rating != last_rating {
                rank = index as u32 + 1;
                last_rating = rating.rating;
            }
            rating.rank = rank;
        }
    }

    fn league_ratio(
        entities: &[EntitySnapshot],
        window: Window,
        metric: Metric,
        made: Category,
        attempted: Category,
    ) -> f64 {
        let made: f64 = entities.iter().map(|entity| entity.value(window, metric, made)).sum();
        let attempted: f64 =
            entities.iter().map(|entity| entity.value(window, metric, attempted)).sum();
        if attempted == 0.0 {
            0.0
        } else {
            made / attempted
        }
    }
}
