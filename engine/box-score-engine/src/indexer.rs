//! Population min/max bounds used by consumers to normalize category values

use crate::models::{Category, EntitySnapshot, Metric, Window};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ratio categories that also carry volume-weighted bounds
pub const WEIGHTED_CATEGORIES: [Category; 2] = [Category::FgPct, Category::FtPct];

/// Ratio categories shared between the totals and averages indices
const SHARED_RATIO_CATEGORIES: [Category; 2] = [Category::FgPct, Category::FtPct];

/// Bounds observed for one category across the population
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBounds {
    pub min: f64,
    pub max: f64,
    /// Bounds over ratio x attempts, only for volume-sensitive ratios
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_max: Option<f64>,
}

/// Category bounds keyed by category
pub type CategoryIndex = BTreeMap<Category, CategoryBounds>;

/// Bounds for one window and metric
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationIndex {
    pub window: Window,
    pub metric: Metric,
    pub categories: CategoryIndex,
}

impl PopulationIndex {
    pub fn get(&self, category: Category) -> Option<&CategoryBounds> {
        self.categories.get(&category)
    }
}

/// Totals and averages bounds for one window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowIndex {
    pub totals: CategoryIndex,
    pub averages: CategoryIndex,
}

impl WindowIndex {
    pub fn get(&self, metric: Metric) -> &CategoryIndex {
        match metric {
            Metric::Totals => &self.totals,
            Metric::Averages => &self.averages,
        }
    }
}

/// Every window x metric index computed for a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PopulationIndexSet {
    windows: BTreeMap<Window, WindowIndex>,
}

impl PopulationIndexSet {
    pub fn get(&self, window: Window, metric: Metric) -> Option<&CategoryIndex> {
        self.windows.get(&window).map(|index| index.get(metric))
    }

    pub fn bounds(&self, window: Window, metric: Metric, category: Category) -> Option<&CategoryBounds> {
        self.get(window, metric).and_then(|index| index.get(&category))
    }
}

/// Running min/max over a stream of values
#[derive(Debug, Clone, Copy, Default)]
struct Extremes(Option<(f64, f64)>);

impl Extremes {
    fn observe(&mut self, value: f64) {
        self.0 = Some(match self.0 {
            Some((min, max)) => (min.min(value), max.max(value)),
            None => (value, value),
        });
    }

    /// 0/0 when nothing was observed
    fn finish(self) -> (f64, f64) {
        self.0.unwrap_or((0.0, 0.0))
    }
}

/// Computes population bounds over a finished collection of snapshots
pub struct MinMaxIndexer;

impl MinMaxIndexer {
    /// Bounds for every category of one window and metric
    ///
    /// An empty population yields 0/0 for every category.
    pub fn index(entities: &[EntitySnapshot], window: Window, metric: Metric) -> PopulationIndex {
        let mut categories = CategoryIndex::new();

        for category in Category::ALL {
            let mut plain = Extremes::default();
            for entity in entities {
                plain.observe(entity.value(window, metric, category));
            }
            let (min, max) = plain.finish();

            let (weighted_min, weighted_max) = if WEIGHTED_CATEGORIES.contains(&category) {
                let (weighted_min, weighted_max) =
                    Self::weighted_extremes(entities, window, metric, category);
                (Some(weighted_min), Some(weighted_max))
            } else {
                (None, None)
            };

            categories.insert(category, CategoryBounds { min, max, weighted_min, weighted_max });
        }

        PopulationIndex { window, metric, categories }
    }

    /// Index every window and metric, then share the ratio bounds across metrics
    pub fn index_all(entities: &[EntitySnapshot]) -> PopulationIndexSet {
        let mut windows = BTreeMap::new();

        for window in Window::ALL {
            let totals = Self::index(entities, window, Metric::Totals).categories;
            let averages = Self::index(entities, window, Metric::Averages).categories;
            windows.insert(window, Self::share_ratio_bounds(WindowIndex { totals, averages }));
        }

        PopulationIndexSet { windows }
    }

    /// Percentages are dimensionless, so the totals index takes the averages
    /// index's fg_pct/ft_pct entries instead of keeping its own
    fn share_ratio_bounds(mut index: WindowIndex) -> WindowIndex {
        for category in SHARED_RATIO_CATEGORIES {
            if let Some(bounds) = index.averages.get(&category).copied() {
                index.totals.insert(category, bounds);
            }
        }
        index
    }

    fn weighted_extremes(
        entities: &[EntitySnapshot],
        window: Window,
        metric: Metric,
        category: Category,
    ) -> (f64, f64) {
        let Some(attempts) = category.attempts() else {
            return (0.0, 0.0);
        };

        let mut weighted = Extremes::default();
        for entity in entities {
            let value = entity.value(window, metric, category);
            let volume = entity.value(window, metric, attempts);
            weighted.observe(value * volume);
        }
        weighted.finish()
    }
}
