//! Per-feature time totals.

use crate::feature::PrintFeature;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Accumulated execution time per print feature, in seconds.
///
/// Produced by a planner's `calculate()`. Callers sum whichever subset they
/// care about; [`TimeTotals::total`] gives the whole print time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeTotals {
    seconds: [f64; PrintFeature::COUNT],
}

impl TimeTotals {
    /// All-zero totals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of every feature bucket.
    pub fn total(&self) -> f64 {
        self.seconds.iter().sum()
    }

    /// Iterate over `(feature, seconds)` pairs in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (PrintFeature, f64)> + '_ {
        PrintFeature::ALL
            .iter()
            .map(move |&feature| (feature, self.seconds[feature.index()]))
    }
}

impl Index<PrintFeature> for TimeTotals {
    type Output = f64;

    fn index(&self, feature: PrintFeature) -> &f64 {
        &self.seconds[feature.index()]
    }
}

impl IndexMut<PrintFeature> for TimeTotals {
    fn index_mut(&mut self, feature: PrintFeature) -> &mut f64 {
        &mut self.seconds[feature.index()]
    }
}
