//! # PrintKit Planner
//!
//! Look-ahead motion planners that estimate how long a printer will take to
//! execute a toolpath, honoring the firmware's kinematic limits.
//!
//! Two interchangeable strategies exist:
//! - [`ClassicPlanner`]: Marlin-style reverse/forward entry-speed passes
//!   with a per-axis jerk cornering model.
//! - [`LookaheadPlanner`]: Klipper-style flush-window lookahead with a
//!   junction-deviation cornering model.
//!
//! [`TimeEstimator`] selects one strategy at construction and exposes the
//! common planning interface. Moves must be fed in toolpath emission order;
//! the algorithms are not commutative.
//!
//! ```
//! use printkit_core::{AxisVector, FirmwareLimits, PrintFeature};
//! use printkit_planner::{PlannerStrategy, TimeEstimator};
//!
//! let mut estimator = TimeEstimator::new(PlannerStrategy::Classic, FirmwareLimits::default());
//! estimator.set_position(AxisVector::zero());
//! estimator.plan(AxisVector::new(50.0, 0.0, 0.0, 1.0), 60.0, PrintFeature::OuterWall);
//! let totals = estimator.calculate();
//! assert!(totals[PrintFeature::OuterWall] > 0.0);
//! ```

pub mod block;
pub mod classic;
pub mod lookahead;
pub mod profile;

pub use block::Block;
pub use classic::ClassicPlanner;
pub use lookahead::LookaheadPlanner;

use printkit_core::{AxisVector, FirmwareLimits, PrintFeature, TimeTotals};

/// Which planning strategy a [`TimeEstimator`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerStrategy {
    /// Reverse/forward-pass planner with per-axis jerk limits.
    Classic,
    /// Flush-window lookahead with junction-deviation cornering.
    Lookahead,
}

/// A print-time estimator with the strategy chosen once at construction.
#[derive(Debug, Clone)]
pub enum TimeEstimator {
    /// Classical reverse/forward-pass planner.
    Classic(ClassicPlanner),
    /// Lookahead flush-window planner.
    Lookahead(LookaheadPlanner),
}

impl TimeEstimator {
    /// Create an estimator for the given strategy and machine limits.
    pub fn new(strategy: PlannerStrategy, limits: FirmwareLimits) -> Self {
        match strategy {
            PlannerStrategy::Classic => TimeEstimator::Classic(ClassicPlanner::new(limits)),
            PlannerStrategy::Lookahead => TimeEstimator::Lookahead(LookaheadPlanner::new(limits)),
        }
    }

    /// Seed the head position before the first [`plan`](Self::plan) call.
    pub fn set_position(&mut self, position: AxisVector) {
        match self {
            TimeEstimator::Classic(planner) => planner.set_position(position),
            TimeEstimator::Lookahead(planner) => planner.set_position(position),
        }
    }

    /// Append one move in toolpath emission order.
    pub fn plan(&mut self, new_position: AxisVector, feedrate: f64, feature: PrintFeature) {
        match self {
            TimeEstimator::Classic(planner) => planner.plan(new_position, feedrate, feature),
            TimeEstimator::Lookahead(planner) => planner.plan(new_position, feedrate, feature),
        }
    }

    /// Add externally computed non-motion time to the `None` bucket.
    pub fn add_time(&mut self, seconds: f64) {
        match self {
            TimeEstimator::Classic(planner) => planner.add_time(seconds),
            TimeEstimator::Lookahead(planner) => planner.add_time(seconds),
        }
    }

    /// Override the default acceleration for subsequently planned moves.
    pub fn set_acceleration(&mut self, acceleration: f64) {
        match self {
            TimeEstimator::Classic(planner) => planner.set_acceleration(acceleration),
            TimeEstimator::Lookahead(planner) => planner.set_acceleration(acceleration),
        }
    }

    /// Override the XY jerk limit for subsequently planned moves.
    pub fn set_max_xy_jerk(&mut self, jerk: f64) {
        match self {
            TimeEstimator::Classic(planner) => planner.set_max_xy_jerk(jerk),
            TimeEstimator::Lookahead(planner) => planner.set_max_xy_jerk(jerk),
        }
    }

    /// Clear buffered moves and extra time for reuse. Seed the position
    /// again before planning.
    pub fn reset(&mut self) {
        match self {
            TimeEstimator::Classic(planner) => planner.reset(),
            TimeEstimator::Lookahead(planner) => planner.reset(),
        }
    }

    /// Finalize the buffered moves and return per-feature time totals.
    ///
    /// The buffer is kept; [`reset`](Self::reset) is the explicit clearing
    /// call.
    pub fn calculate(&mut self) -> TimeTotals {
        match self {
            TimeEstimator::Classic(planner) => planner.calculate(),
            TimeEstimator::Lookahead(planner) => planner.calculate(),
        }
    }

    /// The finalized blocks, for inspection and statistics.
    pub fn blocks(&self) -> &[Block] {
        match self {
            TimeEstimator::Classic(planner) => planner.blocks(),
            TimeEstimator::Lookahead(planner) => planner.blocks(),
        }
    }
}
