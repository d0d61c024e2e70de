//! Classical reverse/forward-pass planner.
//!
//! The Marlin-style strategy: each `plan()` appends a block whose entry
//! speed is capped by the per-axis jerk model; `calculate()` then runs a
//! backward pass (entry speeds must allow deceleration to the successor), a
//! forward pass (entry speeds must be reachable from the predecessor), and
//! finally recomputes every trapezoid before summing time per feature.

use crate::block::{Block, PlannerState};
use printkit_core::{AxisVector, FirmwareLimits, PrintFeature, TimeTotals};
use tracing::debug;

/// Time estimator using acceleration trapezoids with a per-axis jerk
/// cornering model.
#[derive(Debug, Clone)]
pub struct ClassicPlanner {
    state: PlannerState,
}

impl ClassicPlanner {
    /// Create a planner for a machine with the given limits.
    pub fn new(limits: FirmwareLimits) -> Self {
        Self {
            state: PlannerState::new(limits),
        }
    }

    /// Seed the head position before the first [`plan`](Self::plan) call.
    pub fn set_position(&mut self, position: AxisVector) {
        self.state.set_position(position);
    }

    /// Append one move in toolpath emission order.
    pub fn plan(&mut self, new_position: AxisVector, feedrate: f64, feature: PrintFeature) {
        self.state.append_block(new_position, feedrate, feature);
    }

    /// Add externally computed non-motion time (cooling pauses etc.) to the
    /// `None` bucket.
    pub fn add_time(&mut self, seconds: f64) {
        self.state.add_time(seconds);
    }

    /// Override the default acceleration for subsequently planned moves.
    pub fn set_acceleration(&mut self, acceleration: f64) {
        self.state.acceleration = acceleration;
    }

    /// Override the XY jerk limit for subsequently planned moves.
    pub fn set_max_xy_jerk(&mut self, jerk: f64) {
        self.state.max_xy_jerk = jerk;
    }

    /// Clear the buffered blocks and extra time for reuse. The head position
    /// must be seeded again before planning.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Finalize entry speeds over the whole buffer and return the
    /// per-feature time totals.
    ///
    /// Does not clear the buffer; call [`reset`](Self::reset) before reuse.
    pub fn calculate(&mut self) -> TimeTotals {
        debug!(blocks = self.state.blocks.len(), "finalizing classic plan");
        self.state.reverse_pass();
        self.state.forward_pass();
        self.state.recalculate_trapezoids();
        self.state.sum_totals()
    }

    /// The finalized blocks, for inspection and statistics.
    pub fn blocks(&self) -> &[Block] {
        &self.state.blocks
    }
}
