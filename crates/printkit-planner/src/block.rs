//! Motion blocks and the planning buffer shared by both strategies.
//!
//! A [`Block`] holds one linear segment's geometry plus the trapezoid values
//! planned for it. [`PlannerState`] owns the block buffer together with the
//! junction bookkeeping (previous per-axis feedrates) and implements the
//! parts both strategies share: block construction, the reverse/forward
//! entry-speed passes, trapezoid recalculation, and the per-feature time
//! summation.

use crate::profile::{
    acceleration_time_from_distance, calculate_trapezoid, max_allowable_speed,
    MINIMUM_PLANNER_SPEED,
};
use printkit_core::{
    AxisVector, FirmwareLimits, PrintFeature, TimeTotals, AXIS_COUNT, E_AXIS, X_AXIS, Y_AXIS,
    Z_AXIS,
};

/// One linear move's geometry and its planned velocity trapezoid.
#[derive(Debug, Clone, Copy)]
pub struct Block {
    /// Signed per-axis travel of the move (mm).
    pub delta: AxisVector,
    /// Absolute per-axis travel (mm).
    pub abs_delta: AxisVector,
    /// Move length: Euclidean XYZ distance, or |E delta| for pure extrusion.
    pub distance: f64,
    /// Target cruise feedrate after per-axis capping (mm/s).
    pub nominal_feedrate: f64,
    /// Acceleration used for the ramps (mm/s²).
    pub acceleration: f64,
    /// Planned speed entering the block (mm/s).
    pub entry_speed: f64,
    /// Junction-limited ceiling for the entry speed (mm/s).
    pub max_entry_speed: f64,
    /// Speed at the start of the trapezoid (mm/s).
    pub initial_feedrate: f64,
    /// Speed at the end of the trapezoid (mm/s).
    pub final_feedrate: f64,
    /// Distance along the move where acceleration ends (mm).
    pub accelerate_until: f64,
    /// Distance along the move where deceleration begins (mm).
    pub decelerate_after: f64,
    /// True if the move can reach nominal speed and still decelerate to the
    /// planner floor within its own length.
    pub nominal_length: bool,
    /// True while the trapezoid needs recomputation.
    pub recalculate: bool,
    /// Feature bucket the block's time is charged to.
    pub feature: PrintFeature,
}

impl Block {
    /// A zeroed block tagged with `feature`.
    pub fn new(feature: PrintFeature) -> Self {
        Self {
            delta: AxisVector::zero(),
            abs_delta: AxisVector::zero(),
            distance: 0.0,
            nominal_feedrate: 0.0,
            acceleration: 0.0,
            entry_speed: 0.0,
            max_entry_speed: 0.0,
            initial_feedrate: 0.0,
            final_feedrate: 0.0,
            accelerate_until: 0.0,
            decelerate_after: 0.0,
            nominal_length: false,
            recalculate: false,
            feature,
        }
    }

    /// Time spent in the block's three trapezoid phases (s).
    pub fn phase_times(&self) -> (f64, f64, f64) {
        let plateau_distance = self.decelerate_after - self.accelerate_until;
        let accel_time = acceleration_time_from_distance(
            self.initial_feedrate,
            self.accelerate_until,
            self.acceleration,
        );
        let cruise_time = plateau_distance / self.nominal_feedrate;
        let decel_time = acceleration_time_from_distance(
            self.final_feedrate,
            self.distance - self.decelerate_after,
            self.acceleration,
        );
        (accel_time, cruise_time, decel_time)
    }
}

/// Buffer and junction state shared by both planning strategies.
#[derive(Debug, Clone)]
pub(crate) struct PlannerState {
    pub(crate) limits: FirmwareLimits,
    /// Working copy of the default acceleration (M204-style override).
    pub(crate) acceleration: f64,
    /// Working copy of the XY jerk limit (M205-style override).
    pub(crate) max_xy_jerk: f64,
    pub(crate) position: AxisVector,
    previous_feedrate: AxisVector,
    previous_nominal_feedrate: f64,
    pub(crate) blocks: Vec<Block>,
    extra_time: f64,
}

impl PlannerState {
    pub(crate) fn new(limits: FirmwareLimits) -> Self {
        let acceleration = limits.acceleration;
        let max_xy_jerk = limits.max_xy_jerk;
        Self {
            limits,
            acceleration,
            max_xy_jerk,
            position: AxisVector::zero(),
            previous_feedrate: AxisVector::zero(),
            previous_nominal_feedrate: 0.0,
            blocks: Vec::new(),
            extra_time: 0.0,
        }
    }

    pub(crate) fn set_position(&mut self, position: AxisVector) {
        self.position = position;
    }

    pub(crate) fn add_time(&mut self, seconds: f64) {
        self.extra_time += seconds;
    }

    pub(crate) fn reset(&mut self) {
        self.extra_time = 0.0;
        self.blocks.clear();
    }

    /// Build and append the block for a move to `new_position` at the
    /// requested `feedrate`, applying per-axis feedrate capping, per-axis
    /// acceleration limiting, and the jerk-based junction speed model.
    ///
    /// Returns `false` for a zero-travel move, which contributes nothing and
    /// is not buffered.
    pub(crate) fn append_block(
        &mut self,
        new_position: AxisVector,
        feedrate: f64,
        feature: PrintFeature,
    ) -> bool {
        let mut block = Block::new(feature);
        block.delta = new_position - self.position;
        block.abs_delta = block.delta.abs();
        if block.abs_delta.max_component() <= 0.0 {
            return false;
        }

        let feedrate = feedrate.max(self.limits.minimum_feedrate);
        block.distance = block.delta.xyz_magnitude();
        if block.distance == 0.0 {
            // Pure extrusion: length is the filament travel.
            block.distance = block.abs_delta[E_AXIS];
        }
        block.nominal_feedrate = feedrate;

        // Per-axis feedrate targets; if any axis exceeds its cap, scale the
        // whole move down uniformly to preserve its direction.
        let mut current_feedrate = AxisVector::zero();
        let mut current_abs_feedrate = AxisVector::zero();
        let mut feedrate_factor = 1.0_f64;
        for n in 0..AXIS_COUNT {
            current_feedrate[n] = block.delta[n] * feedrate / block.distance;
            current_abs_feedrate[n] = current_feedrate[n].abs();
            if current_abs_feedrate[n] > self.limits.max_feedrate[n] {
                feedrate_factor =
                    feedrate_factor.min(self.limits.max_feedrate[n] / current_abs_feedrate[n]);
            }
        }
        if feedrate_factor < 1.0 {
            for n in 0..AXIS_COUNT {
                current_feedrate[n] *= feedrate_factor;
                current_abs_feedrate[n] *= feedrate_factor;
            }
            block.nominal_feedrate *= feedrate_factor;
        }

        block.acceleration = self.acceleration;
        for n in 0..AXIS_COUNT {
            if block.acceleration * (block.abs_delta[n] / block.distance)
                > self.limits.max_acceleration[n]
            {
                block.acceleration = self.limits.max_acceleration[n];
            }
        }

        // Junction speed for a standing start: half the jerk limits.
        let mut vmax_junction = self.max_xy_jerk / 2.0;
        if current_abs_feedrate[Z_AXIS] > self.limits.max_z_jerk / 2.0 {
            vmax_junction = vmax_junction.min(self.limits.max_z_jerk / 2.0);
        }
        if current_abs_feedrate[E_AXIS] > self.limits.max_e_jerk / 2.0 {
            vmax_junction = vmax_junction.min(self.limits.max_e_jerk / 2.0);
        }
        vmax_junction = vmax_junction.min(block.nominal_feedrate);
        let safe_speed = vmax_junction;

        // From the second move on, limit the junction by the instantaneous
        // feedrate change against the previous move.
        if !self.blocks.is_empty() && self.previous_nominal_feedrate > 1e-4 {
            let dx = current_feedrate[X_AXIS] - self.previous_feedrate[X_AXIS];
            let dy = current_feedrate[Y_AXIS] - self.previous_feedrate[Y_AXIS];
            let xy_jerk = (dx * dx + dy * dy).sqrt();
            vmax_junction = block.nominal_feedrate;
            let mut vmax_junction_factor = 1.0_f64;
            if xy_jerk > self.max_xy_jerk {
                vmax_junction_factor = self.max_xy_jerk / xy_jerk;
            }
            let z_jerk = (current_feedrate[Z_AXIS] - self.previous_feedrate[Z_AXIS]).abs();
            if z_jerk > self.limits.max_z_jerk {
                vmax_junction_factor = vmax_junction_factor.min(self.limits.max_z_jerk / z_jerk);
            }
            let e_jerk = (current_feedrate[E_AXIS] - self.previous_feedrate[E_AXIS]).abs();
            if e_jerk > self.limits.max_e_jerk {
                vmax_junction_factor = vmax_junction_factor.min(self.limits.max_e_jerk / e_jerk);
            }
            // Never faster than the previous move cruised.
            vmax_junction =
                self.previous_nominal_feedrate.min(vmax_junction * vmax_junction_factor);
        }
        block.max_entry_speed = vmax_junction;

        let v_allowable =
            max_allowable_speed(-block.acceleration, MINIMUM_PLANNER_SPEED, block.distance);
        block.entry_speed = vmax_junction.min(v_allowable);
        block.nominal_length = block.nominal_feedrate <= v_allowable;
        block.recalculate = true;

        self.previous_feedrate = current_feedrate;
        self.previous_nominal_feedrate = block.nominal_feedrate;
        self.position = new_position;

        let entry_factor = block.entry_speed / block.nominal_feedrate;
        let exit_factor = safe_speed / block.nominal_feedrate;
        calculate_trapezoid(&mut block, entry_factor, exit_factor);
        self.blocks.push(block);
        true
    }

    /// Backward pass: walking tail to head, lower entry speeds so every block
    /// can still decelerate to its successor's entry speed within its length.
    pub(crate) fn reverse_pass(&mut self) {
        let len = self.blocks.len();
        if len < 3 {
            return;
        }
        for i in (1..len - 1).rev() {
            let (head, tail) = self.blocks.split_at_mut(i + 1);
            let current = &mut head[i];
            let next = &tail[0];
            if current.entry_speed != current.max_entry_speed {
                if !current.nominal_length && current.max_entry_speed > next.entry_speed {
                    current.entry_speed = current.max_entry_speed.min(max_allowable_speed(
                        -current.acceleration,
                        next.entry_speed,
                        current.distance,
                    ));
                } else {
                    current.entry_speed = current.max_entry_speed;
                }
                current.recalculate = true;
            }
        }
    }

    /// Forward pass: walking head to tail, lower entry speeds that the
    /// preceding block cannot accelerate up to within its length.
    pub(crate) fn forward_pass(&mut self) {
        for i in 1..self.blocks.len() {
            let (head, tail) = self.blocks.split_at_mut(i);
            let previous = &head[i - 1];
            let current = &mut tail[0];
            if !previous.nominal_length && previous.entry_speed < current.entry_speed {
                let entry_speed = current.entry_speed.min(max_allowable_speed(
                    -previous.acceleration,
                    previous.entry_speed,
                    previous.distance,
                ));
                if current.entry_speed != entry_speed {
                    current.entry_speed = entry_speed;
                    current.recalculate = true;
                }
            }
        }
    }

    /// Recompute the trapezoid of every block whose entry or exit junction
    /// speed changed. The final block always exits at the planner floor.
    pub(crate) fn recalculate_trapezoids(&mut self) {
        for i in 1..self.blocks.len() {
            let (head, tail) = self.blocks.split_at_mut(i);
            let current = &mut head[i - 1];
            let next = &tail[0];
            if current.recalculate || next.recalculate {
                let entry_factor = current.entry_speed / current.nominal_feedrate;
                let exit_factor = next.entry_speed / current.nominal_feedrate;
                calculate_trapezoid(current, entry_factor, exit_factor);
                current.recalculate = false;
            }
        }
        if let Some(last) = self.blocks.last_mut() {
            let entry_factor = last.entry_speed / last.nominal_feedrate;
            let exit_factor = MINIMUM_PLANNER_SPEED / last.nominal_feedrate;
            calculate_trapezoid(last, entry_factor, exit_factor);
            last.recalculate = false;
        }
    }

    /// Sum every block's phase times into per-feature totals. Externally
    /// added pause time lands in the `None` bucket.
    pub(crate) fn sum_totals(&self) -> TimeTotals {
        let mut totals = TimeTotals::new();
        totals[PrintFeature::None] = self.extra_time;
        for block in &self.blocks {
            let (accel_time, cruise_time, decel_time) = block.phase_times();
            totals[block.feature] += accel_time + cruise_time + decel_time;
        }
        totals
    }
}
