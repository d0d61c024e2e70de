//! Lookahead flush-window planner with junction-deviation cornering.
//!
//! The Klipper-style strategy. Alongside each block it keeps a
//! [`MoveKinematics`] record with squared-velocity bounds. `calculate()`
//! first runs the classical passes over the block buffer, then derives
//! cornering limits from the geometric angle between consecutive moves and a
//! junction-deviation constant, and finally refines trapezoids in sliding
//! flush windows: a window extends until enough minimum move time has
//! accumulated, then achievable start velocities are resolved tail to head
//! within it. Moves a window cannot finalize keep their classical trapezoid.

use crate::block::{Block, PlannerState};
use printkit_core::{
    AxisVector, FirmwareLimits, PrintFeature, TimeTotals, AXIS_COUNT, E_AXIS, X_AXIS, Y_AXIS,
    Z_AXIS,
};
use tracing::debug;

/// Cornering speed assumed to survive a perfectly square corner (mm/s).
const SQUARE_CORNER_VELOCITY: f64 = 5.0;
/// Ceiling on any cruise velocity considered by the lookahead (mm/s).
const MAX_VELOCITY: f64 = 1000.0;
/// Stand-in acceleration for pure-extrusion moves, effectively unlimited.
const EXTRUDE_ONLY_ACCEL: f64 = 99_999_999.9;
/// Acceleration cap for the smoothed (corner-rounding) velocity profile.
const MAX_ACCEL_TO_DECEL: f64 = 10_000.0;
/// Minimum accumulated move time before a window is resolved (s).
const FLUSH_WINDOW_TIME: f64 = 2.0;
/// Junctions with cos(theta) above this are treated as colinear (no corner).
const COLINEAR_COS_THETA: f64 = 0.999999;

/// Per-move kinematic bounds used by the flush-window resolution.
///
/// Velocity fields hold squared values (`_v2`) so the resolution loop never
/// takes square roots until a trapezoid is finalized.
#[derive(Debug, Clone, Copy)]
struct MoveKinematics {
    /// Unit direction of the move (delta / move_d), all four axes.
    axes_r: AxisVector,
    /// Move length (mm); |E delta| for pure extrusion.
    move_d: f64,
    /// Junction-deviation constant derived from the square-corner velocity.
    junction_deviation: f64,
    /// Acceleration bound for this move (mm/s²).
    accel: f64,
    /// False for pure-extrusion moves, which bypass cornering geometry.
    is_kinematic_move: bool,
    /// Cornering-limited ceiling on the squared start velocity.
    max_start_v2: f64,
    /// Squared cruise velocity ceiling.
    max_cruise_v2: f64,
    /// Squared velocity gain available over the move's length (2·d·a).
    delta_v2: f64,
    /// Smoothed-profile ceiling on the squared start velocity.
    max_smoothed_v2: f64,
    /// Squared velocity gain of the smoothed profile.
    smooth_delta_v2: f64,
    /// Time of the move at full cruise speed (s); lower bound on its real time.
    min_move_t: f64,
}

/// Time estimator using a junction-deviation cornering model and lookahead
/// flush windows.
#[derive(Debug, Clone)]
pub struct LookaheadPlanner {
    state: PlannerState,
    kinematics: Vec<MoveKinematics>,
}

impl LookaheadPlanner {
    /// Create a planner for a machine with the given limits.
    pub fn new(limits: FirmwareLimits) -> Self {
        Self {
            state: PlannerState::new(limits),
            kinematics: Vec::new(),
        }
    }

    /// Seed the head position before the first [`plan`](Self::plan) call.
    pub fn set_position(&mut self, position: AxisVector) {
        self.state.set_position(position);
    }

    /// Append one move in toolpath emission order.
    ///
    /// The block and its kinematics record are inserted together; a
    /// zero-travel move inserts neither, so the two buffers stay in lockstep.
    pub fn plan(&mut self, new_position: AxisVector, feedrate: f64, feature: PrintFeature) {
        let kinematics = self.build_kinematics(new_position, feedrate);
        if self.state.append_block(new_position, feedrate, feature) {
            self.kinematics.push(kinematics);
        }
        debug_assert_eq!(self.kinematics.len(), self.state.blocks.len());
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

    /// Clear the buffered moves and extra time for reuse. The head position
    /// must be seeded again before planning.
    pub fn reset(&mut self) {
        self.state.reset();
        self.kinematics.clear();
    }

    /// Finalize the whole buffer and return the per-feature time totals.
    ///
    /// Does not clear the buffer; call [`reset`](Self::reset) before reuse.
    pub fn calculate(&mut self) -> TimeTotals {
        debug!(
            moves = self.kinematics.len(),
            "finalizing lookahead plan"
        );
        self.state.reverse_pass();
        self.state.forward_pass();
        self.state.recalculate_trapezoids();
        self.apply_junction_limits();
        self.flush_windows();
        self.state.sum_totals()
    }

    /// The finalized blocks, for inspection and statistics.
    pub fn blocks(&self) -> &[Block] {
        &self.state.blocks
    }

    fn build_kinematics(&self, new_position: AxisVector, feedrate: f64) -> MoveKinematics {
        let default_accel = self.state.acceleration;
        let scv2 = SQUARE_CORNER_VELOCITY * SQUARE_CORNER_VELOCITY;
        let junction_deviation = scv2 * (2.0_f64.sqrt() - 1.0) / default_accel;

        let delta = new_position - self.state.position;
        let mut move_d = delta.xyz_magnitude();
        let mut velocity = feedrate.min(MAX_VELOCITY);
        let mut accel = default_accel;
        let mut is_kinematic_move = true;

        let inv_move_d;
        if move_d < 1e-9 {
            // Pure extrusion: exempt from cornering and acceleration
            // geometry, runs at the requested feedrate.
            move_d = delta[E_AXIS].abs();
            inv_move_d = if move_d != 0.0 { 1.0 / move_d } else { 0.0 };
            accel = EXTRUDE_ONLY_ACCEL;
            velocity = feedrate;
            is_kinematic_move = false;
        } else {
            inv_move_d = 1.0 / move_d;
        }

        let mut axes_r = AxisVector::zero();
        for n in 0..AXIS_COUNT {
            axes_r[n] = delta[n] * inv_move_d;
        }

        let max_accel_to_decel = MAX_ACCEL_TO_DECEL.min(accel);
        MoveKinematics {
            axes_r,
            move_d,
            junction_deviation,
            accel,
            is_kinematic_move,
            max_start_v2: 0.0,
            max_cruise_v2: velocity * velocity,
            delta_v2: 2.0 * move_d * accel,
            max_smoothed_v2: 0.0,
            smooth_delta_v2: 2.0 * move_d * max_accel_to_decel,
            min_move_t: move_d / velocity,
        }
    }

    /// Derive each junction's squared start-velocity ceiling from the turn
    /// angle between consecutive kinematic moves.
    fn apply_junction_limits(&mut self) {
        for n in 1..self.kinematics.len() {
            let (head, tail) = self.kinematics.split_at_mut(n);
            let prev = &head[n - 1];
            let current = &mut tail[0];
            if !(current.is_kinematic_move && prev.is_kinematic_move) {
                continue;
            }

            // Dot product of the incoming and outgoing unit directions,
            // negated: equal directions give -1, a reversal gives +1.
            let mut cos_theta = -(current.axes_r[X_AXIS] * prev.axes_r[X_AXIS]
                + current.axes_r[Y_AXIS] * prev.axes_r[Y_AXIS]
                + current.axes_r[Z_AXIS] * prev.axes_r[Z_AXIS]);
            if cos_theta > COLINEAR_COS_THETA {
                // Full reversal; the standing-start bound already applies.
                continue;
            }
            cos_theta = cos_theta.max(-COLINEAR_COS_THETA);
            let sin_theta_d2 = (0.5 * (1.0 - cos_theta)).sqrt();
            let junction_radius = sin_theta_d2 / (1.0 - sin_theta_d2);
            let tan_theta_d2 = sin_theta_d2 / (0.5 * (1.0 + cos_theta)).sqrt();

            let centripetal_v2 = 0.5 * current.move_d * tan_theta_d2 * current.accel;
            let prev_centripetal_v2 = 0.5 * prev.move_d * tan_theta_d2 * prev.accel;
            let deviation_v2 = (junction_radius * current.junction_deviation * current.accel)
                .min(junction_radius * prev.junction_deviation * prev.accel);
            let approach_v2 = centripetal_v2
                .min(prev_centripetal_v2)
                .min(prev.max_start_v2 + prev.delta_v2);
            let cruise_v2 = current.max_cruise_v2.min(prev.max_cruise_v2);

            current.max_start_v2 = deviation_v2.min(approach_v2).min(cruise_v2);
            current.max_smoothed_v2 = current
                .max_start_v2
                .min(prev.max_smoothed_v2 + prev.smooth_delta_v2);
        }
    }

    /// Process the buffer in sliding flush windows. Each window accumulates
    /// moves until their minimum time exceeds the flush threshold, then
    /// resolves it tail to head. The final move is never part of a window.
    fn flush_windows(&mut self) {
        let count = self.kinematics.len();
        if count < 2 {
            return;
        }
        let last = count - 1;
        let mut window_start = 0;
        let mut window_end = 0;
        loop {
            let mut flush_time = 0.0;
            while window_end < last {
                flush_time += self.kinematics[window_end].min_move_t;
                if flush_time > FLUSH_WINDOW_TIME {
                    break;
                }
                window_end += 1;
            }
            if window_end >= last {
                break;
            }
            self.resolve_window(window_start, window_end);
            window_end += 1;
            if window_end >= last {
                break;
            }
            window_start = window_end;
        }
    }

    /// Resolve one window tail to head: bound each move's achievable squared
    /// start velocity by its successor's, defer moves whose smoothed profile
    /// is still unconstrained, and finalize each contiguous run with its
    /// shared peak cruise velocity once that peak is known.
    fn resolve_window(&mut self, window_start: usize, window_end: usize) {
        let mut flush_bound = window_end + 1;
        let mut bound_is_set = false;
        let mut delayed: Vec<(usize, f64, f64)> = Vec::new();
        let mut next_end_v2 = 0.0;
        let mut next_smoothed_v2 = 0.0;
        let mut peak_cruise_v2 = 0.0;

        for i in ((window_start + 1)..=window_end).rev() {
            let kin = self.kinematics[i];
            let reachable_start_v2 = next_end_v2 + kin.delta_v2;
            let start_v2 = kin.max_start_v2.min(reachable_start_v2);
            let reachable_smoothed_v2 = next_smoothed_v2 + kin.smooth_delta_v2;
            let smoothed_v2 = kin.max_smoothed_v2.min(reachable_smoothed_v2);

            if smoothed_v2 < reachable_smoothed_v2 {
                // This move can decelerate, or it is a full acceleration
                // move following a full deceleration run.
                if smoothed_v2 + kin.smooth_delta_v2 > next_smoothed_v2 || !delayed.is_empty() {
                    if !bound_is_set && peak_cruise_v2 != 0.0 {
                        flush_bound = i;
                        bound_is_set = true;
                    }
                    peak_cruise_v2 = kin
                        .max_cruise_v2
                        .min((smoothed_v2 + reachable_smoothed_v2) * 0.5);
                    if !delayed.is_empty() {
                        if bound_is_set && i < flush_bound {
                            // Propagate the shared peak to the delayed run.
                            let mut run_cruise_v2 = peak_cruise_v2;
                            for &(index, run_start_v2, run_end_v2) in delayed.iter() {
                                run_cruise_v2 = run_cruise_v2.min(run_start_v2);
                                self.finalize_trapezoid(
                                    index,
                                    run_start_v2.min(run_cruise_v2),
                                    run_cruise_v2,
                                    run_end_v2.min(run_cruise_v2),
                                );
                            }
                        }
                        delayed.clear();
                    }
                }
                if bound_is_set && i < flush_bound {
                    let cruise_v2 = ((start_v2 + reachable_start_v2) * 0.5)
                        .min(kin.max_cruise_v2)
                        .min(peak_cruise_v2);
                    self.finalize_trapezoid(
                        i,
                        start_v2.min(cruise_v2),
                        cruise_v2,
                        next_end_v2.min(cruise_v2),
                    );
                }
            } else {
                // Peak cruise velocity unknown until an earlier move is
                // resolved; defer.
                delayed.push((i, start_v2, next_end_v2));
            }
            next_end_v2 = start_v2;
            next_smoothed_v2 = smoothed_v2;
        }
    }

    /// Write a move's finalized trapezoid from squared junction velocities,
    /// never exceeding what the classical passes already allowed.
    fn finalize_trapezoid(&mut self, index: usize, start_v2: f64, cruise_v2: f64, end_v2: f64) {
        let kin = &self.kinematics[index];
        let block = &mut self.state.blocks[index];

        let initial_v2 = start_v2.min(block.initial_feedrate * block.initial_feedrate);
        let nominal_v2 = cruise_v2.min(block.nominal_feedrate * block.nominal_feedrate);
        let final_v2 = end_v2.min(block.final_feedrate * block.final_feedrate);

        let half_inv_accel = 0.5 / kin.accel;
        let accel_d = (nominal_v2 - initial_v2) * half_inv_accel;
        let decel_d = (nominal_v2 - final_v2) * half_inv_accel;
        let cruise_d = kin.move_d - accel_d - decel_d;

        block.initial_feedrate = initial_v2.sqrt();
        block.nominal_feedrate = nominal_v2.sqrt();
        block.final_feedrate = final_v2.sqrt();
        block.accelerate_until = accel_d;
        block.decelerate_after = accel_d + cruise_d;
    }
}
