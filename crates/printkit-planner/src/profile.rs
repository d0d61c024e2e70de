//! Trapezoidal velocity-profile math.
//!
//! Pure functions shared by both planning strategies. Every formula works in
//! velocity-vs-position space; singular inputs (zero acceleration, negative
//! discriminants) clamp to zero rather than erroring, because they represent
//! "no adjustment needed" rather than failure.

use crate::block::Block;

/// Slowest speed the planner will ever schedule at a block boundary (mm/s).
///
/// Distinct from the configured minimum feedrate, which only floors the
/// requested feedrate of a move.
pub const MINIMUM_PLANNER_SPEED: f64 = 0.05;

/// Maximum speed allowed at a point such that `target_velocity` is still
/// reachable with `acceleration` over `distance`.
///
/// Pass a negative acceleration for the deceleration case.
pub fn max_allowable_speed(acceleration: f64, target_velocity: f64, distance: f64) -> f64 {
    let discriminant = target_velocity * target_velocity - 2.0 * acceleration * distance;
    discriminant.max(0.0).sqrt()
}

/// Distance needed to change speed from `initial_rate` to `target_rate` at
/// `acceleration`. Zero acceleration means no speed change is possible and
/// yields zero distance.
pub fn estimate_acceleration_distance(
    initial_rate: f64,
    target_rate: f64,
    acceleration: f64,
) -> f64 {
    if acceleration == 0.0 {
        return 0.0;
    }
    (target_rate * target_rate - initial_rate * initial_rate) / (2.0 * acceleration)
}

/// The point along a move of length `distance` where acceleration must flip
/// to deceleration so that the move starts at `initial_rate` and ends at
/// `final_rate` exactly.
///
/// Setting the accelerating profile `v = sqrt(2ad + v_i²)` equal to the
/// decelerating profile `v = sqrt(2a(D - d) + v_f²)` and solving for `d`
/// gives `d = (2aD + v_f² - v_i²) / 4a`. Used when the trapezoid has no
/// plateau.
pub fn intersection_distance(
    initial_rate: f64,
    final_rate: f64,
    acceleration: f64,
    distance: f64,
) -> f64 {
    if acceleration == 0.0 {
        return 0.0;
    }
    (2.0 * acceleration * distance - initial_rate * initial_rate + final_rate * final_rate)
        / (4.0 * acceleration)
}

/// Time needed to cover `distance` starting at `initial_feedrate` under
/// constant `acceleration`.
///
/// A negative discriminant means the move is already past the target; the
/// clamp to zero returns the extremum of the parabola instead.
pub fn acceleration_time_from_distance(
    initial_feedrate: f64,
    distance: f64,
    acceleration: f64,
) -> f64 {
    if acceleration == 0.0 {
        return 0.0;
    }
    let discriminant =
        (initial_feedrate * initial_feedrate + 2.0 * acceleration * distance).max(0.0);
    (-initial_feedrate + discriminant.sqrt()) / acceleration
}

/// Compute a block's acceleration/cruise/deceleration breakpoints from its
/// entry and exit speed factors.
///
/// If the move is too short to reach nominal speed the profile degenerates to
/// a triangle: the switch point comes from [`intersection_distance`] and the
/// plateau is empty.
pub fn calculate_trapezoid(block: &mut Block, entry_factor: f64, exit_factor: f64) {
    let initial_feedrate = block.nominal_feedrate * entry_factor;
    let final_feedrate = block.nominal_feedrate * exit_factor;

    let mut accelerate_distance =
        estimate_acceleration_distance(initial_feedrate, block.nominal_feedrate, block.acceleration);
    let decelerate_distance =
        estimate_acceleration_distance(block.nominal_feedrate, final_feedrate, -block.acceleration);

    let mut plateau_distance = block.distance - accelerate_distance - decelerate_distance;
    if plateau_distance < 0.0 {
        accelerate_distance = intersection_distance(
            initial_feedrate,
            final_feedrate,
            block.acceleration,
            block.distance,
        )
        .clamp(0.0, block.distance);
        plateau_distance = 0.0;
    }

    block.accelerate_until = accelerate_distance;
    block.decelerate_after = accelerate_distance + plateau_distance;
    block.initial_feedrate = initial_feedrate;
    block.final_feedrate = final_feedrate;
}

#[cfg(test)]
mod tests {
    use super::*;
    use printkit_core::PrintFeature;

    fn test_block(distance: f64, nominal_feedrate: f64, acceleration: f64) -> Block {
        let mut block = Block::new(PrintFeature::None);
        block.distance = distance;
        block.nominal_feedrate = nominal_feedrate;
        block.acceleration = acceleration;
        block
    }

    #[test]
    fn test_zero_acceleration_guards() {
        assert_eq!(estimate_acceleration_distance(0.0, 50.0, 0.0), 0.0);
        assert_eq!(intersection_distance(0.0, 0.0, 0.0, 100.0), 0.0);
        assert_eq!(acceleration_time_from_distance(10.0, 5.0, 0.0), 0.0);
    }

    #[test]
    fn test_acceleration_distance_from_rest() {
        // v² = 2ad => d = 50²/(2*1000) = 1.25
        let d = estimate_acceleration_distance(0.0, 50.0, 1000.0);
        assert!((d - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_long_move_has_plateau() {
        let mut block = test_block(100.0, 50.0, 1000.0);
        calculate_trapezoid(&mut block, 0.0, 0.0);
        assert!(block.accelerate_until > 0.0);
        assert!(block.decelerate_after > block.accelerate_until);
        assert!(block.decelerate_after < block.distance);
    }

    #[test]
    fn test_short_move_degenerates_to_triangle() {
        // Needs 2 * 1.25 mm of ramp; only 1 mm available.
        let mut block = test_block(1.0, 50.0, 1000.0);
        calculate_trapezoid(&mut block, 0.0, 0.0);
        let expected = intersection_distance(0.0, 0.0, 1000.0, 1.0);
        assert!((block.accelerate_until - expected).abs() < 1e-12);
        // No plateau: deceleration starts where acceleration ends.
        assert_eq!(block.decelerate_after, block.accelerate_until);
        assert!(block.accelerate_until <= block.distance);
    }

    #[test]
    fn test_max_allowable_speed_clamps_discriminant() {
        // Decelerating over a distance that already satisfies the target.
        let v = max_allowable_speed(1000.0, 1.0, 100.0);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_trapezoid_is_bit_reproducible() {
        let mut a = test_block(42.0, 87.5, 2500.0);
        let mut b = test_block(42.0, 87.5, 2500.0);
        calculate_trapezoid(&mut a, 0.25, 0.125);
        calculate_trapezoid(&mut b, 0.25, 0.125);
        assert_eq!(a.accelerate_until.to_bits(), b.accelerate_until.to_bits());
        assert_eq!(a.decelerate_after.to_bits(), b.decelerate_after.to_bits());
        assert_eq!(a.initial_feedrate.to_bits(), b.initial_feedrate.to_bits());
        assert_eq!(a.final_feedrate.to_bits(), b.final_feedrate.to_bits());
    }
}
