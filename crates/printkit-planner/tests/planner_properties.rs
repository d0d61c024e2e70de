//! Property tests over randomly generated move chains.

use printkit_core::{AxisVector, FirmwareLimits, PrintFeature};
use printkit_planner::ClassicPlanner;
use proptest::prelude::*;

fn plan_chain(moves: &[(f64, f64, f64)]) -> ClassicPlanner {
    let mut planner = ClassicPlanner::new(FirmwareLimits::default());
    planner.set_position(AxisVector::zero());
    let mut x = 0.0;
    let mut y = 0.0;
    for &(dx, dy, feedrate) in moves {
        x += dx;
        y += dy;
        planner.plan(AxisVector::new(x, y, 0.0, 0.0), feedrate, PrintFeature::None);
    }
    planner
}

proptest! {
    #[test]
    fn trapezoids_are_always_valid(
        moves in prop::collection::vec(
            (0.1f64..50.0, -30.0f64..30.0, 5.0f64..150.0),
            1..40,
        )
    ) {
        let mut planner = plan_chain(&moves);
        let totals = planner.calculate();

        prop_assert!(totals.total().is_finite());
        prop_assert!(totals.total() >= 0.0);
        for block in planner.blocks() {
            prop_assert!(block.accelerate_until >= -1e-9);
            prop_assert!(block.decelerate_after >= block.accelerate_until - 1e-9);
            prop_assert!(block.decelerate_after <= block.distance + 1e-9);
            prop_assert!(block.entry_speed <= block.max_entry_speed + 1e-9);
            prop_assert!(block.max_entry_speed <= block.nominal_feedrate + 1e-9);
        }
    }

    #[test]
    fn stretching_a_move_never_shrinks_its_time(
        distance in 1.0f64..80.0,
        stretch in 1.0f64..3.0,
        feedrate in 5.0f64..150.0,
    ) {
        let base = plan_chain(&[(distance, 0.0, feedrate)]).calculate().total();
        let stretched = plan_chain(&[(distance * stretch, 0.0, feedrate)])
            .calculate()
            .total();
        prop_assert!(stretched >= base - 1e-9);
    }
}
