//! End-to-end planning scenarios for both estimation strategies.

use printkit_core::{AxisVector, FirmwareLimits, PrintFeature, TimeTotals};
use printkit_planner::profile;
use printkit_planner::{PlannerStrategy, TimeEstimator};

fn estimator(strategy: PlannerStrategy) -> TimeEstimator {
    let mut estimator = TimeEstimator::new(strategy, FirmwareLimits::default());
    estimator.set_position(AxisVector::zero());
    estimator
}

fn totals_bits(totals: &TimeTotals) -> Vec<u64> {
    totals.iter().map(|(_, seconds)| seconds.to_bits()).collect()
}

#[test]
fn single_full_speed_move_has_plateau() {
    let mut estimator = estimator(PlannerStrategy::Classic);
    estimator.plan(
        AxisVector::new(100.0, 0.0, 0.0, 0.0),
        50.0,
        PrintFeature::OuterWall,
    );
    let totals = estimator.calculate();

    let block = &estimator.blocks()[0];
    assert!(block.decelerate_after > block.accelerate_until);
    assert!(block.accelerate_until > 0.0);
    // Time is at least the full-cruise lower bound.
    assert!(totals[PrintFeature::OuterWall] >= 100.0 / 50.0);
}

#[test]
fn short_move_degenerates_to_triangle() {
    let mut estimator = estimator(PlannerStrategy::Classic);
    // 1 mm at 200 mm/s: the ramps alone need several millimetres.
    estimator.plan(
        AxisVector::new(1.0, 0.0, 0.0, 0.0),
        200.0,
        PrintFeature::Skin,
    );
    estimator.calculate();

    let block = &estimator.blocks()[0];
    assert_eq!(
        block.decelerate_after, block.accelerate_until,
        "triangular profile must have no plateau"
    );
    let expected = profile::intersection_distance(
        block.initial_feedrate,
        block.final_feedrate,
        block.acceleration,
        block.distance,
    )
    .clamp(0.0, block.distance);
    assert!((block.accelerate_until - expected).abs() < 1e-9);
}

#[test]
fn pure_extrusion_move_takes_distance_over_feedrate() {
    for strategy in [PlannerStrategy::Classic, PlannerStrategy::Lookahead] {
        let mut estimator = estimator(strategy);
        estimator.plan(
            AxisVector::new(0.0, 0.0, 0.0, 10.0),
            5.0,
            PrintFeature::None,
        );
        let totals = estimator.calculate();
        let expected = 10.0 / 5.0;
        assert!(
            (totals.total() - expected).abs() / expected < 0.01,
            "{:?}: got {} expected {}",
            strategy,
            totals.total(),
            expected
        );
    }
}

#[test]
fn replay_after_reset_is_bit_identical() {
    for strategy in [PlannerStrategy::Classic, PlannerStrategy::Lookahead] {
        let mut estimator = estimator(strategy);
        let moves: Vec<(AxisVector, f64)> = (1..=25)
            .map(|i| {
                let f = i as f64;
                (
                    AxisVector::new(f * 7.3, (f * 1.7).sin() * 40.0, 0.0, f * 0.05),
                    30.0 + (f * 0.9).cos() * 20.0,
                )
            })
            .collect();

        for &(pos, feedrate) in &moves {
            estimator.plan(pos, feedrate, PrintFeature::Infill);
        }
        estimator.add_time(1.25);
        let first = estimator.calculate();

        estimator.reset();
        estimator.set_position(AxisVector::zero());
        for &(pos, feedrate) in &moves {
            estimator.plan(pos, feedrate, PrintFeature::Infill);
        }
        estimator.add_time(1.25);
        let second = estimator.calculate();

        assert_eq!(totals_bits(&first), totals_bits(&second), "{:?}", strategy);
    }
}

#[test]
fn longer_move_never_takes_less_time() {
    for strategy in [PlannerStrategy::Classic, PlannerStrategy::Lookahead] {
        let mut short = estimator(strategy);
        short.plan(
            AxisVector::new(10.0, 0.0, 0.0, 0.0),
            80.0,
            PrintFeature::None,
        );
        let short_time = short.calculate().total();

        let mut long = estimator(strategy);
        long.plan(
            AxisVector::new(25.0, 0.0, 0.0, 0.0),
            80.0,
            PrintFeature::None,
        );
        let long_time = long.calculate().total();

        assert!(long_time >= short_time, "{:?}", strategy);
    }
}

#[test]
fn trapezoids_stay_ordered_across_a_polyline() {
    for strategy in [PlannerStrategy::Classic, PlannerStrategy::Lookahead] {
        let mut estimator = estimator(strategy);
        // Zig-zag infill-like path with corners and a layer change.
        for i in 1..=60 {
            let f = i as f64;
            let x = f * 6.0;
            let y = if i % 2 == 0 { 0.0 } else { 25.0 };
            let z = if i == 30 { 0.2 } else { 0.0 };
            estimator.plan(AxisVector::new(x, y, z, f * 0.1), 45.0, PrintFeature::Infill);
        }
        estimator.calculate();

        for block in estimator.blocks() {
            assert!(block.accelerate_until >= -1e-9, "{:?}", strategy);
            assert!(
                block.decelerate_after >= block.accelerate_until - 1e-9,
                "{:?}",
                strategy
            );
            assert!(
                block.decelerate_after <= block.distance + 1e-9,
                "{:?}",
                strategy
            );
            assert!(block.entry_speed <= block.max_entry_speed + 1e-9, "{:?}", strategy);
        }
    }
}

#[test]
fn extra_time_lands_in_the_none_bucket() {
    let mut estimator = estimator(PlannerStrategy::Classic);
    estimator.add_time(3.5);
    let totals = estimator.calculate();
    assert_eq!(totals[PrintFeature::None], 3.5);
    assert_eq!(totals.total(), 3.5);
}

#[test]
fn empty_buffer_calculates_to_zero() {
    for strategy in [PlannerStrategy::Classic, PlannerStrategy::Lookahead] {
        let mut estimator = estimator(strategy);
        let totals = estimator.calculate();
        assert_eq!(totals.total(), 0.0, "{:?}", strategy);
    }
}

#[test]
fn features_are_bucketed_separately() {
    let mut estimator = estimator(PlannerStrategy::Classic);
    estimator.plan(
        AxisVector::new(50.0, 0.0, 0.0, 1.0),
        40.0,
        PrintFeature::OuterWall,
    );
    estimator.plan(
        AxisVector::new(50.0, 50.0, 0.0, 2.0),
        40.0,
        PrintFeature::Infill,
    );
    estimator.plan(
        AxisVector::new(0.0, 50.0, 0.0, 2.0),
        120.0,
        PrintFeature::MoveCombing,
    );
    let totals = estimator.calculate();

    assert!(totals[PrintFeature::OuterWall] > 0.0);
    assert!(totals[PrintFeature::Infill] > 0.0);
    assert!(totals[PrintFeature::MoveCombing] > 0.0);
    assert_eq!(totals[PrintFeature::Support], 0.0);
    let sum = totals[PrintFeature::OuterWall]
        + totals[PrintFeature::Infill]
        + totals[PrintFeature::MoveCombing];
    assert!((totals.total() - sum).abs() < 1e-12);
}

#[test]
fn calculate_without_reset_reprocesses_the_buffer() {
    // calculate() deliberately leaves the buffer intact; reset() is the
    // explicit clearing call.
    let mut estimator = estimator(PlannerStrategy::Classic);
    estimator.plan(
        AxisVector::new(30.0, 0.0, 0.0, 0.0),
        60.0,
        PrintFeature::None,
    );
    let first = estimator.calculate();
    let second = estimator.calculate();
    assert_eq!(totals_bits(&first), totals_bits(&second));
    assert_eq!(estimator.blocks().len(), 1);
}
