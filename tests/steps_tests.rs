use approx::assert_relative_eq;
use rampforge::color::Color;
use rampforge::curves::{CurveConfig, CurveType};
use rampforge::error::RampError;
use rampforge::family::{ColorFamily, StepId};
use rampforge::steps::{
    Direction, LightnessRange, LightnessSteps, StepScale, is_monotonic, lightness_differences,
    smoothness,
};

fn default_plan(direction: Direction) -> LightnessSteps {
    LightnessSteps::plan_range(
        &StepScale::default(),
        LightnessRange::default(),
        &CurveConfig::default(),
        direction,
    )
    .unwrap()
}

#[test]
fn test_default_scale_ids() {
    let ids = StepScale::default().ids();
    assert_eq!(ids.len(), 14);
    assert_eq!(ids[0], StepId(0));
    assert_eq!(ids[13], StepId(1300));
}

#[test]
fn test_plan_hits_range_endpoints_exactly() {
    let plan = default_plan(Direction::Ascending);
    assert_eq!(plan.len(), 14);
    assert_eq!(plan.first(), 0.15);
    assert_eq!(plan.last(), 0.95);
    assert!(is_monotonic(&plan.lightnesses(), Direction::Ascending));
}

#[test]
fn test_linear_plan_is_evenly_spaced() {
    let plan = default_plan(Direction::Ascending);
    let diffs = lightness_differences(&plan.lightnesses());
    for d in &diffs {
        assert_relative_eq!(*d, 0.8 / 13.0, epsilon = 1e-12);
    }
    assert!(smoothness(&plan.lightnesses()) < 1e-9);
}

#[test]
fn test_descending_plan_starts_light() {
    let plan = default_plan(Direction::Descending);
    assert_eq!(plan.first(), 0.95);
    assert_eq!(plan.last(), 0.15);
    assert!(is_monotonic(&plan.lightnesses(), Direction::Descending));
    assert!(!is_monotonic(&plan.lightnesses(), Direction::Ascending));
}

#[test]
fn test_curved_plans_stay_monotonic() {
    for curve_type in [CurveType::EaseIn, CurveType::EaseOut, CurveType::Sigmoid] {
        let plan = LightnessSteps::plan_range(
            &StepScale::default(),
            LightnessRange::new(0.1, 0.9),
            &CurveConfig::of(curve_type),
            Direction::Ascending,
        )
        .unwrap();
        assert!(is_monotonic(&plan.lightnesses(), Direction::Ascending));
        assert_eq!(plan.first(), 0.1);
        assert_eq!(plan.last(), 0.9);
    }
}

#[test]
fn test_invalid_range_is_configuration_error() {
    let err = LightnessSteps::plan_range(
        &StepScale::default(),
        LightnessRange::new(0.8, 0.2),
        &CurveConfig::default(),
        Direction::Ascending,
    )
    .unwrap_err();
    assert!(matches!(err, RampError::Configuration(_)));

    assert!(LightnessRange::new(-0.1, 0.5).validate().is_err());
    assert!(LightnessRange::new(0.5, 0.5).validate().is_err());
}

#[test]
fn test_step_count_below_two_is_rejected() {
    let scale = StepScale {
        start: 0,
        spacing: 100,
        count: 1,
    };
    assert!(scale.validate().is_err());
}

#[test]
fn test_lightness_at_interpolates_between_ids() {
    let plan = default_plan(Direction::Ascending);
    let l0 = plan.lightness_at(StepId(0));
    let l1 = plan.lightness_at(StepId(100));
    assert_relative_eq!(plan.lightness_at(StepId(50)), (l0 + l1) / 2.0, epsilon = 1e-12);
    // Outside the scale clamps to the extremes
    assert_eq!(plan.lightness_at(StepId(5000)), 0.95);
    assert_eq!(plan.index_of(StepId(300)), Some(3));
    assert_eq!(plan.index_of(StepId(350)), None);
    assert_eq!(plan.nearest_index(StepId(300)), 3);
    assert_eq!(plan.nearest_index(StepId(340)), 3);
    assert_eq!(plan.nearest_index(StepId(350)), 3);
    assert_eq!(plan.nearest_index(StepId(360)), 4);
    assert_eq!(plan.nearest_index(StepId(9000)), 13);
}

#[test]
fn test_pattern_plan_uses_difference_magnitudes() {
    let scale = StepScale {
        start: 100,
        spacing: 100,
        count: 4,
    };
    let plan = LightnessSteps::plan_from_pattern(
        &scale,
        &[-0.1, -0.1, -0.2],
        LightnessRange::new(0.0, 1.0),
        Direction::Ascending,
    )
    .unwrap();

    let values = plan.lightnesses();
    assert_relative_eq!(values[0], 0.0);
    assert_relative_eq!(values[1], 0.25, epsilon = 1e-12);
    assert_relative_eq!(values[2], 0.5, epsilon = 1e-12);
    assert_relative_eq!(values[3], 1.0);
}

#[test]
fn test_pattern_plan_resamples_to_step_count() {
    let scale = StepScale {
        start: 0,
        spacing: 100,
        count: 5,
    };
    let plan = LightnessSteps::plan_from_pattern(
        &scale,
        &[0.3, 0.3],
        LightnessRange::new(0.2, 0.6),
        Direction::Ascending,
    )
    .unwrap();
    let expected = [0.2, 0.3, 0.4, 0.5, 0.6];
    for (value, want) in plan.lightnesses().iter().zip(expected) {
        assert_relative_eq!(*value, want, epsilon = 1e-12);
    }
}

#[test]
fn test_pattern_without_progression_is_rejected() {
    let err = LightnessSteps::plan_from_pattern(
        &StepScale::default(),
        &[0.0, 0.0],
        LightnessRange::default(),
        Direction::Ascending,
    )
    .unwrap_err();
    assert!(matches!(err, RampError::Configuration(_)));
    assert!(
        LightnessSteps::plan_from_pattern(
            &StepScale::default(),
            &[],
            LightnessRange::default(),
            Direction::Ascending,
        )
        .is_err()
    );
}

#[test]
fn test_reference_pattern_follows_step_order() {
    let family = ColorFamily::new(
        "Blue",
        [
            (StepId(900), Color::parse("#172554").unwrap()),
            (StepId(100), Color::parse("#dbeafe").unwrap()),
            (StepId(500), Color::parse("#3b82f6").unwrap()),
        ],
    );
    let pattern = LightnessSteps::reference_pattern(&family);
    assert_eq!(pattern.len(), 2);
    // Light to dark in step order, so both differences are negative
    assert!(pattern.iter().all(|d| *d < 0.0));
}

#[test]
fn test_scaled_plan_keeps_shape() {
    let plan = LightnessSteps::plan_range(
        &StepScale::default(),
        LightnessRange::default(),
        &CurveConfig::of(CurveType::EaseIn),
        Direction::Ascending,
    )
    .unwrap();
    let dark = plan.scaled_to(LightnessRange::new(0.12, 0.9), Direction::Descending);

    assert_eq!(dark.first(), 0.9);
    assert_eq!(dark.last(), 0.12);
    assert_eq!(dark.shape(), plan.shape());
    assert_eq!(dark.direction(), Direction::Descending);
}

#[test]
fn test_smoothness_scores() {
    assert_eq!(smoothness(&[0.5]), 0.0);
    assert_eq!(smoothness(&[0.2, 0.4]), 0.0);
    assert!(smoothness(&[0.1, 0.2, 0.3, 0.4]) < 1e-9);
    assert!(smoothness(&[0.1, 0.15, 0.6, 0.65]) > 0.5);
}
