//! Performance benchmarks for ramp generation.
//!
//! Measures the hot paths:
//! - Full system run over a set of families
//! - OKLCH conversion of sRGB colors
//! - Gamut reduction
//! - Lightness planning

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rampforge::color::{Color, Oklch, max_displayable_chroma};
use rampforge::config::{ModeConfig, RampConfig};
use rampforge::curves::{CurveConfig, CurveType};
use rampforge::family::FamilyInput;
use rampforge::pipeline::Pipeline;
use rampforge::steps::{Direction, LightnessRange, LightnessSteps, StepScale};
use rampforge::strategy::StrategyId;

/// Twelve families with hues spread around the wheel.
fn sample_families() -> Vec<FamilyInput> {
    (0..12)
        .map(|i| {
            let hue = i as f64 * 30.0;
            let steps = (1..=9).map(|s| {
                let l = 0.97 - s as f64 * 0.085;
                let color = Color::from_oklch(Oklch::new(l, 0.12, hue));
                (s * 100, color.hex)
            });
            FamilyInput::new(format!("Family {i}"), steps)
        })
        .collect()
}

/// Benchmark a full run with the default brand-preserving strategy.
fn bench_system_run(c: &mut Criterion) {
    let pipeline = Pipeline::new(RampConfig::default()).unwrap();
    let families = sample_families();

    c.bench_function("system_run_12_families", |b| {
        b.iter(|| pipeline.run(black_box(&families)))
    });
}

/// Benchmark smart-anchor runs with a paired dark mode.
fn bench_system_run_anchor_dark(c: &mut Criterion) {
    let mut config = RampConfig::default();
    config.default_strategy = StrategyId::SmartAnchor;
    config.dark = Some(ModeConfig::default());
    let pipeline = Pipeline::new(config).unwrap();
    let families = sample_families();

    c.bench_function("system_run_anchor_dark", |b| {
        b.iter(|| pipeline.run(black_box(&families)))
    });
}

/// Benchmark sRGB -> OKLCH conversion for 256 colors.
fn bench_from_rgb8(c: &mut Criterion) {
    let colors: Vec<(u8, u8, u8)> = (0u8..=255)
        .map(|i| (i, i.wrapping_mul(97), i.wrapping_mul(193)))
        .collect();

    c.bench_function("from_rgb8_256", |b| {
        b.iter(|| {
            for (r, g, bl) in &colors {
                black_box(Color::from_rgb8(*r, *g, *bl));
            }
        })
    });
}

/// Benchmark chroma bisection for out-of-gamut targets.
fn bench_gamut_reduction(c: &mut Criterion) {
    let targets: Vec<Oklch> = (0..36)
        .map(|i| Oklch::new(0.3 + (i % 6) as f64 * 0.1, 0.35, i as f64 * 10.0))
        .collect();

    c.bench_function("max_displayable_chroma_36", |b| {
        b.iter(|| {
            for target in &targets {
                black_box(max_displayable_chroma(*target));
            }
        })
    });
}

/// Benchmark lightness planning across curve types.
fn bench_plan_range(c: &mut Criterion) {
    let scale = StepScale::default();
    let range = LightnessRange::default();
    let curves = [
        CurveConfig::of(CurveType::Linear),
        CurveConfig::of(CurveType::Sigmoid),
        CurveConfig {
            control_points: Some(vec![0.0, 0.3, 0.8, 1.0]),
            ..CurveConfig::of(CurveType::Bezier)
        },
    ];

    c.bench_function("plan_range", |b| {
        b.iter(|| {
            for curve in &curves {
                black_box(
                    LightnessSteps::plan_range(&scale, range, curve, Direction::Descending)
                        .unwrap(),
                );
            }
        })
    });
}

criterion_group!(
    benches,
    bench_system_run,
    bench_system_run_anchor_dark,
    bench_from_rgb8,
    bench_gamut_reduction,
    bench_plan_range,
);

criterion_main!(benches);
