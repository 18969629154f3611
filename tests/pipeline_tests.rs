use approx::assert_relative_eq;
use rampforge::anchor::AnchorFallback;
use rampforge::color::{Color, Oklch};
use rampforge::config::{ModeConfig, RampConfig, StrategyRule};
use rampforge::error::{RampError, WarningKind};
use rampforge::family::{FamilyInput, StepId};
use rampforge::identity::IdentityPurpose;
use rampforge::pipeline::Pipeline;
use rampforge::report::Mode;
use rampforge::steps::{Direction, LightnessRange};
use rampforge::strategy::StrategyId;

fn blue() -> FamilyInput {
    FamilyInput::new(
        "Blue",
        [
            (100, "#dbeafe"),
            (300, "#93c5fd"),
            (500, "#3b82f6"),
            (700, "#1d4ed8"),
            (900, "#1e3a8a"),
        ],
    )
}

fn slate() -> FamilyInput {
    FamilyInput::new(
        "Slate Gray",
        [(100, "#f1f5f9"), (500, "#64748b"), (900, "#0f172a")],
    )
}

fn green() -> FamilyInput {
    FamilyInput::new(
        "Green",
        [(100, "#dcfce7"), (500, "#22c55e"), (900, "#14532d")],
    )
}

/// Tailwind-style configuration: light colors at low step ids.
fn config() -> RampConfig {
    let mut config = RampConfig::default();
    config.lightness.direction = Direction::Descending;
    config
}

#[test]
fn test_families_reported_in_input_order() {
    let pipeline = Pipeline::new(config()).unwrap();
    let report = pipeline.run(&[green(), blue(), slate()]);

    let names: Vec<&str> = report.families.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["Green", "Blue", "Slate Gray"]);
    assert!(report.excluded.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn test_runs_are_deterministic() {
    let pipeline = Pipeline::new(config()).unwrap();
    let families = [blue(), slate(), green()];

    let first = serde_json::to_string(&pipeline.run(&families)).unwrap();
    let second = serde_json::to_string(&pipeline.run(&families)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_strategy_assignment() {
    let mut config = config();
    let mut brand = StrategyRule::new("(?i)^brand", StrategyId::IdentityPreserving);
    brand.purpose = IdentityPurpose::Semantic;
    config.rules.push(brand);
    let pipeline = Pipeline::new(config).unwrap();

    let table = ["Azure", "Slate Gray", "Brand Blue", "neutral-warm", "Grey"]
        .iter()
        .map(|name| {
            let a = pipeline.assign(name);
            format!("{name}: {} ({:?})", a.strategy.display_name(), a.purpose)
        })
        .collect::<Vec<_>>()
        .join("\n");

    insta::assert_snapshot!(table, @r"
    Azure: brand-preserving (Brand)
    Slate Gray: neutral (Brand)
    Brand Blue: identity-preserving (Semantic)
    neutral-warm: neutral (Brand)
    Grey: neutral (Brand)
    ");
}

#[test]
fn test_neutral_family_uses_neutral_base() {
    let pipeline = Pipeline::new(config()).unwrap();
    let report = pipeline.run(&[slate()]);
    let family = report.family("Slate Gray").unwrap();

    assert_eq!(family.applied_strategy(), StrategyId::Neutral);
    assert_eq!(family.characteristics.hue, 250.0);
    for step in &family.light.optimization.steps {
        assert_eq!(step.target.c, 0.008);
    }
}

#[test]
fn test_output_covers_every_input_step() {
    let pipeline = Pipeline::new(config()).unwrap();
    let input = FamilyInput::new("Blue", [(100, "#dbeafe"), (200, "??"), (500, "#3b82f6")]);
    let report = pipeline.run(&[input]);

    let family = report.family("Blue").unwrap();
    assert_eq!(
        family.light.optimization.step_ids(),
        vec![StepId(100), StepId(200), StepId(500)]
    );
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind, WarningKind::InvalidColor);
    assert_eq!(report.warnings[0].step, Some(StepId(200)));
}

#[test]
fn test_unusable_families_are_excluded() {
    let pipeline = Pipeline::new(config()).unwrap();
    let empty = FamilyInput::new("Empty", Vec::<(u32, String)>::new());
    let broken = FamilyInput::new("Broken", [(500, "nope")]);
    let report = pipeline.run(&[empty, blue(), broken]);

    assert_eq!(report.families.len(), 1);
    let excluded: Vec<&str> = report.excluded.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(excluded, ["Empty", "Broken"]);

    let kinds: Vec<WarningKind> = report.warnings.iter().map(|w| w.kind).collect();
    assert_eq!(
        kinds,
        [
            WarningKind::EmptyFamily,
            WarningKind::InvalidColor,
            WarningKind::EmptyFamily
        ]
    );
    assert_eq!(report.summary.families_excluded, 2);
}

#[test]
fn test_missing_anchor_falls_back_to_brand_preserving() {
    let mut config = config();
    config.default_strategy = StrategyId::SmartAnchor;
    let stone = FamilyInput::new("Stone", [(100, "#cccccc"), (900, "#444444")]);

    let report = Pipeline::new(config.clone()).unwrap().run(&[stone.clone()]);
    let family = report.family("Stone").unwrap();
    assert_eq!(family.strategy, StrategyId::SmartAnchor);
    assert_eq!(family.applied_strategy(), StrategyId::BrandPreserving);
    assert_eq!(report.warnings[0].kind, WarningKind::NoAnchorFound);

    config.anchor.fallback = AnchorFallback::Exclude;
    let report = Pipeline::new(config).unwrap().run(&[stone]);
    assert!(report.families.is_empty());
    assert_eq!(report.excluded[0].name, "Stone");
    assert_eq!(report.warnings[0].kind, WarningKind::NoAnchorFound);
}

#[test]
fn test_dark_mode_variant() {
    let mut config = config();
    config.dark = Some(ModeConfig {
        range: LightnessRange::new(0.12, 0.9),
        direction: Direction::Ascending,
    });
    let report = Pipeline::new(config).unwrap().run(&[blue()]);
    let family = report.family("Blue").unwrap();

    let light = &family.light;
    let dark = family.dark.as_ref().unwrap();
    assert_eq!(light.mode, Mode::Light);
    assert_eq!(dark.mode, Mode::Dark);

    // Step 100 is the lightest in light mode and the darkest in dark mode
    let light_100 = light.optimization.get(StepId(100)).unwrap().target.l;
    let dark_100 = dark.optimization.get(StepId(100)).unwrap().target.l;
    assert_relative_eq!(light_100, 0.95 - 0.8 / 13.0, epsilon = 1e-12);
    assert_relative_eq!(dark_100, 0.12 + 0.78 / 13.0, epsilon = 1e-12);
    assert_eq!(report.summary.total_colors, 10);
}

#[test]
fn test_reference_family_shapes_the_plan() {
    let mut config = config();
    config.lightness.reference_family = Some("Blue".to_string());
    let pipeline = Pipeline::new(config).unwrap();

    let (plan, warnings) = pipeline.resolve_plan(&[green(), blue()]);
    assert!(warnings.is_empty());
    assert_eq!(plan.first(), 0.95);
    assert_eq!(plan.last(), 0.15);
    assert_ne!(plan.lightnesses(), pipeline.base_plan().lightnesses());

    let (plan, warnings) = pipeline.resolve_plan(&[green()]);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, WarningKind::ReferencePattern);
    assert_eq!(plan, *pipeline.base_plan());
}

#[test]
fn test_invalid_configuration_is_fatal() {
    let mut config = config();
    config.lightness.range = LightnessRange::new(0.9, 0.1);
    let err = Pipeline::new(config).unwrap_err();
    assert!(matches!(err, RampError::Configuration(_)));

    let mut config = RampConfig::default();
    config.steps.count = 1;
    assert!(Pipeline::new(config).is_err());
}

#[test]
fn test_brand_separation_skips_neutrals() {
    let pipeline = Pipeline::new(config()).unwrap();
    let red = FamilyInput::new("Red", [(500, "#ef4444")]);
    let scarlet = FamilyInput::new("Scarlet", [(500, "#ee4545")]);

    let report = pipeline.run(&[red, slate(), scarlet]);
    assert_eq!(report.brand_separation.pairs.len(), 1);
    let pair = &report.brand_separation.pairs[0];
    assert_eq!((pair.first.as_str(), pair.second.as_str()), ("Red", "Scarlet"));
    assert!(!pair.passed);
    assert!(!report.summary.all_passed);
    assert_eq!(report.summary.pass_rates.brand_separation, 0.0);
}

#[test]
fn test_summary_aggregates() {
    let pipeline = Pipeline::new(config()).unwrap();
    let report = pipeline.run(&[blue(), slate(), green()]);
    let summary = &report.summary;

    assert_eq!(summary.families_processed, 3);
    assert_eq!(summary.total_colors, 11);
    assert!(summary.mean_delta_e <= summary.max_delta_e);
    assert!(summary.smoothness.min <= summary.smoothness.median);
    assert!(summary.smoothness.median <= summary.smoothness.max);
    for rate in [
        summary.pass_rates.delta_e,
        summary.pass_rates.accessibility,
        summary.pass_rates.smoothness,
    ] {
        assert!((0.0..=1.0).contains(&rate));
    }
}

#[test]
fn test_compare_reports() {
    let families = [blue(), green()];
    let before = Pipeline::new(config()).unwrap().run(&families);
    assert!(before.compare(&before).is_empty());

    let mut narrower = config();
    narrower.lightness.range = LightnessRange::new(0.25, 0.9);
    let after = Pipeline::new(narrower).unwrap().run(&[blue(), slate()]);

    let comparison = after.compare(&before);
    assert_eq!(comparison.added, ["Slate Gray"]);
    assert_eq!(comparison.removed, ["Green"]);
    assert_eq!(comparison.changed.len(), 1);
    let change = &comparison.changed[0];
    assert_eq!(change.name, "Blue");
    assert!(!change.changed_steps.is_empty());
}

#[test]
fn test_dark_mode_can_pass_validation() {
    let pipeline = Pipeline::new(RampConfig::default()).unwrap();
    let on_plan = FamilyInput::new(
        "Blue",
        pipeline.base_plan().values().iter().map(|&(step, l)| {
            (step.0, Color::from_oklch(Oklch::new(l, 0.1, 260.0)).hex)
        }),
    );
    let light_only = pipeline.run(std::slice::from_ref(&on_plan));
    assert!(light_only.summary.all_passed);

    let mut config = RampConfig::default();
    config.dark = Some(ModeConfig::default());
    let report = Pipeline::new(config).unwrap().run(&[on_plan]);
    let family = report.family("Blue").unwrap();
    let dark = family.dark.as_ref().unwrap();

    // Dark delta E is against the light originals: recorded, not judged
    assert!(!dark.validation.delta_e.outcome.passed);
    assert!(dark.validation.accessibility.passed);
    assert!(family.passed());
    assert!(report.summary.all_passed);
    assert_eq!(report.summary.pass_rates.delta_e, 1.0);
}
