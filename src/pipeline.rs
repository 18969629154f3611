//! End-to-end ramp generation for a whole color system.
//!
//! Families are planned, optimized and validated independently in parallel;
//! everything that spans families (warnings, brand separation, summary) is
//! folded sequentially afterwards in input order.

use rayon::prelude::*;
use regex::Regex;
use tracing::{info, warn};

#[cfg(debug_assertions)]
use tracing::instrument;

use crate::anchor::AnchorFallback;
use crate::characteristics::{FamilyCharacteristics, extract};
use crate::config::{BaseSource, RampConfig, StrategyRule};
use crate::error::{RampError, Warning, WarningKind};
use crate::family::{ColorFamily, FamilyInput};
use crate::identity::IdentityPurpose;
use crate::report::{ExcludedFamily, FamilyReport, Mode, SystemReport, VariantReport};
use crate::steps::{Direction, LightnessSteps};
use crate::strategy::{OptimizationContext, StrategyId, optimize};
use crate::validation::{check_brand_separation, validate};

/// A compiled strategy rule.
#[derive(Debug, Clone)]
struct CompiledRule {
    regex: Regex,
    rule: StrategyRule,
}

/// Strategy choice for one family, after rule matching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub strategy: StrategyId,
    pub purpose: IdentityPurpose,
    pub base: BaseSource,
    /// Direction override from the matching rule
    pub direction: Option<Direction>,
}

/// Result of processing one family before aggregation.
enum FamilyOutcome {
    Processed(Box<FamilyReport>, Vec<Warning>),
    Excluded(ExcludedFamily, Vec<Warning>),
}

/// Validated configuration plus the state derived from it.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: RampConfig,
    rules: Vec<CompiledRule>,
    /// Range- or pattern-based plan, used directly or as the fallback when a
    /// reference family cannot be used
    base_plan: LightnessSteps,
}

impl Pipeline {
    /// Validate `config` and prepare it for processing.
    pub fn new(config: RampConfig) -> Result<Self, RampError> {
        config.validate()?;

        let rules = config
            .rules
            .iter()
            .map(|rule| {
                Regex::new(&rule.pattern)
                    .map(|regex| CompiledRule {
                        regex,
                        rule: rule.clone(),
                    })
                    .map_err(|e| {
                        RampError::config(format!("invalid rule pattern '{}': {e}", rule.pattern))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let lightness = &config.lightness;
        let base_plan = match &lightness.reference_pattern {
            Some(pattern) => LightnessSteps::plan_from_pattern(
                &config.steps,
                pattern,
                lightness.range,
                lightness.direction,
            )?,
            None => LightnessSteps::plan_range(
                &config.steps,
                lightness.range,
                &lightness.curve,
                lightness.direction,
            )?,
        };

        Ok(Self {
            config,
            rules,
            base_plan,
        })
    }

    pub fn config(&self) -> &RampConfig {
        &self.config
    }

    /// The plan used when no reference family is configured.
    pub fn base_plan(&self) -> &LightnessSteps {
        &self.base_plan
    }

    /// Strategy assignment for a family name: first matching rule, else the default.
    pub fn assign(&self, name: &str) -> Assignment {
        match self.rules.iter().find(|r| r.regex.is_match(name)) {
            Some(CompiledRule { rule, .. }) => Assignment {
                strategy: rule.strategy,
                purpose: rule.purpose,
                base: rule.base,
                direction: rule.direction,
            },
            None => Assignment {
                strategy: self.config.default_strategy,
                purpose: IdentityPurpose::default(),
                base: BaseSource::Family,
                direction: None,
            },
        }
    }

    /// The light-mode plan for this run.
    ///
    /// With `reference_family` set, the named input family's lightness
    /// differences are transplanted; if that family is missing or unusable a
    /// warning is recorded and the base plan is used.
    pub fn resolve_plan(&self, families: &[FamilyInput]) -> (LightnessSteps, Vec<Warning>) {
        let Some(name) = &self.config.lightness.reference_family else {
            return (self.base_plan.clone(), Vec::new());
        };

        let lightness = &self.config.lightness;
        let resolved = families
            .iter()
            .find(|f| &f.name == name)
            .ok_or_else(|| RampError::config(format!("reference family '{name}' not found")))
            .and_then(|input| ColorFamily::parse(input).map(|(family, _)| family))
            .and_then(|family| {
                let pattern = LightnessSteps::reference_pattern(&family);
                LightnessSteps::plan_from_pattern(
                    &self.config.steps,
                    &pattern,
                    lightness.range,
                    lightness.direction,
                )
            });

        match resolved {
            Ok(plan) => (plan, Vec::new()),
            Err(e) => {
                warn!(reference = %name, error = %e, "reference family unusable, using range plan");
                let warning = Warning::new(
                    WarningKind::ReferencePattern,
                    Some(name),
                    format!("reference pattern unusable ({e}); using the configured range"),
                );
                (self.base_plan.clone(), vec![warning])
            }
        }
    }

    /// Generate, optimize and validate every family.
    #[cfg_attr(debug_assertions, instrument(skip_all, fields(families = families.len())))]
    pub fn run(&self, families: &[FamilyInput]) -> SystemReport {
        let (plan, mut warnings) = self.resolve_plan(families);

        let outcomes: Vec<FamilyOutcome> = families
            .par_iter()
            .map(|input| self.process_family(input, &plan))
            .collect();

        let mut reports = Vec::new();
        let mut excluded = Vec::new();
        for outcome in outcomes {
            match outcome {
                FamilyOutcome::Processed(report, family_warnings) => {
                    warnings.extend(family_warnings);
                    reports.push(*report);
                }
                FamilyOutcome::Excluded(family, family_warnings) => {
                    warnings.extend(family_warnings);
                    excluded.push(family);
                }
            }
        }

        let brand_hues: Vec<(String, f64)> = reports
            .iter()
            .filter(|r| r.applied_strategy() != StrategyId::Neutral)
            .map(|r| (r.name.clone(), r.characteristics.hue))
            .collect();
        let separation = check_brand_separation(&brand_hues, self.config.thresholds.brand_separation);

        let report = SystemReport::assemble(
            reports,
            excluded,
            warnings,
            separation,
            &self.config.thresholds,
        );

        info!(
            processed = report.summary.families_processed,
            excluded = report.summary.families_excluded,
            colors = report.summary.total_colors,
            max_delta_e = report.summary.max_delta_e,
            passed = report.summary.all_passed,
            "color system generated"
        );
        report
    }

    fn process_family(&self, input: &FamilyInput, plan: &LightnessSteps) -> FamilyOutcome {
        let mut warnings = Vec::new();

        let family = match ColorFamily::parse(input) {
            Ok((family, parse_warnings)) => {
                warnings.extend(parse_warnings);
                family
            }
            Err(e) => return Self::exclude(&input.name, e, warnings),
        };

        let assignment = self.assign(family.name());
        let Some(characteristics) = self.characteristics(&family, &assignment) else {
            return Self::exclude(
                &input.name,
                RampError::EmptyFamily(input.name.clone()),
                warnings,
            );
        };

        let light_plan = match assignment.direction {
            Some(direction) => plan.with_direction(direction),
            None => plan.clone(),
        };
        let light = match self.variant(
            &family,
            &light_plan,
            &characteristics,
            &assignment,
            Mode::Light,
            &mut warnings,
        ) {
            Ok(variant) => variant,
            Err(e) => return Self::exclude(&input.name, e, warnings),
        };

        let dark = match &self.config.dark {
            Some(mode) => {
                // A rule that flips the light direction flips the dark one too.
                let inverted = assignment
                    .direction
                    .is_some_and(|d| d != self.config.lightness.direction);
                let direction = if inverted {
                    mode.direction.reversed()
                } else {
                    mode.direction
                };
                let dark_plan = plan.scaled_to(mode.range, direction);
                match self.variant(
                    &family,
                    &dark_plan,
                    &characteristics,
                    &assignment,
                    Mode::Dark,
                    &mut warnings,
                ) {
                    Ok(variant) => Some(variant),
                    Err(e) => return Self::exclude(&input.name, e, warnings),
                }
            }
            None => None,
        };

        info!(
            family = %family.name(),
            strategy = light.optimization.strategy.display_name(),
            steps = light.optimization.steps.len(),
            max_delta_e = light.validation.delta_e.outcome.score,
            passed = light.validation.passed(),
            "processed family"
        );

        let report = FamilyReport {
            name: family.name().to_string(),
            strategy: assignment.strategy,
            characteristics,
            light,
            dark,
        };
        FamilyOutcome::Processed(Box::new(report), warnings)
    }

    fn characteristics(
        &self,
        family: &ColorFamily,
        assignment: &Assignment,
    ) -> Option<FamilyCharacteristics> {
        if assignment.strategy == StrategyId::Neutral || assignment.base == BaseSource::Neutral {
            return Some(self.config.neutral_base.characteristics());
        }
        let configured = match assignment.base {
            BaseSource::Brand => self.config.brand_base.map(FamilyCharacteristics::from),
            _ => None,
        };
        configured.or_else(|| extract(family, &self.config.extraction))
    }

    /// Optimize and validate one variant, applying the anchor fallback.
    fn variant(
        &self,
        family: &ColorFamily,
        plan: &LightnessSteps,
        characteristics: &FamilyCharacteristics,
        assignment: &Assignment,
        mode: Mode,
        warnings: &mut Vec<Warning>,
    ) -> Result<VariantReport, RampError> {
        let ctx = OptimizationContext {
            neutral: &self.config.neutral_base,
            extraction: &self.config.extraction,
            anchor: &self.config.anchor.scoring,
            purpose: assignment.purpose,
        };

        let optimization = match optimize(family, plan, characteristics, assignment.strategy, &ctx) {
            Err(e @ RampError::NoAnchorFound { .. })
                if self.config.anchor.fallback == AnchorFallback::BrandPreserving =>
            {
                warn!(family = %family.name(), ?mode, "no anchor found, falling back to brand-preserving");
                warnings.push(Warning::new(
                    WarningKind::NoAnchorFound,
                    Some(family.name()),
                    format!("{e}; used brand-preserving instead"),
                ));
                optimize(family, plan, characteristics, StrategyId::BrandPreserving, &ctx)?
            }
            other => other?,
        };

        let validation = validate(&optimization, &self.config.thresholds);
        Ok(VariantReport {
            mode,
            optimization,
            validation,
        })
    }

    fn exclude(name: &str, error: RampError, mut warnings: Vec<Warning>) -> FamilyOutcome {
        let kind = match &error {
            RampError::InvalidColor { .. } => WarningKind::InvalidColor,
            RampError::NoAnchorFound { .. } => WarningKind::NoAnchorFound,
            _ => WarningKind::EmptyFamily,
        };
        warn!(family = %name, error = %error, "family excluded");
        warnings.push(Warning::new(kind, Some(name), error.to_string()));
        FamilyOutcome::Excluded(
            ExcludedFamily {
                name: name.to_string(),
                reason: error.to_string(),
            },
            warnings,
        )
    }
}
