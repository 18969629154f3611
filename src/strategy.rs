//! Ramp optimization strategies and their shared result type.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(debug_assertions)]
use tracing::instrument;

use crate::anchor::{self, AnchorScoring};
use crate::characteristics::{ExtractionPolicy, FamilyCharacteristics};
use crate::color::{Color, Oklch, perceptual_distance};
use crate::error::RampError;
use crate::family::{ColorFamily, StepId};
use crate::identity::{self, IdentityPurpose};
use crate::neutral::{self, NeutralBase};
use crate::steps::LightnessSteps;

/// Available optimization strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    /// Fixed neutral hue/chroma at every step
    Neutral,
    /// Family hue/chroma held constant, lightness from the plan
    #[default]
    BrandPreserving,
    /// One existing color preserved exactly, the rest regenerated around it
    SmartAnchor,
    /// Every identity-carrying color preserved, the rest filled between them
    IdentityPreserving,
}

impl StrategyId {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::BrandPreserving => "brand-preserving",
            Self::SmartAnchor => "smart-anchor",
            Self::IdentityPreserving => "identity-preserving",
        }
    }
}

/// Shared inputs every strategy may consult.
#[derive(Debug, Clone, Copy)]
pub struct OptimizationContext<'a> {
    pub neutral: &'a NeutralBase,
    pub extraction: &'a ExtractionPolicy,
    pub anchor: &'a AnchorScoring,
    pub purpose: IdentityPurpose,
}

/// One optimized step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedStep {
    pub step: StepId,
    pub original: Color,
    /// The OKLCH values the strategy asked for, before gamut reduction
    pub target: Oklch,
    pub color: Color,
    pub delta_e: f64,
    pub preserved: bool,
}

/// Outcome of optimizing one family with one strategy.
///
/// `steps` plus `passthrough` cover exactly the input family's step ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub family: String,
    pub strategy: StrategyId,
    pub steps: Vec<OptimizedStep>,
    /// Unparseable input values, returned unchanged
    pub passthrough: Vec<(StepId, String)>,
    pub preserved_steps: Vec<StepId>,
    pub anchor_step: Option<StepId>,
}

impl OptimizationResult {
    /// Every step id in the result, in ascending order.
    pub fn step_ids(&self) -> Vec<StepId> {
        let mut ids: Vec<StepId> = self
            .steps
            .iter()
            .map(|s| s.step)
            .chain(self.passthrough.iter().map(|(id, _)| *id))
            .collect();
        ids.sort();
        ids
    }

    pub fn get(&self, step: StepId) -> Option<&OptimizedStep> {
        self.steps.iter().find(|s| s.step == step)
    }

    pub fn delta_e_by_step(&self) -> Vec<(StepId, f64)> {
        self.steps.iter().map(|s| (s.step, s.delta_e)).collect()
    }

    pub fn max_delta_e(&self) -> f64 {
        self.steps.iter().map(|s| s.delta_e).fold(0.0, f64::max)
    }

    pub fn mean_delta_e(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        self.steps.iter().map(|s| s.delta_e).sum::<f64>() / self.steps.len() as f64
    }

    /// Final lightness of each optimized step, in step order.
    pub fn lightnesses(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.color.lightness()).collect()
    }
}

/// What a strategy decided for a single step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum StepPlan {
    Generate(Oklch),
    Preserve,
}

/// Optimize a family with the given strategy.
///
/// `plans` from each strategy are aligned with `family.steps()`.
#[cfg_attr(
    debug_assertions,
    instrument(skip_all, fields(family = family.name(), strategy = strategy.display_name()))
)]
pub fn optimize(
    family: &ColorFamily,
    plan: &LightnessSteps,
    characteristics: &FamilyCharacteristics,
    strategy: StrategyId,
    ctx: &OptimizationContext<'_>,
) -> Result<OptimizationResult, RampError> {
    if family.is_empty() {
        return Err(RampError::EmptyFamily(family.name().to_string()));
    }

    let result = match strategy {
        StrategyId::Neutral => {
            let plans = neutral::plan_steps(family, plan, ctx.neutral);
            assemble(family, strategy, &plans, None)
        }
        StrategyId::BrandPreserving => {
            let plans = brand_preserving_steps(family, plan, characteristics);
            assemble(family, strategy, &plans, None)
        }
        StrategyId::SmartAnchor => {
            let (anchor_step, plans) = anchor::plan_steps(family, plan, characteristics, ctx)?;
            assemble(family, strategy, &plans, Some(anchor_step))
        }
        StrategyId::IdentityPreserving => {
            let plans = identity::plan_steps(family, plan, characteristics, ctx);
            assemble(family, strategy, &plans, None)
        }
    };

    debug!(
        steps = result.steps.len(),
        preserved = result.preserved_steps.len(),
        max_delta_e = result.max_delta_e(),
        "optimized family"
    );
    Ok(result)
}

/// Constant family hue/chroma with lightness taken straight from the plan.
fn brand_preserving_steps(
    family: &ColorFamily,
    plan: &LightnessSteps,
    characteristics: &FamilyCharacteristics,
) -> Vec<StepPlan> {
    family
        .steps()
        .iter()
        .map(|(step, _)| {
            StepPlan::Generate(Oklch::new(
                plan.lightness_at(*step),
                characteristics.chroma,
                characteristics.hue,
            ))
        })
        .collect()
}

pub(crate) fn assemble(
    family: &ColorFamily,
    strategy: StrategyId,
    plans: &[StepPlan],
    anchor_step: Option<StepId>,
) -> OptimizationResult {
    let steps: Vec<OptimizedStep> = family
        .steps()
        .iter()
        .zip(plans)
        .map(|((step, original), plan)| match plan {
            StepPlan::Generate(target) => {
                let color = Color::from_oklch(*target);
                OptimizedStep {
                    step: *step,
                    original: original.clone(),
                    target: *target,
                    delta_e: perceptual_distance(original, &color),
                    color,
                    preserved: false,
                }
            }
            StepPlan::Preserve => OptimizedStep {
                step: *step,
                original: original.clone(),
                target: original.oklch,
                color: original.clone(),
                delta_e: 0.0,
                preserved: true,
            },
        })
        .collect();

    let preserved_steps = steps.iter().filter(|s| s.preserved).map(|s| s.step).collect();

    OptimizationResult {
        family: family.name().to_string(),
        strategy,
        steps,
        passthrough: family.unparsed().to_vec(),
        preserved_steps,
        anchor_step,
    }
}
