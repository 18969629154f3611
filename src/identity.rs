//! Identity-preserving optimization: keep every color that carries the
//! family's identity and regenerate only the steps between them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::anchor::warp_to_anchors;
use crate::characteristics::FamilyCharacteristics;
use crate::color::Oklch;
use crate::family::{ColorFamily, StepId};
use crate::steps::LightnessSteps;
use crate::strategy::{OptimizationContext, StepPlan};

/// Lightness band in which a saturated color is worth preserving.
pub const USABLE_LIGHTNESS: (f64, f64) = (0.25, 0.85);

/// What the family is used for; sets how saturated a color must be to count
/// as part of its identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityPurpose {
    /// Brand colors: only strongly saturated steps are identity
    #[default]
    Brand,
    /// Status/semantic colors (success, warning, ...)
    Semantic,
    /// Low-chroma tinted families
    Subtle,
}

impl IdentityPurpose {
    pub fn chroma_threshold(self) -> f64 {
        match self {
            Self::Brand => 0.10,
            Self::Semantic => 0.05,
            Self::Subtle => 0.02,
        }
    }
}

/// Steps to pass through unchanged: the primary step plus every step that is
/// saturated enough for `purpose` and lies in the usable lightness band.
pub fn preserved_steps(family: &ColorFamily, primary: StepId, purpose: IdentityPurpose) -> Vec<StepId> {
    let (lo, hi) = USABLE_LIGHTNESS;
    family
        .steps()
        .iter()
        .filter(|(step, color)| {
            *step == primary
                || (color.chroma() > purpose.chroma_threshold()
                    && (lo..=hi).contains(&color.lightness()))
        })
        .map(|(step, _)| *step)
        .collect()
}

pub(crate) fn plan_steps(
    family: &ColorFamily,
    plan: &LightnessSteps,
    characteristics: &FamilyCharacteristics,
    ctx: &OptimizationContext<'_>,
) -> Vec<StepPlan> {
    let preserved = preserved_steps(family, ctx.extraction.primary(), ctx.purpose);

    let planned: Vec<f64> = family
        .steps()
        .iter()
        .map(|(step, _)| plan.lightness_at(*step))
        .collect();
    let anchors: Vec<(usize, f64)> = family
        .steps()
        .iter()
        .enumerate()
        .filter(|(_, (step, _))| preserved.contains(step))
        .map(|(i, (_, color))| (i, color.lightness()))
        .collect();
    let filled = warp_to_anchors(&planned, plan.first(), plan.last(), &anchors);

    debug!(
        preserved = preserved.len(),
        purpose = ?ctx.purpose,
        "identity steps selected"
    );

    family
        .steps()
        .iter()
        .zip(filled)
        .map(|((step, _), l)| {
            if preserved.contains(step) {
                StepPlan::Preserve
            } else {
                StepPlan::Generate(Oklch::new(l, characteristics.chroma, characteristics.hue))
            }
        })
        .collect()
}
