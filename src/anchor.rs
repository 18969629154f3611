//! Smart-anchor optimization: preserve one existing color exactly.
//!
//! The anchor is the highest-scoring color of the family. The planned lightness
//! sequence is then warped so the anchor's step lands exactly on the anchor's
//! own lightness. The correction is full at the anchor and falls off linearly
//! (in planned lightness) to zero at both plan extremes, so the side of the
//! ramp with less room gets the steeper adjustment. An anchor lighter or darker
//! than the plan itself replaces the extreme it overshoots, so the steps past
//! it hold the anchor's lightness instead of turning back.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::characteristics::FamilyCharacteristics;
use crate::color::{Color, Oklch};
use crate::error::RampError;
use crate::family::{ColorFamily, StepId};
use crate::steps::LightnessSteps;
use crate::strategy::{OptimizationContext, StepPlan};

/// Planned-lightness spans below this are treated as a single point.
const DEGENERATE_SPAN: f64 = 1e-9;

/// Weights for ranking anchor candidates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorScoring {
    /// Added when the candidate sits on the primary step
    pub primary_bonus: f64,
    /// Multiplier for the candidate's chroma
    pub chroma_weight: f64,
    /// Added when the candidate's lightness is inside the usable band
    pub usability_bonus: f64,
    pub usable_min: f64,
    pub usable_max: f64,
    /// A winner must score strictly above this
    pub minimum_score: f64,
}

impl Default for AnchorScoring {
    fn default() -> Self {
        Self {
            primary_bonus: 40.0,
            chroma_weight: 100.0,
            usability_bonus: 10.0,
            usable_min: 0.3,
            usable_max: 0.8,
            minimum_score: 12.0,
        }
    }
}

/// What to do when a family has no anchor worth preserving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorFallback {
    /// Optimize the family with the brand-preserving strategy instead
    #[default]
    BrandPreserving,
    /// Leave the family out of the report
    Exclude,
}

/// The chosen anchor and the score it won with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorCandidate {
    pub step: StepId,
    pub score: f64,
}

/// Score one color as an anchor candidate.
pub fn score_anchor(step: StepId, color: &Color, primary: StepId, scoring: &AnchorScoring) -> f64 {
    let mut score = scoring.chroma_weight * color.chroma();
    if step == primary {
        score += scoring.primary_bonus;
    }
    if (scoring.usable_min..=scoring.usable_max).contains(&color.lightness()) {
        score += scoring.usability_bonus;
    }
    score
}

/// Pick the highest-scoring color; ties go to the lower step id.
pub fn select_anchor(
    family: &ColorFamily,
    primary: StepId,
    scoring: &AnchorScoring,
) -> Result<AnchorCandidate, RampError> {
    let best = family
        .steps()
        .iter()
        .map(|(step, color)| AnchorCandidate {
            step: *step,
            score: score_anchor(*step, color, primary, scoring),
        })
        .fold(None, |best: Option<AnchorCandidate>, candidate| match best {
            Some(b) if b.score >= candidate.score => Some(b),
            _ => Some(candidate),
        });

    match best {
        Some(candidate) if candidate.score > scoring.minimum_score => Ok(candidate),
        _ => Err(RampError::NoAnchorFound {
            family: family.name().to_string(),
            best_score: best.map_or(0.0, |b| b.score),
            minimum: scoring.minimum_score,
        }),
    }
}

#[derive(Debug, Clone, Copy)]
struct Knot {
    index: f64,
    planned: f64,
    value: f64,
}

/// Warp planned lightness values so every anchored index hits its target.
///
/// `anchors` are `(index into planned, target lightness)` pairs. Values between
/// two knots are mapped linearly in planned-lightness space; the plan extremes
/// `start` and `end` act as knots before the first and after the last index.
/// When the first (last) target lies beyond `start` (`end`) in the plan's
/// direction, that knot takes the target's value so the result stays
/// monotonic. Anchored indices return their target exactly.
pub fn warp_to_anchors(planned: &[f64], start: f64, end: f64, anchors: &[(usize, f64)]) -> Vec<f64> {
    if planned.is_empty() {
        return Vec::new();
    }

    let mut anchors: Vec<(usize, f64)> = anchors
        .iter()
        .copied()
        .filter(|(i, _)| *i < planned.len())
        .collect();
    anchors.sort_by_key(|(i, _)| *i);
    anchors.dedup_by_key(|(i, _)| *i);

    let last = (planned.len() - 1) as f64;
    let mut knots = Vec::with_capacity(anchors.len() + 2);
    knots.push(Knot {
        index: 0.0,
        planned: start,
        value: start,
    });
    knots.extend(anchors.iter().map(|&(i, value)| Knot {
        index: i as f64,
        planned: planned[i],
        value,
    }));
    knots.push(Knot {
        index: last,
        planned: end,
        value: end,
    });

    // `a` comes after `b` along the plan
    let beyond = |a: f64, b: f64| if end >= start { a > b } else { a < b };
    if let Some(&(_, first)) = anchors.first() {
        if beyond(start, first) {
            knots[0].value = first;
        }
    }
    if let Some(&(_, final_value)) = anchors.last() {
        if beyond(final_value, end) {
            let n = knots.len() - 1;
            knots[n].value = final_value;
        }
    }

    planned
        .iter()
        .enumerate()
        .map(|(j, &p)| {
            if let Some(&(_, value)) = anchors.iter().find(|(i, _)| *i == j) {
                return value;
            }
            let position = j as f64;
            let next = knots
                .iter()
                .position(|k| k.index > position || (k.index == position && k.index == last))
                .unwrap_or(knots.len() - 1)
                .max(1);
            let (prev, next) = (knots[next - 1], knots[next]);
            interpolate(prev, next, position, p)
        })
        .collect()
}

fn interpolate(prev: Knot, next: Knot, position: f64, planned: f64) -> f64 {
    let span = next.planned - prev.planned;
    let w = if span.abs() > DEGENERATE_SPAN {
        (planned - prev.planned) / span
    } else if next.index > prev.index {
        (position - prev.index) / (next.index - prev.index)
    } else {
        0.0
    };
    let w = w.clamp(0.0, 1.0);
    prev.value + (next.value - prev.value) * w
}

pub(crate) fn plan_steps(
    family: &ColorFamily,
    plan: &LightnessSteps,
    characteristics: &FamilyCharacteristics,
    ctx: &OptimizationContext<'_>,
) -> Result<(StepId, Vec<StepPlan>), RampError> {
    let anchor = select_anchor(family, ctx.extraction.primary(), ctx.anchor)?;
    let (index, anchor_color) = family
        .index_of(anchor.step)
        .map(|i| (i, &family.steps()[i].1))
        .ok_or_else(|| RampError::EmptyFamily(family.name().to_string()))?;

    let planned: Vec<f64> = family
        .steps()
        .iter()
        .map(|(step, _)| plan.lightness_at(*step))
        .collect();
    let corrected = warp_to_anchors(
        &planned,
        plan.first(),
        plan.last(),
        &[(index, anchor_color.lightness())],
    );

    debug!(
        anchor = %anchor.step,
        score = anchor.score,
        planned = planned[index],
        actual = anchor_color.lightness(),
        "selected anchor"
    );

    let plans = corrected
        .iter()
        .enumerate()
        .map(|(i, &l)| {
            if i == index {
                StepPlan::Preserve
            } else {
                StepPlan::Generate(Oklch::new(l, characteristics.chroma, characteristics.hue))
            }
        })
        .collect();

    Ok((anchor.step, plans))
}
