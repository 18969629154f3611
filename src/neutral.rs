//! Neutral normalization: every step shares one reference hue and chroma.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::characteristics::FamilyCharacteristics;
use crate::color::Oklch;
use crate::family::ColorFamily;
use crate::steps::LightnessSteps;
use crate::strategy::StepPlan;

/// Reference hue/chroma for neutral families.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeutralBase {
    pub hue: f64,
    pub chroma: f64,
    /// Amplitude of the alternating chroma offset that breaks up banding
    pub chroma_variation: f64,
}

impl Default for NeutralBase {
    fn default() -> Self {
        Self {
            hue: 250.0,
            chroma: 0.008,
            chroma_variation: 0.0,
        }
    }
}

impl NeutralBase {
    pub fn characteristics(&self) -> FamilyCharacteristics {
        FamilyCharacteristics {
            hue: self.hue,
            chroma: self.chroma,
            source_step: None,
        }
    }

    /// Chroma at plan position `index`: base chroma plus `variation * sin(index * pi/2)`.
    pub fn chroma_at(&self, index: usize) -> f64 {
        let offset = self.chroma_variation * (index as f64 * FRAC_PI_2).sin();
        (self.chroma + offset).max(0.0)
    }
}

pub(crate) fn plan_steps(
    family: &ColorFamily,
    plan: &LightnessSteps,
    base: &NeutralBase,
) -> Vec<StepPlan> {
    family
        .steps()
        .iter()
        .map(|(step, _)| {
            let chroma = base.chroma_at(plan.nearest_index(*step));
            StepPlan::Generate(Oklch::new(plan.lightness_at(*step), chroma, base.hue))
        })
        .collect()
}
