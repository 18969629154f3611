//! Family identity extraction: one representative hue and chroma per family.

use serde::{Deserialize, Serialize};

use crate::family::{ColorFamily, StepId};

/// Hue and chroma that define a family's identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FamilyCharacteristics {
    pub hue: f64,
    pub chroma: f64,
    /// Step the values were taken from; `None` for configured bases
    pub source_step: Option<StepId>,
}

/// Explicitly configured hue/chroma, used instead of extracting from a family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseCharacteristics {
    pub hue: f64,
    pub chroma: f64,
}

impl From<BaseCharacteristics> for FamilyCharacteristics {
    fn from(base: BaseCharacteristics) -> Self {
        Self {
            hue: base.hue,
            chroma: base.chroma,
            source_step: None,
        }
    }
}

/// Which steps are consulted, in order, when extracting characteristics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionPolicy {
    /// The conventional brand-defining step
    pub primary_step: u32,
    /// Mid-range steps tried when the primary step is missing
    pub priority_steps: Vec<u32>,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self {
            primary_step: 500,
            priority_steps: vec![600, 400, 700, 300, 800],
        }
    }
}

impl ExtractionPolicy {
    pub fn primary(&self) -> StepId {
        StepId(self.primary_step)
    }
}

/// Pick a family's representative hue and chroma.
///
/// Prefers the primary step, then each priority step in order, then the first
/// available color. Returns `None` only for a family with no parsed colors.
pub fn extract(family: &ColorFamily, policy: &ExtractionPolicy) -> Option<FamilyCharacteristics> {
    let (step, color) = std::iter::once(policy.primary_step)
        .chain(policy.priority_steps.iter().copied())
        .map(StepId)
        .find_map(|step| family.get(step).map(|color| (step, color)))
        .or_else(|| family.steps().first().map(|(step, color)| (*step, color)))?;

    Some(FamilyCharacteristics {
        hue: color.hue(),
        chroma: color.chroma(),
        source_step: Some(step),
    })
}
