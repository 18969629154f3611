//! Color family data model: named families of colors at numeric steps.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::color::Color;
use crate::error::{RampError, Warning, WarningKind};

/// Numeric level of a color within its family (e.g. 0, 100, ..., 1300).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub u32);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for StepId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Raw family as supplied by the caller: step level to color string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyInput {
    pub name: String,
    pub steps: BTreeMap<u32, String>,
}

impl FamilyInput {
    pub fn new<I, S>(name: impl Into<String>, steps: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            steps: steps.into_iter().map(|(id, v)| (id, v.into())).collect(),
        }
    }
}

/// A parsed color family with steps held in explicit ascending step order.
///
/// Values that failed to parse are kept verbatim in `unparsed` so they can be
/// passed through to the output unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorFamily {
    name: String,
    steps: Vec<(StepId, Color)>,
    unparsed: Vec<(StepId, String)>,
}

impl ColorFamily {
    /// Build a family from already-parsed colors.
    ///
    /// Steps are sorted by id; when an id repeats, the first occurrence wins.
    pub fn new(name: impl Into<String>, steps: impl IntoIterator<Item = (StepId, Color)>) -> Self {
        let mut steps: Vec<(StepId, Color)> = steps.into_iter().collect();
        steps.sort_by_key(|(id, _)| *id);
        steps.dedup_by_key(|(id, _)| *id);
        Self {
            name: name.into(),
            steps,
            unparsed: Vec::new(),
        }
    }

    /// Parse a raw family, recording a warning for every unparseable step.
    ///
    /// Fails with [`RampError::EmptyFamily`] only when the input has no steps at all.
    pub fn parse(input: &FamilyInput) -> Result<(Self, Vec<Warning>), RampError> {
        if input.steps.is_empty() {
            return Err(RampError::EmptyFamily(input.name.clone()));
        }

        let mut steps = Vec::with_capacity(input.steps.len());
        let mut unparsed = Vec::new();
        let mut warnings = Vec::new();

        for (&id, raw) in &input.steps {
            let step = StepId(id);
            match Color::parse(raw) {
                Ok(color) => steps.push((step, color)),
                Err(e) => {
                    warn!(family = %input.name, %step, value = %raw, "skipping unparseable color");
                    warnings.push(
                        Warning::new(WarningKind::InvalidColor, Some(&input.name), e.to_string())
                            .at_step(step),
                    );
                    unparsed.push((step, raw.clone()));
                }
            }
        }

        let family = Self {
            name: input.name.clone(),
            steps,
            unparsed,
        };
        Ok((family, warnings))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parsed steps in ascending step order.
    pub fn steps(&self) -> &[(StepId, Color)] {
        &self.steps
    }

    /// Steps whose stored value could not be parsed, in ascending step order.
    pub fn unparsed(&self) -> &[(StepId, String)] {
        &self.unparsed
    }

    pub fn get(&self, step: StepId) -> Option<&Color> {
        self.steps
            .binary_search_by_key(&step, |(id, _)| *id)
            .ok()
            .map(|i| &self.steps[i].1)
    }

    pub fn index_of(&self, step: StepId) -> Option<usize> {
        self.steps.binary_search_by_key(&step, |(id, _)| *id).ok()
    }

    /// True when the family has no parsed colors.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Every step id in the family, parsed or not, in ascending order.
    pub fn step_ids(&self) -> Vec<StepId> {
        let mut ids: Vec<StepId> = self
            .steps
            .iter()
            .map(|(id, _)| *id)
            .chain(self.unparsed.iter().map(|(id, _)| *id))
            .collect();
        ids.sort();
        ids
    }

    /// Lightness of each parsed step, in step order.
    pub fn lightnesses(&self) -> Vec<f64> {
        self.steps.iter().map(|(_, c)| c.lightness()).collect()
    }
}
