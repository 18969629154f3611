//! Lightness step planning: one target lightness per configured step.
//!
//! A plan keeps a normalized monotonic shape (`0.0` at the first step, `1.0` at
//! the last) and scales it onto a lightness range. Keeping the shape separate
//! lets the same plan be rescaled for paired light/dark modes.

use float_cmp::approx_eq;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::curves::{CurveConfig, compute_sample_positions};
use crate::error::RampError;
use crate::family::{ColorFamily, StepId};

/// Floor for the mean step difference when computing smoothness.
const MIN_MEAN_STEP: f64 = 1e-6;

/// Direction in which lightness progresses as step ids increase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Dark to light: lightness increases with step id
    #[default]
    Ascending,
    /// Light to dark: lightness decreases with step id
    Descending,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// The configured step ids: `count` ids starting at `start`, `spacing` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepScale {
    pub start: u32,
    pub spacing: u32,
    pub count: usize,
}

impl Default for StepScale {
    fn default() -> Self {
        Self {
            start: 0,
            spacing: 100,
            count: 14,
        }
    }
}

impl StepScale {
    pub fn validate(&self) -> Result<(), RampError> {
        if self.count < 2 {
            return Err(RampError::config(format!(
                "step count must be at least 2, got {}",
                self.count
            )));
        }
        if self.spacing == 0 {
            return Err(RampError::config("step spacing must be positive"));
        }
        let span = u64::from(self.spacing) * (self.count as u64 - 1);
        if u64::from(self.start) + span > u64::from(u32::MAX) {
            return Err(RampError::config("step scale overflows the step id range"));
        }
        Ok(())
    }

    pub fn ids(&self) -> Vec<StepId> {
        (0..self.count)
            .map(|i| StepId(self.start + self.spacing * i as u32))
            .collect()
    }
}

/// Inclusive lightness bounds for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightnessRange {
    pub min: f64,
    pub max: f64,
}

impl LightnessRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn validate(&self) -> Result<(), RampError> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(RampError::config("lightness range must be finite"));
        }
        if self.min < 0.0 || self.max > 1.0 {
            return Err(RampError::config(format!(
                "lightness range [{}, {}] must lie within [0, 1]",
                self.min, self.max
            )));
        }
        if self.min >= self.max {
            return Err(RampError::config(format!(
                "lightness range min ({}) must be below max ({})",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

impl Default for LightnessRange {
    fn default() -> Self {
        Self::new(0.15, 0.95)
    }
}

/// A planned lightness sequence, one value per configured step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightnessSteps {
    direction: Direction,
    range: LightnessRange,
    shape: Vec<f64>,
    values: Vec<(StepId, f64)>,
}

impl LightnessSteps {
    /// Plan by interpolating `scale.count` values across `range` along `curve`.
    ///
    /// # Example
    ///
    /// ```
    /// use rampforge::curves::CurveConfig;
    /// use rampforge::steps::{Direction, LightnessRange, LightnessSteps, StepScale};
    ///
    /// let plan = LightnessSteps::plan_range(
    ///     &StepScale { start: 0, spacing: 100, count: 5 },
    ///     LightnessRange::new(0.2, 0.6),
    ///     &CurveConfig::default(),
    ///     Direction::Ascending,
    /// )
    /// .unwrap();
    /// assert_eq!(plan.first(), 0.2);
    /// assert_eq!(plan.last(), 0.6);
    /// ```
    pub fn plan_range(
        scale: &StepScale,
        range: LightnessRange,
        curve: &CurveConfig,
        direction: Direction,
    ) -> Result<Self, RampError> {
        scale.validate()?;
        range.validate()?;
        curve.validate()?;

        let shape = compute_sample_positions(scale.count, curve);
        debug!(
            count = scale.count,
            curve = curve.curve_type.display_name(),
            "planned lightness from range"
        );
        Ok(Self::from_shape(scale, shape, range, direction))
    }

    /// Plan by transplanting a reference family's lightness differences.
    ///
    /// Difference magnitudes are rescaled so their sum spans `range` exactly and
    /// integrated from the start of the range. A reference with a different
    /// number of steps is resampled along its cumulative shape.
    pub fn plan_from_pattern(
        scale: &StepScale,
        differences: &[f64],
        range: LightnessRange,
        direction: Direction,
    ) -> Result<Self, RampError> {
        scale.validate()?;
        range.validate()?;

        if differences.iter().any(|d| !d.is_finite()) {
            return Err(RampError::config("reference pattern contains non-finite values"));
        }
        let total: f64 = differences.iter().map(|d| d.abs()).sum();
        if differences.is_empty() || total <= f64::EPSILON {
            return Err(RampError::config(
                "reference pattern has no lightness progression",
            ));
        }

        let mut reference = Vec::with_capacity(differences.len() + 1);
        let mut acc = 0.0;
        reference.push(0.0);
        for d in differences {
            acc += d.abs() / total;
            reference.push(acc);
        }

        let shape = resample_shape(&reference, scale.count);
        debug!(
            reference_steps = reference.len(),
            count = scale.count,
            "planned lightness from reference pattern"
        );
        Ok(Self::from_shape(scale, shape, range, direction))
    }

    /// Consecutive lightness differences of a family, in step order.
    pub fn reference_pattern(family: &ColorFamily) -> Vec<f64> {
        lightness_differences(&family.lightnesses())
    }

    /// The same plan shape scaled onto another range and direction.
    pub fn scaled_to(&self, range: LightnessRange, direction: Direction) -> Self {
        let values = self
            .values
            .iter()
            .zip(&self.shape)
            .map(|((id, _), &t)| (*id, scale_position(t, range, direction)))
            .collect();
        Self {
            direction,
            range,
            shape: self.shape.clone(),
            values,
        }
    }

    /// The same plan with its direction replaced.
    pub fn with_direction(&self, direction: Direction) -> Self {
        self.scaled_to(self.range, direction)
    }

    fn from_shape(
        scale: &StepScale,
        shape: Vec<f64>,
        range: LightnessRange,
        direction: Direction,
    ) -> Self {
        let values = scale
            .ids()
            .into_iter()
            .zip(&shape)
            .map(|(id, &t)| (id, scale_position(t, range, direction)))
            .collect();
        Self {
            direction,
            range,
            shape,
            values,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn range(&self) -> LightnessRange {
        self.range
    }

    /// Normalized positions (`0.0..=1.0`) of each step, in step order.
    pub fn shape(&self) -> &[f64] {
        &self.shape
    }

    pub fn values(&self) -> &[(StepId, f64)] {
        &self.values
    }

    pub fn lightnesses(&self) -> Vec<f64> {
        self.values.iter().map(|(_, l)| *l).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Planned lightness of the first step.
    pub fn first(&self) -> f64 {
        self.values.first().map_or(self.range.min, |(_, l)| *l)
    }

    /// Planned lightness of the last step.
    pub fn last(&self) -> f64 {
        self.values.last().map_or(self.range.max, |(_, l)| *l)
    }

    /// Target lightness for any step id.
    ///
    /// Exact for configured ids, interpolated by id between them and clamped
    /// to the first/last value outside the scale.
    pub fn lightness_at(&self, step: StepId) -> f64 {
        match self.values.binary_search_by_key(&step, |(id, _)| *id) {
            Ok(i) => self.values[i].1,
            Err(0) => self.first(),
            Err(i) if i >= self.values.len() => self.last(),
            Err(i) => {
                let (lo_id, lo) = self.values[i - 1];
                let (hi_id, hi) = self.values[i];
                let t = f64::from(step.0 - lo_id.0) / f64::from(hi_id.0 - lo_id.0);
                lo + (hi - lo) * t
            }
        }
    }

    /// Index of a configured step id within the plan.
    pub fn index_of(&self, step: StepId) -> Option<usize> {
        self.values.binary_search_by_key(&step, |(id, _)| *id).ok()
    }

    /// Index of the configured step id closest to `step`, the lower one on ties.
    pub fn nearest_index(&self, step: StepId) -> usize {
        match self.values.binary_search_by_key(&step, |(id, _)| *id) {
            Ok(i) | Err(i @ 0) => i,
            Err(i) if i >= self.values.len() => self.values.len() - 1,
            Err(i) => {
                let below = step.0 - self.values[i - 1].0.0;
                let above = self.values[i].0.0 - step.0;
                if above < below { i } else { i - 1 }
            }
        }
    }
}

// Two-term lerp so t = 0 and t = 1 land exactly on the range bounds.
fn scale_position(t: f64, range: LightnessRange, direction: Direction) -> f64 {
    let (from, to) = match direction {
        Direction::Ascending => (range.min, range.max),
        Direction::Descending => (range.max, range.min),
    };
    from * (1.0 - t) + to * t
}

/// Linearly resample a cumulative shape (0.0 to 1.0) to `count` points.
fn resample_shape(reference: &[f64], count: usize) -> Vec<f64> {
    let segments = reference.len() - 1;
    let last = count - 1;
    (0..count)
        .map(|j| {
            if j == 0 {
                return 0.0;
            }
            if j == last {
                return 1.0;
            }
            let x = j as f64 / last as f64 * segments as f64;
            let i = (x.floor() as usize).min(segments - 1);
            let frac = x - i as f64;
            reference[i] + (reference[i + 1] - reference[i]) * frac
        })
        .collect()
}

/// Consecutive differences `values[i + 1] - values[i]`.
pub fn lightness_differences(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Smoothness of a lightness progression (lower is smoother).
///
/// Population standard deviation of consecutive differences divided by the
/// magnitude of their mean. Sequences with fewer than three values score 0.
pub fn smoothness(values: &[f64]) -> f64 {
    let diffs = lightness_differences(values);
    if diffs.len() < 2 {
        return 0.0;
    }

    let n = diffs.len() as f64;
    let mean = diffs.iter().sum::<f64>() / n;
    let variance = diffs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean.abs().max(MIN_MEAN_STEP)
}

/// Whether `values` never move against `direction`, within float tolerance.
pub fn is_monotonic(values: &[f64], direction: Direction) -> bool {
    values.windows(2).all(|w| {
        let step = match direction {
            Direction::Ascending => w[1] - w[0],
            Direction::Descending => w[0] - w[1],
        };
        step >= 0.0 || approx_eq!(f64, step, 0.0, epsilon = 1e-12)
    })
}
