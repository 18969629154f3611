//! Ramp validation: perceptual fidelity, accessibility potential, brand
//! separation and progression smoothness.
//!
//! Every check returns its score alongside the verdict. A failing check is a
//! recorded outcome, never an error.

use float_cmp::approx_eq;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[cfg(debug_assertions)]
use tracing::instrument;

use crate::color::circular_hue_distance;
use crate::error::RampError;
use crate::family::StepId;
use crate::steps::smoothness;
use crate::strategy::OptimizationResult;

/// Dark lightness band usable for text/surfaces on light backgrounds.
pub const LOW_BAND: (f64, f64) = (0.15, 0.35);

/// Light lightness band usable for text/surfaces on dark backgrounds.
pub const HIGH_BAND: (f64, f64) = (0.65, 0.95);

/// Largest possible circular hue distance.
const MAX_HUE_DISTANCE: f64 = 180.0;

/// Pass/fail bounds for every validation dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Per-step perceptual distance must stay below this
    pub delta_e: f64,
    /// Minimum hue angle (degrees) between any two brand families
    pub brand_separation: f64,
    /// Minimum share of accessibility-capable colors
    pub accessibility_rate: f64,
    /// Maximum smoothness score (std-dev / mean of lightness steps)
    pub smoothness_ceiling: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            delta_e: 2.0,
            brand_separation: 15.0,
            accessibility_rate: 0.5,
            smoothness_ceiling: 0.5,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), RampError> {
        if !(self.delta_e.is_finite() && self.delta_e > 0.0) {
            return Err(RampError::config(format!(
                "delta_e threshold must be positive, got {}",
                self.delta_e
            )));
        }
        if !(0.0..=180.0).contains(&self.brand_separation) {
            return Err(RampError::config(format!(
                "brand_separation must be between 0 and 180 degrees, got {}",
                self.brand_separation
            )));
        }
        if !(0.0..=1.0).contains(&self.accessibility_rate) {
            return Err(RampError::config(format!(
                "accessibility_rate must be between 0 and 1, got {}",
                self.accessibility_rate
            )));
        }
        if !(self.smoothness_ceiling.is_finite() && self.smoothness_ceiling > 0.0) {
            return Err(RampError::config(format!(
                "smoothness_ceiling must be positive, got {}",
                self.smoothness_ceiling
            )));
        }
        Ok(())
    }
}

/// Score and verdict of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub score: f64,
    pub threshold: f64,
    pub passed: bool,
}

/// Perceptual-fidelity check for one optimized family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaECheck {
    /// Score is the maximum per-step Delta E
    pub outcome: CheckOutcome,
    pub mean: f64,
    pub failing_steps: Vec<StepId>,
}

/// All per-family checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub delta_e: DeltaECheck,
    pub accessibility: CheckOutcome,
    pub smoothness: CheckOutcome,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.delta_e.outcome.passed && self.accessibility.passed && self.smoothness.passed
    }
}

/// Distance between one pair of families' characteristic hues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparationPair {
    pub first: String,
    pub second: String,
    pub distance: f64,
    pub passed: bool,
}

/// Pairwise brand separation across families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparationMatrix {
    pub pairs: Vec<SeparationPair>,
    /// Score is the smallest pairwise distance
    pub outcome: CheckOutcome,
}

/// Per-step Delta E against the bound; the family passes when its maximum does.
pub fn check_delta_e(result: &OptimizationResult, threshold: f64) -> DeltaECheck {
    let max = result.max_delta_e();
    let failing_steps = result
        .steps
        .iter()
        .filter(|s| s.delta_e >= threshold)
        .map(|s| s.step)
        .collect();

    DeltaECheck {
        outcome: CheckOutcome {
            score: max,
            threshold,
            passed: max < threshold,
        },
        mean: result.mean_delta_e(),
        failing_steps,
    }
}

/// Whether a lightness falls in either accessibility band (inclusive).
pub fn is_accessibility_capable(lightness: f64) -> bool {
    let in_band = |(lo, hi): (f64, f64)| (lo..=hi).contains(&lightness);
    in_band(LOW_BAND) || in_band(HIGH_BAND)
}

/// Share of `lightnesses` that are accessibility-capable (0 for no colors).
pub fn accessibility_rate(lightnesses: &[f64]) -> f64 {
    if lightnesses.is_empty() {
        return 0.0;
    }
    let capable = lightnesses
        .iter()
        .filter(|&&l| is_accessibility_capable(l))
        .count();
    capable as f64 / lightnesses.len() as f64
}

pub fn check_accessibility(lightnesses: &[f64], minimum_rate: f64) -> CheckOutcome {
    let rate = accessibility_rate(lightnesses);
    CheckOutcome {
        score: rate,
        threshold: minimum_rate,
        passed: rate > minimum_rate || approx_eq!(f64, rate, minimum_rate, epsilon = 1e-9),
    }
}

pub fn check_smoothness(lightnesses: &[f64], ceiling: f64) -> CheckOutcome {
    let score = smoothness(lightnesses);
    CheckOutcome {
        score,
        threshold: ceiling,
        passed: score < ceiling,
    }
}

/// Compare every unordered pair of `(name, hue)` entries, in input order.
///
/// # Example
///
/// ```
/// use rampforge::validation::check_brand_separation;
///
/// let hues = vec![("Lime".to_string(), 109.0), ("Azure".to_string(), 231.0)];
/// let matrix = check_brand_separation(&hues, 15.0);
/// assert!(matrix.outcome.passed);
/// assert!((matrix.pairs[0].distance - 122.0).abs() < 1e-9);
/// ```
pub fn check_brand_separation(hues: &[(String, f64)], minimum: f64) -> SeparationMatrix {
    let mut pairs = Vec::new();
    for (i, (first, h1)) in hues.iter().enumerate() {
        for (second, h2) in &hues[i + 1..] {
            let distance = circular_hue_distance(*h1, *h2);
            pairs.push(SeparationPair {
                first: first.clone(),
                second: second.clone(),
                distance,
                passed: distance > minimum,
            });
        }
    }

    let score = pairs
        .iter()
        .map(|p| p.distance)
        .fold(MAX_HUE_DISTANCE, f64::min);

    for pair in pairs.iter().filter(|p| !p.passed) {
        warn!(
            first = %pair.first,
            second = %pair.second,
            distance = pair.distance,
            minimum,
            "brands too close in hue"
        );
    }

    SeparationMatrix {
        outcome: CheckOutcome {
            score,
            threshold: minimum,
            passed: pairs.iter().all(|p| p.passed),
        },
        pairs,
    }
}

/// Run the per-family checks on an optimization result.
#[cfg_attr(debug_assertions, instrument(skip_all, fields(family = %result.family)))]
pub fn validate(result: &OptimizationResult, thresholds: &Thresholds) -> ValidationReport {
    let lightnesses = result.lightnesses();
    let report = ValidationReport {
        delta_e: check_delta_e(result, thresholds.delta_e),
        accessibility: check_accessibility(&lightnesses, thresholds.accessibility_rate),
        smoothness: check_smoothness(&lightnesses, thresholds.smoothness_ceiling),
    };

    if !report.delta_e.outcome.passed {
        warn!(
            family = %result.family,
            max_delta_e = report.delta_e.outcome.score,
            steps = ?report.delta_e.failing_steps,
            "perceptual difference above threshold"
        );
    }
    if !report.accessibility.passed {
        warn!(
            family = %result.family,
            rate = report.accessibility.score,
            "too few accessibility-capable colors"
        );
    }
    if !report.smoothness.passed {
        warn!(
            family = %result.family,
            smoothness = report.smoothness.score,
            "lightness progression is uneven"
        );
    }

    report
}
