//! Easing curves that shape how lightness is distributed across steps.

use enterpolation::{Signal, bspline::BSpline};
use serde::{Deserialize, Serialize};

use crate::error::RampError;

/// Available curve/easing types for step planning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveType {
    /// Linear interpolation (no easing)
    #[default]
    Linear,
    /// Ease-in (accelerating from start)
    #[serde(alias = "easeIn")]
    EaseIn,
    /// Ease-out (decelerating to end)
    #[serde(alias = "easeOut")]
    EaseOut,
    /// Smooth S-curve (Hermite interpolation)
    Smoothstep,
    /// Sigmoid curve with configurable steepness
    Sigmoid,
    /// Bezier-style curve through caller control values
    Bezier,
}

impl CurveType {
    /// Display name for the curve type.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::EaseIn => "Ease In",
            Self::EaseOut => "Ease Out",
            Self::Smoothstep => "Smoothstep",
            Self::Sigmoid => "Sigmoid",
            Self::Bezier => "Bezier",
        }
    }
}

/// Configuration for the lightness curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// The curve type to use
    #[serde(rename = "type")]
    pub curve_type: CurveType,
    /// Strength/steepness parameter (for sigmoid, 0.1-5.0)
    pub strength: f64,
    /// Control values for bezier, evenly spaced over `t`.
    /// Must start at 0.0, end at 1.0 and never decrease.
    pub control_points: Option<Vec<f64>>,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            curve_type: CurveType::Linear,
            strength: 1.0,
            control_points: None,
        }
    }
}

impl CurveConfig {
    pub fn of(curve_type: CurveType) -> Self {
        Self {
            curve_type,
            ..Default::default()
        }
    }

    /// Check that the curve maps `[0, 1]` monotonically onto `[0, 1]`.
    pub fn validate(&self) -> Result<(), RampError> {
        if !(self.strength.is_finite() && self.strength > 0.0) {
            return Err(RampError::config(format!(
                "curve strength must be positive, got {}",
                self.strength
            )));
        }

        if self.curve_type != CurveType::Bezier {
            return Ok(());
        }

        let Some(points) = &self.control_points else {
            return Err(RampError::config("bezier curve requires control_points"));
        };
        if points.len() < 2 {
            return Err(RampError::config(
                "bezier curve requires at least two control points",
            ));
        }
        if points.first() != Some(&0.0) || points.last() != Some(&1.0) {
            return Err(RampError::config(
                "bezier control points must start at 0.0 and end at 1.0",
            ));
        }
        if points.windows(2).any(|w| w[1] < w[0]) {
            return Err(RampError::config(
                "bezier control points must be non-decreasing",
            ));
        }
        Ok(())
    }
}

/// Evaluate a curve at parameter t (0.0 to 1.0).
///
/// Returns the mapped t value after applying the easing function.
pub fn evaluate_curve(config: &CurveConfig, t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);

    match config.curve_type {
        CurveType::Linear => t,
        CurveType::EaseIn => t * t,
        CurveType::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
        CurveType::Smoothstep => t * t * (3.0 - 2.0 * t),
        CurveType::Sigmoid => sigmoid(t, config.strength),
        CurveType::Bezier => evaluate_bezier(config, t),
    }
}

/// Sigmoid function with configurable steepness.
/// Maps [0,1] -> [0,1] with an S-curve shape.
fn sigmoid(t: f64, strength: f64) -> f64 {
    let k = strength.max(0.1) * 6.0;
    let x = (t - 0.5) * k;
    let raw = 1.0 / (1.0 + (-x).exp());

    // Normalize to exactly [0, 1] range
    let min_val = 1.0 / (1.0 + (k * 0.5).exp());
    let max_val = 1.0 / (1.0 + (-k * 0.5).exp());
    (raw - min_val) / (max_val - min_val)
}

/// Evaluate the control values as a clamped B-spline.
///
/// With up to four control values the spline degree equals `len - 1`, which is
/// exactly the Bezier curve over those values.
fn evaluate_bezier(config: &CurveConfig, t: f64) -> f64 {
    let Some(points) = &config.control_points else {
        return t;
    };

    if points.len() < 2 {
        return t;
    }

    let degree = (points.len() - 1).min(3);

    let result = BSpline::builder()
        .clamped()
        .elements(points.clone())
        .equidistant::<f64>()
        .degree(degree)
        .normalized()
        .dynamic()
        .build();

    match result {
        Ok(spline) => spline.eval(t).clamp(0.0, 1.0),
        Err(_) => t,
    }
}

/// Compute normalized sample positions, one per step.
///
/// The first position is exactly 0.0 and the last exactly 1.0.
pub fn compute_sample_positions(steps: usize, curve: &CurveConfig) -> Vec<f64> {
    if steps == 0 {
        return vec![];
    }
    if steps == 1 {
        return vec![0.0];
    }

    let last = steps - 1;
    (0..steps)
        .map(|i| match i {
            0 => 0.0,
            i if i == last => 1.0,
            i => evaluate_curve(curve, i as f64 / last as f64),
        })
        .collect()
}
