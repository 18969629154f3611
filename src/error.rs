//! Error taxonomy and recorded warnings for the ramp pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::family::StepId;

/// Errors raised while building or optimizing color ramps.
///
/// Only [`RampError::Configuration`] is fatal for a run. The other variants are
/// caught per family by the pipeline and turned into [`Warning`]s.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RampError {
    /// A stored value could not be parsed as a color
    #[error("invalid color '{input}': {reason}")]
    InvalidColor { input: String, reason: String },
    /// A family has no steps to process
    #[error("family '{0}' has no processable steps")]
    EmptyFamily(String),
    /// Smart-anchor selection found no color scoring above the minimum
    #[error("no anchor found in family '{family}' (best score {best_score:.2}, minimum {minimum:.2})")]
    NoAnchorFound {
        family: String,
        best_score: f64,
        minimum: f64,
    },
    /// Structurally invalid range, step count or threshold
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl RampError {
    /// Shorthand for building a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Category of a recorded, non-fatal problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    InvalidColor,
    EmptyFamily,
    NoAnchorFound,
    ReferencePattern,
}

/// A problem recorded in the report instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub family: Option<String>,
    pub step: Option<StepId>,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, family: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind,
            family: family.map(str::to_string),
            step: None,
            message: message.into(),
        }
    }

    pub fn at_step(mut self, step: StepId) -> Self {
        self.step = Some(step);
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.family, self.step) {
            (Some(family), Some(step)) => write!(f, "{family}/{step}: {}", self.message),
            (Some(family), None) => write!(f, "{family}: {}", self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}
