//! TOML configuration for the ramp pipeline.
//!
//! Configuration is layered with figment: built-in defaults, then an optional
//! TOML file, then any overrides the caller merges on top (the CLI does this).

use std::path::Path;

use figment::Figment;
use figment::providers::{Format, Serialized, Toml};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::anchor::{AnchorFallback, AnchorScoring};
use crate::characteristics::{BaseCharacteristics, ExtractionPolicy};
use crate::curves::CurveConfig;
use crate::error::RampError;
use crate::identity::IdentityPurpose;
use crate::neutral::NeutralBase;
use crate::steps::{Direction, LightnessRange, StepScale};
use crate::strategy::StrategyId;
use crate::validation::Thresholds;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading/writing file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Figment/TOML extraction error
    #[error("config parse error: {0}")]
    Parse(#[from] Box<figment::Error>),
    /// TOML serialization error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Structurally invalid values
    #[error(transparent)]
    Invalid(#[from] RampError),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Parse(Box::new(e))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RampConfig {
    /// Strategy for families no rule matches
    pub default_strategy: StrategyId,
    /// Step ids every family is planned over
    pub steps: StepScale,
    /// Primary (light) mode lightness plan
    pub lightness: LightnessConfig,
    /// Optional paired dark mode sharing the plan's shape
    pub dark: Option<ModeConfig>,
    pub thresholds: Thresholds,
    pub extraction: ExtractionPolicy,
    pub neutral_base: NeutralBase,
    /// Canonical brand hue/chroma for rules with `base = "brand"`
    pub brand_base: Option<BaseCharacteristics>,
    pub anchor: AnchorSettings,
    /// Name-pattern rules, first match wins
    pub rules: Vec<StrategyRule>,
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            default_strategy: StrategyId::BrandPreserving,
            steps: StepScale::default(),
            lightness: LightnessConfig::default(),
            dark: None,
            thresholds: Thresholds::default(),
            extraction: ExtractionPolicy::default(),
            neutral_base: NeutralBase::default(),
            brand_base: None,
            anchor: AnchorSettings::default(),
            rules: vec![StrategyRule::new(r"(?i)neutral|gr[ae]y", StrategyId::Neutral)],
        }
    }
}

/// Lightness plan for the primary mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightnessConfig {
    pub range: LightnessRange,
    pub curve: CurveConfig,
    pub direction: Direction,
    /// Explicit consecutive lightness differences to transplant
    pub reference_pattern: Option<Vec<f64>>,
    /// Name of an input family whose lightness differences are transplanted
    pub reference_family: Option<String>,
}

impl Default for LightnessConfig {
    fn default() -> Self {
        Self {
            range: LightnessRange::default(),
            curve: CurveConfig::default(),
            direction: Direction::Ascending,
            reference_pattern: None,
            reference_family: None,
        }
    }
}

/// Range and direction of a secondary mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    pub range: LightnessRange,
    pub direction: Direction,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            range: LightnessRange::new(0.12, 0.9),
            direction: Direction::Descending,
        }
    }
}

/// Smart-anchor scoring and fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorSettings {
    pub scoring: AnchorScoring,
    pub fallback: AnchorFallback,
}

/// Where a rule takes its identity hue/chroma from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseSource {
    /// Extracted from the family's own colors
    #[default]
    Family,
    /// The configured `brand_base`
    Brand,
    /// The configured `neutral_base`
    Neutral,
}

/// Maps family names matching `pattern` to a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRule {
    /// Regular expression matched against the family name
    pub pattern: String,
    pub strategy: StrategyId,
    #[serde(default)]
    pub purpose: IdentityPurpose,
    /// Overrides the primary mode's direction for matching families
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub base: BaseSource,
}

impl StrategyRule {
    pub fn new(pattern: impl Into<String>, strategy: StrategyId) -> Self {
        Self {
            pattern: pattern.into(),
            strategy,
            purpose: IdentityPurpose::default(),
            direction: None,
            base: BaseSource::default(),
        }
    }
}

impl RampConfig {
    /// Figment with defaults and, when given, a TOML file merged on top.
    pub fn figment(path: Option<&Path>) -> Result<Figment, ConfigError> {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                Ok(figment.merge(Toml::string(&content)))
            }
            None => Ok(figment),
        }
    }

    /// Defaults, then the optional TOML file, then `overrides` on top.
    ///
    /// `overrides` should contain only the keys the caller wants to force, so
    /// file settings it doesn't mention survive.
    pub fn layered<T: Serialize>(path: Option<&Path>, overrides: T) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path)?
            .merge(Serialized::globals(overrides))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file over the defaults and validate it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(Some(path))?.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text over the defaults and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::string(content))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check every structural constraint before any family is processed.
    pub fn validate(&self) -> Result<(), RampError> {
        self.steps.validate()?;
        self.lightness.range.validate()?;
        self.lightness.curve.validate()?;
        self.thresholds.validate()?;

        if let Some(dark) = &self.dark {
            dark.range.validate()?;
        }

        if let Some(pattern) = &self.lightness.reference_pattern {
            if pattern.iter().any(|d| !d.is_finite()) || pattern.iter().all(|d| *d == 0.0) {
                return Err(RampError::config(
                    "reference_pattern needs at least one finite non-zero difference",
                ));
            }
        }

        let base = &self.neutral_base;
        if !(base.chroma >= 0.0 && base.chroma_variation >= 0.0 && base.hue.is_finite()) {
            return Err(RampError::config(
                "neutral_base needs a finite hue and non-negative chroma",
            ));
        }
        if let Some(brand) = &self.brand_base {
            if !(brand.chroma >= 0.0 && brand.hue.is_finite()) {
                return Err(RampError::config(
                    "brand_base needs a finite hue and non-negative chroma",
                ));
            }
        }

        for rule in &self.rules {
            Regex::new(&rule.pattern).map_err(|e| {
                RampError::config(format!("invalid rule pattern '{}': {e}", rule.pattern))
            })?;
            if rule.base == BaseSource::Brand && self.brand_base.is_none() {
                return Err(RampError::config(format!(
                    "rule '{}' uses base = \"brand\" but no brand_base is configured",
                    rule.pattern
                )));
            }
        }

        Ok(())
    }
}
