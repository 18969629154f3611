//! CLI argument parsing and input loading.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::anchor::AnchorFallback;
use crate::curves::CurveType;
use crate::family::FamilyInput;
use crate::strategy::StrategyId;

/// Report serialization format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

/// CLI-compatible curve type enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CurveTypeArg {
    /// Evenly spaced lightness
    Linear,
    /// Small steps at the dark end, large at the light end
    EaseIn,
    /// Large steps at the dark end, small at the light end
    EaseOut,
    /// Smooth S-curve (Hermite)
    Smoothstep,
    /// Configurable S-curve (use with --curve-strength)
    Sigmoid,
}

impl From<CurveTypeArg> for CurveType {
    fn from(arg: CurveTypeArg) -> Self {
        match arg {
            CurveTypeArg::Linear => CurveType::Linear,
            CurveTypeArg::EaseIn => CurveType::EaseIn,
            CurveTypeArg::EaseOut => CurveType::EaseOut,
            CurveTypeArg::Smoothstep => CurveType::Smoothstep,
            CurveTypeArg::Sigmoid => CurveType::Sigmoid,
        }
    }
}

/// CLI-compatible strategy enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Neutral,
    BrandPreserving,
    SmartAnchor,
    IdentityPreserving,
}

impl From<StrategyArg> for StrategyId {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Neutral => StrategyId::Neutral,
            StrategyArg::BrandPreserving => StrategyId::BrandPreserving,
            StrategyArg::SmartAnchor => StrategyId::SmartAnchor,
            StrategyArg::IdentityPreserving => StrategyId::IdentityPreserving,
        }
    }
}

/// Regenerate design-system color families as perceptually uniform OKLCH ramps.
#[derive(Parser, Debug)]
#[command(name = "rampforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Color families to process (JSON or YAML: name -> {step -> color}, or a list of {name, steps})
    #[arg(short, long, value_name = "FILE", required_unless_present = "completions")]
    pub families: Option<PathBuf>,

    /// Load configuration from TOML file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Save the effective configuration to a TOML file
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Previous report (JSON or YAML) to compare this run against
    #[arg(long, value_name = "FILE")]
    pub compare: Option<PathBuf>,

    /// Also generate the dark mode variant of every family
    #[arg(long)]
    pub dark: bool,

    /// Exit with an error when any validation check fails
    #[arg(long)]
    pub strict: bool,

    // Step and lightness overrides
    /// Number of steps per family
    #[arg(long)]
    pub step_count: Option<usize>,

    /// First step id
    #[arg(long)]
    pub step_start: Option<u32>,

    /// Distance between consecutive step ids
    #[arg(long)]
    pub step_spacing: Option<u32>,

    /// Lightness of the darkest step (0-1)
    #[arg(long)]
    pub min_lightness: Option<f64>,

    /// Lightness of the lightest step (0-1)
    #[arg(long)]
    pub max_lightness: Option<f64>,

    /// Lightness distribution curve
    #[arg(long, value_enum)]
    pub curve: Option<CurveTypeArg>,

    /// Curve strength (for sigmoid)
    #[arg(long)]
    pub curve_strength: Option<f64>,

    /// Dark mode minimum lightness (implies --dark)
    #[arg(long)]
    pub dark_min_lightness: Option<f64>,

    /// Dark mode maximum lightness (implies --dark)
    #[arg(long)]
    pub dark_max_lightness: Option<f64>,

    /// Strategy for families no rule matches
    #[arg(long, value_enum)]
    pub default_strategy: Option<StrategyArg>,

    /// Exclude families with no usable anchor instead of falling back
    #[arg(long)]
    pub exclude_unanchored: bool,

    // Validation thresholds
    /// Maximum per-step perceptual difference
    #[arg(long)]
    pub delta_e_threshold: Option<f64>,

    /// Minimum hue separation between brand families (degrees)
    #[arg(long)]
    pub brand_separation: Option<f64>,

    /// Minimum share of accessibility-capable colors (0-1)
    #[arg(long)]
    pub accessibility_rate: Option<f64>,

    /// Maximum smoothness score
    #[arg(long)]
    pub smoothness_ceiling: Option<f64>,

    /// Log file path (default: rampforge.log)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error (default: info)
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Generate shell completions for the specified shell
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<clap_complete::Shell>,
}

fn set(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((key, rest)) = path.split_first() else {
        return;
    };
    if rest.is_empty() {
        root.insert((*key).to_string(), value);
        return;
    }
    let child = root
        .entry((*key).to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(map) = child {
        set(map, rest, value);
    }
}

impl Cli {
    /// Nested configuration overrides for the flags that were actually given.
    ///
    /// Unset flags are left out so they don't clobber values from the TOML
    /// file when merged on top of it.
    pub fn to_config_overrides(&self) -> Value {
        let mut root = Map::new();

        let mut put = |path: &[&str], value: Option<Value>| {
            if let Some(value) = value {
                set(&mut root, path, value);
            }
        };

        put(&["steps", "count"], self.step_count.map(|v| json!(v)));
        put(&["steps", "start"], self.step_start.map(|v| json!(v)));
        put(&["steps", "spacing"], self.step_spacing.map(|v| json!(v)));
        put(&["lightness", "range", "min"], self.min_lightness.map(|v| json!(v)));
        put(&["lightness", "range", "max"], self.max_lightness.map(|v| json!(v)));
        put(
            &["lightness", "curve", "type"],
            self.curve.map(|c| json!(CurveType::from(c))),
        );
        put(&["lightness", "curve", "strength"], self.curve_strength.map(|v| json!(v)));

        let dark_requested =
            self.dark || self.dark_min_lightness.is_some() || self.dark_max_lightness.is_some();
        put(&["dark"], dark_requested.then(|| json!({})));
        put(&["dark", "range", "min"], self.dark_min_lightness.map(|v| json!(v)));
        put(&["dark", "range", "max"], self.dark_max_lightness.map(|v| json!(v)));

        put(
            &["default_strategy"],
            self.default_strategy.map(|s| json!(StrategyId::from(s))),
        );
        put(
            &["anchor", "fallback"],
            self.exclude_unanchored
                .then(|| json!(AnchorFallback::Exclude)),
        );

        put(&["thresholds", "delta_e"], self.delta_e_threshold.map(|v| json!(v)));
        put(&["thresholds", "brand_separation"], self.brand_separation.map(|v| json!(v)));
        put(&["thresholds", "accessibility_rate"], self.accessibility_rate.map(|v| json!(v)));
        put(&["thresholds", "smoothness_ceiling"], self.smoothness_ceiling.map(|v| json!(v)));

        Value::Object(root)
    }
}

/// Errors reading family or report files.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Families keyed by name, as an alternative to a list.
type FamilyMap = BTreeMap<String, BTreeMap<u32, String>>;

fn from_map(map: FamilyMap) -> Vec<FamilyInput> {
    map.into_iter()
        .map(|(name, steps)| FamilyInput { name, steps })
        .collect()
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Parse families from text. A list keeps its order; a map is ordered by name.
pub fn parse_families(content: &str, json: bool) -> Result<Vec<FamilyInput>, InputError> {
    if json {
        let value: serde_json::Value = serde_json::from_str(content)?;
        if value.is_array() {
            Ok(serde_json::from_value(value)?)
        } else {
            Ok(from_map(serde_json::from_value(value)?))
        }
    } else {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        if value.is_sequence() {
            Ok(serde_yaml::from_value(value)?)
        } else {
            Ok(from_map(serde_yaml::from_value(value)?))
        }
    }
}

/// Read a families file; `.json` files are parsed as JSON, anything else as YAML.
pub fn read_families(path: &Path) -> Result<Vec<FamilyInput>, InputError> {
    let content = std::fs::read_to_string(path)?;
    parse_families(&content, is_json(path))
}

/// Read a previously written report (JSON or YAML by extension).
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let content = std::fs::read_to_string(path)?;
    if is_json(path) {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}
