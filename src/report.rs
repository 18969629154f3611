//! System report: per-family results, cross-family checks and aggregates.

use float_cmp::approx_eq;
use serde::{Deserialize, Serialize};

use crate::characteristics::FamilyCharacteristics;
use crate::error::Warning;
use crate::family::StepId;
use crate::strategy::{OptimizationResult, StrategyId};
use crate::validation::{
    CheckOutcome, SeparationMatrix, ValidationReport, Thresholds, check_accessibility,
};

/// Which lightness mode a variant was planned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Light,
    Dark,
}

/// One optimized variant of a family and its validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantReport {
    pub mode: Mode,
    pub optimization: OptimizationResult,
    pub validation: ValidationReport,
}

/// Everything produced for one family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyReport {
    pub name: String,
    /// Strategy selected by configuration (the applied one may be a fallback)
    pub strategy: StrategyId,
    pub characteristics: FamilyCharacteristics,
    pub light: VariantReport,
    pub dark: Option<VariantReport>,
}

impl FamilyReport {
    pub fn variants(&self) -> impl Iterator<Item = &VariantReport> {
        std::iter::once(&self.light).chain(self.dark.as_ref())
    }

    pub fn applied_strategy(&self) -> StrategyId {
        self.light.optimization.strategy
    }

    /// Light variant passes every check; the dark variant passes accessibility
    /// and smoothness. Dark delta E is measured against the light originals, so
    /// it is recorded but carries no verdict.
    pub fn passed(&self) -> bool {
        self.light.validation.passed()
            && self.dark.as_ref().is_none_or(|v| {
                v.validation.accessibility.passed && v.validation.smoothness.passed
            })
    }
}

/// A family left out of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedFamily {
    pub name: String,
    pub reason: String,
}

/// Min/mean/median/max of a set of scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub min: f64,
    pub mean: f64,
    pub median: f64,
    pub max: f64,
}

impl Distribution {
    /// Summarize `values`; all zeros when empty.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        Self {
            min: sorted[0],
            mean: sorted.iter().sum::<f64>() / n as f64,
            median,
            max: sorted[n - 1],
        }
    }
}

/// Share of passing checks per validation dimension (1.0 when nothing was checked).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassRates {
    pub delta_e: f64,
    pub accessibility: f64,
    pub smoothness: f64,
    pub brand_separation: f64,
}

/// Aggregates across every processed family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSummary {
    pub families_processed: usize,
    pub families_excluded: usize,
    /// Optimized colors across all variants
    pub total_colors: usize,
    /// Delta E statistics over light-mode steps
    pub mean_delta_e: f64,
    pub max_delta_e: f64,
    pub smoothness: Distribution,
    /// System-wide share of accessibility-capable colors
    pub accessibility: CheckOutcome,
    pub pass_rates: PassRates,
    pub all_passed: bool,
}

/// Final output of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemReport {
    pub families: Vec<FamilyReport>,
    pub excluded: Vec<ExcludedFamily>,
    pub warnings: Vec<Warning>,
    pub brand_separation: SeparationMatrix,
    pub summary: SystemSummary,
}

fn rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        passed as f64 / total as f64
    }
}

impl SystemReport {
    /// Aggregate per-family results. Families are folded in the given order.
    pub(crate) fn assemble(
        families: Vec<FamilyReport>,
        excluded: Vec<ExcludedFamily>,
        warnings: Vec<Warning>,
        brand_separation: SeparationMatrix,
        thresholds: &Thresholds,
    ) -> Self {
        let light_delta_e: Vec<f64> = families
            .iter()
            .flat_map(|f| f.light.optimization.steps.iter().map(|s| s.delta_e))
            .collect();
        let variants: Vec<&VariantReport> = families.iter().flat_map(|f| f.variants()).collect();
        let lightnesses: Vec<f64> = variants
            .iter()
            .flat_map(|v| v.optimization.lightnesses())
            .collect();
        let smoothness_scores: Vec<f64> = variants
            .iter()
            .map(|v| v.validation.smoothness.score)
            .collect();

        let mean_delta_e = if light_delta_e.is_empty() {
            0.0
        } else {
            light_delta_e.iter().sum::<f64>() / light_delta_e.len() as f64
        };
        let max_delta_e = light_delta_e.iter().copied().fold(0.0, f64::max);

        let count = |pred: fn(&ValidationReport) -> bool| {
            variants.iter().filter(|v| pred(&v.validation)).count()
        };
        let pass_rates = PassRates {
            delta_e: rate(
                families
                    .iter()
                    .filter(|f| f.light.validation.delta_e.outcome.passed)
                    .count(),
                families.len(),
            ),
            accessibility: rate(count(|v| v.accessibility.passed), variants.len()),
            smoothness: rate(count(|v| v.smoothness.passed), variants.len()),
            brand_separation: rate(
                brand_separation.pairs.iter().filter(|p| p.passed).count(),
                brand_separation.pairs.len(),
            ),
        };

        let accessibility = check_accessibility(&lightnesses, thresholds.accessibility_rate);
        let all_passed = families.iter().all(FamilyReport::passed)
            && brand_separation.outcome.passed
            && accessibility.passed;

        let summary = SystemSummary {
            families_processed: families.len(),
            families_excluded: excluded.len(),
            total_colors: lightnesses.len(),
            mean_delta_e,
            max_delta_e,
            smoothness: Distribution::from_values(&smoothness_scores),
            accessibility,
            pass_rates,
            all_passed,
        };

        Self {
            families,
            excluded,
            warnings,
            brand_separation,
            summary,
        }
    }

    pub fn family(&self, name: &str) -> Option<&FamilyReport> {
        self.families.iter().find(|f| f.name == name)
    }

    /// Compare this report against a previous run's report.
    ///
    /// Families are matched by name; only light-mode results are compared.
    pub fn compare(&self, previous: &SystemReport) -> ReportComparison {
        let changed = self
            .families
            .iter()
            .filter_map(|current| {
                let before = previous.family(&current.name)?;
                FamilyChange::between(before, current)
            })
            .collect();

        let added = self
            .families
            .iter()
            .filter(|f| previous.family(&f.name).is_none())
            .map(|f| f.name.clone())
            .collect();
        let removed = previous
            .families
            .iter()
            .filter(|f| self.family(&f.name).is_none())
            .map(|f| f.name.clone())
            .collect();

        ReportComparison {
            changed,
            added,
            removed,
        }
    }
}

/// Difference between two runs' reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportComparison {
    pub changed: Vec<FamilyChange>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl ReportComparison {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }
}

/// How one family's light-mode result moved between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyChange {
    pub name: String,
    pub previous_max_delta_e: f64,
    pub current_max_delta_e: f64,
    pub previous_smoothness: f64,
    pub current_smoothness: f64,
    pub changed_steps: Vec<StepChange>,
}

/// A step whose output hex differs between runs (`None` when absent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepChange {
    pub step: StepId,
    pub previous: Option<String>,
    pub current: Option<String>,
}

impl FamilyChange {
    fn between(before: &FamilyReport, after: &FamilyReport) -> Option<Self> {
        let old = &before.light.optimization;
        let new = &after.light.optimization;

        let mut ids = old.step_ids();
        ids.extend(new.step_ids());
        ids.sort();
        ids.dedup();

        let changed_steps: Vec<StepChange> = ids
            .into_iter()
            .filter_map(|step| {
                let previous = old.get(step).map(|s| s.color.hex.clone());
                let current = new.get(step).map(|s| s.color.hex.clone());
                (previous != current).then_some(StepChange {
                    step,
                    previous,
                    current,
                })
            })
            .collect();

        let change = Self {
            name: after.name.clone(),
            previous_max_delta_e: old.max_delta_e(),
            current_max_delta_e: new.max_delta_e(),
            previous_smoothness: before.light.validation.smoothness.score,
            current_smoothness: after.light.validation.smoothness.score,
            changed_steps,
        };

        let metrics_equal = approx_eq!(
            f64,
            change.previous_max_delta_e,
            change.current_max_delta_e,
            ulps = 4
        ) && approx_eq!(
            f64,
            change.previous_smoothness,
            change.current_smoothness,
            ulps = 4
        );

        if metrics_equal && change.changed_steps.is_empty() {
            None
        } else {
            Some(change)
        }
    }
}
