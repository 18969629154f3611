//! CLI entry point for rampforge.

use std::io;

use clap::{CommandFactory, Parser};
use color_eyre::eyre::{Result, WrapErr, bail};
use serde::Serialize;

use rampforge::cli::{Cli, OutputFormat, read_document, read_families};
use rampforge::config::RampConfig;
use rampforge::logging::init_logging;
use rampforge::pipeline::Pipeline;
use rampforge::report::{ReportComparison, SystemReport};

/// Output document when `--compare` is given.
#[derive(Serialize)]
struct ComparedReport<'a> {
    report: &'a SystemReport,
    comparison: &'a ReportComparison,
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).wrap_err("Failed to serialize report to JSON")
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).wrap_err("Failed to serialize report to YAML")
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "rampforge", &mut io::stdout());
        return Ok(());
    }

    let _guard = init_logging(cli.log_file.as_deref(), Some(cli.log_level.as_str()));

    let config = RampConfig::layered(cli.config.as_deref(), cli.to_config_overrides())
        .wrap_err("Failed to load configuration")?;

    if let Some(path) = &cli.save_config {
        config
            .save(path)
            .wrap_err_with(|| format!("Failed to save config to {}", path.display()))?;
        eprintln!("Saved configuration to {}", path.display());
    }

    let Some(families_path) = &cli.families else {
        bail!("--families is required");
    };
    let families = read_families(families_path)
        .wrap_err_with(|| format!("Failed to read families from {}", families_path.display()))?;

    let pipeline = Pipeline::new(config).wrap_err("Invalid configuration")?;
    let report = pipeline.run(&families);

    for warning in &report.warnings {
        eprintln!("Warning: {warning}");
    }
    for family in &report.excluded {
        eprintln!("Excluded {}: {}", family.name, family.reason);
    }

    let output = match &cli.compare {
        Some(path) => {
            let previous: SystemReport = read_document(path)
                .wrap_err_with(|| format!("Failed to read previous report {}", path.display()))?;
            let comparison = report.compare(&previous);
            if comparison.is_empty() {
                eprintln!("No changes against {}", path.display());
            } else {
                eprintln!(
                    "{} changed, {} added, {} removed against {}",
                    comparison.changed.len(),
                    comparison.added.len(),
                    comparison.removed.len(),
                    path.display()
                );
            }
            render(
                &ComparedReport {
                    report: &report,
                    comparison: &comparison,
                },
                cli.format,
            )?
        }
        None => render(&report, cli.format)?,
    };

    if let Some(path) = &cli.output {
        std::fs::write(path, &output)
            .wrap_err_with(|| format!("Failed to write to {}", path.display()))?;
        eprintln!("Wrote report to {}", path.display());
    } else {
        print!("{output}");
    }

    if cli.strict && !report.summary.all_passed {
        bail!("Validation failed");
    }

    Ok(())
}
