//! Perceptually uniform OKLCH color ramps for design-system color families.
//!
//! Each family is planned onto a shared lightness sequence, optimized with a
//! per-family strategy and validated for perceptual fidelity, accessibility
//! potential, smoothness and cross-family brand separation.
//!
//! ```no_run
//! use rampforge::config::RampConfig;
//! use rampforge::family::FamilyInput;
//! use rampforge::pipeline::Pipeline;
//!
//! let pipeline = Pipeline::new(RampConfig::default())?;
//! let report = pipeline.run(&[FamilyInput::new(
//!     "Ocean",
//!     [(300, "#7fb2e5"), (500, "#2f6fb0"), (700, "#1b3f66")],
//! )]);
//! println!("{}", report.summary.max_delta_e);
//! # Ok::<(), rampforge::error::RampError>(())
//! ```

pub mod anchor;
pub mod characteristics;
pub mod cli;
pub mod color;
pub mod config;
pub mod curves;
pub mod error;
pub mod family;
pub mod identity;
pub mod logging;
pub mod neutral;
pub mod pipeline;
pub mod report;
pub mod steps;
pub mod strategy;
pub mod validation;
