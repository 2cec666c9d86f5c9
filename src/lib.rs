//! # attack-runtime
//!
//! Expected time to first success of randomized PUF modelling attacks.
//!
//! A runtime study repeats each attack many times with fresh seeds. This
//! crate covers the analytical side of such a study:
//!
//! - [`ExperimentMatrix`]: the deterministic list of trials to run, with
//!   per-repetition seeds
//! - [`estimate`]: success rate and expected time to first success of one
//!   table cell under a geometric-retry model
//! - [`output`]: rounding and formatting of durations, and the runtime
//!   table report
//!
//! Running the attacks and drawing the distribution figure are left to
//! external tools; they meet this crate at the [`ResultSet`] and the
//! [`ReportPlot`](output::ReportPlot) trait.
//!
//! ## Quick Start
//!
//! ```ignore
//! use attack_runtime::{data::load_results_csv, output::{NoPlot, RuntimeReport}, StudyConfig};
//! use std::path::Path;
//!
//! let config = StudyConfig::attack_runtime();
//! let results = load_results_csv(Path::new("attack_runtime.csv"))?;
//! let report = RuntimeReport::new(&config)?;
//! println!("{}", report.table(&results));
//! report.generate(&results, Path::new("figures"), &NoPlot)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod data;
mod error;
pub mod matrix;
pub mod output;
mod types;

pub use analysis::{estimate, Estimate};
pub use config::{
    ComparisonColumn, ConfigurationSpec, PlotLayout, SeedBases, StudyConfig, TrainingPolicy,
    DEFAULT_SUCCESS_THRESHOLD,
};
pub use data::ResultSet;
pub use error::{ConfigError, DataError, Error, EstimateError, Result};
pub use matrix::{AttackSpec, ExperimentMatrix, TrialSeeds, TrialSpec};
pub use output::{format_duration, render_table, round_duration};
pub use types::{AttackKind, Combiner, ConfigKey, Transformation, TrialOutcome};
