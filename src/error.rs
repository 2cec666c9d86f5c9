//! Error types for runtime studies.

use thiserror::Error;

/// Top-level error for study generation, result loading and reporting.
#[derive(Error, Debug)]
pub enum Error {
    /// The static study configuration is invalid.
    #[error("invalid study configuration: {0}")]
    Config(#[from] ConfigError),

    /// The result table could not be loaded.
    #[error("failed to load results: {0}")]
    Data(#[from] DataError),

    /// A table cell could not be estimated.
    #[error(transparent)]
    Estimate(#[from] EstimateError),

    /// Writing an artifact failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors in the static study configuration.
///
/// These are raised before any trial is generated, since a bad configuration
/// would make the derived seed streams meaningless.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// One of `n`, `k` or `N` is zero.
    #[error("{field} must be positive (configuration n={n}, k={k}, N={challenges})")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Input size of the configuration.
        n: usize,
        /// Stage count of the configuration.
        k: usize,
        /// Challenge count of the configuration.
        challenges: usize,
    },

    /// The same `(n, k, N)` triple appears twice.
    #[error("configuration n={n}, k={k}, N={challenges} is listed more than once")]
    DuplicateConfiguration {
        /// Input size.
        n: usize,
        /// Stage count.
        k: usize,
        /// Challenge count.
        challenges: usize,
    },

    /// No configurations were given.
    #[error("study has no configurations")]
    NoConfigurations,

    /// No input transformations were given.
    #[error("study has no input transformations")]
    EmptyTransformations,

    /// No comparison columns were given.
    #[error("study has no comparison columns")]
    EmptyColumns,

    /// Repetition count is zero.
    #[error("repetitions must be positive")]
    ZeroRepetitions,

    /// Success threshold outside `[0, 1)`.
    #[error("success threshold must be in [0, 1), got {0}")]
    InvalidThreshold(f64),

    /// Two seed roles share a base offset, so their streams would coincide.
    #[error("seed roles {first} and {second} share base offset {base}")]
    SeedCollision {
        /// First seed role.
        first: &'static str,
        /// Second seed role.
        second: &'static str,
        /// The shared base offset.
        base: u64,
    },

    /// Base offset plus repetition count overflows `u64`.
    #[error("seed role {role} overflows with base {base} and {repetitions} repetitions")]
    SeedOverflow {
        /// Seed role.
        role: &'static str,
        /// Base offset.
        base: u64,
        /// Repetition count.
        repetitions: usize,
    },

    /// Unrecognized study preset name.
    #[error("unknown preset '{0}'. Available: attack-runtime, quick")]
    UnknownPreset(String),

    /// Unrecognized transformation name.
    #[error("unknown input transformation '{0}'")]
    UnknownTransformation(String),

    /// Unrecognized attack or experiment name.
    #[error("unknown attack kind '{0}'")]
    UnknownAttack(String),
}

/// Errors while loading a result table.
#[derive(Error, Debug)]
pub enum DataError {
    /// IO error reading the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file has no header line.
    #[error("result table is empty (no header line)")]
    MissingHeader,

    /// A required column is absent from the header.
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    /// A row has fewer fields than the header.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// Line number (1-indexed).
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// A field could not be converted to its column type.
    #[error("invalid value '{value}' for column '{column}' at line {line}")]
    InvalidValue {
        /// Line number (1-indexed).
        line: usize,
        /// Column name.
        column: &'static str,
        /// The offending field.
        value: String,
    },

    /// Attack or transformation name not recognized.
    #[error("line {line}: {source}")]
    Variant {
        /// Line number (1-indexed).
        line: usize,
        /// Underlying name error.
        source: ConfigError,
    },
}

/// Errors from the time-to-success estimator.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateError {
    /// The cell holds no trials.
    #[error("no data yet")]
    NoData,
}
