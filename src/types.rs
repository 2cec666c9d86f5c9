//! Core domain types shared by the matrix generator, the estimator and the
//! report renderer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Attack procedure a trial runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttackKind {
    /// Plain logistic-regression modelling attack.
    #[serde(rename = "lr")]
    LogisticRegression,
    /// Correlation attack (LR followed by permutation search on the
    /// lightweight-secure transformation).
    #[serde(rename = "corr")]
    Correlation,
}

impl AttackKind {
    /// Short key used in column definitions (`lr`, `corr`).
    pub fn key(&self) -> &'static str {
        match self {
            AttackKind::LogisticRegression => "lr",
            AttackKind::Correlation => "corr",
        }
    }

    /// Name shown in table headers.
    pub fn display_name(&self) -> &'static str {
        match self {
            AttackKind::LogisticRegression => "LR",
            AttackKind::Correlation => "Correlation Attack",
        }
    }

    /// Experiment name recorded by the trial runner in the `experiment` column.
    pub fn experiment_name(&self) -> &'static str {
        match self {
            AttackKind::LogisticRegression => "ExperimentLogisticRegression",
            AttackKind::Correlation => "ExperimentCorrelationAttack",
        }
    }

    /// Parse either the short key or the runner's experiment name.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim() {
            "lr" | "ExperimentLogisticRegression" => Ok(AttackKind::LogisticRegression),
            "corr" | "ExperimentCorrelationAttack" => Ok(AttackKind::Correlation),
            other => Err(ConfigError::UnknownAttack(other.to_string())),
        }
    }
}

impl fmt::Display for AttackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Input transformation applied to challenges before they reach the PUF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Transformation {
    /// Classic arbiter-PUF feature transform.
    #[serde(rename = "transform_atf")]
    Classic,
    /// Lightweight-secure input transformation.
    #[serde(rename = "transform_lightweight_secure")]
    LightweightSecure,
    /// Fixed-permutation based transformation.
    #[serde(rename = "transform_fixed_permutation")]
    Permutation,
}

impl Transformation {
    /// All transformations, in the order the study enumerates them.
    pub const ALL: [Transformation; 3] = [
        Transformation::Classic,
        Transformation::LightweightSecure,
        Transformation::Permutation,
    ];

    /// Name recorded by the trial runner in the `transformation` column.
    pub fn name(&self) -> &'static str {
        match self {
            Transformation::Classic => "transform_atf",
            Transformation::LightweightSecure => "transform_lightweight_secure",
            Transformation::Permutation => "transform_fixed_permutation",
        }
    }

    /// Name shown in table headers.
    pub fn display_name(&self) -> &'static str {
        match self {
            Transformation::Classic => "Classic",
            Transformation::LightweightSecure => "Lightweight Secure",
            Transformation::Permutation => "Permutation-Based",
        }
    }

    /// Parse a runner name or one of the short aliases
    /// (`classic`, `lightweight-secure`, `permutation`).
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim() {
            "transform_atf" | "classic" | "atf" => Ok(Transformation::Classic),
            "transform_lightweight_secure" | "lightweight-secure" | "lightweight_secure" => {
                Ok(Transformation::LightweightSecure)
            }
            "transform_fixed_permutation" | "permutation" | "fixed-permutation" => {
                Ok(Transformation::Permutation)
            }
            other => Err(ConfigError::UnknownTransformation(other.to_string())),
        }
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Function combining the responses of the individual arbiter chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Combiner {
    /// XOR of all chain responses.
    #[default]
    #[serde(rename = "combiner_xor")]
    Xor,
}

/// Identity of a benchmark point: input size, stage count and CRP count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfigKey {
    /// Challenge length.
    pub n: usize,
    /// Number of arbiter chains.
    pub k: usize,
    /// Number of challenge/response pairs available to the attack.
    #[serde(rename = "N")]
    pub challenges: usize,
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={}, k={}, N={}", self.n, self.k, self.challenges)
    }
}

/// Result of one executed attack trial, as recorded by the trial runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    /// Challenge length.
    pub n: usize,
    /// Number of arbiter chains.
    pub k: usize,
    /// Number of CRPs used.
    #[serde(rename = "N")]
    pub challenges: usize,
    /// Attack the trial ran.
    #[serde(rename = "experiment")]
    pub attack: AttackKind,
    /// Input transformation of the attacked instance.
    pub transformation: Transformation,
    /// Model accuracy reached, in `[0, 1]`.
    pub accuracy: f64,
    /// Wall-clock duration in seconds.
    pub measured_time: f64,
}

impl TrialOutcome {
    /// The configuration this trial belongs to.
    pub fn config_key(&self) -> ConfigKey {
        ConfigKey {
            n: self.n,
            k: self.k,
            challenges: self.challenges,
        }
    }

    /// Whether the trial counts as a successful attack.
    ///
    /// Strictly greater: an accuracy equal to the threshold is a failure.
    pub fn is_success(&self, threshold: f64) -> bool {
        self.accuracy > threshold
    }
}
