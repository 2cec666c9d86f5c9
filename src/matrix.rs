//! Experiment matrix generation.
//!
//! The matrix lists every trial the external runner must execute: for each
//! repetition, each benchmark point and each attack variant one
//! [`TrialSpec`] carrying the derived seeds.
//!
//! # Example
//!
//! ```ignore
//! use attack_runtime::{ExperimentMatrix, StudyConfig};
//!
//! let matrix = ExperimentMatrix::new(StudyConfig::quick())?;
//! for trial in matrix.iter() {
//!     println!("{}", serde_json::to_string(&trial)?);
//! }
//! ```

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigurationSpec, SeedBases, StudyConfig, TrainingPolicy};
use crate::error::{ConfigError, Result};
use crate::types::{AttackKind, Combiner, ConfigKey, Transformation};

/// Seeds of one repetition, one per seed role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrialSeeds {
    /// Simulated PUF instance.
    pub seed_instance: u64,
    /// Initial model weights.
    pub seed_model: u64,
    /// Challenge sampling.
    pub seed_challenge: u64,
    /// Distance evaluation.
    pub seed_distance: u64,
}

impl TrialSeeds {
    /// Derive the seeds of repetition `repetition`.
    ///
    /// Callers must have validated `bases` against the repetition count, so
    /// the additions cannot overflow.
    pub fn derive(bases: &SeedBases, repetition: usize) -> Self {
        let i = repetition as u64;
        Self {
            seed_instance: bases.instance + i,
            seed_model: bases.model + i,
            seed_challenge: bases.challenge + i,
            seed_distance: bases.distance + i,
        }
    }

    /// The four seeds in role order.
    pub fn as_array(&self) -> [u64; 4] {
        [
            self.seed_instance,
            self.seed_model,
            self.seed_challenge,
            self.seed_distance,
        ]
    }
}

/// Attack-specific parameters of a trial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "experiment")]
pub enum AttackSpec {
    /// Correlation attack with a capped LR stage.
    #[serde(rename = "ExperimentCorrelationAttack")]
    Correlation {
        /// Iteration cap of the LR stage.
        lr_iteration_limit: usize,
    },
    /// Plain logistic regression.
    #[serde(rename = "ExperimentLogisticRegression")]
    LogisticRegression {
        /// Response combiner of the attacked instance.
        combiner: Combiner,
    },
}

impl AttackSpec {
    /// The attack kind this trial runs.
    pub fn kind(&self) -> AttackKind {
        match self {
            AttackSpec::Correlation { .. } => AttackKind::Correlation,
            AttackSpec::LogisticRegression { .. } => AttackKind::LogisticRegression,
        }
    }
}

/// Everything the runner needs to execute one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSpec {
    /// Repetition index in `[0, repetitions)`.
    pub repetition: usize,
    /// Benchmark point.
    #[serde(flatten)]
    pub config: ConfigKey,
    /// Input transformation of the attacked instance.
    pub transformation: Transformation,
    /// Seeds of this repetition.
    #[serde(flatten)]
    pub seeds: TrialSeeds,
    /// Training policy of the LR run (or LR stage).
    #[serde(flatten)]
    pub training: TrainingPolicy,
    /// Attack and its parameters.
    #[serde(flatten)]
    pub attack: AttackSpec,
}

/// Deterministic enumeration of all trials of a study.
///
/// Construction validates the study, so every matrix that exists describes a
/// reproducible seed derivation.
#[derive(Debug, Clone)]
pub struct ExperimentMatrix {
    config: StudyConfig,
}

impl ExperimentMatrix {
    /// Validate `config` and build its matrix.
    pub fn new(config: StudyConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        tracing::debug!(
            study = %config.name,
            points = config.configurations.len(),
            repetitions = config.repetitions,
            trials = config.total_trials(),
            "experiment matrix configured"
        );
        Ok(Self { config })
    }

    /// The study this matrix enumerates.
    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    /// Total number of trials.
    pub fn len(&self) -> usize {
        self.config.total_trials()
    }

    /// Whether the matrix is empty. Never true for a validated study.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all trials: repetition-major, then benchmark point, then
    /// variant (correlation attack first, then LR per transformation).
    pub fn iter(&self) -> impl Iterator<Item = TrialSpec> + '_ {
        (0..self.config.repetitions).flat_map(move |repetition| {
            let seeds = TrialSeeds::derive(&self.config.seeds, repetition);
            self.config
                .configurations
                .iter()
                .flat_map(move |spec| self.trials_for(spec, repetition, seeds))
        })
    }

    /// Collect the whole matrix.
    pub fn trials(&self) -> Vec<TrialSpec> {
        self.iter().collect()
    }

    /// Write the matrix as JSON lines, one trial per line.
    pub fn write_json_lines<W: Write>(&self, mut writer: W) -> Result<()> {
        for trial in self.iter() {
            serde_json::to_writer(&mut writer, &trial)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    fn trials_for<'a>(
        &'a self,
        spec: &ConfigurationSpec,
        repetition: usize,
        seeds: TrialSeeds,
    ) -> impl Iterator<Item = TrialSpec> + 'a {
        let config = spec.key();
        let training = self.config.training;
        let combiner = self.config.combiner;
        let correlation = TrialSpec {
            repetition,
            config,
            transformation: Transformation::LightweightSecure,
            seeds,
            training,
            attack: AttackSpec::Correlation {
                lr_iteration_limit: self.config.correlation_iteration_limit,
            },
        };
        let lr = self
            .config
            .transformations
            .iter()
            .map(move |&transformation| TrialSpec {
                repetition,
                config,
                transformation,
                seeds,
                training,
                attack: AttackSpec::LogisticRegression { combiner },
            });
        std::iter::once(correlation).chain(lr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_size_and_order() {
        let config = StudyConfig::quick().repetitions(3);
        let matrix = ExperimentMatrix::new(config.clone()).unwrap();
        let trials = matrix.trials();

        assert_eq!(trials.len(), 3 * 2 * 4);
        assert_eq!(trials.len(), matrix.len());

        // First block: repetition 0, first point, correlation then LR variants.
        assert_eq!(trials[0].repetition, 0);
        assert_eq!(trials[0].config, config.configurations[0].key());
        assert_eq!(trials[0].attack.kind(), AttackKind::Correlation);
        assert_eq!(trials[0].transformation, Transformation::LightweightSecure);
        let lr: Vec<Transformation> = trials[1..4].iter().map(|t| t.transformation).collect();
        assert_eq!(lr, Transformation::ALL.to_vec());
        assert!(trials[1..4]
            .iter()
            .all(|t| t.attack.kind() == AttackKind::LogisticRegression));

        // Second point follows within the same repetition.
        assert_eq!(trials[4].repetition, 0);
        assert_eq!(trials[4].config, config.configurations[1].key());

        // Repetition-major.
        assert_eq!(trials[8].repetition, 1);
        assert_eq!(trials[8].config, config.configurations[0].key());
    }

    #[test]
    fn test_seeds_follow_bases() {
        let matrix = ExperimentMatrix::new(StudyConfig::quick()).unwrap();
        let trials = matrix.trials();
        let last = trials.last().unwrap();
        assert_eq!(last.repetition, 9);
        assert_eq!(
            last.seeds,
            TrialSeeds {
                seed_instance: 314159 + 9,
                seed_model: 265358 + 9,
                seed_challenge: 979323 + 9,
                seed_distance: 846264 + 9,
            }
        );
        // All variants of a repetition share the seeds.
        let rep0: Vec<_> = trials.iter().filter(|t| t.repetition == 0).collect();
        assert!(rep0.iter().all(|t| t.seeds == rep0[0].seeds));
    }

    #[test]
    fn test_attack_parameters() {
        let matrix = ExperimentMatrix::new(StudyConfig::quick()).unwrap();
        let trials = matrix.trials();
        assert_eq!(
            trials[0].attack,
            AttackSpec::Correlation {
                lr_iteration_limit: 1000
            }
        );
        assert_eq!(
            trials[1].attack,
            AttackSpec::LogisticRegression {
                combiner: Combiner::Xor
            }
        );
        // Both attacks train under the same policy.
        for trial in &trials[..4] {
            assert_eq!(trial.training.mini_batch_size, 0);
            assert_eq!(trial.training.convergence_decimals, 2);
            assert!(!trial.training.shuffle);
        }
    }

    #[test]
    fn test_invalid_config_fails_at_construction() {
        let mut config = StudyConfig::quick();
        config.configurations[0].n = 0;
        assert!(matches!(
            ExperimentMatrix::new(config),
            Err(ConfigError::NonPositive { field: "n", .. })
        ));
    }

    #[test]
    fn test_json_lines_output() {
        let matrix = ExperimentMatrix::new(StudyConfig::quick().repetitions(1)).unwrap();
        let mut buf = Vec::new();
        matrix.write_json_lines(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), matrix.len());

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["experiment"], "ExperimentCorrelationAttack");
        assert_eq!(first["N"], 10_000);
        assert_eq!(first["seed_instance"], 314159);
        assert_eq!(first["lr_iteration_limit"], 1000);
        assert_eq!(first["mini_batch_size"], 0);
        assert_eq!(first["convergence_decimals"], 2);
        assert_eq!(first["shuffle"], false);
        assert!(first.get("combiner").is_none());

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["experiment"], "ExperimentLogisticRegression");
        assert_eq!(second["transformation"], "transform_atf");
        assert_eq!(second["combiner"], "combiner_xor");
        assert_eq!(second["mini_batch_size"], 0);
        assert_eq!(second["shuffle"], false);

        let parsed: TrialSpec = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed, matrix.trials()[0]);
    }
}
