//! Static study configuration.
//!
//! A [`StudyConfig`] fixes everything a runtime study needs before a single
//! trial runs: the benchmark points, the transformations attacked, the table
//! columns, the repetition count, the seed bases and the attack policies.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::types::{AttackKind, Combiner, ConfigKey, Transformation, TrialOutcome};

/// Default accuracy above which an attack counts as successful.
pub const DEFAULT_SUCCESS_THRESHOLD: f64 = 0.98;

/// Default iteration cap for the LR stage of the correlation attack.
pub const DEFAULT_CORRELATION_ITERATION_LIMIT: usize = 1000;

/// Position of a configuration's panel in the distribution figure,
/// as `(rows, columns, index)` with a 1-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotLayout {
    /// Number of subplot rows.
    pub rows: u8,
    /// Number of subplot columns.
    pub cols: u8,
    /// 1-based subplot index.
    pub index: u8,
}

impl PlotLayout {
    /// Create a layout entry.
    pub const fn new(rows: u8, cols: u8, index: u8) -> Self {
        Self { rows, cols, index }
    }
}

/// One benchmark point of the study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationSpec {
    /// Challenge length.
    pub n: usize,
    /// Number of arbiter chains.
    pub k: usize,
    /// Number of CRPs given to the attack.
    #[serde(rename = "N")]
    pub challenges: usize,
    /// Panel of the distribution figure, if this point is plotted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_layout: Option<PlotLayout>,
    /// Panel title.
    #[serde(default)]
    pub label: String,
}

impl ConfigurationSpec {
    /// Create a benchmark point without a plot panel.
    pub fn new(n: usize, k: usize, challenges: usize) -> std::result::Result<Self, ConfigError> {
        let spec = Self {
            n,
            k,
            challenges,
            plot_layout: None,
            label: String::new(),
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Attach a plot panel and its title.
    pub fn with_plot(mut self, layout: PlotLayout, label: impl Into<String>) -> Self {
        self.plot_layout = Some(layout);
        self.label = label.into();
        self
    }

    /// Identity of this point.
    pub fn key(&self) -> ConfigKey {
        ConfigKey {
            n: self.n,
            k: self.k,
            challenges: self.challenges,
        }
    }

    /// Whether a trial was run on this benchmark point.
    pub fn matches(&self, outcome: &TrialOutcome) -> bool {
        outcome.n == self.n && outcome.k == self.k && outcome.challenges == self.challenges
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        let non_positive = |field| ConfigError::NonPositive {
            field,
            n: self.n,
            k: self.k,
            challenges: self.challenges,
        };
        if self.n == 0 {
            return Err(non_positive("n"));
        }
        if self.k == 0 {
            return Err(non_positive("k"));
        }
        if self.challenges == 0 {
            return Err(non_positive("N"));
        }
        Ok(())
    }
}

/// One column of the runtime table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonColumn {
    /// Attack whose trials fill the column.
    pub attack: AttackKind,
    /// Transformation of the attacked instances.
    pub transformation: Transformation,
}

impl ComparisonColumn {
    /// Create a column.
    pub const fn new(attack: AttackKind, transformation: Transformation) -> Self {
        Self {
            attack,
            transformation,
        }
    }

    /// Whether a trial belongs to this column.
    ///
    /// Correlation-attack trials are selected by attack kind alone, since the
    /// attack only ever runs on one transformation. LR trials additionally
    /// need an exact transformation match.
    pub fn matches(&self, outcome: &TrialOutcome) -> bool {
        if outcome.attack != self.attack {
            return false;
        }
        match self.attack {
            AttackKind::Correlation => true,
            AttackKind::LogisticRegression => outcome.transformation == self.transformation,
        }
    }
}

/// Base offsets of the four seed streams.
///
/// Repetition `i` uses `base + i` for every role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedBases {
    /// Seed of the simulated PUF instance.
    pub instance: u64,
    /// Seed of the initial model.
    pub model: u64,
    /// Seed of the challenge sampling.
    pub challenge: u64,
    /// Seed of the distance evaluation.
    pub distance: u64,
}

impl Default for SeedBases {
    fn default() -> Self {
        Self {
            instance: 314159,
            model: 265358,
            challenge: 979323,
            distance: 846264,
        }
    }
}

impl SeedBases {
    fn roles(&self) -> [(&'static str, u64); 4] {
        [
            ("instance", self.instance),
            ("model", self.model),
            ("challenge", self.challenge),
            ("distance", self.distance),
        ]
    }

    fn validate(&self, repetitions: usize) -> std::result::Result<(), ConfigError> {
        let roles = self.roles();
        for (i, &(first, a)) in roles.iter().enumerate() {
            for &(second, b) in &roles[i + 1..] {
                if a == b {
                    return Err(ConfigError::SeedCollision {
                        first,
                        second,
                        base: a,
                    });
                }
            }
            if a.checked_add(repetitions as u64).is_none() {
                return Err(ConfigError::SeedOverflow {
                    role: first,
                    base: a,
                    repetitions,
                });
            }
        }
        Ok(())
    }
}

/// Training policy of every LR run, including the LR stage of the
/// correlation attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPolicy {
    /// Mini-batch size; 0 trains on the full set.
    pub mini_batch_size: usize,
    /// Decimal places of the weight change that count as converged.
    pub convergence_decimals: u32,
    /// Whether training data is reshuffled between epochs.
    pub shuffle: bool,
}

impl Default for TrainingPolicy {
    fn default() -> Self {
        Self {
            mini_batch_size: 0,
            convergence_decimals: 2,
            shuffle: false,
        }
    }
}

/// Complete static description of a runtime study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Report identifier; artifact file names derive from it.
    pub name: String,
    /// Benchmark points, in table row order.
    pub configurations: Vec<ConfigurationSpec>,
    /// Transformations attacked by plain LR, in generation order.
    pub transformations: Vec<Transformation>,
    /// Table columns, in display order.
    pub columns: Vec<ComparisonColumn>,
    /// Independent repetitions per benchmark point and attack.
    pub repetitions: usize,
    /// Accuracy above which a trial is a success.
    pub success_threshold: f64,
    /// Seed stream offsets.
    #[serde(default)]
    pub seeds: SeedBases,
    /// Iteration cap of the correlation attack's LR stage.
    pub correlation_iteration_limit: usize,
    /// Training policy shared by both attacks.
    #[serde(default)]
    pub training: TrainingPolicy,
    /// Response combiner of the instances attacked by plain LR.
    #[serde(default)]
    pub combiner: Combiner,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self::attack_runtime()
    }
}

impl StudyConfig {
    /// The published attack runtime study.
    ///
    /// - 5 benchmark points on 64 and 128 bit challenges, 4 of them plotted
    /// - 1000 repetitions per point and attack
    /// - Columns: LR on every transformation, correlation attack on
    ///   lightweight secure
    pub fn attack_runtime() -> Self {
        Self {
            name: "attack_runtime".to_string(),
            configurations: vec![
                point(64, 5, 300_000).with_plot(
                    PlotLayout::new(2, 2, 1),
                    "Perm. Index. Dist. (n=64; k=5; 300,000 CRPs)",
                ),
                point(64, 6, 1_000_000).with_plot(
                    PlotLayout::new(2, 2, 2),
                    "Perm. Index. Dist. (n=64; k=6; 1,000,000 CRPs)",
                ),
                point(64, 7, 2_000_000),
                point(128, 4, 1_000_000).with_plot(
                    PlotLayout::new(2, 2, 3),
                    "Perm. Index. Dist. (n=128; k=4; 2,000,000 CRPs)",
                ),
                point(128, 5, 2_000_000).with_plot(
                    PlotLayout::new(2, 2, 4),
                    "Perm. Index. Dist. (n=128; k=5; 2,000,000 CRPs)",
                ),
            ],
            transformations: Transformation::ALL.to_vec(),
            columns: default_columns(),
            repetitions: 1000,
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
            seeds: SeedBases::default(),
            correlation_iteration_limit: DEFAULT_CORRELATION_ITERATION_LIMIT,
            training: TrainingPolicy::default(),
            combiner: Combiner::Xor,
        }
    }

    /// Small smoke-test study: two cheap points, 10 repetitions.
    pub fn quick() -> Self {
        Self {
            name: "attack_runtime_quick".to_string(),
            configurations: vec![
                point(32, 2, 10_000).with_plot(PlotLayout::new(1, 2, 1), "n=32; k=2"),
                point(32, 3, 20_000).with_plot(PlotLayout::new(1, 2, 2), "n=32; k=3"),
            ],
            repetitions: 10,
            ..Self::attack_runtime()
        }
    }

    /// Look up a preset by name (`attack-runtime`, `quick`).
    pub fn preset(name: &str) -> std::result::Result<Self, ConfigError> {
        match name.to_lowercase().as_str() {
            "attack-runtime" | "attack_runtime" | "full" => Ok(Self::attack_runtime()),
            "quick" => Ok(Self::quick()),
            _ => Err(ConfigError::UnknownPreset(name.to_string())),
        }
    }

    /// Load a study from a JSON file and validate it.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Set the report identifier.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the number of repetitions.
    pub fn repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Set the success threshold.
    pub fn success_threshold(mut self, threshold: f64) -> Self {
        self.success_threshold = threshold;
        self
    }

    /// Append a benchmark point.
    pub fn with_configuration(mut self, spec: ConfigurationSpec) -> Self {
        self.configurations.push(spec);
        self
    }

    /// Replace the seed bases.
    pub fn seeds(mut self, seeds: SeedBases) -> Self {
        self.seeds = seeds;
        self
    }

    // =========================================================================
    // Derived quantities
    // =========================================================================

    /// Trials generated per repetition and benchmark point
    /// (one correlation attack plus one LR per transformation).
    pub fn trials_per_point(&self) -> usize {
        1 + self.transformations.len()
    }

    /// Total number of trials in the experiment matrix.
    pub fn total_trials(&self) -> usize {
        self.repetitions * self.configurations.len() * self.trials_per_point()
    }

    /// Benchmark points that have a panel in the distribution figure.
    pub fn plot_panels(&self) -> Vec<(&ConfigurationSpec, PlotLayout)> {
        self.configurations
            .iter()
            .filter_map(|spec| spec.plot_layout.map(|layout| (spec, layout)))
            .collect()
    }

    /// Check the configuration.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.configurations.is_empty() {
            return Err(ConfigError::NoConfigurations);
        }
        for (i, spec) in self.configurations.iter().enumerate() {
            spec.validate()?;
            if self.configurations[..i].iter().any(|s| s.key() == spec.key()) {
                return Err(ConfigError::DuplicateConfiguration {
                    n: spec.n,
                    k: spec.k,
                    challenges: spec.challenges,
                });
            }
        }
        if self.transformations.is_empty() {
            return Err(ConfigError::EmptyTransformations);
        }
        if self.columns.is_empty() {
            return Err(ConfigError::EmptyColumns);
        }
        if self.repetitions == 0 {
            return Err(ConfigError::ZeroRepetitions);
        }
        if !(0.0..1.0).contains(&self.success_threshold) {
            return Err(ConfigError::InvalidThreshold(self.success_threshold));
        }
        self.seeds.validate(self.repetitions)
    }
}

/// The table columns of the published study.
pub fn default_columns() -> Vec<ComparisonColumn> {
    vec![
        ComparisonColumn::new(AttackKind::LogisticRegression, Transformation::Classic),
        ComparisonColumn::new(
            AttackKind::LogisticRegression,
            Transformation::LightweightSecure,
        ),
        ComparisonColumn::new(AttackKind::Correlation, Transformation::LightweightSecure),
        ComparisonColumn::new(AttackKind::LogisticRegression, Transformation::Permutation),
    ]
}

// Preset points are non-zero literals.
fn point(n: usize, k: usize, challenges: usize) -> ConfigurationSpec {
    ConfigurationSpec {
        n,
        k,
        challenges,
        plot_layout: None,
        label: String::new(),
    }
}
