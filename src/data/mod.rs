//! Result set of executed trials.
//!
//! The trial runner records one row per executed trial. This module holds
//! those rows in a [`ResultSet`] and loads them from the runner's CSV export.
//!
//! # Example
//!
//! ```ignore
//! use attack_runtime::data::load_results_csv;
//! use std::path::Path;
//!
//! let results = load_results_csv(Path::new("attack_runtime.csv"))?;
//! println!("Loaded {} trials", results.len());
//! ```

mod csv;

pub use csv::{load_results_csv, parse_results};

use std::collections::BTreeSet;

use crate::config::{ComparisonColumn, ConfigurationSpec};
use crate::types::{ConfigKey, TrialOutcome};

/// All recorded trial outcomes.
///
/// Rows are only ever appended; nothing in the reporting path mutates them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    outcomes: Vec<TrialOutcome>,
}

impl ResultSet {
    /// Create an empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one outcome.
    pub fn push(&mut self, outcome: TrialOutcome) {
        self.outcomes.push(outcome);
    }

    /// Number of recorded trials.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether no trial has been recorded.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Iterate over all outcomes.
    pub fn iter(&self) -> std::slice::Iter<'_, TrialOutcome> {
        self.outcomes.iter()
    }

    /// All outcomes as a slice.
    pub fn as_slice(&self) -> &[TrialOutcome] {
        &self.outcomes
    }

    /// The trials of one table cell: exact `(n, k, N)` match plus the
    /// column's attack and transformation discriminators.
    pub fn cell(&self, spec: &ConfigurationSpec, column: &ComparisonColumn) -> Vec<&TrialOutcome> {
        self.outcomes
            .iter()
            .filter(|o| spec.matches(o) && column.matches(o))
            .collect()
    }

    /// Distinct benchmark points present in the results.
    pub fn config_keys(&self) -> BTreeSet<ConfigKey> {
        self.outcomes.iter().map(TrialOutcome::config_key).collect()
    }
}

impl FromIterator<TrialOutcome> for ResultSet {
    fn from_iter<I: IntoIterator<Item = TrialOutcome>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

impl Extend<TrialOutcome> for ResultSet {
    fn extend<I: IntoIterator<Item = TrialOutcome>>(&mut self, iter: I) {
        self.outcomes.extend(iter);
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a TrialOutcome;
    type IntoIter = std::slice::Iter<'a, TrialOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}
