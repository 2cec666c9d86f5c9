//! Expected time to first success under a geometric-retry model.
//!
//! Each trial of a cell is treated as an independent Bernoulli attempt with
//! the cell's observed success rate `p`. The number of attempts until the
//! first success is geometric with mean `1/p`; the estimate schedules
//! `ceil(1/p)` attempts, charges the mean failure time for all but the last
//! and the mean success time for the last.
//!
//! When no success was observed `p` is unknown and the estimate degrades to
//! the total time already spent on the cell, flagged as a lower bound.

use serde::{Deserialize, Serialize};

use crate::error::EstimateError;
use crate::types::TrialOutcome;

/// Estimated time to first success of one table cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimate {
    /// At least one trial succeeded.
    Exact {
        /// Trials in the cell.
        trials: usize,
        /// Successful trials.
        successes: usize,
        /// Attempts to schedule until the first success, `ceil(1/p)`.
        expected_tries: u64,
        /// Expected wall-clock seconds until the first success.
        expected_seconds: f64,
    },
    /// No trial succeeded; the value understates the true expectation.
    Bound {
        /// Trials in the cell.
        trials: usize,
        /// Mean trial duration times the number of trials.
        expected_seconds: f64,
    },
}

impl Estimate {
    /// Observed success rate in `[0, 1]`.
    pub fn success_rate(&self) -> f64 {
        match *self {
            Estimate::Exact {
                trials, successes, ..
            } => successes as f64 / trials as f64,
            Estimate::Bound { .. } => 0.0,
        }
    }

    /// Estimated seconds until the first success.
    pub fn expected_seconds(&self) -> f64 {
        match *self {
            Estimate::Exact {
                expected_seconds, ..
            }
            | Estimate::Bound {
                expected_seconds, ..
            } => expected_seconds,
        }
    }

    /// Whether this is a lower-bound fallback.
    pub fn is_lower_bound(&self) -> bool {
        matches!(self, Estimate::Bound { .. })
    }

    /// Number of trials the estimate is based on.
    pub fn trials(&self) -> usize {
        match *self {
            Estimate::Exact { trials, .. } | Estimate::Bound { trials, .. } => trials,
        }
    }

    /// Number of successful trials.
    pub fn successes(&self) -> usize {
        match *self {
            Estimate::Exact { successes, .. } => successes,
            Estimate::Bound { .. } => 0,
        }
    }
}

/// Running sums for one side of the success/failure partition.
#[derive(Debug, Default, Clone, Copy)]
struct TimeSum {
    count: usize,
    seconds: f64,
}

impl TimeSum {
    fn add(&mut self, seconds: f64) {
        self.count += 1;
        self.seconds += seconds;
    }

    /// Mean duration; 0 for an empty side.
    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.seconds / self.count as f64
        }
    }
}

/// Estimate the expected time to first success of a cell.
///
/// A trial is a success iff its accuracy is strictly above
/// `success_threshold`.
///
/// # Errors
/// Returns [`EstimateError::NoData`] if the cell holds no trials.
pub fn estimate<'a, I>(cell: I, success_threshold: f64) -> Result<Estimate, EstimateError>
where
    I: IntoIterator<Item = &'a TrialOutcome>,
{
    let mut successes = TimeSum::default();
    let mut failures = TimeSum::default();
    for outcome in cell {
        if outcome.is_success(success_threshold) {
            successes.add(outcome.measured_time);
        } else {
            failures.add(outcome.measured_time);
        }
    }

    let trials = successes.count + failures.count;
    if trials == 0 {
        return Err(EstimateError::NoData);
    }

    if successes.count == 0 {
        let mean_time = failures.seconds / trials as f64;
        return Ok(Estimate::Bound {
            trials,
            expected_seconds: mean_time * trials as f64,
        });
    }

    // ceil(1/p) with p = successes/trials, in exact integer arithmetic.
    let expected_tries = trials.div_ceil(successes.count) as u64;
    let expected_seconds = (expected_tries - 1) as f64 * failures.mean() + successes.mean();

    Ok(Estimate::Exact {
        trials,
        successes: successes.count,
        expected_tries,
        expected_seconds,
    })
}
