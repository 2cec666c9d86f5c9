//! CSV loading of trial results.
//!
//! The runner's export has a header line naming its columns. The columns
//! `n`, `k`, `N`, `transformation`, `experiment`, `accuracy` and
//! `measured_time` are required; they may appear in any order and any other
//! column is ignored. Rows of experiments or transformations outside this
//! study's vocabulary are skipped with a warning.
//!
//! # Example file content
//! ```csv
//! experiment,n,k,N,transformation,accuracy,measured_time
//! ExperimentLogisticRegression,64,5,300000,transform_atf,0.991,812.4
//! ExperimentCorrelationAttack,64,5,300000,transform_lightweight_secure,0.62,3011.9
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::ResultSet;
use crate::error::{ConfigError, DataError};
use crate::types::{AttackKind, Transformation, TrialOutcome};

const REQUIRED_COLUMNS: [&str; 7] = [
    "n",
    "k",
    "N",
    "transformation",
    "experiment",
    "accuracy",
    "measured_time",
];

/// Load a result set from a CSV file.
///
/// # Errors
/// Returns `DataError` if the file cannot be read, lacks a required column,
/// or holds a row that cannot be parsed.
pub fn load_results_csv(path: &Path) -> Result<ResultSet, DataError> {
    let file = File::open(path)?;
    let results = parse_results(BufReader::new(file))?;
    tracing::debug!(path = %path.display(), trials = results.len(), "loaded result set");
    Ok(results)
}

/// Parse a result set from any buffered reader.
pub fn parse_results<R: BufRead>(reader: R) -> Result<ResultSet, DataError> {
    let mut lines = reader.lines().enumerate();

    let header = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Err(DataError::MissingHeader),
        }
    };
    let columns = ColumnIndex::from_header(&header)?;

    let mut results = ResultSet::new();
    let mut skipped = Vec::new();
    for (line_num, line_result) in lines {
        let line = line_result?;
        let line = line.trim();

        // Skip empty lines
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        match columns.parse_row(&fields, line_num + 1)? {
            Some(outcome) => results.push(outcome),
            None => skipped.push(line_num + 1),
        }
    }

    if !skipped.is_empty() {
        tracing::warn!(
            count = skipped.len(),
            lines = ?skipped,
            "skipped rows with unknown experiment or transformation"
        );
    }

    Ok(results)
}

/// Positions of the required columns within a row.
struct ColumnIndex {
    positions: [usize; 7],
    width: usize,
}

impl ColumnIndex {
    fn from_header(header: &str) -> Result<Self, DataError> {
        let names: Vec<&str> = header
            .trim()
            .trim_start_matches('\u{feff}')
            .split(',')
            .map(str::trim)
            .collect();

        let mut positions = [0; 7];
        for (slot, required) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = names
                .iter()
                .position(|&name| name == required)
                .ok_or(DataError::MissingColumn(required))?;
        }
        let width = positions.iter().copied().max().unwrap_or(0) + 1;

        Ok(Self { positions, width })
    }

    /// Parse one row. Rows of experiments or transformations this crate
    /// does not know yield `None`; no table cell can select them.
    fn parse_row(
        &self,
        fields: &[&str],
        line: usize,
    ) -> Result<Option<TrialOutcome>, DataError> {
        if fields.len() < self.width {
            return Err(DataError::Parse {
                line,
                message: format!("expected at least {} columns, got {}", self.width, fields.len()),
            });
        }
        let field = |i: usize| fields[self.positions[i]];

        let Ok(attack) = AttackKind::parse(field(4)) else {
            return Ok(None);
        };
        let transformation = match (attack, field(3)) {
            // The correlation attack only runs on lightweight secure; the
            // runner may leave the column blank for it.
            (AttackKind::Correlation, "") => Transformation::LightweightSecure,
            (AttackKind::LogisticRegression, "") => {
                return Err(DataError::Variant {
                    line,
                    source: ConfigError::UnknownTransformation(String::new()),
                })
            }
            (_, name) => match Transformation::parse(name) {
                Ok(transformation) => transformation,
                Err(_) => return Ok(None),
            },
        };

        Ok(Some(TrialOutcome {
            n: parse_count(field(0), "n", line)?,
            k: parse_count(field(1), "k", line)?,
            challenges: parse_count(field(2), "N", line)?,
            attack,
            transformation,
            accuracy: parse_real(field(5), "accuracy", line)?,
            measured_time: parse_real(field(6), "measured_time", line)?,
        }))
    }
}

/// Parse an integer column; tolerates a float rendering such as `64.0`.
fn parse_count(value: &str, column: &'static str, line: usize) -> Result<usize, DataError> {
    let invalid = || DataError::InvalidValue {
        line,
        column,
        value: value.to_string(),
    };
    if let Ok(count) = value.parse::<usize>() {
        return Ok(count);
    }
    let float: f64 = value.parse().map_err(|_| invalid())?;
    if float.fract() == 0.0 && float >= 0.0 && float <= usize::MAX as f64 {
        Ok(float as usize)
    } else {
        Err(invalid())
    }
}

fn parse_real(value: &str, column: &'static str, line: usize) -> Result<f64, DataError> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DataError::InvalidValue {
            line,
            column,
            value: value.to_string(),
        }),
    }
}
