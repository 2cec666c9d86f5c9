//! Runtime table rendering.
//!
//! Rows are benchmark points, columns are attack/transformation pairings and
//! every cell holds the estimated time to first success. Cells are evaluated
//! independently: an empty cell renders as a placeholder and never affects
//! its neighbours.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use super::duration::{format_duration, round_duration};
use crate::analysis::{estimate, Estimate};
use crate::config::{ComparisonColumn, ConfigurationSpec};
use crate::data::ResultSet;
use crate::error::EstimateError;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Placeholder for cells without any trial.
pub const NO_DATA: &str = "no data yet";

/// Output layout of the runtime table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    /// LaTeX `tabular` with booktabs rules.
    #[default]
    Latex,
    /// GitHub-flavoured Markdown.
    Markdown,
}

impl TableFormat {
    /// File extension of the table artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Latex => "tex",
            TableFormat::Markdown => "md",
        }
    }

    /// Glyph appended to lower-bound cells.
    pub fn lower_bound_marker(&self) -> &'static str {
        match self {
            TableFormat::Latex => r"${}^\ast$",
            TableFormat::Markdown => r"\*",
        }
    }

    /// Parse a format name (`latex`/`tex`, `markdown`/`md`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "latex" | "tex" => Some(TableFormat::Latex),
            "markdown" | "md" => Some(TableFormat::Markdown),
            _ => None,
        }
    }
}

/// Estimates of one table row, in column order.
pub type RowEstimates = Vec<Result<Estimate, EstimateError>>;

/// Evaluate every cell of the table.
///
/// Returns one entry per configuration, in configuration order, each holding
/// one result per column in column order.
pub fn evaluate_cells(
    configs: &[ConfigurationSpec],
    columns: &[ComparisonColumn],
    results: &ResultSet,
    threshold: f64,
) -> Vec<RowEstimates> {
    let row = |spec: &ConfigurationSpec| -> RowEstimates {
        columns
            .iter()
            .map(|column| {
                let cell = results.cell(spec, column);
                let est = estimate(cell, threshold);
                tracing::debug!(
                    config = %spec.key(),
                    attack = %column.attack,
                    transformation = %column.transformation,
                    result = ?est,
                    "estimated cell"
                );
                est
            })
            .collect()
    };

    #[cfg(feature = "parallel")]
    let rows: Vec<RowEstimates> = configs.par_iter().map(row).collect();

    #[cfg(not(feature = "parallel"))]
    let rows: Vec<RowEstimates> = configs.iter().map(row).collect();

    rows
}

/// Text of one cell: the rounded duration, parenthesised and marked for a
/// lower bound, or the placeholder for an empty cell.
pub fn cell_label(estimate: &Result<Estimate, EstimateError>, format: TableFormat) -> String {
    match estimate {
        Err(EstimateError::NoData) => NO_DATA.to_string(),
        Ok(est) => {
            let text = format_duration(round_duration(est.expected_seconds()));
            if est.is_lower_bound() {
                format!("({}){}", text, format.lower_bound_marker())
            } else {
                text
            }
        }
    }
}

/// Render the runtime table as LaTeX.
pub fn render_table(
    configs: &[ConfigurationSpec],
    columns: &[ComparisonColumn],
    results: &ResultSet,
    threshold: f64,
) -> String {
    render_table_as(TableFormat::Latex, configs, columns, results, threshold)
}

/// Render the runtime table in the given format.
pub fn render_table_as(
    format: TableFormat,
    configs: &[ConfigurationSpec],
    columns: &[ComparisonColumn],
    results: &ResultSet,
    threshold: f64,
) -> String {
    let estimates = evaluate_cells(configs, columns, results, threshold);
    render_estimates(format, configs, columns, &estimates, threshold)
}

/// Render a table from cells already evaluated by [`evaluate_cells`].
pub fn render_estimates(
    format: TableFormat,
    configs: &[ConfigurationSpec],
    columns: &[ComparisonColumn],
    estimates: &[RowEstimates],
    threshold: f64,
) -> String {
    let rows: Vec<Vec<String>> = estimates
        .iter()
        .map(|row| row.iter().map(|est| cell_label(est, format)).collect())
        .collect();

    match format {
        TableFormat::Latex => latex_table(configs, columns, &rows),
        TableFormat::Markdown => markdown_table(configs, columns, &rows, threshold),
    }
}

fn latex_table(
    configs: &[ConfigurationSpec],
    columns: &[ComparisonColumn],
    rows: &[Vec<String>],
) -> String {
    let mut out = String::new();

    out.push_str(r"\begin{tabular}{rrr");
    out.push_str(&"c".repeat(columns.len()));
    out.push_str("}\n  \\toprule\n");

    // Header: attack names, then transformation names.
    out.push_str("  &&&");
    out.push_str(
        &columns
            .iter()
            .map(|c| format!("{} on", c.attack.display_name()))
            .collect::<Vec<_>>()
            .join("&\t\t"),
    );
    out.push_str("\\\\\n");
    out.push_str("  $n$ & $k$ & \\# CRPs &\t\t");
    out.push_str(
        &columns
            .iter()
            .map(|c| c.transformation.display_name())
            .collect::<Vec<_>>()
            .join("&\t\t"),
    );
    out.push_str("\\\\\n  \\midrule\n");

    for (spec, cells) in configs.iter().zip(rows) {
        let _ = write!(
            out,
            "  {}&{}&{}&\t\t",
            spec.n,
            spec.k,
            group_thousands(spec.challenges)
        );
        out.push_str(&cells.join("&\t\t"));
        out.push_str("\\\\\n");
    }

    out.push_str("  \\bottomrule\n");
    out.push_str(r"\end{tabular}");
    out
}

fn markdown_table(
    configs: &[ConfigurationSpec],
    columns: &[ComparisonColumn],
    rows: &[Vec<String>],
    threshold: f64,
) -> String {
    let mut out = String::new();

    out.push_str("| n | k | # CRPs |");
    for c in columns {
        let _ = write!(
            out,
            " {} on {} |",
            c.attack.display_name(),
            c.transformation.display_name()
        );
    }
    out.push_str("\n|--:|--:|--:|");
    for _ in columns {
        out.push_str(":--:|");
    }
    out.push('\n');

    for (spec, cells) in configs.iter().zip(rows) {
        let _ = write!(
            out,
            "| {} | {} | {} |",
            spec.n,
            spec.k,
            group_thousands(spec.challenges)
        );
        for cell in cells {
            let _ = write!(out, " {} |", cell);
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "\n{} lower bound: no attack reached accuracy above {} yet.",
        TableFormat::Markdown.lower_bound_marker(),
        threshold
    );
    out
}

/// Format a count with `,` thousands separators.
pub(crate) fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_columns, StudyConfig};
    use crate::types::{AttackKind, Transformation, TrialOutcome};

    fn outcome(
        spec: &ConfigurationSpec,
        attack: AttackKind,
        transformation: Transformation,
        accuracy: f64,
        measured_time: f64,
    ) -> TrialOutcome {
        TrialOutcome {
            n: spec.n,
            k: spec.k,
            challenges: spec.challenges,
            attack,
            transformation,
            accuracy,
            measured_time,
        }
    }

    fn sample_results(config: &StudyConfig) -> ResultSet {
        let first = &config.configurations[0];
        let lr = AttackKind::LogisticRegression;
        vec![
            outcome(first, lr, Transformation::Classic, 0.99, 100.0),
            outcome(first, lr, Transformation::Classic, 0.99, 120.0),
            outcome(first, lr, Transformation::Classic, 0.5, 50.0),
            outcome(first, lr, Transformation::LightweightSecure, 0.6, 10.0),
            outcome(first, lr, Transformation::LightweightSecure, 0.6, 20.0),
            outcome(first, lr, Transformation::LightweightSecure, 0.6, 30.0),
            outcome(first, lr, Transformation::LightweightSecure, 0.6, 40.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(300_000), "300,000");
        assert_eq!(group_thousands(2_000_000), "2,000,000");
    }

    #[test]
    fn test_cell_labels() {
        let exact = Ok(Estimate::Exact {
            trials: 3,
            successes: 2,
            expected_tries: 2,
            expected_seconds: 160.0,
        });
        let bound = Ok(Estimate::Bound {
            trials: 4,
            expected_seconds: 100.0,
        });
        assert_eq!(cell_label(&exact, TableFormat::Latex), "2m 40s");
        assert_eq!(cell_label(&bound, TableFormat::Latex), r"(1m 40s)${}^\ast$");
        assert_eq!(cell_label(&bound, TableFormat::Markdown), r"(1m 40s)\*");
        assert_eq!(cell_label(&Err(EstimateError::NoData), TableFormat::Latex), NO_DATA);
    }

    #[test]
    fn test_evaluate_cells_shape() {
        let config = StudyConfig::quick();
        let results = sample_results(&config);
        let rows = evaluate_cells(&config.configurations, &config.columns, &results, 0.98);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.len() == 4));
        assert_eq!(rows[0][0].as_ref().unwrap().expected_seconds(), 160.0);
        assert!(rows[0][1].as_ref().unwrap().is_lower_bound());
        assert_eq!(rows[0][2], Err(EstimateError::NoData));
        assert!(rows[1].iter().all(|c| *c == Err(EstimateError::NoData)));
    }

    #[test]
    fn test_latex_layout() {
        let config = StudyConfig::quick();
        let results = sample_results(&config);
        let table = render_table(&config.configurations, &config.columns, &results, 0.98);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], r"\begin{tabular}{rrrcccc}");
        assert_eq!(lines[1], r"  \toprule");
        assert_eq!(
            lines[2],
            "  &&&LR on&\t\tLR on&\t\tCorrelation Attack on&\t\tLR on\\\\"
        );
        assert_eq!(
            lines[3],
            "  $n$ & $k$ & \\# CRPs &\t\tClassic&\t\tLightweight Secure&\t\tLightweight Secure&\t\tPermutation-Based\\\\"
        );
        assert_eq!(lines[4], r"  \midrule");
        assert_eq!(
            lines[5],
            "  32&2&10,000&\t\t2m 40s&\t\t(1m 40s)${}^\\ast$&\t\tno data yet&\t\tno data yet\\\\"
        );
        assert!(lines[6].starts_with("  32&3&20,000&"));
        assert_eq!(lines[7], r"  \bottomrule");
        assert_eq!(lines[8], r"\end{tabular}");
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn test_markdown_layout() {
        let config = StudyConfig::quick();
        let results = sample_results(&config);
        let table = render_table_as(
            TableFormat::Markdown,
            &config.configurations,
            &default_columns(),
            &results,
            0.98,
        );

        assert!(table.starts_with("| n | k | # CRPs | LR on Classic |"));
        assert!(table.contains(
            "| 32 | 2 | 10,000 | 2m 40s | (1m 40s)\\* | no data yet | no data yet |"
        ));
        assert!(table.trim_end().ends_with("accuracy above 0.98 yet."));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(TableFormat::parse("LaTeX"), Some(TableFormat::Latex));
        assert_eq!(TableFormat::parse("md"), Some(TableFormat::Markdown));
        assert_eq!(TableFormat::parse("html"), None);
        assert_eq!(TableFormat::Markdown.extension(), "md");
    }
}
