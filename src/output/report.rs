//! Report generation for a runtime study.
//!
//! A [`RuntimeReport`] renders the runtime table for a study, writes it as a
//! single artifact named after the study, exports the per-cell estimates as
//! JSON and hands the raw results to the plot once.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::plot::{PlotPanel, ReportPlot};
use super::table::{cell_label, evaluate_cells, render_estimates, RowEstimates, TableFormat};
use crate::config::StudyConfig;
use crate::data::ResultSet;
use crate::error::{ConfigError, Result};
use crate::types::{AttackKind, Transformation};

/// Estimate of one table cell, for machine-readable export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellSummary {
    /// Challenge length.
    pub n: usize,
    /// Number of arbiter chains.
    pub k: usize,
    /// Number of CRPs.
    #[serde(rename = "N")]
    pub challenges: usize,
    /// Column attack.
    pub attack: AttackKind,
    /// Column transformation.
    pub transformation: Transformation,
    /// Trials in the cell.
    pub trials: usize,
    /// Successful trials.
    pub successes: usize,
    /// Observed success rate; `None` for an empty cell.
    pub success_rate: Option<f64>,
    /// Estimated seconds to first success; `None` for an empty cell.
    pub expected_seconds: Option<f64>,
    /// Whether the estimate is a lower bound.
    pub lower_bound: bool,
    /// Text shown in the table.
    pub label: String,
}

/// Artifacts written by [`RuntimeReport::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifacts {
    /// Rendered table.
    pub table: PathBuf,
    /// JSON cell summaries.
    pub summary: PathBuf,
    /// Text of the table file.
    pub rendered: String,
}

/// Runtime table report of one study.
#[derive(Debug, Clone)]
pub struct RuntimeReport<'a> {
    config: &'a StudyConfig,
    format: TableFormat,
}

impl<'a> RuntimeReport<'a> {
    /// Create a report for a validated study.
    pub fn new(config: &'a StudyConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            format: TableFormat::default(),
        })
    }

    /// Set the table format.
    pub fn format(mut self, format: TableFormat) -> Self {
        self.format = format;
        self
    }

    /// Render the table.
    pub fn table(&self, results: &ResultSet) -> String {
        self.render(&self.evaluate(results))
    }

    /// Per-cell estimates, row-major.
    pub fn summaries(&self, results: &ResultSet) -> Vec<CellSummary> {
        self.summarize(&self.evaluate(results))
    }

    fn evaluate(&self, results: &ResultSet) -> Vec<RowEstimates> {
        evaluate_cells(
            &self.config.configurations,
            &self.config.columns,
            results,
            self.config.success_threshold,
        )
    }

    fn render(&self, rows: &[RowEstimates]) -> String {
        render_estimates(
            self.format,
            &self.config.configurations,
            &self.config.columns,
            rows,
            self.config.success_threshold,
        )
    }

    fn summarize(&self, rows: &[RowEstimates]) -> Vec<CellSummary> {
        self.config
            .configurations
            .iter()
            .zip(rows)
            .flat_map(|(spec, row)| {
                self.config.columns.iter().zip(row).map(move |(column, est)| {
                    let label = cell_label(est, self.format);
                    let est = est.as_ref().ok();
                    CellSummary {
                        n: spec.n,
                        k: spec.k,
                        challenges: spec.challenges,
                        attack: column.attack,
                        transformation: column.transformation,
                        trials: est.map_or(0, |e| e.trials()),
                        successes: est.map_or(0, |e| e.successes()),
                        success_rate: est.map(|e| e.success_rate()),
                        expected_seconds: est.map(|e| e.expected_seconds()),
                        lower_bound: est.is_some_and(|e| e.is_lower_bound()),
                        label,
                    }
                })
            })
            .collect()
    }

    /// `<dir>/<study>.table.<ext>`.
    pub fn table_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!(
            "{}.table.{}",
            self.config.name,
            self.format.extension()
        ))
    }

    /// `<dir>/<study>.summary.json`.
    pub fn summary_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.summary.json", self.config.name))
    }

    /// Write the table and summary into `dir` and run the plot.
    ///
    /// Cells are evaluated once for both artifacts. The table is written in
    /// one call, so readers never observe a partial artifact.
    pub fn generate(
        &self,
        results: &ResultSet,
        dir: &Path,
        plot: &dyn ReportPlot,
    ) -> Result<ReportArtifacts> {
        self.warn_uncovered(results);
        let rows = self.evaluate(results);

        let table = self.table_path(dir);
        let rendered = self.render(&rows);
        fs::write(&table, &rendered)?;
        tracing::info!(path = %table.display(), "wrote runtime table");

        let summary = self.summary_path(dir);
        fs::write(
            &summary,
            serde_json::to_string_pretty(&self.summarize(&rows))?,
        )?;
        tracing::info!(path = %summary.display(), "wrote cell summaries");

        let panels: Vec<PlotPanel<'_>> = self
            .config
            .plot_panels()
            .into_iter()
            .map(|(config, layout)| PlotPanel { config, layout })
            .collect();
        tracing::debug!(plot = plot.name(), panels = panels.len(), "running plot");
        plot.plot(results, &panels)?;

        Ok(ReportArtifacts {
            table,
            summary,
            rendered,
        })
    }

    fn warn_uncovered(&self, results: &ResultSet) {
        let uncovered: Vec<String> = results
            .config_keys()
            .into_iter()
            .filter(|key| !self.config.configurations.iter().any(|s| s.key() == *key))
            .map(|key| key.to_string())
            .collect();
        if !uncovered.is_empty() {
            tracing::warn!(
                configurations = ?uncovered,
                "results contain configurations that no table row covers"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::plot::NoPlot;
    use crate::types::TrialOutcome;
    use std::cell::Cell;

    struct CountingPlot {
        calls: Cell<usize>,
        panels: Cell<usize>,
    }

    impl ReportPlot for CountingPlot {
        fn name(&self) -> &str {
            "counting"
        }

        fn plot(&self, results: &ResultSet, panels: &[PlotPanel<'_>]) -> Result<()> {
            assert_eq!(results.len(), 3);
            self.calls.set(self.calls.get() + 1);
            self.panels.set(panels.len());
            Ok(())
        }
    }

    fn results(config: &StudyConfig) -> ResultSet {
        let spec = &config.configurations[0];
        [(0.99, 100.0), (0.99, 120.0), (0.5, 50.0)]
            .into_iter()
            .map(|(accuracy, measured_time)| TrialOutcome {
                n: spec.n,
                k: spec.k,
                challenges: spec.challenges,
                attack: AttackKind::LogisticRegression,
                transformation: Transformation::Classic,
                accuracy,
                measured_time,
            })
            .collect()
    }

    #[test]
    fn test_summaries() {
        let config = StudyConfig::quick();
        let report = RuntimeReport::new(&config).unwrap();
        let summaries = report.summaries(&results(&config));

        assert_eq!(summaries.len(), 2 * 4);
        let first = &summaries[0];
        assert_eq!(first.trials, 3);
        assert_eq!(first.successes, 2);
        assert_eq!(first.expected_seconds, Some(160.0));
        assert!(!first.lower_bound);
        assert_eq!(first.label, "2m 40s");

        let empty = &summaries[1];
        assert_eq!(empty.trials, 0);
        assert_eq!(empty.success_rate, None);
        assert_eq!(empty.label, "no data yet");
    }

    #[test]
    fn test_generate_writes_artifacts_and_plots_once() {
        let config = StudyConfig::quick();
        let report = RuntimeReport::new(&config)
            .unwrap()
            .format(TableFormat::Markdown);
        let dir = tempfile::TempDir::new().unwrap();
        let plot = CountingPlot {
            calls: Cell::new(0),
            panels: Cell::new(0),
        };

        let artifacts = report.generate(&results(&config), dir.path(), &plot).unwrap();

        assert_eq!(plot.calls.get(), 1);
        assert_eq!(plot.panels.get(), 2);
        assert_eq!(
            artifacts.table,
            dir.path().join("attack_runtime_quick.table.md")
        );
        let table = fs::read_to_string(&artifacts.table).unwrap();
        assert_eq!(table, artifacts.rendered);
        assert_eq!(table, report.table(&results(&config)));
        assert!(table.contains("| 32 | 2 | 10,000 | 2m 40s |"));

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&artifacts.summary).unwrap()).unwrap();
        assert_eq!(summary.as_array().unwrap().len(), 8);
        assert_eq!(summary[0]["attack"], "lr");
        assert_eq!(summary[0]["transformation"], "transform_atf");
    }

    #[test]
    fn test_generate_with_empty_results() {
        let config = StudyConfig::quick();
        let report = RuntimeReport::new(&config).unwrap();
        let dir = tempfile::TempDir::new().unwrap();

        let artifacts = report
            .generate(&ResultSet::new(), dir.path(), &NoPlot)
            .unwrap();
        let table = fs::read_to_string(artifacts.table).unwrap();
        assert_eq!(table.matches("no data yet").count(), 2 * 4);
    }

    #[test]
    fn test_invalid_study_rejected() {
        let config = StudyConfig::quick().success_threshold(-0.1);
        assert!(RuntimeReport::new(&config).is_err());
    }
}
