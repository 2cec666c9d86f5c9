//! Hand-off to the distribution figure.
//!
//! The figure itself is drawn by an external plotting tool. A report only
//! passes the raw result set and the panel layout to a [`ReportPlot`], once
//! per report.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{ConfigurationSpec, PlotLayout};
use crate::data::ResultSet;
use crate::error::Result;
use crate::types::{AttackKind, ConfigKey};

/// One panel of the distribution figure.
#[derive(Debug, Clone, Copy)]
pub struct PlotPanel<'a> {
    /// Benchmark point shown in the panel.
    pub config: &'a ConfigurationSpec,
    /// Subplot position.
    pub layout: PlotLayout,
}

/// Receiver of the raw results for the distribution figure.
pub trait ReportPlot {
    /// Short name for log output.
    fn name(&self) -> &str;

    /// Produce the figure (or its input) from the full result set.
    fn plot(&self, results: &ResultSet, panels: &[PlotPanel<'_>]) -> Result<()>;
}

/// Plot that does nothing; for reports without a figure.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlot;

impl ReportPlot for NoPlot {
    fn name(&self) -> &str {
        "none"
    }

    fn plot(&self, _results: &ResultSet, _panels: &[PlotPanel<'_>]) -> Result<()> {
        Ok(())
    }
}

/// Writes the correlation-attack trials of every panel as JSON, the input
/// format of the external figure script.
#[derive(Debug, Clone)]
pub struct PanelDataExport {
    path: PathBuf,
}

#[derive(Debug, Serialize)]
struct PanelData<'a> {
    label: &'a str,
    layout: PlotLayout,
    #[serde(flatten)]
    config: ConfigKey,
    trials: Vec<PanelTrial>,
}

#[derive(Debug, Serialize)]
struct PanelTrial {
    accuracy: f64,
    measured_time: f64,
}

impl PanelDataExport {
    /// Export to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Destination file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportPlot for PanelDataExport {
    fn name(&self) -> &str {
        "panel-data"
    }

    fn plot(&self, results: &ResultSet, panels: &[PlotPanel<'_>]) -> Result<()> {
        let data: Vec<PanelData<'_>> = panels
            .iter()
            .map(|panel| PanelData {
                label: &panel.config.label,
                layout: panel.layout,
                config: panel.config.key(),
                trials: results
                    .iter()
                    .filter(|o| o.attack == AttackKind::Correlation && panel.config.matches(o))
                    .map(|o| PanelTrial {
                        accuracy: o.accuracy,
                        measured_time: o.measured_time,
                    })
                    .collect(),
            })
            .collect();

        fs::write(&self.path, serde_json::to_string_pretty(&data)?)?;
        tracing::info!(path = %self.path.display(), panels = data.len(), "wrote plot panel data");
        Ok(())
    }
}
