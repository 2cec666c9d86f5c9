//! Presentation of study results.
//!
//! - Duration: coarse rounding and human-readable durations
//! - Table: the runtime table in LaTeX or Markdown
//! - Report: table, JSON summaries and the plot hand-off as artifacts
//! - Plot: interface to the external distribution figure

mod duration;
mod plot;
mod report;
mod table;

pub use duration::{format_duration, round_duration, DAYS_DISPLAY_THRESHOLD};
pub use plot::{NoPlot, PanelDataExport, PlotPanel, ReportPlot};
pub use report::{CellSummary, ReportArtifacts, RuntimeReport};
pub use table::{
    cell_label, evaluate_cells, render_estimates, render_table, render_table_as, RowEstimates,
    TableFormat, NO_DATA,
};
