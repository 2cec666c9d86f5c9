//! CLI for attack runtime studies.
//!
//! # Usage
//!
//! ```bash
//! # Print the trial list of the published study as JSON lines
//! cargo run --bin attack-runtime -- matrix > trials.jsonl
//!
//! # Smoke-test study with 3 repetitions
//! cargo run --bin attack-runtime -- matrix --preset quick --repetitions 3
//!
//! # Render the runtime table from the runner's results
//! cargo run --bin attack-runtime -- report results.csv --output figures/
//!
//! # Markdown table, custom study definition
//! cargo run --bin attack-runtime -- report results.csv --study study.json --format md
//! ```

use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use attack_runtime::data::load_results_csv;
use attack_runtime::output::{NoPlot, PanelDataExport, RuntimeReport, TableFormat};
use attack_runtime::{ExperimentMatrix, StudyConfig};

/// Expected time to first success for randomized PUF attacks
#[derive(Parser, Debug)]
#[command(name = "attack-runtime")]
#[command(about = "Generate attack runtime experiment matrices and runtime tables")]
#[command(version)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every trial of the study as one JSON object per line
    Matrix {
        #[command(flatten)]
        study: StudyArgs,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render the runtime table from a results CSV
    Report {
        /// CSV export of the trial runner
        results: PathBuf,

        #[command(flatten)]
        study: StudyArgs,

        /// Output directory for the table, summary and plot data
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Table format: latex or markdown
        #[arg(short, long, default_value = "latex")]
        format: String,

        /// Skip writing the plot panel data
        #[arg(long)]
        no_plot: bool,
    },
}

#[derive(Args, Debug)]
struct StudyArgs {
    /// Preset study: attack-runtime or quick
    #[arg(short, long, default_value = "attack-runtime")]
    preset: String,

    /// Study definition as JSON (overrides --preset)
    #[arg(long)]
    study: Option<PathBuf>,

    /// Custom repetitions (overrides the study)
    #[arg(long)]
    repetitions: Option<usize>,

    /// Custom success threshold (overrides the study)
    #[arg(long)]
    threshold: Option<f64>,
}

impl StudyArgs {
    fn load(&self) -> attack_runtime::Result<StudyConfig> {
        let mut config = match &self.study {
            Some(path) => StudyConfig::from_json_file(path)?,
            None => StudyConfig::preset(&self.preset)?,
        };

        if let Some(repetitions) = self.repetitions {
            config = config.repetitions(repetitions);
        }
        if let Some(threshold) = self.threshold {
            config = config.success_threshold(threshold);
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(command: Command) -> attack_runtime::Result<()> {
    match command {
        Command::Matrix { study, output } => {
            let matrix = ExperimentMatrix::new(study.load()?)?;
            match output {
                Some(path) => {
                    matrix.write_json_lines(BufWriter::new(fs::File::create(&path)?))?;
                    tracing::info!(
                        path = %path.display(),
                        trials = matrix.len(),
                        "wrote experiment matrix"
                    );
                }
                None => matrix.write_json_lines(io::stdout().lock())?,
            }
            Ok(())
        }
        Command::Report {
            results,
            study,
            output,
            format,
            no_plot,
        } => {
            let config = study.load()?;
            let format = table_format(&format)?;
            report(&config, &results, &output, format, no_plot)
        }
    }
}

fn table_format(name: &str) -> attack_runtime::Result<TableFormat> {
    TableFormat::parse(name).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unknown table format '{}'. Available: latex, markdown", name),
        )
        .into()
    })
}

fn report(
    config: &StudyConfig,
    results_path: &Path,
    output: &Path,
    format: TableFormat,
    no_plot: bool,
) -> attack_runtime::Result<()> {
    let results = load_results_csv(results_path)?;
    tracing::info!(
        trials = results.len(),
        study = %config.name,
        "loaded results from {}",
        results_path.display()
    );

    fs::create_dir_all(output)?;
    let report = RuntimeReport::new(config)?.format(format);

    let artifacts = if no_plot {
        report.generate(&results, output, &NoPlot)?
    } else {
        let plot = PanelDataExport::new(output.join(format!("{}.panels.json", config.name)));
        report.generate(&results, output, &plot)?
    };

    println!("{}", artifacts.rendered);
    println!("\nWrote table to: {}", artifacts.table.display());
    println!("Wrote summary to: {}", artifacts.summary.display());
    Ok(())
}
