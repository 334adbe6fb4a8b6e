use anyhow::Context;
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;
use std::process::ExitCode;

mod config;
mod error;
mod export;
mod metrics;
mod models;
mod output;
mod render;
mod session;

use crate::config::ReportConfig;
use crate::export::{export_report, StatusSink};
use crate::models::StructureId;
use crate::session::{JsonFileProvider, Session};

#[derive(Parser)]
#[command(name = "rt_plan_report")]
#[command(about = "Render a radiotherapy plan report (DVH chart and dose metrics) to PDF")]
struct Cli {
    /// Session data file (patient, plan, structures, DVHs, selection)
    #[arg(short, long)]
    input: PathBuf,

    /// Output PDF path
    #[arg(short, long)]
    output: PathBuf,

    /// Report configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Structure ids to include, replacing the selection in the input
    #[arg(short, long, num_args = 1.., value_delimiter = ',')]
    select: Option<Vec<StructureId>>,

    /// Also write the metrics table as CSV next to the PDF
    #[arg(long)]
    csv: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Prints the export outcome for the operator.
struct ConsoleStatus;

impl StatusSink for ConsoleStatus {
    fn success(&mut self, message: &str) {
        println!("{}", message);
    }

    fn failure(&mut self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Setup problems (bad arguments, unreadable config or session file) surface
/// as errors. Export failures have already been reported through the status
/// sink and only set the exit code.
fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let mut config = match &cli.config {
        Some(path) => {
            let config = ReportConfig::from_file(path)
                .with_context(|| format!("loading report configuration {:?}", path))?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => ReportConfig::default(),
    };
    if cli.csv {
        config.metrics_csv = true;
    }

    let mut provider = JsonFileProvider::from_file(&cli.input)
        .with_context(|| format!("reading session data {:?}", cli.input))?;
    let mut session = Session::new();
    session.sync(&mut provider)?;
    if let Some(doses) = session.doses() {
        info!(
            "Dose grid: max {} (scaling {})",
            doses.max_dose, doses.dose_grid_scaling
        );
    }

    if let Some(selection) = cli.select {
        session.set_selection(selection);
    }
    info!(
        "Session holds {} structures and {} DVHs, plan: {}",
        session.structures().map_or(0, |structures| structures.len()),
        session.dvhs().map_or(0, |dvhs| dvhs.len()),
        session.plan().map_or_else(|| "none".to_string(), |plan| plan.summary())
    );
    debug!("Patient {:?}, selection {:?}", session.patient(), session.selection());

    match export_report(&session, &cli.output, &config, &mut ConsoleStatus) {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(failure) => Ok(ExitCode::from(failure.exit_code())),
    }
}
