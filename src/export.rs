use crate::config::ReportConfig;
use crate::error::{ReportError, ReportResult};
use crate::output::{compose, save_metrics_csv};
use crate::session::Session;
use log::{debug, error, info};
use std::backtrace::Backtrace;
use std::error::Error as _;
use std::path::{Path, PathBuf};

pub const SUCCESS_MESSAGE: &str = "Report created successfully.";

/// Receives the single outcome notice of an export, for display to the
/// operator.
pub trait StatusSink {
    fn success(&mut self, message: &str);
    fn failure(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSuccess {
    pub path: PathBuf,
    pub metrics_csv: Option<PathBuf>,
    pub structures: usize,
}

#[derive(Debug)]
pub struct ExportFailure {
    pub message: String,
    pub error: ReportError,
}

impl ExportFailure {
    /// Process exit status for this failure: 2 when the session data cannot
    /// make a report, 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self.error {
            ReportError::MissingData(_) | ReportError::InvalidInput(_) => 2,
            _ => 1,
        }
    }
}

/// Compose the report for `session` and write it to `destination`.
///
/// Exactly one notice goes to `sink`. Errors are logged with their source
/// chain and a backtrace and returned as an [`ExportFailure`]; none escape.
pub fn export_report(
    session: &Session,
    destination: &Path,
    config: &ReportConfig,
    sink: &mut dyn StatusSink,
) -> Result<ExportSuccess, ExportFailure> {
    info!("Exporting plan report to {:?}", destination);

    match run_export(session, destination, config) {
        Ok(success) => {
            info!("Report for {} structures exported", success.structures);
            sink.success(SUCCESS_MESSAGE);
            Ok(success)
        }
        Err(error) => {
            log_failure(&error);
            let message = format!("An error occurred while saving report: {}", error);
            sink.failure(&message);
            Err(ExportFailure { message, error })
        }
    }
}

fn run_export(
    session: &Session,
    destination: &Path,
    config: &ReportConfig,
) -> ReportResult<ExportSuccess> {
    let document = compose(session, config)?;
    debug!("Dose axis spans 0-{} cGy", document.dose_extent);
    document.write_pdf(destination)?;

    let metrics_csv = if config.metrics_csv {
        let csv_path = metrics_csv_path(destination);
        save_metrics_csv(&document.rows, &csv_path)?;
        Some(csv_path)
    } else {
        None
    };

    Ok(ExportSuccess {
        path: destination.to_path_buf(),
        metrics_csv,
        structures: document.rows.len(),
    })
}

/// CSV companion path for a report written to `destination`: the same path
/// with a `.csv` extension, or `<stem>.metrics.csv` when that would be the
/// report itself.
pub fn metrics_csv_path(destination: &Path) -> PathBuf {
    let csv_path = destination.with_extension("csv");
    if csv_path != destination {
        return csv_path;
    }
    let stem = destination
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    destination.with_file_name(format!("{}.metrics.csv", stem))
}

fn log_failure(error: &ReportError) {
    let mut chain = format!("{}", error);
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push_str(&format!("\n  caused by: {}", cause));
        source = cause.source();
    }
    error!("Report export failed: {}\n{}", chain, Backtrace::force_capture());
}
