use thiserror::Error;

use crate::models::StructureId;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    MissingData(#[from] MissingData),

    #[error("Invalid input data: {0}")]
    InvalidInput(String),

    #[error("Invalid report configuration: {0}")]
    InvalidConfig(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Chart error: {0}")]
    Chart(String),
}

/// Data required for a report that is not present in the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MissingData {
    #[error("No DVHs currently loaded")]
    NoDvhs,

    #[error("No structures currently loaded")]
    NoStructures,

    #[error("Some structures must be selected in order to generate a report")]
    NoSelection,

    #[error("Selected structure {0} is not in the loaded structure set")]
    UnknownStructure(StructureId),

    #[error("Selected structure {0} has no DVH")]
    MissingCurve(StructureId),

    #[error("DVH for structure {0} has no matching structure")]
    OrphanCurve(StructureId),
}

pub type ReportResult<T> = Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_missing_data_is_not_its_own_cause() {
        let error = ReportError::from(MissingData::NoDvhs);
        assert_eq!(error.to_string(), "No DVHs currently loaded");
        assert!(error.source().is_none());
    }

    #[test]
    fn test_io_error_keeps_cause() {
        let error = ReportError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(error.to_string(), "IO error: gone");
        assert!(error.source().is_some());
    }
}
