use super::PatientUpdate;
use crate::error::ReportResult;
use crate::models::StructureId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

/// Source of importer data and of the user's structure selection.
pub trait DataProvider {
    /// Next pending data update, if any.
    fn poll_update(&mut self) -> ReportResult<Option<PatientUpdate>>;

    /// Latest selection, if it changed since the last poll.
    fn poll_selection(&mut self) -> ReportResult<Option<Vec<StructureId>>>;
}

/// On-disk form of a session: the data updates in delivery order and the
/// structure selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionFile {
    pub updates: Vec<PatientUpdate>,
    pub selection: Option<Vec<StructureId>>,
}

/// Replays a [`SessionFile`] as if the importer had delivered it.
pub struct JsonFileProvider {
    updates: VecDeque<PatientUpdate>,
    selection: Option<Vec<StructureId>>,
}

impl JsonFileProvider {
    pub fn from_file<P: AsRef<Path>>(path: P) -> ReportResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: SessionFile = serde_json::from_str(&content)?;
        Ok(Self::new(file))
    }

    pub fn new(file: SessionFile) -> Self {
        Self {
            updates: file.updates.into(),
            selection: file.selection,
        }
    }
}

impl DataProvider for JsonFileProvider {
    fn poll_update(&mut self) -> ReportResult<Option<PatientUpdate>> {
        Ok(self.updates.pop_front())
    }

    fn poll_selection(&mut self) -> ReportResult<Option<Vec<StructureId>>> {
        Ok(self.selection.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use tempfile::TempDir;

    const SESSION_JSON: &str = r#"{
        "updates": [
            {
                "structures": {
                    "1": { "id": 1, "name": "PTV", "color": [255, 0, 0] },
                    "3": { "id": 3, "name": "Bladder", "color": [255, 255, 0] }
                },
                "dvhs": {
                    "1": { "structure_id": 1, "counts": [100.0, 100.0, 40.0, 0.0],
                           "volume": 80.5, "min": 1.0, "max": 3.0, "mean": 2.1, "D50": 2.0 },
                    "3": { "structure_id": 3, "counts": [100.0, 10.0],
                           "volume": 250.0, "min": 0.0, "max": 1.0, "mean": 0.4, "D50": 0.3 }
                }
            },
            {
                "name": { "given_name": "Jane", "middle_name": "", "family_name": "Doe" },
                "id": "RT-0042",
                "birth_date": "19800115"
            },
            { "gender": "F" }
        ],
        "selection": [3, 1]
    }"#;

    #[test]
    fn test_session_file_replay() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, SESSION_JSON).unwrap();

        let mut provider = JsonFileProvider::from_file(&path).unwrap();
        let mut session = Session::new();
        let applied = session.sync(&mut provider).unwrap();

        assert_eq!(applied, 3);
        assert_eq!(session.selection(), Some(&[3, 1][..]));
        assert_eq!(session.patient().name.as_deref(), Some("Jane Doe"));
        assert_eq!(session.patient().birth_date.as_deref(), Some("1980-01-15"));
        assert_eq!(session.patient().gender.as_deref(), Some("F"));
        assert!(session.plan().is_none());
        assert_eq!(session.dvhs().unwrap()[&1].relative_volume.len(), 4);
        assert!(session.report_inputs().is_ok());

        // Drained
        assert!(provider.poll_update().unwrap().is_none());
        assert!(provider.poll_selection().unwrap().is_none());
    }

    #[test]
    fn test_malformed_session_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{ "updates": [ { "dvhs": "not a map" } ] }"#).unwrap();

        assert!(matches!(
            JsonFileProvider::from_file(&path),
            Err(crate::error::ReportError::Json(_))
        ));
    }
}
