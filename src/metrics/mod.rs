use crate::error::{MissingData, ReportResult};
use crate::models::{DvhMap, StructureId, StructureMap};
use serde::Serialize;

pub const COLUMN_HEADERS: [&str; 6] = [
    "Structure Name",
    "Volume",
    "Min Dose",
    "Max Dose",
    "Mean Dose",
    "D50",
];

/// Display row of the dose metrics table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub name: String,
    pub volume: String,
    pub min_dose: String,
    pub max_dose: String,
    pub mean_dose: String,
    pub d50: f64,
}

impl Row {
    pub fn cells(&self) -> [String; 6] {
        [
            self.name.clone(),
            self.volume.clone(),
            self.min_dose.clone(),
            self.max_dose.clone(),
            self.mean_dose.clone(),
            format!("{:?}", self.d50),
        ]
    }
}

/// One row per selected structure, in selection order.
pub fn build_rows(
    selection: &[StructureId],
    structures: &StructureMap,
    curves: &DvhMap,
) -> ReportResult<Vec<Row>> {
    selection
        .iter()
        .map(|id| -> ReportResult<Row> {
            let structure = structures.get(id).ok_or(MissingData::UnknownStructure(*id))?;
            let dvh = curves.get(id).ok_or(MissingData::MissingCurve(*id))?;
            Ok(Row {
                name: structure.name.clone(),
                volume: format!("{:.2}", dvh.volume),
                min_dose: format!("{:.2}", dvh.min_dose),
                max_dose: format!("{:.2}", dvh.max_dose),
                mean_dose: format!("{:.2}", dvh.mean_dose),
                d50: dvh.d50,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::session::fixtures::{curve, structure};

    fn maps() -> (StructureMap, DvhMap) {
        let structures = StructureMap::from([
            (1, structure(1, "PTV", [255, 0, 0])),
            (2, structure(2, "Rectum", [0, 128, 0])),
            (3, structure(3, "Bladder", [255, 255, 0])),
        ]);
        let curves = DvhMap::from([
            (1, curve(1, 8000, 123.4)),
            (2, curve(2, 5000, 61.0)),
            (3, curve(3, 4000, 0.123456)),
        ]);
        (structures, curves)
    }

    #[test]
    fn test_rows_follow_selection_order() {
        let (structures, curves) = maps();
        let rows = build_rows(&[3, 1], &structures, &curves).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Bladder");
        assert_eq!(rows[1].name, "PTV");
    }

    #[test]
    fn test_two_decimal_formatting() {
        let (structures, curves) = maps();
        let rows = build_rows(&[1, 3], &structures, &curves).unwrap();
        assert_eq!(rows[0].volume, "123.40");
        assert_eq!(rows[0].max_dose, "8000.00");
        assert_eq!(rows[0].mean_dose, "4000.00");
        assert_eq!(rows[0].min_dose, "0.00");
        assert_eq!(rows[1].volume, "0.12");
    }

    #[test]
    fn test_d50_kept_raw() {
        let (structures, mut curves) = maps();
        curves.get_mut(&2).unwrap().d50 = 2512.375;
        let rows = build_rows(&[2], &structures, &curves).unwrap();
        assert_eq!(rows[0].d50, 2512.375);
        assert_eq!(rows[0].cells()[5], "2512.375");
    }

    #[test]
    fn test_whole_d50_still_reads_as_float() {
        let (structures, curves) = maps();
        // PTV's D50 is exactly 4000
        let rows = build_rows(&[1], &structures, &curves).unwrap();
        assert_eq!(rows[0].cells()[5], "4000.0");
    }

    #[test]
    fn test_unresolved_id_fails() {
        let (structures, mut curves) = maps();
        assert!(matches!(
            build_rows(&[1, 4], &structures, &curves),
            Err(ReportError::MissingData(MissingData::UnknownStructure(4)))
        ));

        curves.remove(&2);
        assert!(matches!(
            build_rows(&[2], &structures, &curves),
            Err(ReportError::MissingData(MissingData::MissingCurve(2)))
        ));
    }
}
