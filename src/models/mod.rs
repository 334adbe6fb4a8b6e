use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// ROI number of a structure in the structure set.
pub type StructureId = u32;

/// Structures keyed by id. Iteration order is ascending id.
pub type StructureMap = BTreeMap<StructureId, Structure>;

/// DVH curves keyed by the id of the structure they were computed for.
pub type DvhMap = BTreeMap<StructureId, DvhCurve>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub name: Option<String>,
    pub id: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<String>, // YYYY-MM-DD
}

/// Person name components as delivered by the importer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientName {
    #[serde(alias = "given_name")]
    pub given: String,
    #[serde(alias = "middle_name")]
    pub middle: String,
    #[serde(alias = "family_name")]
    pub family: String,
}

impl PatientName {
    pub fn full_name(&self) -> String {
        [&self.given, &self.middle, &self.family]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Reformat an 8-digit `YYYYMMDD` birth date as `YYYY-MM-DD`.
///
/// Digit strings that are not a valid calendar date are still delimited;
/// anything else is kept as delivered.
pub fn format_birth_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y%m%d") {
        return date.format("%Y-%m-%d").to_string();
    }

    if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
        warn!("Birth date {} is not a calendar date, delimiting as-is", raw);
        return format!("{}-{}-{}", &raw[0..4], &raw[4..6], &raw[6..8]);
    }

    warn!("Birth date {:?} is not in YYYYMMDD form, keeping it verbatim", raw);
    raw.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(alias = "brachy")]
    pub is_brachytherapy: bool,
    pub label: String,
    #[serde(alias = "rxdose")]
    pub prescription_dose_cgy: i64,
    #[serde(alias = "name")]
    pub target_volume_name: String,
}

impl Plan {
    pub fn plan_type(&self) -> &'static str {
        if self.is_brachytherapy {
            "Brachytherapy"
        } else {
            "External Beam"
        }
    }

    /// One-line plan summary shown under the patient line.
    pub fn summary(&self) -> String {
        format!(
            "{} Plan \"{}\", total dose: {} cGy, PTV: \"{}\"",
            self.plan_type(),
            self.label,
            self.prescription_dose_cgy,
            self.target_volume_name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub id: StructureId,
    pub name: String,
    pub color: StructureColor,
}

/// Display color of a structure, 0-255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureColor(pub [u8; 3]);

/// Color with channels in `[0, 1]`, ready for drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbF {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl RgbF {
    pub const BLACK: RgbF = RgbF { r: 0.0, g: 0.0, b: 0.0 };
}

impl StructureColor {
    /// Normalized plot color. White is drawn as black so the curve stays
    /// visible on the page background.
    pub fn normalized(&self) -> RgbF {
        if self.0 == [255, 255, 255] {
            return RgbF::BLACK;
        }
        let [r, g, b] = self.0;
        RgbF {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DvhCurve {
    pub structure_id: StructureId,
    /// Percent of structure volume receiving at least the dose of each
    /// 1 cGy bin.
    #[serde(alias = "counts")]
    pub relative_volume: Vec<f64>,
    pub volume: f64, // cm³
    #[serde(alias = "min")]
    pub min_dose: f64,
    #[serde(alias = "max")]
    pub max_dose: f64,
    #[serde(alias = "mean")]
    pub mean_dose: f64,
    #[serde(alias = "D50")]
    pub d50: f64,
}

/// Summary of the dose grid the DVHs were computed from. Carried with the
/// session, not drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseSummary {
    pub max_dose: f64,
    pub dose_grid_scaling: f64,
    #[serde(default)]
    pub units: Option<String>,
}
