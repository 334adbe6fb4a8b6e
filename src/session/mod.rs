pub mod provider;

use crate::error::{MissingData, ReportError, ReportResult};
use crate::models::{
    format_birth_date, DoseSummary, DvhMap, Patient, PatientName, Plan, StructureId,
    StructureMap,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub use provider::*;

/// Partial update from the importer. Absent fields leave session state as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientUpdate {
    pub plan: Option<Plan>,
    pub dvhs: Option<DvhMap>,
    pub doses: Option<DoseSummary>,
    pub structures: Option<StructureMap>,
    pub name: Option<PatientName>,
    pub id: Option<String>,
    pub gender: Option<String>,
    /// `YYYYMMDD`
    pub birth_date: Option<String>,
}

/// Latest known planning data for one patient, plus the structure selection.
#[derive(Debug, Clone, Default)]
pub struct Session {
    patient: Patient,
    plan: Option<Plan>,
    dvhs: Option<DvhMap>,
    doses: Option<DoseSummary>,
    structures: Option<StructureMap>,
    selection: Option<Vec<StructureId>>,
}

/// Validated view of a session with everything a report needs.
#[derive(Debug, Clone, Copy)]
pub struct ReportInputs<'a> {
    pub patient: &'a Patient,
    pub plan: Option<&'a Plan>,
    pub structures: &'a StructureMap,
    pub curves: &'a DvhMap,
    pub selection: &'a [StructureId],
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_update(&mut self, update: PatientUpdate) {
        if let Some(plan) = update.plan {
            debug!("Plan updated: {}", plan.label);
            self.plan = Some(plan);
        }
        if let Some(dvhs) = update.dvhs {
            debug!("{} DVHs received", dvhs.len());
            self.dvhs = Some(dvhs);
        }
        if let Some(doses) = update.doses {
            self.doses = Some(doses);
        }
        if let Some(structures) = update.structures {
            debug!("{} structures received", structures.len());
            self.structures = Some(structures);
        }

        if let Some(name) = update.name {
            self.patient.name = Some(name.full_name());
        }
        if let Some(id) = update.id {
            self.patient.id = Some(id);
        }
        if let Some(gender) = update.gender {
            self.patient.gender = Some(gender);
        }
        if let Some(birth_date) = update.birth_date {
            self.patient.birth_date = Some(format_birth_date(&birth_date));
        }
    }

    /// Replace the selection. Repeated ids keep their first position.
    pub fn set_selection<I: IntoIterator<Item = StructureId>>(&mut self, ids: I) {
        let mut selection: Vec<StructureId> = Vec::new();
        for id in ids {
            if !selection.contains(&id) {
                selection.push(id);
            }
        }
        debug!("Selection set to {:?}", selection);
        self.selection = Some(selection);
    }

    /// Drain everything the provider has queued. Returns the number of data
    /// updates applied.
    pub fn sync(&mut self, provider: &mut dyn DataProvider) -> ReportResult<usize> {
        let mut applied = 0;
        while let Some(update) = provider.poll_update()? {
            self.apply_update(update);
            applied += 1;
        }
        if let Some(selection) = provider.poll_selection()? {
            self.set_selection(selection);
        }
        info!("Session synced ({} data updates)", applied);
        Ok(applied)
    }

    pub fn patient(&self) -> &Patient {
        &self.patient
    }

    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn dvhs(&self) -> Option<&DvhMap> {
        self.dvhs.as_ref()
    }

    pub fn doses(&self) -> Option<&DoseSummary> {
        self.doses.as_ref()
    }

    pub fn structures(&self) -> Option<&StructureMap> {
        self.structures.as_ref()
    }

    pub fn selection(&self) -> Option<&[StructureId]> {
        self.selection.as_deref()
    }

    /// Check that a report can be produced from the current state.
    pub fn report_inputs(&self) -> ReportResult<ReportInputs<'_>> {
        let curves = match &self.dvhs {
            Some(dvhs) if !dvhs.is_empty() => dvhs,
            _ => return Err(MissingData::NoDvhs.into()),
        };
        let structures = match &self.structures {
            Some(structures) if !structures.is_empty() => structures,
            _ => return Err(MissingData::NoStructures.into()),
        };
        let selection = match &self.selection {
            Some(selection) if !selection.is_empty() => selection.as_slice(),
            _ => return Err(MissingData::NoSelection.into()),
        };

        for &id in selection {
            if !structures.contains_key(&id) {
                return Err(MissingData::UnknownStructure(id).into());
            }
            let curve = curves.get(&id).ok_or(MissingData::MissingCurve(id))?;
            if !structures.contains_key(&curve.structure_id) {
                return Err(MissingData::OrphanCurve(curve.structure_id).into());
            }
            if curve.structure_id != id {
                return Err(ReportError::InvalidInput(format!(
                    "DVH stored under structure {} belongs to structure {}",
                    id, curve.structure_id
                )));
            }
        }

        Ok(ReportInputs {
            patient: &self.patient,
            plan: self.plan.as_ref(),
            structures,
            curves,
            selection,
        })
    }
}
