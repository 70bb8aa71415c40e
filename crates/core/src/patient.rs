//! Patient service.
//!
//! Sits between a transport (REST, CLI) and a [`PatientStore`]. It validates identifiers and
//! payloads before touching the store, and turns the store's absence signals into
//! [`RecordError::PatientNotFound`] / [`RecordError::ClinicalDataNotFound`].

use crate::config::CoreConfig;
use crate::error::{RecordError, RecordResult};
use crate::model::{ClinicalDataEntry, Patient};
use crate::store::{EntryLookup, PatientStore};
use crate::validation::{parse_record_id, ClinicalDataInput, PatientInput};
use std::sync::Arc;

/// Pure patient data operations - no API concerns
#[derive(Clone)]
pub struct PatientService {
    cfg: Arc<CoreConfig>,
    store: Arc<dyn PatientStore>,
}

impl PatientService {
    /// Creates a new instance of PatientService over `store`.
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<dyn PatientStore>) -> Self {
        Self { cfg, store }
    }

    pub fn list_patients(&self) -> RecordResult<Vec<Patient>> {
        self.store.list_all()
    }

    pub fn get_patient(&self, id: &str) -> RecordResult<Patient> {
        let id = parse_record_id(id)?;
        self.store
            .get_by_id(&id)?
            .ok_or(RecordError::PatientNotFound)
    }

    /// Creates a patient from a client payload.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Validation`] if a required field is missing; the store is not
    /// touched in that case.
    pub fn create_patient(&self, input: PatientInput) -> RecordResult<Patient> {
        let new = input.into_new_patient()?;
        let patient = self.store.create(new)?;
        tracing::debug!("created patient {}", patient.id);
        Ok(patient)
    }

    /// Replaces `name`, `condition`, `contact` and `age` of an existing patient.
    ///
    /// All four fields are required. A missing field is a validation error even when the
    /// patient does not exist.
    pub fn update_patient(&self, id: &str, input: PatientInput) -> RecordResult<Patient> {
        let id = parse_record_id(id)?;
        let fields = input.into_fields()?;
        self.store
            .update(&id, fields)?
            .ok_or(RecordError::PatientNotFound)
    }

    /// Deletes a patient and its clinical data, returning the removed record.
    pub fn delete_patient(&self, id: &str) -> RecordResult<Patient> {
        let id = parse_record_id(id)?;
        let removed = self
            .store
            .delete(&id)?
            .ok_or(RecordError::PatientNotFound)?;
        tracing::debug!(
            "deleted patient {} with {} clinical entries",
            removed.id,
            removed.clinical_data.len()
        );
        Ok(removed)
    }

    /// Patients whose condition is exactly `Critical`.
    ///
    /// An empty result is [`RecordError::NoCriticalPatients`] unless the configuration asks
    /// for an empty list instead.
    pub fn list_critical_patients(&self) -> RecordResult<Vec<Patient>> {
        let patients = self.store.list_critical()?;
        if patients.is_empty() && self.cfg.critical_empty_is_not_found() {
            return Err(RecordError::NoCriticalPatients);
        }
        Ok(patients)
    }

    pub fn clinical_data(&self, patient_id: &str) -> RecordResult<Vec<ClinicalDataEntry>> {
        let patient_id = parse_record_id(patient_id)?;
        self.store
            .clinical_data(&patient_id)?
            .ok_or(RecordError::PatientNotFound)
    }

    /// Appends an observation to the end of the patient's history and returns it.
    pub fn add_clinical_data(
        &self,
        patient_id: &str,
        input: ClinicalDataInput,
    ) -> RecordResult<ClinicalDataEntry> {
        let patient_id = parse_record_id(patient_id)?;
        let fields = input.into_fields()?;
        self.store
            .append_clinical_data(&patient_id, fields)?
            .ok_or(RecordError::PatientNotFound)
    }

    /// Patches the supplied, non-empty fields of one entry.
    pub fn update_clinical_data(
        &self,
        patient_id: &str,
        entry_id: &str,
        input: ClinicalDataInput,
    ) -> RecordResult<ClinicalDataEntry> {
        let patient_id = parse_record_id(patient_id)?;
        let entry_id = parse_record_id(entry_id)?;
        let patch = input.into_patch()?;
        lookup_result(
            self.store
                .patch_clinical_data(&patient_id, &entry_id, &patch)?,
        )
    }

    pub fn delete_clinical_data(
        &self,
        patient_id: &str,
        entry_id: &str,
    ) -> RecordResult<ClinicalDataEntry> {
        let patient_id = parse_record_id(patient_id)?;
        let entry_id = parse_record_id(entry_id)?;
        lookup_result(self.store.remove_clinical_data(&patient_id, &entry_id)?)
    }
}

fn lookup_result<T>(lookup: EntryLookup<T>) -> RecordResult<T> {
    match lookup {
        EntryLookup::Found(v) => Ok(v),
        EntryLookup::PatientMissing => Err(RecordError::PatientNotFound),
        EntryLookup::EntryMissing => Err(RecordError::ClinicalDataNotFound),
    }
}
