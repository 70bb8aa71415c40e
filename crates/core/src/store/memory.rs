//! In-memory patient store.

use super::{EntryLookup, PatientStore};
use crate::constants::ID_ALLOCATION_ATTEMPTS;
use crate::error::{RecordError, RecordResult};
use crate::model::{
    ClinicalDataEntry, ClinicalDataFields, ClinicalDataPatch, NewPatient, Patient, PatientFields,
};
use crate::object_id::ObjectId;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Keeps patients in insertion order behind a single `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    patients: RwLock<Vec<Patient>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RecordResult<RwLockReadGuard<'_, Vec<Patient>>> {
        self.patients.read().map_err(|_| RecordError::LockPoisoned)
    }

    fn write(&self) -> RecordResult<RwLockWriteGuard<'_, Vec<Patient>>> {
        self.patients.write().map_err(|_| RecordError::LockPoisoned)
    }

    /// Runs `f` against one patient while holding the write lock.
    ///
    /// `f` returning `None` means the addressed entry was not found.
    fn modify<T>(
        &self,
        id: &ObjectId,
        f: impl FnOnce(&mut Patient) -> RecordResult<Option<T>>,
    ) -> RecordResult<EntryLookup<T>> {
        let mut patients = self.write()?;
        let Some(patient) = patients.iter_mut().find(|p| p.id == *id) else {
            return Ok(EntryLookup::PatientMissing);
        };
        Ok(match f(patient)? {
            Some(v) => EntryLookup::Found(v),
            None => EntryLookup::EntryMissing,
        })
    }
}

impl PatientStore for MemoryStore {
    fn list_all(&self) -> RecordResult<Vec<Patient>> {
        Ok(self.read()?.clone())
    }

    fn get_by_id(&self, id: &ObjectId) -> RecordResult<Option<Patient>> {
        Ok(self.read()?.iter().find(|p| p.id == *id).cloned())
    }

    fn create(&self, new: NewPatient) -> RecordResult<Patient> {
        let mut patients = self.write()?;

        let mut id = None;
        for _attempt in 0..ID_ALLOCATION_ATTEMPTS {
            let candidate = ObjectId::new();
            if !patients.iter().any(|p| p.id == candidate) {
                id = Some(candidate);
                break;
            }
        }
        let id = id.ok_or(RecordError::IdAllocation(ID_ALLOCATION_ATTEMPTS))?;

        let patient = Patient::from_new(id, new)?;
        patients.push(patient.clone());
        Ok(patient)
    }

    fn update(&self, id: &ObjectId, fields: PatientFields) -> RecordResult<Option<Patient>> {
        self.modify(id, |patient| {
            patient.apply_fields(fields);
            Ok(Some(patient.clone()))
        })
        .map(EntryLookup::found)
    }

    fn delete(&self, id: &ObjectId) -> RecordResult<Option<Patient>> {
        let mut patients = self.write()?;
        Ok(patients
            .iter()
            .position(|p| p.id == *id)
            .map(|idx| patients.remove(idx)))
    }

    fn append_clinical_data(
        &self,
        patient_id: &ObjectId,
        fields: ClinicalDataFields,
    ) -> RecordResult<Option<ClinicalDataEntry>> {
        self.modify(patient_id, |patient| patient.push_clinical_data(fields).map(Some))
            .map(EntryLookup::found)
    }

    fn patch_clinical_data(
        &self,
        patient_id: &ObjectId,
        entry_id: &ObjectId,
        patch: &ClinicalDataPatch,
    ) -> RecordResult<EntryLookup<ClinicalDataEntry>> {
        self.modify(patient_id, |patient| {
            Ok(patient.patch_clinical_data(entry_id, patch))
        })
    }

    fn remove_clinical_data(
        &self,
        patient_id: &ObjectId,
        entry_id: &ObjectId,
    ) -> RecordResult<EntryLookup<ClinicalDataEntry>> {
        self.modify(patient_id, |patient| Ok(patient.pull_clinical_data(entry_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;
    use std::sync::Arc;

    #[test]
    fn test_create_then_get() {
        contract::create_then_get(&MemoryStore::new());
    }

    #[test]
    fn test_list_all_in_insertion_order() {
        contract::list_all_in_insertion_order(&MemoryStore::new());
    }

    #[test]
    fn test_update_keeps_clinical_data() {
        contract::update_keeps_clinical_data(&MemoryStore::new());
    }

    #[test]
    fn test_delete_cascades() {
        contract::delete_cascades(&MemoryStore::new());
    }

    #[test]
    fn test_clinical_data_lifecycle() {
        contract::clinical_data_lifecycle(&MemoryStore::new());
    }

    #[test]
    fn test_concurrent_appends_all_land() {
        contract::concurrent_appends_all_land(Arc::new(MemoryStore::new()));
    }
}
