//! Patient document stores.
//!
//! [`PatientStore`] is the seam between the service layer and persistence. Two
//! implementations are provided:
//!
//! - [`MemoryStore`]: a process-local store, used by tests and `SENCARE_STORE=memory`.
//! - [`FileStore`]: one JSON document per patient under a sharded directory tree.
//!
//! Every mutating operation is applied to a single document as one step under the
//! store's write lock. Clinical-data mutations are addressed by entry identifier inside the
//! store, so overlapping appends, patches and removals on the same patient never overwrite
//! one another.
//!
//! Absence is not an error here: lookups return `Option` or [`EntryLookup`], and the
//! service decides how to surface them.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::config::{CoreConfig, StoreBackend};
use crate::error::RecordResult;
use crate::model::{
    ClinicalDataEntry, ClinicalDataFields, ClinicalDataPatch, NewPatient, Patient, PatientFields,
};
use crate::object_id::ObjectId;
use std::sync::Arc;

/// Outcome of an operation addressed by patient id and entry id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryLookup<T> {
    PatientMissing,
    EntryMissing,
    Found(T),
}

impl<T> EntryLookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            EntryLookup::Found(v) => Some(v),
            _ => None,
        }
    }
}

pub trait PatientStore: Send + Sync {
    /// All patients in store order.
    fn list_all(&self) -> RecordResult<Vec<Patient>>;

    fn get_by_id(&self, id: &ObjectId) -> RecordResult<Option<Patient>>;

    /// Assigns a fresh identifier, persists, and returns the new patient.
    fn create(&self, new: NewPatient) -> RecordResult<Patient>;

    /// Overwrites the required fields of an existing patient.
    fn update(&self, id: &ObjectId, fields: PatientFields) -> RecordResult<Option<Patient>>;

    /// Removes the patient together with its clinical data.
    fn delete(&self, id: &ObjectId) -> RecordResult<Option<Patient>>;

    /// Patients whose condition is exactly `Critical`, in store order.
    fn list_critical(&self) -> RecordResult<Vec<Patient>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(Patient::is_critical)
            .collect())
    }

    fn append_clinical_data(
        &self,
        patient_id: &ObjectId,
        fields: ClinicalDataFields,
    ) -> RecordResult<Option<ClinicalDataEntry>>;

    fn clinical_data(&self, patient_id: &ObjectId) -> RecordResult<Option<Vec<ClinicalDataEntry>>> {
        Ok(self.get_by_id(patient_id)?.map(|p| p.clinical_data))
    }

    fn patch_clinical_data(
        &self,
        patient_id: &ObjectId,
        entry_id: &ObjectId,
        patch: &ClinicalDataPatch,
    ) -> RecordResult<EntryLookup<ClinicalDataEntry>>;

    fn remove_clinical_data(
        &self,
        patient_id: &ObjectId,
        entry_id: &ObjectId,
    ) -> RecordResult<EntryLookup<ClinicalDataEntry>>;
}

/// Opens the store selected by `cfg`.
pub fn open_store(cfg: &CoreConfig) -> RecordResult<Arc<dyn PatientStore>> {
    match cfg.store_backend() {
        StoreBackend::Memory => {
            tracing::info!("using in-memory patient store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::File => {
            let store = FileStore::open(cfg.patients_dir())?;
            tracing::info!("using file patient store at {}", store.root().display());
            Ok(Arc::new(store))
        }
    }
}
