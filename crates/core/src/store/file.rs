//! File-backed patient store.
//!
//! Each patient is one JSON document:
//!
//! ```text
//! <patient_data_dir>/patients/
//!   <s1>/
//!     <s2>/
//!       <id>/
//!         patient.json
//! ```
//!
//! where `s1` and `s2` are the first four hex characters of the identifier.
//!
//! Writes go to `patient.json.tmp` and are renamed over `patient.json`, so a reader never
//! observes a half-written document. All mutations are serialised by one write mutex; reads
//! take no lock.

use super::{EntryLookup, PatientStore};
use crate::constants::{ID_ALLOCATION_ATTEMPTS, PATIENT_JSON_FILENAME, PATIENT_JSON_TMP_FILENAME};
use crate::error::{RecordError, RecordResult};
use crate::model::{
    ClinicalDataEntry, ClinicalDataFields, ClinicalDataPatch, NewPatient, Patient, PatientFields,
};
use crate::object_id::ObjectId;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::StorageDirCreation`] if the root directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> RecordResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(RecordError::StorageDirCreation)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn lock(&self) -> RecordResult<MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| RecordError::LockPoisoned)
    }

    fn document_path(&self, id: &ObjectId) -> PathBuf {
        id.sharded_dir(&self.root).join(PATIENT_JSON_FILENAME)
    }

    fn read_document(path: &Path) -> RecordResult<Option<Patient>> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RecordError::FileRead(e)),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(RecordError::Deserialization)
    }

    fn write_document(&self, patient: &Patient) -> RecordResult<()> {
        let dir = patient.id.sharded_dir(&self.root);
        fs::create_dir_all(&dir).map_err(RecordError::PatientDirCreation)?;

        let json = serde_json::to_string_pretty(patient).map_err(RecordError::Serialization)?;
        let tmp = dir.join(PATIENT_JSON_TMP_FILENAME);
        fs::write(&tmp, json).map_err(RecordError::FileWrite)?;
        fs::rename(&tmp, dir.join(PATIENT_JSON_FILENAME)).map_err(RecordError::FileWrite)
    }

    /// Allocates an identifier whose sharded directory does not exist yet and creates it.
    fn create_unique_dir(&self) -> RecordResult<ObjectId> {
        for _attempt in 0..ID_ALLOCATION_ATTEMPTS {
            let id = ObjectId::new();
            let candidate = id.sharded_dir(&self.root);

            if candidate.exists() {
                continue;
            }
            if let Some(parent) = candidate.parent() {
                fs::create_dir_all(parent).map_err(RecordError::PatientDirCreation)?;
            }
            match fs::create_dir(&candidate) {
                Ok(()) => return Ok(id),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(RecordError::PatientDirCreation(e)),
            }
        }
        Err(RecordError::IdAllocation(ID_ALLOCATION_ATTEMPTS))
    }

    /// Read-modify-write of one document under the write lock.
    ///
    /// The document is only rewritten when `f` returns `Some`.
    fn modify<T>(
        &self,
        id: &ObjectId,
        f: impl FnOnce(&mut Patient) -> RecordResult<Option<T>>,
    ) -> RecordResult<EntryLookup<T>> {
        let _guard = self.lock()?;
        let Some(mut patient) = Self::read_document(&self.document_path(id))? else {
            return Ok(EntryLookup::PatientMissing);
        };
        match f(&mut patient)? {
            Some(v) => {
                self.write_document(&patient)?;
                Ok(EntryLookup::Found(v))
            }
            None => Ok(EntryLookup::EntryMissing),
        }
    }

    /// Subdirectories of `path`. Plain files are ignored.
    fn read_dirs(path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(path)? {
            let path = entry?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        Ok(dirs)
    }

    /// Like [`Self::read_dirs`] for shard levels below the root: a failure is logged and
    /// the shard skipped.
    fn read_shard_dirs(path: &Path) -> Vec<PathBuf> {
        Self::read_dirs(path).unwrap_or_else(|e| {
            tracing::warn!("skipping unreadable shard {}: {}", path.display(), e);
            Vec::new()
        })
    }
}

impl PatientStore for FileStore {
    /// Walks the sharded tree and returns documents ordered by identifier.
    ///
    /// An unreadable store root is [`RecordError::FileRead`]. Unreadable shards and
    /// documents that cannot be parsed are logged and skipped.
    fn list_all(&self) -> RecordResult<Vec<Patient>> {
        let mut patients = Vec::new();

        let shards = Self::read_dirs(&self.root).map_err(RecordError::FileRead)?;
        for s1 in shards {
            for s2 in Self::read_shard_dirs(&s1) {
                for id_dir in Self::read_shard_dirs(&s2) {
                    let path = id_dir.join(PATIENT_JSON_FILENAME);
                    match Self::read_document(&path) {
                        Ok(Some(patient)) => patients.push(patient),
                        Ok(None) => {}
                        Err(e) => {
                            tracing::warn!(
                                "skipping unreadable patient document {}: {}",
                                path.display(),
                                e
                            );
                        }
                    }
                }
            }
        }

        patients.sort_by_key(|p| p.id);
        Ok(patients)
    }

    fn get_by_id(&self, id: &ObjectId) -> RecordResult<Option<Patient>> {
        Self::read_document(&self.document_path(id))
    }

    fn create(&self, new: NewPatient) -> RecordResult<Patient> {
        let _guard = self.lock()?;
        let id = self.create_unique_dir()?;

        let written = Patient::from_new(id, new).and_then(|patient| {
            self.write_document(&patient)?;
            Ok(patient)
        });
        if written.is_err() {
            let dir = id.sharded_dir(&self.root);
            if let Err(cleanup) = fs::remove_dir_all(&dir) {
                tracing::error!(
                    "failed to clean up {} after create failure: {}",
                    dir.display(),
                    cleanup
                );
            }
        }
        written
    }

    fn update(&self, id: &ObjectId, fields: PatientFields) -> RecordResult<Option<Patient>> {
        self.modify(id, |patient| {
            patient.apply_fields(fields);
            Ok(Some(patient.clone()))
        })
        .map(EntryLookup::found)
    }

    fn delete(&self, id: &ObjectId) -> RecordResult<Option<Patient>> {
        let _guard = self.lock()?;
        let Some(patient) = Self::read_document(&self.document_path(id))? else {
            return Ok(None);
        };
        match fs::remove_dir_all(id.sharded_dir(&self.root)) {
            Ok(()) => Ok(Some(patient)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RecordError::FileRemove(e)),
        }
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
    use crate::model::tests::patient_fields;
    use crate::store::contract;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileStore) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::open(temp_dir.path().join("patients")).expect("open should succeed");
        (temp_dir, store)
    }

    #[test]
    fn test_create_then_get() {
        let (_dir, store) = store();
        contract::create_then_get(&store);
    }

    #[test]
    fn test_list_all_in_insertion_order() {
        let (_dir, store) = store();
        contract::list_all_in_insertion_order(&store);
    }

    #[test]
    fn test_update_keeps_clinical_data() {
        let (_dir, store) = store();
        contract::update_keeps_clinical_data(&store);
    }

    #[test]
    fn test_delete_cascades() {
        let (_dir, store) = store();
        contract::delete_cascades(&store);
    }

    #[test]
    fn test_clinical_data_lifecycle() {
        let (_dir, store) = store();
        contract::clinical_data_lifecycle(&store);
    }

    #[test]
    fn test_concurrent_appends_all_land() {
        let (_dir, store) = store();
        contract::concurrent_appends_all_land(Arc::new(store));
    }

    #[test]
    fn test_create_writes_sharded_document() {
        let (_dir, store) = store();
        let patient = store
            .create(NewPatient {
                fields: patient_fields("Jane Doe", "Critical"),
                clinical_data: vec![],
            })
            .unwrap();

        let dir = patient.id.sharded_dir(store.root());
        assert!(dir.join(PATIENT_JSON_FILENAME).is_file());
        assert!(!dir.join(PATIENT_JSON_TMP_FILENAME).exists());

        let raw = fs::read_to_string(dir.join(PATIENT_JSON_FILENAME)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["id"], patient.id.to_string());
        assert_eq!(json["clinicalData"], serde_json::json!([]));
    }

    #[test]
    fn test_list_all_skips_invalid_documents() {
        let (_dir, store) = store();
        store
            .create(NewPatient {
                fields: patient_fields("Valid", "Stable"),
                clinical_data: vec![],
            })
            .unwrap();

        let bogus = ObjectId::new().sharded_dir(store.root());
        fs::create_dir_all(&bogus).unwrap();
        fs::write(bogus.join(PATIENT_JSON_FILENAME), "{ not json").unwrap();

        let patients = store.list_all().unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].name, *"Valid");
    }

    #[test]
    fn test_unreadable_root_is_a_read_error() {
        let (_dir, store) = store();
        store
            .create(NewPatient {
                fields: patient_fields("Jane Doe", "Critical"),
                clinical_data: vec![],
            })
            .unwrap();

        fs::remove_dir_all(store.root()).unwrap();
        fs::write(store.root(), "not a directory").unwrap();

        assert!(matches!(store.list_all(), Err(RecordError::FileRead(_))));
        assert!(matches!(store.list_critical(), Err(RecordError::FileRead(_))));
    }

    #[test]
    fn test_list_all_ignores_stray_files_between_shards() {
        let (_dir, store) = store();
        let created = store
            .create(NewPatient {
                fields: patient_fields("Jane Doe", "Critical"),
                clinical_data: vec![],
            })
            .unwrap();

        fs::write(store.root().join("README"), "notes").unwrap();
        let s1 = created.id.sharded_dir(store.root());
        let s1 = s1.parent().and_then(Path::parent).unwrap();
        fs::write(s1.join("stray.txt"), "notes").unwrap();

        assert_eq!(store.list_all().unwrap(), vec![created]);
    }

    #[test]
    fn test_reopen_sees_existing_documents() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("patients");
        let created = FileStore::open(&root)
            .unwrap()
            .create(NewPatient {
                fields: patient_fields("Jane Doe", "Critical"),
                clinical_data: vec![],
            })
            .unwrap();

        let reopened = FileStore::open(&root).unwrap();
        assert_eq!(reopened.get_by_id(&created.id).unwrap(), Some(created));
    }
}
