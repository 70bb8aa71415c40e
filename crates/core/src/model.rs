//! Patient documents and their embedded clinical-data history.
//!
//! A [`Patient`] is one document. Its `clinicalData` list is owned by the document and is
//! only ever mutated through the methods below, which keep entry identifiers unique within
//! the list and preserve insertion order.

use crate::constants::{CRITICAL_CONDITION, DEFAULT_PHOTO, ID_ALLOCATION_ATTEMPTS};
use crate::error::{RecordError, RecordResult};
use crate::object_id::ObjectId;
use chrono::{DateTime, Utc};
use sencare_types::{Age, NonEmptyText};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: ObjectId,
    pub name: NonEmptyText,
    pub condition: NonEmptyText,
    pub contact: NonEmptyText,
    pub age: Age,
    pub photo: String,
    #[serde(default)]
    pub clinical_data: Vec<ClinicalDataEntry>,
}

/// One timestamped observation owned by a [`Patient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalDataEntry {
    pub id: ObjectId,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: NonEmptyText,
    pub value: NonEmptyText,
    pub condition: NonEmptyText,
}

/// Validated fields for creating or fully updating a patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientFields {
    pub name: NonEmptyText,
    pub condition: NonEmptyText,
    pub contact: NonEmptyText,
    pub age: Age,
    pub photo: Option<NonEmptyText>,
}

/// Validated payload for creating a patient, optionally with initial clinical data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub fields: PatientFields,
    pub clinical_data: Vec<ClinicalDataFields>,
}

/// Validated fields for a new clinical-data entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalDataFields {
    pub date: DateTime<Utc>,
    pub kind: NonEmptyText,
    pub value: NonEmptyText,
    pub condition: NonEmptyText,
}

/// A partial update to a clinical-data entry. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClinicalDataPatch {
    pub date: Option<DateTime<Utc>>,
    pub kind: Option<NonEmptyText>,
    pub value: Option<NonEmptyText>,
    pub condition: Option<NonEmptyText>,
}

impl ClinicalDataPatch {
    fn apply(&self, entry: &mut ClinicalDataEntry) {
        if let Some(date) = self.date {
            entry.date = date;
        }
        if let Some(kind) = &self.kind {
            entry.kind = kind.clone();
        }
        if let Some(value) = &self.value {
            entry.value = value.clone();
        }
        if let Some(condition) = &self.condition {
            entry.condition = condition.clone();
        }
    }
}

impl Patient {
    /// Builds a new patient document with the given identifier.
    ///
    /// Initial clinical-data entries receive fresh identifiers, unique within the list.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::IdAllocation`] if an entry identifier cannot be allocated.
    pub fn from_new(id: ObjectId, new: NewPatient) -> RecordResult<Self> {
        let NewPatient {
            fields,
            clinical_data,
        } = new;

        let mut patient = Patient {
            id,
            name: fields.name,
            condition: fields.condition,
            contact: fields.contact,
            age: fields.age,
            photo: fields
                .photo
                .map(NonEmptyText::into_string)
                .unwrap_or_else(|| DEFAULT_PHOTO.to_string()),
            clinical_data: Vec::with_capacity(clinical_data.len()),
        };
        for entry in clinical_data {
            patient.push_clinical_data(entry)?;
        }
        Ok(patient)
    }

    pub fn is_critical(&self) -> bool {
        self.condition == *CRITICAL_CONDITION
    }

    /// Overwrites the required fields. The photo changes only when one is supplied.
    pub fn apply_fields(&mut self, fields: PatientFields) {
        self.name = fields.name;
        self.condition = fields.condition;
        self.contact = fields.contact;
        self.age = fields.age;
        if let Some(photo) = fields.photo {
            self.photo = photo.into_string();
        }
    }

    pub fn clinical_entry(&self, entry_id: &ObjectId) -> Option<&ClinicalDataEntry> {
        self.clinical_data.iter().find(|e| e.id == *entry_id)
    }

    /// Appends a new entry at the end of the history and returns it.
    pub fn push_clinical_data(
        &mut self,
        fields: ClinicalDataFields,
    ) -> RecordResult<ClinicalDataEntry> {
        let id = self.allocate_entry_id(ObjectId::new)?;
        let entry = ClinicalDataEntry {
            id,
            date: fields.date,
            kind: fields.kind,
            value: fields.value,
            condition: fields.condition,
        };
        self.clinical_data.push(entry.clone());
        Ok(entry)
    }

    /// Applies `patch` to the entry with `entry_id`, returning the updated entry.
    pub fn patch_clinical_data(
        &mut self,
        entry_id: &ObjectId,
        patch: &ClinicalDataPatch,
    ) -> Option<ClinicalDataEntry> {
        let entry = self.clinical_data.iter_mut().find(|e| e.id == *entry_id)?;
        patch.apply(entry);
        Some(entry.clone())
    }

    /// Removes the entry with `entry_id`, returning it. Order of the rest is preserved.
    pub fn pull_clinical_data(&mut self, entry_id: &ObjectId) -> Option<ClinicalDataEntry> {
        let idx = self.clinical_data.iter().position(|e| e.id == *entry_id)?;
        Some(self.clinical_data.remove(idx))
    }

    fn allocate_entry_id(
        &self,
        mut id_source: impl FnMut() -> ObjectId,
    ) -> RecordResult<ObjectId> {
        for _attempt in 0..ID_ALLOCATION_ATTEMPTS {
            let id = id_source();
            if self.clinical_entry(&id).is_none() {
                return Ok(id);
            }
        }
        Err(RecordError::IdAllocation(ID_ALLOCATION_ATTEMPTS))
    }
}
