//! Input validation utilities.
//!
//! Raw payloads arrive with every field optional. The functions here turn them into the
//! validated types of [`crate::model`] or fail with [`RecordError::Validation`] before any
//! store is touched.

use crate::constants::{
    NON_POSITIVE_AGE_MSG, REQUIRED_CLINICAL_FIELDS_MSG, REQUIRED_PATIENT_FIELDS_MSG,
};
use crate::error::{RecordError, RecordResult};
use crate::model::{ClinicalDataFields, ClinicalDataPatch, NewPatient, PatientFields};
use crate::object_id::ObjectId;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sencare_types::{Age, NonEmptyText};
use serde::Deserialize;

/// Patient payload as received from a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInput {
    pub name: Option<String>,
    pub condition: Option<String>,
    pub contact: Option<String>,
    pub age: Option<i64>,
    pub photo: Option<String>,
    pub clinical_data: Option<Vec<ClinicalDataInput>>,
}

/// Clinical-data payload as received from a client, used for both appends and patches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClinicalDataInput {
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub value: Option<String>,
    pub condition: Option<String>,
}

/// Validates an identifier taken from a request path, exactly as supplied.
pub fn parse_record_id(input: &str) -> RecordResult<ObjectId> {
    ObjectId::parse(input)
}

/// Parses an observation timestamp.
///
/// Accepts RFC 3339 (`2024-01-01T10:00:00Z`, any offset) or a calendar date
/// (`2024-01-01`, read as midnight UTC).
pub fn parse_observation_date(input: &str) -> RecordResult<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| RecordError::Validation(format!("Invalid date: '{}'", input)))
}

impl PatientInput {
    /// Validates the fields required for a full patient update.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Validation`] if `name`, `condition`, `contact` or `age` is
    /// missing or blank, or if `age` is not a positive integer.
    pub fn into_fields(self) -> RecordResult<PatientFields> {
        let required = |v: Option<String>| {
            NonEmptyText::from_optional(v)
                .ok_or_else(|| RecordError::Validation(REQUIRED_PATIENT_FIELDS_MSG.into()))
        };

        let name = required(self.name)?;
        let condition = required(self.condition)?;
        let contact = required(self.contact)?;
        let age = self
            .age
            .ok_or_else(|| RecordError::Validation(REQUIRED_PATIENT_FIELDS_MSG.into()))?;
        let age = Age::new(age).map_err(|_| RecordError::Validation(NON_POSITIVE_AGE_MSG.into()))?;

        Ok(PatientFields {
            name,
            condition,
            contact,
            age,
            photo: NonEmptyText::from_optional(self.photo),
        })
    }

    /// Validates a creation payload, including any initial clinical data.
    pub fn into_new_patient(mut self) -> RecordResult<NewPatient> {
        let clinical_data = self
            .clinical_data
            .take()
            .unwrap_or_default()
            .into_iter()
            .map(ClinicalDataInput::into_fields)
            .collect::<RecordResult<Vec<_>>>();

        // Missing patient fields are reported ahead of problems in nested entries.
        let fields = self.into_fields()?;
        Ok(NewPatient {
            fields,
            clinical_data: clinical_data?,
        })
    }
}

impl ClinicalDataInput {
    /// Validates a new entry: all four fields must be present and non-empty.
    pub fn into_fields(self) -> RecordResult<ClinicalDataFields> {
        let required = |v: Option<String>| {
            NonEmptyText::from_optional(v)
                .ok_or_else(|| RecordError::Validation(REQUIRED_CLINICAL_FIELDS_MSG.into()))
        };

        let date = required(self.date)?;
        let kind = required(self.kind)?;
        let value = required(self.value)?;
        let condition = required(self.condition)?;

        Ok(ClinicalDataFields {
            date: parse_observation_date(date.as_str())?,
            kind,
            value,
            condition,
        })
    }

    /// Builds a patch: absent and blank fields are both "not provided".
    pub fn into_patch(self) -> RecordResult<ClinicalDataPatch> {
        let date = NonEmptyText::from_optional(self.date)
            .map(|d| parse_observation_date(d.as_str()))
            .transpose()?;

        Ok(ClinicalDataPatch {
            date,
            kind: NonEmptyText::from_optional(self.kind),
            value: NonEmptyText::from_optional(self.value),
            condition: NonEmptyText::from_optional(self.condition),
        })
    }
}
