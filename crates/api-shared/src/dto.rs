//! Request and response payloads.
//!
//! Request payloads keep every field optional so that a missing field is reported as a
//! validation error by the core rather than as a deserialisation failure.

use chrono::SecondsFormat;
use sencare_core::{ClinicalDataEntry, ClinicalDataInput, Patient, PatientInput};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientRes {
    #[schema(example = "64b18a7f4c1d2b4d1c8c5123")]
    pub id: String,
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "Critical")]
    pub condition: String,
    #[schema(example = "555-0100")]
    pub contact: String,
    #[schema(example = 40)]
    pub age: u32,
    #[schema(example = "/assets/patient1.png")]
    pub photo: String,
    pub clinical_data: Vec<ClinicalDataRes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClinicalDataRes {
    pub id: String,
    /// RFC 3339 timestamp in UTC.
    #[schema(example = "2024-01-01T00:00:00Z")]
    pub date: String,
    #[serde(rename = "type")]
    #[schema(example = "BP")]
    pub kind: String,
    #[schema(example = "150/95")]
    pub value: String,
    #[schema(example = "Critical")]
    pub condition: String,
}

/// Confirmation returned by delete operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeletedRes {
    pub message: String,
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientReq {
    pub name: Option<String>,
    pub condition: Option<String>,
    pub contact: Option<String>,
    pub age: Option<i64>,
    pub photo: Option<String>,
    pub clinical_data: Option<Vec<ClinicalDataReq>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePatientReq {
    pub name: Option<String>,
    pub condition: Option<String>,
    pub contact: Option<String>,
    pub age: Option<i64>,
    pub photo: Option<String>,
}

/// Clinical-data payload. For patches, absent or empty fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ClinicalDataReq {
    #[schema(example = "2024-01-01")]
    pub date: Option<String>,
    #[serde(rename = "type")]
    #[schema(example = "BP")]
    pub kind: Option<String>,
    #[schema(example = "150/95")]
    pub value: Option<String>,
    #[schema(example = "Critical")]
    pub condition: Option<String>,
}

impl From<Patient> for PatientRes {
    fn from(p: Patient) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.into_string(),
            condition: p.condition.into_string(),
            contact: p.contact.into_string(),
            age: p.age.years(),
            photo: p.photo,
            clinical_data: p.clinical_data.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<ClinicalDataEntry> for ClinicalDataRes {
    fn from(e: ClinicalDataEntry) -> Self {
        Self {
            id: e.id.to_string(),
            date: e.date.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            kind: e.kind.into_string(),
            value: e.value.into_string(),
            condition: e.condition.into_string(),
        }
    }
}

impl From<ClinicalDataReq> for ClinicalDataInput {
    fn from(r: ClinicalDataReq) -> Self {
        Self {
            date: r.date,
            kind: r.kind,
            value: r.value,
            condition: r.condition,
        }
    }
}

impl From<CreatePatientReq> for PatientInput {
    fn from(r: CreatePatientReq) -> Self {
        Self {
            name: r.name,
            condition: r.condition,
            contact: r.contact,
            age: r.age,
            photo: r.photo,
            clinical_data: r
                .clinical_data
                .map(|entries| entries.into_iter().map(Into::into).collect()),
        }
    }
}

impl From<UpdatePatientReq> for PatientInput {
    fn from(r: UpdatePatientReq) -> Self {
        Self {
            name: r.name,
            condition: r.condition,
            contact: r.contact,
            age: r.age,
            photo: r.photo,
            clinical_data: None,
        }
    }
}
