//! Uniform response envelope.
//!
//! Successful responses are `{ "status": "success", "data": ... }`; failures are
//! `{ "status": "error", "message": ... }`.

use crate::dto::{ClinicalDataRes, DeletedRes, PatientRes};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[aliases(
    PatientEnvelope = SuccessEnvelope<PatientRes>,
    PatientListEnvelope = SuccessEnvelope<Vec<PatientRes>>,
    ClinicalDataEnvelope = SuccessEnvelope<ClinicalDataRes>,
    ClinicalDataListEnvelope = SuccessEnvelope<Vec<ClinicalDataRes>>,
    DeletedEnvelope = SuccessEnvelope<DeletedRes>
)]
pub struct SuccessEnvelope<T> {
    pub status: Status,
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    pub status: Status,
    pub message: String,
}

impl<T> SuccessEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            status: Status::Success,
            data,
        }
    }
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
        }
    }
}
