//! REST handlers. Each one maps 1:1 onto a [`sencare_core::PatientService`] operation.

use crate::error::{json_body, ApiResult};
use crate::AppState;
use api_shared::envelope::{
    ClinicalDataEnvelope, ClinicalDataListEnvelope, DeletedEnvelope, PatientEnvelope,
    PatientListEnvelope,
};
use api_shared::{
    ClinicalDataReq, ClinicalDataRes, CreatePatientReq, DeletedRes, ErrorEnvelope, HealthRes,
    HealthService, PatientRes, SuccessEnvelope, UpdatePatientReq,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};

type Envelope<T> = Json<SuccessEnvelope<T>>;

fn ok<T>(data: T) -> Envelope<T> {
    Json(SuccessEnvelope::new(data))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "All patients", body = PatientListEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    )
)]
/// List all patients in store order.
pub async fn list_patients(State(state): State<AppState>) -> ApiResult<Envelope<Vec<PatientRes>>> {
    let patients = state.patient_service.list_patients()?;
    Ok(ok(patients.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/patients/critical",
    responses(
        (status = 200, description = "Patients whose condition is Critical", body = PatientListEnvelope),
        (status = 404, description = "No critical patients", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    )
)]
/// List patients whose condition is exactly `Critical`.
pub async fn list_critical_patients(
    State(state): State<AppState>,
) -> ApiResult<Envelope<Vec<PatientRes>>> {
    let patients = state.patient_service.list_critical_patients()?;
    Ok(ok(patients.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient identifier (24 hex characters)")),
    responses(
        (status = 200, description = "Patient", body = PatientEnvelope),
        (status = 400, description = "Invalid ID format", body = ErrorEnvelope),
        (status = 404, description = "Patient not found", body = ErrorEnvelope)
    )
)]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<PatientRes>> {
    let patient = state.patient_service.get_patient(&id)?;
    Ok(ok(patient.into()))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = CreatePatientReq,
    responses(
        (status = 201, description = "Patient created", body = PatientEnvelope),
        (status = 400, description = "Missing or invalid fields", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    )
)]
/// Create a new patient.
///
/// `name`, `condition`, `contact` and `age` are required. `photo` defaults to a placeholder
/// and `clinicalData` to an empty history.
pub async fn create_patient(
    State(state): State<AppState>,
    payload: Result<Json<CreatePatientReq>, JsonRejection>,
) -> ApiResult<(StatusCode, Envelope<PatientRes>)> {
    let req = json_body(payload)?;
    let patient = state.patient_service.create_patient(req.into())?;
    tracing::info!("created patient {}", patient.id);
    Ok((StatusCode::CREATED, ok(patient.into())))
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient identifier (24 hex characters)")),
    request_body = UpdatePatientReq,
    responses(
        (status = 200, description = "Patient updated", body = PatientEnvelope),
        (status = 400, description = "Invalid ID format or missing fields", body = ErrorEnvelope),
        (status = 404, description = "Patient not found", body = ErrorEnvelope)
    )
)]
/// Replace `name`, `condition`, `contact` and `age` of a patient. All four are required.
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePatientReq>, JsonRejection>,
) -> ApiResult<Envelope<PatientRes>> {
    let req = json_body(payload)?;
    let patient = state.patient_service.update_patient(&id, req.into())?;
    Ok(ok(patient.into()))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient identifier (24 hex characters)")),
    responses(
        (status = 200, description = "Patient and its clinical data deleted", body = DeletedEnvelope),
        (status = 400, description = "Invalid ID format", body = ErrorEnvelope),
        (status = 404, description = "Patient not found", body = ErrorEnvelope)
    )
)]
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<DeletedRes>> {
    let removed = state.patient_service.delete_patient(&id)?;
    tracing::info!("deleted patient {}", removed.id);
    Ok(ok(DeletedRes {
        message: "Patient deleted successfully".into(),
        id: removed.id.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/clinical-data",
    params(("id" = String, Path, description = "Patient identifier (24 hex characters)")),
    responses(
        (status = 200, description = "Clinical-data history, oldest first", body = ClinicalDataListEnvelope),
        (status = 400, description = "Invalid ID format", body = ErrorEnvelope),
        (status = 404, description = "Patient not found", body = ErrorEnvelope)
    )
)]
pub async fn get_clinical_data(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Vec<ClinicalDataRes>>> {
    let entries = state.patient_service.clinical_data(&id)?;
    Ok(ok(entries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/clinical-data",
    params(("id" = String, Path, description = "Patient identifier (24 hex characters)")),
    request_body = ClinicalDataReq,
    responses(
        (status = 200, description = "Entry appended", body = ClinicalDataEnvelope),
        (status = 400, description = "Invalid ID format or missing fields", body = ErrorEnvelope),
        (status = 404, description = "Patient not found", body = ErrorEnvelope)
    )
)]
/// Append an observation. `date`, `type`, `value` and `condition` are required.
pub async fn add_clinical_data(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ClinicalDataReq>, JsonRejection>,
) -> ApiResult<Envelope<ClinicalDataRes>> {
    let req = json_body(payload)?;
    let entry = state.patient_service.add_clinical_data(&id, req.into())?;
    Ok(ok(entry.into()))
}

#[utoipa::path(
    patch,
    path = "/patients/{id}/clinical-data/{entry_id}",
    params(
        ("id" = String, Path, description = "Patient identifier (24 hex characters)"),
        ("entry_id" = String, Path, description = "Clinical-data entry identifier (24 hex characters)")
    ),
    request_body = ClinicalDataReq,
    responses(
        (status = 200, description = "Entry updated", body = ClinicalDataEnvelope),
        (status = 400, description = "Invalid ID format or date", body = ErrorEnvelope),
        (status = 404, description = "Patient or clinical data not found", body = ErrorEnvelope)
    )
)]
/// Update the supplied fields of one entry. Also served for `PUT`.
///
/// Absent and empty fields keep their current value.
pub async fn update_clinical_data(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(String, String)>,
    payload: Result<Json<ClinicalDataReq>, JsonRejection>,
) -> ApiResult<Envelope<ClinicalDataRes>> {
    let req = json_body(payload)?;
    let entry = state
        .patient_service
        .update_clinical_data(&id, &entry_id, req.into())?;
    Ok(ok(entry.into()))
}

#[utoipa::path(
    delete,
    path = "/patients/{id}/clinical-data/{entry_id}",
    params(
        ("id" = String, Path, description = "Patient identifier (24 hex characters)"),
        ("entry_id" = String, Path, description = "Clinical-data entry identifier (24 hex characters)")
    ),
    responses(
        (status = 200, description = "Entry deleted", body = DeletedEnvelope),
        (status = 400, description = "Invalid ID format", body = ErrorEnvelope),
        (status = 404, description = "Patient or clinical data not found", body = ErrorEnvelope)
    )
)]
pub async fn delete_clinical_data(
    State(state): State<AppState>,
    Path((id, entry_id)): Path<(String, String)>,
) -> ApiResult<Envelope<DeletedRes>> {
    let removed = state.patient_service.delete_clinical_data(&id, &entry_id)?;
    Ok(ok(DeletedRes {
        message: "Clinical data deleted successfully".into(),
        id: removed.id.to_string(),
    }))
}
