//! # API REST
//!
//! REST API implementation for SenCare.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON envelopes, status codes, CORS, request tracing)
//!
//! Uses `api-shared` for wire types and `sencare-core` for everything else.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;

use api_shared::envelope::{
    ClinicalDataEnvelope, ClinicalDataListEnvelope, DeletedEnvelope, PatientEnvelope,
    PatientListEnvelope,
};
use api_shared::{
    ClinicalDataReq, ClinicalDataRes, CreatePatientReq, DeletedRes, ErrorEnvelope, HealthRes,
    PatientRes, Status, UpdatePatientReq,
};
use axum::{routing::get, Router};
use sencare_core::PatientService;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub patient_service: PatientService,
}

impl AppState {
    pub fn new(patient_service: PatientService) -> Self {
        Self { patient_service }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_patients,
        handlers::list_critical_patients,
        handlers::get_patient,
        handlers::create_patient,
        handlers::update_patient,
        handlers::delete_patient,
        handlers::get_clinical_data,
        handlers::add_clinical_data,
        handlers::update_clinical_data,
        handlers::delete_clinical_data,
    ),
    components(schemas(
        Status,
        HealthRes,
        PatientRes,
        ClinicalDataRes,
        DeletedRes,
        CreatePatientReq,
        UpdatePatientReq,
        ClinicalDataReq,
        ErrorEnvelope,
        PatientEnvelope,
        PatientListEnvelope,
        ClinicalDataEnvelope,
        ClinicalDataListEnvelope,
        DeletedEnvelope,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router, including Swagger UI at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    use handlers::*;

    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients).post(create_patient))
        .route("/patients/critical", get(list_critical_patients))
        .route(
            "/patients/:id",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
        .route(
            "/patients/:id/clinical-data",
            get(get_clinical_data).post(add_clinical_data),
        )
        .route(
            "/patients/:id/clinical-data/:entry_id",
            axum::routing::patch(update_clinical_data)
                .put(update_clinical_data)
                .delete(delete_clinical_data),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the REST API until the process is stopped.
///
/// # Errors
/// Returns an error if the address cannot be bound or the HTTP server fails while running.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("++ SenCare REST listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
