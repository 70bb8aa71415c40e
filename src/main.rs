use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use sencare_core::config::{flag_from_env_value, store_backend_from_env_value};
use sencare_core::{open_store, CoreConfig, PatientService};

/// Main entry point for the SenCare application
///
/// Resolves configuration from the environment once, opens the configured patient store and
/// serves the REST API (with Swagger UI at `/swagger-ui`).
///
/// # Environment Variables
/// - `SENCARE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PATIENT_DATA_DIR`: Directory for patient data storage (default: "patient_data")
/// - `SENCARE_STORE`: `file` or `memory` (default: "file")
/// - `SENCARE_CRITICAL_EMPTY_404`: report an empty critical list as 404 (default: "true")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sencare=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("SENCARE_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let patient_data_dir = std::env::var("PATIENT_DATA_DIR")
        .unwrap_or_else(|_| sencare_core::DEFAULT_PATIENT_DATA_DIR.into());
    let store_backend = store_backend_from_env_value(std::env::var("SENCARE_STORE").ok())?;
    let critical_empty_is_not_found = flag_from_env_value(
        "SENCARE_CRITICAL_EMPTY_404",
        std::env::var("SENCARE_CRITICAL_EMPTY_404").ok(),
        true,
    )?;

    let cfg = Arc::new(CoreConfig::new(
        PathBuf::from(patient_data_dir),
        store_backend,
        critical_empty_is_not_found,
    )?);

    tracing::info!("++ Starting SenCare REST on {}", rest_addr);

    let store = open_store(&cfg)?;
    let state = AppState::new(PatientService::new(cfg, store));

    api_rest::serve(&rest_addr, state).await
}
