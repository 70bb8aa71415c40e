//! # API Shared
//!
//! Shared wire definitions for the SenCare APIs.
//!
//! Contains:
//! - The response envelope every endpoint returns (`envelope` module)
//! - Request/response payloads with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `sencare` CLI.

pub mod dto;
pub mod envelope;
pub mod health;

pub use dto::*;
pub use envelope::{ErrorEnvelope, Status, SuccessEnvelope};
pub use health::HealthService;
