//! # SenCare Core
//!
//! Core business logic for the SenCare patient record system.
//!
//! This crate contains pure data operations:
//! - Patient documents with their embedded clinical-data history ([`model`])
//! - Request validation and identifier parsing ([`validation`], [`object_id`])
//! - The [`store::PatientStore`] abstraction with in-memory and file-backed implementations
//! - [`PatientService`], which orchestrates validation and store access
//!
//! **No API concerns**: HTTP servers, envelopes and OpenAPI documents belong in `api-rest`
//! and `api-shared`.

pub mod config;
pub mod constants;
pub mod error;
pub mod model;
pub mod object_id;
pub mod patient;
pub mod store;
pub mod validation;

pub use config::{CoreConfig, StoreBackend};
pub use constants::DEFAULT_PATIENT_DATA_DIR;
pub use error::{RecordError, RecordResult};
pub use model::{ClinicalDataEntry, ClinicalDataPatch, Patient};
pub use object_id::ObjectId;
pub use patient::PatientService;
pub use sencare_types::{Age, NonEmptyText, TextError};
pub use store::{open_store, EntryLookup, FileStore, MemoryStore, PatientStore};
pub use validation::{ClinicalDataInput, PatientInput};
