//! Constants used throughout the SenCare core crate.
//!
//! Path, filename and message constants live here so the stores, the service and the
//! transports agree on them.

/// Default directory for patient data storage when no explicit directory is configured.
pub const DEFAULT_PATIENT_DATA_DIR: &str = "patient_data";

/// Directory name (under the patient data directory) holding patient documents.
pub const PATIENTS_DIR_NAME: &str = "patients";

/// Filename for the patient JSON document.
pub const PATIENT_JSON_FILENAME: &str = "patient.json";

/// Temporary filename used while a patient document is being replaced.
pub const PATIENT_JSON_TMP_FILENAME: &str = "patient.json.tmp";

/// Photo assigned to patients created without one.
pub const DEFAULT_PHOTO: &str = "/assets/patient1.png";

/// Condition value that marks a patient as needing urgent attention.
pub const CRITICAL_CONDITION: &str = "Critical";

/// Number of attempts made to allocate a non-colliding identifier.
pub const ID_ALLOCATION_ATTEMPTS: usize = 5;

pub const INVALID_ID_MSG: &str = "Invalid ID format";
pub const REQUIRED_PATIENT_FIELDS_MSG: &str = "Name, condition, contact, and age are required";
pub const REQUIRED_CLINICAL_FIELDS_MSG: &str = "Date, type, value, and condition are required";
pub const NON_POSITIVE_AGE_MSG: &str = "Age must be a positive integer";
