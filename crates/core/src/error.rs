use sencare_types::TextError;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("{0}")]
    Validation(String),
    #[error("Patient not found")]
    PatientNotFound,
    #[error("Clinical data not found")]
    ClinicalDataNotFound,
    #[error("No critical patients found")]
    NoCriticalPatients,

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to create patient directory: {0}")]
    PatientDirCreation(std::io::Error),
    #[error("failed to write patient file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read patient file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to remove patient directory: {0}")]
    FileRemove(std::io::Error),
    #[error("failed to serialize patient: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize patient: {0}")]
    Deserialization(serde_json::Error),
    #[error("patient store lock poisoned")]
    LockPoisoned,
    #[error("failed to allocate a unique identifier after {0} attempts")]
    IdAllocation(usize),
}

impl RecordError {
    /// True for errors caused by the request rather than by the store.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RecordError::Validation(_)
                | RecordError::PatientNotFound
                | RecordError::ClinicalDataNotFound
                | RecordError::NoCriticalPatients
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RecordError::PatientNotFound
                | RecordError::ClinicalDataNotFound
                | RecordError::NoCriticalPatients
        )
    }
}

impl From<TextError> for RecordError {
    fn from(err: TextError) -> Self {
        RecordError::Validation(err.to_string())
    }
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;
