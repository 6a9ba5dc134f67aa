//! Error types for the engine.

use thiserror::Error;

use harvestseal_core::{CertificateId, CoreError, ValidationError};
use harvestseal_store::StoreError;

use crate::capability::CapabilityError;

/// Errors that can occur during engine operations.
///
/// Integrity findings are not errors: verification returns a structured
/// [`VerificationReport`](harvestseal_core::VerificationReport) whether
/// the chain holds or not.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No certificate with this id.
    #[error("certificate not found: {0}")]
    NotFound(CertificateId),

    /// The certificate exists but has no such version.
    #[error("certificate {id} has no version {version}")]
    VersionNotFound { id: CertificateId, version: u32 },

    /// The caller's input is unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The caller's content failed validation.
    #[error("invalid content: {0}")]
    Validation(#[from] ValidationError),

    /// The certificate moved past the version the caller observed.
    /// Re-read the certificate and retry against its current version.
    #[error(
        "certificate {certificate_id} is at version {current}, update observed version {observed}"
    )]
    Conflict {
        certificate_id: CertificateId,
        observed: u32,
        current: u32,
    },

    /// An injected dependency failed.
    #[error("dependency failure: {0}")]
    Dependency(#[from] CapabilityError),

    /// Content could not be canonically encoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(StoreError),
}

/// Store failures that correspond to caller mistakes map to the matching
/// engine variant; the rest pass through as storage errors.
impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => EngineError::NotFound(id),
            StoreError::VersionNotFound { id, version } => {
                EngineError::VersionNotFound { id, version }
            }
            StoreError::EmptyCriteria => {
                EngineError::InvalidArgument("search criteria are empty".to_string())
            }
            StoreError::UnknownSnapshot => {
                EngineError::InvalidArgument("unknown or expired search snapshot".to_string())
            }
            other => EngineError::Store(other),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
