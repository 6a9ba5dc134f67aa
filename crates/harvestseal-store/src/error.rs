//! Error types for the certificate store.

use harvestseal_core::CertificateId;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No certificate with this id.
    #[error("certificate not found: {0}")]
    NotFound(CertificateId),

    /// The certificate exists but has no such version.
    #[error("certificate {id} has no version {version}")]
    VersionNotFound { id: CertificateId, version: u32 },

    /// A certificate with this id already exists.
    #[error("certificate already exists: {0}")]
    DuplicateCertificate(CertificateId),

    /// A search was attempted with no criteria.
    #[error("search criteria are empty")]
    EmptyCriteria,

    /// The pagination token refers to an unknown or evicted snapshot.
    #[error("unknown or expired search snapshot")]
    UnknownSnapshot,

    /// A write would break chain invariants (non-contiguous version
    /// number or mismatched previous-version link).
    #[error("invalid chain data: {0}")]
    InvalidData(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
