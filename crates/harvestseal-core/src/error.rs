//! Error types for HarvestSeal core.

use thiserror::Error;

use crate::canonical::CanonicalError;
use crate::merkle::MerkleError;

/// Core errors from the integrity primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error(transparent)]
    Canonical(#[from] CanonicalError),

    #[error(transparent)]
    Merkle(#[from] MerkleError),
}

/// Validation errors for certificate content and update deltas.
///
/// These surface as invalid-argument failures before any mutation
/// happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("missing required identifier: {0}")]
    MissingIdentifier(&'static str),

    #[error("field {0} must be a finite number")]
    NonFiniteNumber(&'static str),

    #[error("field {0} must not be negative")]
    NegativeNumber(&'static str),

    #[error("supply-chain events cannot be submitted at creation")]
    EventsPresentAtCreation,

    #[error("update delta is empty")]
    EmptyDelta,

    #[error("duplicate supply-chain event id: {0}")]
    DuplicateEventId(String),

    #[error("event {event_id} does not reference certificate {expected}")]
    EventCertificateMismatch { event_id: String, expected: String },
}
