//! # HarvestSeal Core
//!
//! Pure primitives for HarvestSeal: certificate content, canonical
//! hashing, Merkle commitments, and version-chain verification.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over certificate data, safe under unlimited concurrent
//! invocation.
//!
//! ## Key Types
//!
//! - [`CertificateContent`] - What one certificate version attests
//! - [`CertificateVersion`] - An immutable, hash-linked snapshot
//! - [`ContentHash`] - SHA-256 digest of canonical content bytes
//! - [`Seal`] - Issuer attestation over a version's content hash
//! - [`VerificationReport`] - Structured outcome of chain replay
//!
//! ## Canonicalization
//!
//! Content hashes are computed over deterministic CBOR, so structurally
//! equal content hashes identically whatever order its fields were built
//! in. See the [`canonical`] module.

pub mod canonical;
pub mod content;
pub mod crypto;
pub mod error;
pub mod merkle;
pub mod types;
pub mod validation;
pub mod version;

pub use canonical::{canonical_bytes, canonical_hash, CanonicalError};
pub use content::{
    Certification, CertificateContent, CertificateDelta, EventType, EventValue, FarmProfile,
    GeoPoint, HarvestDetails, SoilReport, SupplyChainEvent,
};
pub use crypto::{ContentHash, IssuerKeypair, IssuerPublicKey, IssuerSignature, Seal, SEAL_DOMAIN};
pub use error::{CoreError, ValidationError};
pub use merkle::{content_merkle_root, merkle_root, section_leaves, MerkleError};
pub use types::CertificateId;
pub use validation::{validate_delta, validate_event, validate_geo_point, validate_new_content};
pub use version::{
    verify_chain, CertificateVersion, ConfidenceLevel, IntegrityError, VerificationReport,
    VersionSummary,
};
