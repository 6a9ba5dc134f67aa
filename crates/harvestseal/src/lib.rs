//! # HarvestSeal
//!
//! Certificate integrity and versioning for agricultural provenance -
//! tamper-evident certificates through canonical hashing, Merkle roots,
//! and issuer seals.
//!
//! ## Overview
//!
//! HarvestSeal keeps a provenance certificate honest across its life:
//!
//! - **Versions**: Immutable snapshots; every change is a new version
//! - **Hash chain**: Each version links to its predecessor by content hash
//! - **Seals**: Issuer signatures bound to each version's content hash
//! - **Audit trail**: Append-only, totally ordered record of every mutation
//! - **Search**: Ranked, AND-matched queries with stable snapshot pagination
//!
//! ## Key Concepts
//!
//! - **Certificate**: A chain of versions. Never edited, only extended.
//! - **Content hash**: Canonical-encoding hash; independent of field order.
//! - **Merkle root**: Commitment over the content's five sections.
//! - **Verification**: Replays the chain; tampering is a structured
//!   finding, not a thrown error.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use harvestseal::{Engine, EngineConfig};
//! use harvestseal::capability::{StaticKeyProvider, SystemIdGenerator};
//! use harvestseal::store::CertificateStore;
//!
//! async fn example(content: harvestseal::core::CertificateContent) {
//!     let engine = Engine::new(
//!         Arc::new(CertificateStore::new()),
//!         Arc::new(SystemIdGenerator),
//!         Arc::new(StaticKeyProvider::generate()),
//!         EngineConfig::default(),
//!     );
//!
//!     // Create a certificate at version 1
//!     let version = engine
//!         .create_certificate(content, "inspector-1")
//!         .await
//!         .unwrap();
//!
//!     // Replay and verify its chain
//!     let report = engine.verify_certificate(&version.id).unwrap();
//!     assert!(report.is_valid);
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `harvestseal::core` - Content model, hashing, Merkle, seals
//! - `harvestseal::store` - In-memory store, audit trail, search

pub mod capability;
pub mod engine;
pub mod error;

// Re-export component crates
pub use harvestseal_core as core;
pub use harvestseal_store as store;

// Re-export main types for convenience
pub use capability::{
    CapabilityError, IdGenerator, SigningKeyProvider, StaticKeyProvider, SystemIdGenerator,
};
pub use engine::{Engine, EngineConfig, UpdateRequest};
pub use error::{EngineError, Result};

// Re-export commonly used core and store types
pub use harvestseal_core::{
    verify_chain, CertificateContent, CertificateDelta, CertificateId, CertificateVersion,
    ConfidenceLevel, ContentHash, IntegrityError, IssuerKeypair, IssuerPublicKey, Seal,
    SupplyChainEvent, VerificationReport, VersionSummary,
};
pub use harvestseal_store::{
    AuditAction, AuditFilter, AuditTrailEntry, Certificate, CertificateStore, DateRange,
    SearchCriteria, SearchField, SearchPage, SearchResult, SnapshotToken, Statistics,
};
