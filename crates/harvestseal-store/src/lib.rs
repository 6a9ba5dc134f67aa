//! # HarvestSeal Store
//!
//! In-memory storage for HarvestSeal certificates: hash-linked version
//! chains, append-only audit trails, and snapshot-paginated search.
//!
//! ## Overview
//!
//! [`CertificateStore`] owns every certificate's version chain and audit
//! trail. Reads hand out cheap `Arc` snapshots; writes to one certificate
//! are linearized through an [`UpdateGuard`] while writes to different
//! certificates run in parallel. Search freezes its ranked results into
//! an immutable snapshot so pagination stays consistent under concurrent
//! writes.
//!
//! ## Key Types
//!
//! - [`CertificateStore`] - The store itself
//! - [`UpdateGuard`] - Exclusive per-certificate update slot
//! - [`Certificate`] - Latest version plus chain size
//! - [`AuditTrailEntry`] / [`AuditFilter`] - Append-only operation log
//! - [`SearchCriteria`] / [`SearchPage`] - AND-matched, ranked search
//! - [`Statistics`] - On-demand store-wide aggregates
//!
//! ## Usage
//!
//! ```rust,no_run
//! use harvestseal_store::{CertificateStore, SearchCriteria};
//!
//! let store = CertificateStore::new();
//!
//! // Rank latest versions against AND-combined criteria
//! let criteria = SearchCriteria {
//!     crop_type: Some("Tomato".into()),
//!     ..SearchCriteria::default()
//! };
//! let page = store.advanced_search(&criteria, 20).unwrap();
//! assert!(page.results.len() <= 20);
//! ```
//!
//! ## Design Notes
//!
//! - **Per-certificate linearization**: at most one update in flight per id
//! - **Copy-on-read**: reads return `Arc` snapshots, never live references
//! - **Store-wide audit sequence**: entries totally ordered across certificates
//! - **Frozen search snapshots**: pages never skip or repeat results

pub mod audit;
pub mod error;
pub mod memory;
pub mod search;

#[cfg(test)]
pub(crate) mod testutil;

pub use audit::{
    is_sensitive_key, sanitize_detail, AuditAction, AuditFilter, AuditTrailEntry, NewAuditEntry,
    REDACTED,
};
pub use error::{Result, StoreError};
pub use memory::{
    Certificate, CertificateStore, Statistics, UpdateGuard, DEFAULT_MAX_SNAPSHOTS,
};
pub use search::{
    DateRange, SearchCriteria, SearchField, SearchPage, SearchResult, SnapshotToken,
    EXACT_MATCH_WEIGHT, PARTIAL_MATCH_WEIGHT,
};
