//! # HarvestSeal Testkit
//!
//! Testing utilities for HarvestSeal.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known test cases with expected outputs for cross-implementation verification
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up test scenarios
//!
//! ## Golden Vectors
//!
//! Golden vectors ensure deterministic content hashing across implementations:
//!
//! ```rust
//! use harvestseal_testkit::vectors::{all_vectors, version_from_vector};
//!
//! for vector in all_vectors() {
//!     let version = version_from_vector(&vector);
//!     println!("{}: {}", vector.name, version.content_hash.to_hex());
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use harvestseal_testkit::generators::{chain_from_params, ChainParams};
//! use harvestseal_core::verify_chain;
//!
//! proptest! {
//!     #[test]
//!     fn generated_chains_verify(params: ChainParams) {
//!         let chain = chain_from_params(&params);
//!         prop_assert!(verify_chain(&chain).is_valid);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust,no_run
//! use harvestseal_testkit::fixtures::EngineFixture;
//!
//! # async fn demo() {
//! let fixture = EngineFixture::new();
//! let v1 = fixture.create_sample().await;
//! let v2 = fixture.append_event(&v1.id, 1).await;
//! # }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{
    crop_criteria, multi_issuer_fixtures, sample_content, sample_event, EngineFixture,
    FailingIdGenerator, FailingKeyProvider, SequentialIdGenerator,
};
pub use generators::{chain_from_params, ChainParams};
pub use vectors::{all_vectors, verify_all_vectors, version_from_vector, GoldenVector};
