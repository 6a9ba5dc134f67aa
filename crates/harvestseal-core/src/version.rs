//! Certificate version records and hash-chain verification.
//!
//! A certificate is an ordered chain of immutable versions. Each version
//! commits to its own content (content hash + Merkle root) and links to
//! its predecessor by that predecessor's content hash. Verification
//! replays the chain from version 1 and reports the first broken link as
//! a structured finding, never as a thrown failure: a tamper discovery is
//! an expected, actionable outcome.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::canonical::canonical_hash;
use crate::content::CertificateContent;
use crate::crypto::{ContentHash, IssuerKeypair, Seal};
use crate::error::CoreError;
use crate::merkle::content_merkle_root;
use crate::types::CertificateId;

/// One immutable snapshot in a certificate's version chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateVersion {
    /// The certificate this version belongs to.
    pub id: CertificateId,

    /// Position in the chain, starting at 1.
    pub version: u32,

    /// The attested content at this version.
    pub content: CertificateContent,

    /// Canonical hash of `content`.
    pub content_hash: ContentHash,

    /// Merkle root over the content sections.
    pub merkle_root: ContentHash,

    /// Issuer seal over `content_hash`, when sealing is enabled.
    pub seal: Option<Seal>,

    /// `content_hash` of the previous version. `None` iff `version == 1`.
    pub previous_version_hash: Option<ContentHash>,

    /// When this version was created (Unix milliseconds).
    pub created_at: i64,

    /// Who created this version.
    pub created_by: String,
}

impl CertificateVersion {
    /// Build an unsealed version, computing its content hash and Merkle
    /// root from the content.
    pub fn build(
        id: CertificateId,
        version: u32,
        content: CertificateContent,
        previous_version_hash: Option<ContentHash>,
        created_at: i64,
        created_by: impl Into<String>,
    ) -> Result<Self, CoreError> {
        let content_hash = canonical_hash(&content)?;
        let merkle_root = content_merkle_root(&content)?;
        Ok(Self {
            id,
            version,
            content,
            content_hash,
            merkle_root,
            seal: None,
            previous_version_hash,
            created_at,
            created_by: created_by.into(),
        })
    }

    /// Seal this version with the issuer's keypair.
    pub fn with_seal(mut self, keypair: &IssuerKeypair) -> Self {
        self.seal = Some(keypair.seal(&self.content_hash));
        self
    }

    /// Whether an issuer seal is present.
    pub fn is_sealed(&self) -> bool {
        self.seal.is_some()
    }

    /// Condensed view for history listings.
    pub fn summary(&self) -> VersionSummary {
        VersionSummary {
            version: self.version,
            content_hash: self.content_hash,
            previous_version_hash: self.previous_version_hash,
            created_at: self.created_at,
            created_by: self.created_by.clone(),
            event_count: self.content.supply_chain_events.len(),
            sealed: self.is_sealed(),
        }
    }
}

/// Condensed version record for history listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub version: u32,
    pub content_hash: ContentHash,
    pub previous_version_hash: Option<ContentHash>,
    pub created_at: i64,
    pub created_by: String,
    pub event_count: usize,
    pub sealed: bool,
}

/// Verification outcome classification.
///
/// `High` requires every chain check to pass and the latest version to be
/// sealed. `Medium` means the chain is sound but the latest version
/// carries no seal. `Low` means some check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ConfidenceLevel::Low => "LOW",
            ConfidenceLevel::Medium => "MEDIUM",
            ConfidenceLevel::High => "HIGH",
        })
    }
}

/// A structured integrity finding from chain verification.
///
/// Carried inside a [`VerificationReport`]; callers branch on these
/// instead of catching errors.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum IntegrityError {
    #[error("version chain is empty")]
    EmptyChain,

    #[error("version {version}: version number out of sequence")]
    VersionOutOfSequence { version: u32 },

    #[error("version {version}: stored content no longer encodes canonically")]
    UnencodableContent { version: u32 },

    #[error("version {version}: content hash does not match stored content")]
    ContentHashMismatch { version: u32 },

    #[error("version {version}: merkle root does not match stored content")]
    MerkleRootMismatch { version: u32 },

    #[error("version {version}: broken link to previous version")]
    PreviousHashMismatch { version: u32 },

    #[error("version {version}: seal does not verify against content hash")]
    SealInvalid { version: u32 },
}

impl IntegrityError {
    /// The version the finding points at, if any.
    pub fn version(&self) -> Option<u32> {
        match self {
            IntegrityError::EmptyChain => None,
            IntegrityError::VersionOutOfSequence { version }
            | IntegrityError::UnencodableContent { version }
            | IntegrityError::ContentHashMismatch { version }
            | IntegrityError::MerkleRootMismatch { version }
            | IntegrityError::PreviousHashMismatch { version }
            | IntegrityError::SealInvalid { version } => Some(*version),
        }
    }
}

/// The outcome of replaying a certificate's version chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True iff every check passed for every version.
    pub is_valid: bool,

    /// Classification of the outcome.
    pub confidence: ConfidenceLevel,

    /// Findings, in discovery order. Verification stops at the first
    /// broken version, so at most one finding is reported.
    pub errors: Vec<IntegrityError>,
}

/// Replay a version chain from version 1 and check every link.
///
/// Versions must be supplied oldest first. For each version this checks:
///
/// 1. the version number continues the sequence 1, 2, 3, ...
/// 2. the stored content re-hashes to the stored content hash
/// 3. the stored content re-derives the stored Merkle root
/// 4. the previous-version link matches the prior version's stored hash
/// 5. a present seal verifies against the stored content hash
///
/// Verification stops at the first failed check and reports which version
/// broke and how.
pub fn verify_chain<'a, I>(versions: I) -> VerificationReport
where
    I: IntoIterator<Item = &'a CertificateVersion>,
{
    let mut prev_hash: Option<ContentHash> = None;
    let mut expected_version: u32 = 1;
    let mut latest_sealed = false;
    let mut any = false;

    for v in versions {
        any = true;
        latest_sealed = v.is_sealed();

        // 1. Version numbers must be contiguous from 1
        if v.version != expected_version {
            return broken(IntegrityError::VersionOutOfSequence { version: v.version });
        }

        // 2. Recompute the content hash from stored content
        let recomputed = match canonical_hash(&v.content) {
            Ok(hash) => hash,
            Err(_) => return broken(IntegrityError::UnencodableContent { version: v.version }),
        };
        if recomputed != v.content_hash {
            return broken(IntegrityError::ContentHashMismatch { version: v.version });
        }

        // 3. Recompute the merkle root from stored content
        match content_merkle_root(&v.content) {
            Ok(root) if root == v.merkle_root => {}
            Ok(_) => return broken(IntegrityError::MerkleRootMismatch { version: v.version }),
            Err(_) => return broken(IntegrityError::UnencodableContent { version: v.version }),
        }

        // 4. The link to the previous version must match its stored hash
        if v.previous_version_hash != prev_hash {
            return broken(IntegrityError::PreviousHashMismatch { version: v.version });
        }

        // 5. A present seal must verify against the stored hash
        if let Some(seal) = &v.seal {
            if seal.verify(&v.content_hash).is_err() {
                return broken(IntegrityError::SealInvalid { version: v.version });
            }
        }

        prev_hash = Some(v.content_hash);
        expected_version += 1;
    }

    if !any {
        return broken(IntegrityError::EmptyChain);
    }

    let confidence = if latest_sealed {
        ConfidenceLevel::High
    } else {
        ConfidenceLevel::Medium
    };
    VerificationReport {
        is_valid: true,
        confidence,
        errors: Vec::new(),
    }
}

fn broken(error: IntegrityError) -> VerificationReport {
    VerificationReport {
        is_valid: false,
        confidence: ConfidenceLevel::Low,
        errors: vec![error],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::test_support::{sample_content, sample_event};
    use crate::content::CertificateDelta;
    use crate::crypto::IssuerSignature;

    fn issuer() -> IssuerKeypair {
        IssuerKeypair::from_seed(&[0x42; 32])
    }

    /// Build a sealed chain of `len` versions, each appending one event.
    fn make_chain(len: u32, sealed: bool) -> Vec<CertificateVersion> {
        let keypair = issuer();
        let id = CertificateId::new("CERT-TEST-1");
        let mut chain = Vec::new();
        let mut content = sample_content();
        let mut prev: Option<ContentHash> = None;

        for n in 1..=len {
            if n > 1 {
                let event = sample_event("CERT-TEST-1", &format!("EVT-{}", n));
                content = content.with_delta(&CertificateDelta::events(vec![event]));
            }
            let mut version = CertificateVersion::build(
                id.clone(),
                n,
                content.clone(),
                prev,
                1_724_000_000_000 + i64::from(n),
                "inspector-1",
            )
            .unwrap();
            if sealed {
                version = version.with_seal(&keypair);
            }
            prev = Some(version.content_hash);
            chain.push(version);
        }
        chain
    }

    #[test]
    fn test_build_computes_commitments() {
        let v = CertificateVersion::build(
            CertificateId::new("CERT-1"),
            1,
            sample_content(),
            None,
            1_724_000_000_000,
            "inspector-1",
        )
        .unwrap();

        assert_eq!(v.content_hash, canonical_hash(&v.content).unwrap());
        assert_eq!(v.merkle_root, content_merkle_root(&v.content).unwrap());
        assert_eq!(v.content_hash.to_hex().len(), 64);
        assert!(v.previous_version_hash.is_none());
        assert!(!v.is_sealed());
    }

    #[test]
    fn test_sealed_chain_verifies_high() {
        let chain = make_chain(3, true);
        let report = verify_chain(chain.iter());
        assert!(report.is_valid);
        assert_eq!(report.confidence, ConfidenceLevel::High);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_unsealed_chain_verifies_medium() {
        let chain = make_chain(2, false);
        let report = verify_chain(chain.iter());
        assert!(report.is_valid);
        assert_eq!(report.confidence, ConfidenceLevel::Medium);
    }

    #[test]
    fn test_tampered_content_detected() {
        let mut chain = make_chain(3, true);
        chain[1].content.harvest.quantity = 99_999.0;

        let report = verify_chain(chain.iter());
        assert!(!report.is_valid);
        assert_eq!(report.confidence, ConfidenceLevel::Low);
        assert_eq!(
            report.errors,
            vec![IntegrityError::ContentHashMismatch { version: 2 }]
        );
    }

    #[test]
    fn test_broken_previous_link_detected() {
        let mut chain = make_chain(2, true);
        chain[1].previous_version_hash = Some(ContentHash::from_bytes([0xee; 32]));

        let report = verify_chain(chain.iter());
        assert_eq!(
            report.errors,
            vec![IntegrityError::PreviousHashMismatch { version: 2 }]
        );
    }

    #[test]
    fn test_version_one_must_not_link_back() {
        let mut chain = make_chain(1, true);
        chain[0].previous_version_hash = Some(ContentHash::from_bytes([0x01; 32]));

        let report = verify_chain(chain.iter());
        assert_eq!(
            report.errors,
            vec![IntegrityError::PreviousHashMismatch { version: 1 }]
        );
    }

    #[test]
    fn test_invalid_seal_detected() {
        let mut chain = make_chain(2, true);
        let seal = chain[1].seal.as_mut().unwrap();
        seal.signature = IssuerSignature::from_bytes([0xff; 64]);

        let report = verify_chain(chain.iter());
        assert_eq!(report.errors, vec![IntegrityError::SealInvalid { version: 2 }]);
    }

    #[test]
    fn test_out_of_sequence_detected() {
        let mut chain = make_chain(2, true);
        chain[1].version = 5;

        let report = verify_chain(chain.iter());
        assert_eq!(
            report.errors,
            vec![IntegrityError::VersionOutOfSequence { version: 5 }]
        );
    }

    #[test]
    fn test_empty_chain_reported() {
        let report = verify_chain(std::iter::empty::<&CertificateVersion>());
        assert!(!report.is_valid);
        assert_eq!(report.errors, vec![IntegrityError::EmptyChain]);
    }

    #[test]
    fn test_stops_at_first_broken_version() {
        let mut chain = make_chain(4, true);
        chain[1].content.harvest.quantity = 1.0;
        chain[3].content.harvest.quantity = 2.0;

        let report = verify_chain(chain.iter());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].version(), Some(2));
    }

    #[test]
    fn test_summary_reflects_version() {
        let chain = make_chain(2, true);
        let summary = chain[1].summary();
        assert_eq!(summary.version, 2);
        assert_eq!(summary.content_hash, chain[1].content_hash);
        assert_eq!(summary.previous_version_hash, Some(chain[0].content_hash));
        assert_eq!(summary.event_count, 1);
        assert!(summary.sealed);
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(ConfidenceLevel::Low < ConfidenceLevel::Medium);
        assert!(ConfidenceLevel::Medium < ConfidenceLevel::High);
    }
}
