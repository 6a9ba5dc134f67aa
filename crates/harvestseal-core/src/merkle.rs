//! Merkle commitment over certificate sections.
//!
//! Each certificate version commits to its content twice: the flat
//! canonical content hash, and a Merkle root over per-section leaf hashes.
//! The root lets a verifier check one section (say, the soil report)
//! against the sealed commitment without the full content in hand.

use thiserror::Error;

use crate::canonical::{canonical_bytes, CanonicalError};
use crate::content::CertificateContent;
use crate::crypto::ContentHash;
use crate::error::CoreError;

/// Errors from Merkle-root computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MerkleError {
    #[error("cannot compute a merkle root over zero leaves")]
    EmptyLeafSet,
}

/// Hash the certificate sections into leaf digests.
///
/// Leaf order is a fixed contract: farm, harvest, soil, certifications,
/// events. Changing this order changes every computed root, so it must
/// never be rearranged.
pub fn section_leaves(content: &CertificateContent) -> Result<Vec<ContentHash>, CanonicalError> {
    Ok(vec![
        section_leaf(&content.farm)?,
        section_leaf(&content.harvest)?,
        section_leaf(&content.soil)?,
        section_leaf(&content.certifications)?,
        section_leaf(&content.supply_chain_events)?,
    ])
}

fn section_leaf<T: serde::Serialize>(section: &T) -> Result<ContentHash, CanonicalError> {
    Ok(ContentHash::hash(&canonical_bytes(section)?))
}

/// Compute the Merkle root of an ordered leaf sequence.
///
/// Adjacent leaves are combined pairwise bottom-up. A level with an odd
/// count pairs its last leaf with itself. A single leaf is its own root.
pub fn merkle_root(leaves: &[ContentHash]) -> Result<ContentHash, MerkleError> {
    if leaves.is_empty() {
        return Err(MerkleError::EmptyLeafSet);
    }

    let mut level = leaves.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            let left = pair[0];
            let right = if pair.len() == 2 { pair[1] } else { left };
            next.push(combine(&left, &right));
        }
        level = next;
    }
    Ok(level[0])
}

/// Merkle root over a certificate's sections.
pub fn content_merkle_root(content: &CertificateContent) -> Result<ContentHash, CoreError> {
    let leaves = section_leaves(content)?;
    Ok(merkle_root(&leaves)?)
}

/// Hash the concatenation of two child digests.
fn combine(left: &ContentHash, right: &ContentHash) -> ContentHash {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left.as_bytes());
    buf[32..].copy_from_slice(right.as_bytes());
    ContentHash::hash(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::test_support::{sample_content, sample_event};
    use crate::content::CertificateDelta;
    use proptest::prelude::*;

    fn leaf(byte: u8) -> ContentHash {
        ContentHash::from_bytes([byte; 32])
    }

    #[test]
    fn test_empty_leaf_set_rejected() {
        assert_eq!(merkle_root(&[]), Err(MerkleError::EmptyLeafSet));
    }

    #[test]
    fn test_single_leaf_is_its_own_root() {
        let l = leaf(7);
        assert_eq!(merkle_root(&[l]).unwrap(), l);
    }

    #[test]
    fn test_root_deterministic() {
        let leaves = [leaf(1), leaf(2), leaf(3)];
        assert_eq!(merkle_root(&leaves).unwrap(), merkle_root(&leaves).unwrap());
    }

    #[test]
    fn test_root_depends_on_leaf_order() {
        let forward = [leaf(1), leaf(2)];
        let reversed = [leaf(2), leaf(1)];
        assert_ne!(
            merkle_root(&forward).unwrap(),
            merkle_root(&reversed).unwrap()
        );
    }

    #[test]
    fn test_odd_level_duplicates_last_leaf() {
        let odd = [leaf(1), leaf(2), leaf(3)];
        let padded = [leaf(1), leaf(2), leaf(3), leaf(3)];
        assert_eq!(merkle_root(&odd).unwrap(), merkle_root(&padded).unwrap());
    }

    #[test]
    fn test_two_leaves_combine() {
        let root = merkle_root(&[leaf(1), leaf(2)]).unwrap();
        assert_eq!(root, combine(&leaf(1), &leaf(2)));
    }

    #[test]
    fn test_section_leaves_cover_all_sections() {
        let content = sample_content();
        let leaves = section_leaves(&content).unwrap();
        assert_eq!(leaves.len(), 5);
    }

    #[test]
    fn test_section_change_moves_root() {
        let content = sample_content();
        let root_before = content_merkle_root(&content).unwrap();

        let updated = content.with_delta(&CertificateDelta::events(vec![sample_event(
            "CERT-1", "EVT-1",
        )]));
        let root_after = content_merkle_root(&updated).unwrap();
        assert_ne!(root_before, root_after);

        // Only the events leaf should have moved.
        let before = section_leaves(&content).unwrap();
        let after = section_leaves(&updated).unwrap();
        assert_eq!(before[..4], after[..4]);
        assert_ne!(before[4], after[4]);
    }

    proptest! {
        #[test]
        fn prop_root_deterministic(seed in proptest::collection::vec(any::<[u8; 32]>(), 1..16)) {
            let leaves: Vec<ContentHash> = seed.iter().map(|b| ContentHash::from_bytes(*b)).collect();
            let r1 = merkle_root(&leaves).unwrap();
            let r2 = merkle_root(&leaves).unwrap();
            prop_assert_eq!(r1, r2);
        }

        #[test]
        fn prop_odd_padding_matches_duplicate(seed in proptest::collection::vec(any::<[u8; 32]>(), 3..16)) {
            let mut leaves: Vec<ContentHash> = seed.iter().map(|b| ContentHash::from_bytes(*b)).collect();
            if leaves.len() % 2 == 1 {
                let root_odd = merkle_root(&leaves).unwrap();
                let last = *leaves.last().unwrap();
                leaves.push(last);
                prop_assert_eq!(root_odd, merkle_root(&leaves).unwrap());
            }
        }
    }
}
