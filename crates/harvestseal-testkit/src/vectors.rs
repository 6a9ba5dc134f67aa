//! Golden test vectors for deterministic verification.
//!
//! These vectors ensure that canonical content hashing produces
//! identical results across implementations. Each vector fixes the
//! issuer seed, certificate id, content variation, and timestamp, so
//! the resulting content hash is fully determined.

use harvestseal_core::{canonical_bytes, CertificateId, CertificateVersion, IssuerKeypair};

use crate::fixtures::content_with_crop;

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Seed for deterministic issuer key generation.
    pub seed: [u8; 32],
    /// Certificate id the version is built under.
    pub certificate_id: &'static str,
    /// Crop variation applied to the sample content.
    pub crop: &'static str,
    /// Version creation timestamp.
    pub created_at: i64,
    /// Expected content hash (hex).
    pub expected_content_hash: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "Tomato batch, default issuer",
            seed: [0x42; 32],
            certificate_id: "AGRI-VECTOR-01",
            crop: "Tomato",
            created_at: 1_724_200_000_000,
            // This will be filled in when we can compute it
            expected_content_hash: "",
        },
        GoldenVector {
            name: "Potato batch, default issuer",
            seed: [0x42; 32],
            certificate_id: "AGRI-VECTOR-02",
            crop: "Potato",
            created_at: 1_724_200_000_000,
            expected_content_hash: "",
        },
        GoldenVector {
            name: "Tomato batch, zero-seed issuer",
            seed: [0x00; 32],
            certificate_id: "AGRI-VECTOR-03",
            crop: "Tomato",
            created_at: 0,
            expected_content_hash: "",
        },
    ]
}

/// Build the sealed version 1 a golden vector describes.
pub fn version_from_vector(vector: &GoldenVector) -> CertificateVersion {
    let keypair = IssuerKeypair::from_seed(&vector.seed);
    let content = content_with_crop(vector.crop, "Golden Vector Farm");
    CertificateVersion::build(
        CertificateId::new(vector.certificate_id),
        1,
        content,
        None,
        vector.created_at,
        "inspector-1",
    )
    .expect("build vector version")
    .with_seal(&keypair)
}

/// Verify all golden vectors produce consistent content hashes.
///
/// Call this to verify your implementation matches the reference.
/// Vectors with an empty expected hash just report what they got.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let version = version_from_vector(v);
            let hex = version.content_hash.to_hex();
            let matches = v.expected_content_hash.is_empty() || hex == v.expected_content_hash;
            (v.name.to_string(), matches, hex)
        })
        .collect()
}
