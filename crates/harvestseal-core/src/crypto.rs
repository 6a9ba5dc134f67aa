//! Cryptographic primitives for HarvestSeal.
//!
//! Wraps SHA-256 hashing and Ed25519 sealing with strong types.
//!
//! SHA-256 is used for content hashes and Merkle roots because certificate
//! hashes are an external contract: downstream verifiers (scan services,
//! regulators, partner systems) recompute them with stock tooling, and the
//! 64-hex digest string is what gets printed on labels and reports.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::CoreError;

/// Domain prefix for seal signatures.
///
/// Seals sign `SEAL_DOMAIN || content_hash`, never raw content. Binding to
/// the hash keeps verification independent of payload transmission, and the
/// prefix prevents cross-protocol reuse of a signature.
pub const SEAL_DOMAIN: &[u8] = b"harvestseal-seal-v1:";

/// A 32-byte SHA-256 digest.
///
/// Used for both content hashes and Merkle roots. Serializes as a 64-hex
/// string, the form consumers see.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Compute the SHA-256 hash of the given data.
    pub fn hash(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        Self(digest.into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to a 64-character hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The zero hash (sentinel value).
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for ContentHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for ContentHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A 32-byte Ed25519 public key identifying an issuer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct IssuerPublicKey(pub [u8; 32]);

impl IssuerPublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &IssuerSignature) -> Result<(), CoreError> {
        let verifying_key =
            VerifyingKey::from_bytes(&self.0).map_err(|_| CoreError::InvalidPublicKey)?;

        let sig = Signature::from_bytes(&signature.0);

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CoreError::InvalidSignature)
    }
}

impl fmt::Debug for IssuerPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IssuerPub({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for IssuerPublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for IssuerPublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for IssuerPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for IssuerPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct IssuerSignature(pub [u8; 64]);

impl IssuerSignature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 64 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for IssuerSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IssuerSig({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for IssuerSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 64]> for IssuerSignature {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

impl Serialize for IssuerSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for IssuerSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// An issuer's attestation over one certificate version.
///
/// Bundles the issuer public key with a signature over the version's
/// content hash, so a seal is verifiable from the version record alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seal {
    /// The issuer that sealed this version.
    pub issuer: IssuerPublicKey,

    /// Signature over `SEAL_DOMAIN || content_hash`.
    pub signature: IssuerSignature,
}

impl Seal {
    /// Verify this seal against a content hash.
    pub fn verify(&self, content_hash: &ContentHash) -> Result<(), CoreError> {
        self.issuer.verify(&seal_message(content_hash), &self.signature)
    }
}

/// The domain-separated message a seal signs.
fn seal_message(content_hash: &ContentHash) -> Vec<u8> {
    let mut msg = Vec::with_capacity(SEAL_DOMAIN.len() + 32);
    msg.extend_from_slice(SEAL_DOMAIN);
    msg.extend_from_slice(content_hash.as_bytes());
    msg
}

/// A keypair for sealing certificate versions.
///
/// This wraps ed25519-dalek's SigningKey.
#[derive(Clone)]
pub struct IssuerKeypair {
    signing_key: SigningKey,
}

impl IssuerKeypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key.
    pub fn public_key(&self) -> IssuerPublicKey {
        IssuerPublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Produce a seal over a content hash.
    pub fn seal(&self, content_hash: &ContentHash) -> Seal {
        let sig = self.signing_key.sign(&seal_message(content_hash));
        Seal {
            issuer: self.public_key(),
            signature: IssuerSignature(sig.to_bytes()),
        }
    }

    /// Get the raw seed bytes (secret key material).
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl fmt::Debug for IssuerKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IssuerKeypair({:?})", self.public_key())
    }
}
