//! Injected capabilities: id generation and signing-key access.
//!
//! The engine never mints identifiers or holds key material itself; both
//! come through these traits so deployments can plug in their own
//! registries and key stores. Capability failures surface to callers as
//! dependency failures, distinct from invalid input.

use async_trait::async_trait;
use thiserror::Error;

use harvestseal_core::IssuerKeypair;

/// Errors raised by injected capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// The id generator failed or produced an unusable id.
    #[error("id generation failed: {0}")]
    IdGeneration(String),

    /// The signing-key provider could not supply the issuer keypair.
    #[error("signing key unavailable: {0}")]
    SigningKey(String),
}

/// Result type for capability calls.
pub type Result<T> = std::result::Result<T, CapabilityError>;

/// Mints unique certificate identifiers.
///
/// The engine checks the returned id's shape (non-empty, bounded length,
/// id-safe characters) and rejects collisions, but trusts the generator
/// for uniqueness beyond that.
#[async_trait]
pub trait IdGenerator: Send + Sync {
    /// Generate a fresh id carrying the given prefix.
    async fn generate_id(&self, prefix: &str) -> Result<String>;
}

/// Supplies the issuer keypair used to seal certificate versions.
#[async_trait]
pub trait SigningKeyProvider: Send + Sync {
    /// The current issuer keypair.
    async fn issuer_keypair(&self) -> Result<IssuerKeypair>;
}

/// Default id generator: `<PREFIX>-<base36 millis>-<6 random alphanumerics>`,
/// uppercased.
///
/// The timestamp component keeps ids roughly sortable by creation time;
/// the random suffix separates ids minted in the same millisecond.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemIdGenerator;

#[async_trait]
impl IdGenerator for SystemIdGenerator {
    async fn generate_id(&self, prefix: &str) -> Result<String> {
        use rand::distributions::Alphanumeric;
        use rand::Rng;

        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        Ok(format!("{}-{}-{}", prefix, base36(now_millis() as u64), suffix).to_uppercase())
    }
}

/// Key provider backed by a fixed in-process keypair.
///
/// Suitable for single-issuer deployments and tests. Production setups
/// wrap their key store behind [`SigningKeyProvider`] instead.
#[derive(Clone)]
pub struct StaticKeyProvider {
    keypair: IssuerKeypair,
}

impl StaticKeyProvider {
    /// Wrap an existing keypair.
    pub fn new(keypair: IssuerKeypair) -> Self {
        Self { keypair }
    }

    /// Generate a fresh keypair and wrap it.
    pub fn generate() -> Self {
        Self::new(IssuerKeypair::generate())
    }
}

#[async_trait]
impl SigningKeyProvider for StaticKeyProvider {
    async fn issuer_keypair(&self) -> Result<IssuerKeypair> {
        Ok(self.keypair.clone())
    }
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.iter().rev().map(|&b| b as char).collect()
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
