//! Strong type definitions for HarvestSeal.
//!
//! Identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque certificate identifier.
///
/// Ids are minted by an injected generator (e.g. `CERT-MBX3K9A1-7F2QPZ`)
/// and treated as opaque strings everywhere inside the engine. The engine
/// validates shape at creation but never derives meaning from the content.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateId(String);

impl CertificateId {
    /// Wrap an id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CertificateId({})", self.0)
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CertificateId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for CertificateId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for CertificateId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certificate_id_display() {
        let id = CertificateId::new("CERT-MBX3K9A1-7F2QPZ");
        assert_eq!(format!("{}", id), "CERT-MBX3K9A1-7F2QPZ");
        assert_eq!(id.as_str(), "CERT-MBX3K9A1-7F2QPZ");
    }

    #[test]
    fn test_certificate_id_debug() {
        let id = CertificateId::new("CERT-X");
        assert_eq!(format!("{:?}", id), "CertificateId(CERT-X)");
    }

    #[test]
    fn test_certificate_id_serde_transparent() {
        let id = CertificateId::new("CERT-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"CERT-1\"");
        let back: CertificateId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
