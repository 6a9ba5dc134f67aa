//! Append-only audit trail for certificate operations.
//!
//! Every mutation (create, update) appends one entry. Entries are
//! immutable once appended, carry a store-wide monotonic sequence number,
//! and order by `(timestamp, sequence)`. Detail fields flagged as
//! sensitive are redacted before the entry is stored; the raw values are
//! never retrievable afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use harvestseal_core::CertificateId;

/// Replacement value for sanitized detail fields.
pub const REDACTED: &str = "[REDACTED]";

/// The operation an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
}

impl AuditAction {
    /// Wire/display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable entry in a certificate's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrailEntry {
    /// Store-wide monotonic sequence number.
    pub sequence: u64,

    /// The certificate the operation targeted.
    pub certificate_id: CertificateId,

    /// Who performed the operation.
    pub actor: String,

    /// What was done.
    pub action: AuditAction,

    /// Caller-supplied reason, for updates.
    pub reason: Option<String>,

    /// When the entry was appended (Unix milliseconds).
    pub timestamp: i64,

    /// Sanitized operation detail. Sensitive fields arrive here already
    /// redacted.
    pub detail: BTreeMap<String, String>,
}

/// Input for a new audit entry.
///
/// The store stamps sequence and timestamp and sanitizes the detail map
/// when it appends the entry.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub actor: String,
    pub action: AuditAction,
    pub reason: Option<String>,
    pub detail: BTreeMap<String, String>,
}

impl NewAuditEntry {
    /// Entry for a certificate creation.
    pub fn create(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            action: AuditAction::Create,
            reason: None,
            detail: BTreeMap::new(),
        }
    }

    /// Entry for a certificate update.
    pub fn update(actor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            action: AuditAction::Update,
            reason: Some(reason.into()),
            detail: BTreeMap::new(),
        }
    }

    /// Attach a detail field.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.detail.insert(key.into(), value.into());
        self
    }
}

/// Filter for reading an audit trail. All present fields must match;
/// bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Only entries by this actor.
    pub actor: Option<String>,

    /// Only entries with this action.
    pub action: Option<AuditAction>,

    /// Only entries at or after this timestamp (Unix milliseconds).
    pub after: Option<i64>,

    /// Only entries at or before this timestamp (Unix milliseconds).
    pub before: Option<i64>,
}

impl AuditFilter {
    /// True if the entry passes every present filter field.
    pub fn matches(&self, entry: &AuditTrailEntry) -> bool {
        if let Some(actor) = &self.actor {
            if entry.actor != *actor {
                return false;
            }
        }
        if let Some(action) = self.action {
            if entry.action != action {
                return false;
            }
        }
        if let Some(after) = self.after {
            if entry.timestamp < after {
                return false;
            }
        }
        if let Some(before) = self.before {
            if entry.timestamp > before {
                return false;
            }
        }
        true
    }
}

/// Whether a detail key is flagged sensitive.
///
/// The flag is by naming convention: anything that looks like a contact
/// channel (contact, email, phone) is stripped before storage.
pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.contains("contact") || key.contains("email") || key.contains("phone")
}

/// Redact flagged-sensitive fields from a detail map.
///
/// Redaction replaces the value with [`REDACTED`]; the original value is
/// gone for good.
pub fn sanitize_detail(detail: BTreeMap<String, String>) -> BTreeMap<String, String> {
    detail
        .into_iter()
        .map(|(key, value)| {
            if is_sensitive_key(&key) {
                (key, REDACTED.to_string())
            } else {
                (key, value)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(actor: &str, action: AuditAction, timestamp: i64) -> AuditTrailEntry {
        AuditTrailEntry {
            sequence: 1,
            certificate_id: CertificateId::new("CERT-1"),
            actor: actor.into(),
            action,
            reason: None,
            timestamp,
            detail: BTreeMap::new(),
        }
    }

    #[test]
    fn test_sanitize_redacts_contact_fields() {
        let mut detail = BTreeMap::new();
        detail.insert("farmer_contact".to_string(), "+91-98765".to_string());
        detail.insert("contact_email".to_string(), "a@b.example".to_string());
        detail.insert("PhoneNumber".to_string(), "12345".to_string());
        detail.insert("crop_type".to_string(), "Tomato".to_string());

        let sanitized = sanitize_detail(detail);
        assert_eq!(sanitized["farmer_contact"], REDACTED);
        assert_eq!(sanitized["contact_email"], REDACTED);
        assert_eq!(sanitized["PhoneNumber"], REDACTED);
        assert_eq!(sanitized["crop_type"], "Tomato");
    }

    #[test]
    fn test_filter_by_actor() {
        let filter = AuditFilter {
            actor: Some("inspector-1".into()),
            ..AuditFilter::default()
        };
        assert!(filter.matches(&entry("inspector-1", AuditAction::Create, 100)));
        assert!(!filter.matches(&entry("inspector-2", AuditAction::Create, 100)));
    }

    #[test]
    fn test_filter_by_action() {
        let filter = AuditFilter {
            action: Some(AuditAction::Update),
            ..AuditFilter::default()
        };
        assert!(filter.matches(&entry("a", AuditAction::Update, 100)));
        assert!(!filter.matches(&entry("a", AuditAction::Create, 100)));
    }

    #[test]
    fn test_filter_by_time_range_inclusive() {
        let filter = AuditFilter {
            after: Some(100),
            before: Some(200),
            ..AuditFilter::default()
        };
        assert!(filter.matches(&entry("a", AuditAction::Create, 100)));
        assert!(filter.matches(&entry("a", AuditAction::Create, 200)));
        assert!(!filter.matches(&entry("a", AuditAction::Create, 99)));
        assert!(!filter.matches(&entry("a", AuditAction::Create, 201)));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = AuditFilter::default();
        assert!(filter.matches(&entry("anyone", AuditAction::Create, 0)));
    }

    #[test]
    fn test_action_display() {
        assert_eq!(AuditAction::Create.to_string(), "CREATE");
        assert_eq!(AuditAction::Update.to_string(), "UPDATE");
    }
}
