//! The Engine: unified API for certificate integrity and versioning.
//!
//! The engine ties content validation, canonical hashing, sealing, and
//! the store into one interface. It owns the optimistic-concurrency
//! check: an update must name the version its caller last observed, and
//! fails with a conflict if the chain has moved past it.

use std::collections::BTreeMap;
use std::sync::Arc;

use harvestseal_core::{
    validate_delta, validate_new_content, verify_chain, CertificateContent, CertificateDelta,
    CertificateId, CertificateVersion, IssuerPublicKey, VerificationReport, VersionSummary,
};
use harvestseal_store::{
    AuditFilter, AuditTrailEntry, Certificate, CertificateStore, NewAuditEntry, SearchCriteria,
    SearchPage, SnapshotToken, Statistics, StoreError,
};

use crate::capability::{CapabilityError, IdGenerator, SigningKeyProvider};
use crate::error::{EngineError, Result};

/// Configuration for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Whether new versions are sealed with the issuer key.
    pub enable_seals: bool,

    /// Prefix handed to the id generator for new certificates.
    pub id_prefix: String,

    /// Longest accepted certificate id, in bytes.
    pub max_id_length: usize,

    /// Page size used when the caller does not pass one.
    pub default_page_size: usize,

    /// Hard cap on requested page sizes.
    pub max_page_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_seals: true,
            id_prefix: "AGRI".to_string(),
            max_id_length: 64,
            default_page_size: 20,
            max_page_size: 50,
        }
    }
}

/// The inputs of one certificate update.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub certificate_id: CertificateId,

    /// The version the caller last read. The update fails with a
    /// conflict if the chain head has moved past it.
    pub observed_version: u32,

    pub delta: CertificateDelta,
    pub updated_by: String,
    pub reason: String,

    /// Extra audit detail. Sensitive keys are redacted when the entry
    /// is appended.
    pub detail: BTreeMap<String, String>,
}

impl UpdateRequest {
    pub fn new(
        certificate_id: CertificateId,
        observed_version: u32,
        delta: CertificateDelta,
        updated_by: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            certificate_id,
            observed_version,
            delta,
            updated_by: updated_by.into(),
            reason: reason.into(),
            detail: BTreeMap::new(),
        }
    }

    /// Attach one audit detail entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.detail.insert(key.into(), value.into());
        self
    }
}

/// The main engine struct.
///
/// Provides a unified API for:
/// - Creating and updating certificates
/// - Querying versions, history, and audit trails
/// - Verifying version chains
/// - Searching and aggregate statistics
pub struct Engine {
    /// The certificate store.
    store: Arc<CertificateStore>,
    /// Mints certificate ids.
    ids: Arc<dyn IdGenerator>,
    /// Supplies the issuer keypair for sealing.
    keys: Arc<dyn SigningKeyProvider>,
    /// Configuration.
    config: EngineConfig,
}

impl Engine {
    /// Create a new engine over an existing store.
    pub fn new(
        store: Arc<CertificateStore>,
        ids: Arc<dyn IdGenerator>,
        keys: Arc<dyn SigningKeyProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            ids,
            keys,
            config,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &CertificateStore {
        &self.store
    }

    /// The issuer's public key, for out-of-process seal verification.
    pub async fn issuer_public_key(&self) -> Result<IssuerPublicKey> {
        Ok(self.keys.issuer_keypair().await?.public_key())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Certificate Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a certificate at version 1 from validated content.
    ///
    /// Mints an id through the injected generator, computes the content
    /// hash and Merkle root, seals the version when sealing is enabled,
    /// and records a creation audit entry.
    pub async fn create_certificate(
        &self,
        content: CertificateContent,
        created_by: &str,
    ) -> Result<Arc<CertificateVersion>> {
        validate_new_content(&content)?;

        let id = self.ids.generate_id(&self.config.id_prefix).await?;
        self.check_id_shape(&id)?;
        let id = CertificateId::new(id);

        let mut version =
            CertificateVersion::build(id.clone(), 1, content, None, now_millis(), created_by)?;
        if self.config.enable_seals {
            let keypair = self.keys.issuer_keypair().await?;
            version = version.with_seal(&keypair);
        }

        self.store
            .insert_certificate(version, NewAuditEntry::create(created_by))
            .map_err(|err| match err {
                // The generator promised uniqueness
                StoreError::DuplicateCertificate(id) => EngineError::Dependency(
                    CapabilityError::IdGeneration(format!("generated id collides: {}", id)),
                ),
                other => other.into(),
            })
    }

    /// Append the next version of a certificate.
    ///
    /// The request's delta is validated against the current chain head,
    /// the new version links back to it by content hash, and an update
    /// audit entry is recorded. Fails with [`EngineError::Conflict`] if
    /// the head is no longer at the observed version.
    pub async fn update_certificate(
        &self,
        request: UpdateRequest,
    ) -> Result<Arc<CertificateVersion>> {
        let UpdateRequest {
            certificate_id,
            observed_version,
            delta,
            updated_by,
            reason,
            detail,
        } = request;

        let guard = self.store.begin_update(&certificate_id).await?;
        let head = guard.latest();

        if head.version != observed_version {
            return Err(EngineError::Conflict {
                certificate_id,
                observed: observed_version,
                current: head.version,
            });
        }

        validate_delta(&delta, &head.content, &certificate_id)?;
        let content = head.content.with_delta(&delta);

        let mut version = CertificateVersion::build(
            certificate_id,
            head.version + 1,
            content,
            Some(head.content_hash),
            now_millis(),
            &updated_by,
        )?;
        if self.config.enable_seals {
            let keypair = self.keys.issuer_keypair().await?;
            version = version.with_seal(&keypair);
        }

        let mut audit = NewAuditEntry::update(updated_by, reason);
        audit.detail = detail;
        audit = audit.with_detail(
            "events_appended",
            delta.append_events.len().to_string(),
        );
        if delta.replace_certifications.is_some() {
            audit = audit.with_detail("certifications_replaced", "true");
        }

        Ok(guard.commit(version, audit)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a certificate's latest version and chain size.
    pub fn get_certificate(&self, id: &CertificateId) -> Result<Certificate> {
        Ok(self.store.get_certificate(id)?)
    }

    /// Get one specific version of a certificate.
    pub fn get_certificate_version(
        &self,
        id: &CertificateId,
        version: u32,
    ) -> Result<Arc<CertificateVersion>> {
        Ok(self.store.get_version(id, version)?)
    }

    /// Get a certificate's version history, oldest first.
    pub fn get_version_history(&self, id: &CertificateId) -> Result<Vec<VersionSummary>> {
        let chain = self.store.get_chain(id)?;
        Ok(chain.iter().map(|v| v.summary()).collect())
    }

    /// Whether a certificate with this id exists.
    pub fn certificate_exists(&self, id: &CertificateId) -> bool {
        self.store.has_certificate(id)
    }

    /// Look up several certificates at once.
    ///
    /// Missing ids are skipped; results come back in request order. An
    /// empty id list is rejected.
    pub fn get_certificates(&self, ids: &[CertificateId]) -> Result<Vec<Certificate>> {
        if ids.is_empty() {
            return Err(EngineError::InvalidArgument(
                "no certificate ids provided".to_string(),
            ));
        }
        Ok(self.store.get_certificates(ids))
    }

    /// Get a certificate's audit trail, filtered and ordered by
    /// `(timestamp, sequence)`.
    pub fn get_audit_trail(
        &self,
        id: &CertificateId,
        filter: &AuditFilter,
    ) -> Result<Vec<Arc<AuditTrailEntry>>> {
        Ok(self.store.get_audit_trail(id, filter)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Replay a certificate's chain and report its integrity.
    ///
    /// A broken chain is a finding, not a failure: the report carries
    /// the precise first break and a confidence classification. Only a
    /// missing certificate is an error.
    pub fn verify_certificate(&self, id: &CertificateId) -> Result<VerificationReport> {
        let chain = self.store.get_chain(id)?;
        let report = verify_chain(chain.iter().map(Arc::as_ref));
        if !report.is_valid {
            if let Some(error) = report.errors.first() {
                tracing::warn!("Certificate {} failed verification: {}", id, error);
            }
        }
        Ok(report)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search and Statistics
    // ─────────────────────────────────────────────────────────────────────────

    /// Search latest versions with AND-combined criteria.
    ///
    /// Returns the first page of ranked results plus a snapshot token;
    /// later pages come from [`search_page`](Self::search_page) and see
    /// exactly the results frozen here.
    pub fn advanced_search(
        &self,
        criteria: &SearchCriteria,
        page_size: Option<usize>,
    ) -> Result<SearchPage> {
        let page_size = self.clamp_page_size(page_size)?;
        Ok(self.store.advanced_search(criteria, page_size)?)
    }

    /// Fetch a further page from a search snapshot.
    pub fn search_page(
        &self,
        token: SnapshotToken,
        offset: usize,
        page_size: Option<usize>,
    ) -> Result<SearchPage> {
        let page_size = self.clamp_page_size(page_size)?;
        Ok(self.store.search_page(token, offset, page_size)?)
    }

    /// Store-wide aggregates, computed on demand.
    pub fn get_statistics(&self) -> Statistics {
        self.store.statistics()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Shape-check a generated id. The generator owns uniqueness; the
    /// engine only refuses ids it could not round-trip.
    fn check_id_shape(&self, id: &str) -> Result<()> {
        let reason = if id.trim().is_empty() {
            Some("empty id".to_string())
        } else if id.len() > self.config.max_id_length {
            Some(format!(
                "id longer than {} bytes",
                self.config.max_id_length
            ))
        } else if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            Some("id contains non id-safe characters".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => {
                tracing::warn!("Rejected generated certificate id: {}", reason);
                Err(EngineError::Dependency(CapabilityError::IdGeneration(
                    reason,
                )))
            }
            None => Ok(()),
        }
    }

    fn clamp_page_size(&self, page_size: Option<usize>) -> Result<usize> {
        match page_size {
            Some(0) => Err(EngineError::InvalidArgument(
                "page size must be positive".to_string(),
            )),
            Some(n) => Ok(n.min(self.config.max_page_size)),
            None => Ok(self.config.default_page_size),
        }
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
