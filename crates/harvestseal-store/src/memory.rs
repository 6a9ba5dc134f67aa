//! In-memory certificate store.
//!
//! Version chains and audit trails live behind per-certificate entries.
//! Reads hand out `Arc` snapshots and never block behind writers of
//! other certificates. Writes to one certificate are linearized through
//! an [`UpdateGuard`]: at most one update is in flight per certificate,
//! while updates to different certificates proceed in parallel.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::OwnedMutexGuard;

use harvestseal_core::{CertificateId, CertificateVersion};

use crate::audit::{sanitize_detail, AuditFilter, AuditTrailEntry, NewAuditEntry};
use crate::error::{Result, StoreError};
use crate::search::{
    evaluate, page_of, rank_results, result_row, SearchCriteria, SearchPage, SnapshotRegistry,
    SnapshotToken,
};

/// Default bound on live search snapshots.
pub const DEFAULT_MAX_SNAPSHOTS: usize = 64;

/// A certificate as callers see it: the latest version plus chain size.
#[derive(Debug, Clone)]
pub struct Certificate {
    pub latest: Arc<CertificateVersion>,
    pub version_count: u32,
}

/// Store-wide aggregates, computed on demand from live state.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Statistics {
    pub total_certificates: usize,
    pub total_versions: usize,

    /// Supply-chain events across all latest versions.
    pub total_events: usize,

    /// Certificates whose latest version carries an issuer seal.
    pub sealed_certificates: usize,

    pub certificates_by_crop: BTreeMap<String, usize>,
    pub certificates_by_farm_type: BTreeMap<String, usize>,

    /// `total_events / total_certificates`, 0.0 for an empty store.
    pub average_events_per_certificate: f64,
}

/// In-memory certificate store.
///
/// All data is lost when the store is dropped. Thread-safe; intended to
/// be shared behind an `Arc`.
pub struct CertificateStore {
    entries: RwLock<HashMap<CertificateId, Arc<CertEntry>>>,

    /// Store-wide audit sequence. Shared with update guards so commits
    /// can stamp entries without going back through the store.
    audit_seq: Arc<AtomicU64>,

    snapshots: Mutex<SnapshotRegistry>,
    max_snapshots: usize,
}

/// Per-certificate state. The chain is never empty: an entry is created
/// with version 1 and commits only append.
struct CertEntry {
    /// Serializes updates to this certificate.
    update_lock: Arc<tokio::sync::Mutex<()>>,

    /// The version chain, oldest first.
    chain: RwLock<Vec<Arc<CertificateVersion>>>,

    /// Audit entries for this certificate, in append order.
    audit: RwLock<Vec<Arc<AuditTrailEntry>>>,
}

impl CertEntry {
    fn latest(&self) -> Arc<CertificateVersion> {
        self.chain
            .read()
            .unwrap()
            .last()
            .cloned()
            .expect("chain never empty")
    }
}

impl CertificateStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::with_max_snapshots(DEFAULT_MAX_SNAPSHOTS)
    }

    /// Create a store with a custom bound on live search snapshots.
    pub fn with_max_snapshots(max_snapshots: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            audit_seq: Arc::new(AtomicU64::new(0)),
            snapshots: Mutex::new(SnapshotRegistry::default()),
            max_snapshots,
        }
    }

    /// Insert a brand-new certificate at version 1.
    ///
    /// The audit entry is stamped with the next store-wide sequence and
    /// the current time, and its detail map is sanitized.
    pub fn insert_certificate(
        &self,
        version: CertificateVersion,
        audit: NewAuditEntry,
    ) -> Result<Arc<CertificateVersion>> {
        if version.version != 1 || version.previous_version_hash.is_some() {
            return Err(StoreError::InvalidData(format!(
                "new certificate must start at version 1 with no previous link, got version {}",
                version.version
            )));
        }

        let mut entries = self.entries.write().unwrap();
        if entries.contains_key(&version.id) {
            return Err(StoreError::DuplicateCertificate(version.id.clone()));
        }

        let id = version.id.clone();
        let stamped = stamp(&self.audit_seq, &id, audit);
        let version = Arc::new(version);
        entries.insert(
            id,
            Arc::new(CertEntry {
                update_lock: Arc::new(tokio::sync::Mutex::new(())),
                chain: RwLock::new(vec![version.clone()]),
                audit: RwLock::new(vec![Arc::new(stamped)]),
            }),
        );

        Ok(version)
    }

    /// Acquire the exclusive update slot for one certificate.
    ///
    /// Resolves once every earlier update to the same certificate has
    /// committed or been dropped. Holds no store-wide lock while
    /// waiting, so updates to other certificates are unaffected.
    pub async fn begin_update(&self, id: &CertificateId) -> Result<UpdateGuard> {
        let entry = {
            let entries = self.entries.read().unwrap();
            entries
                .get(id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.clone()))?
        };

        let permit = entry.update_lock.clone().lock_owned().await;
        Ok(UpdateGuard {
            entry,
            certificate_id: id.clone(),
            audit_seq: self.audit_seq.clone(),
            _permit: permit,
        })
    }

    /// Look up a certificate's latest version and chain size.
    pub fn get_certificate(&self, id: &CertificateId) -> Result<Certificate> {
        let entry = self.entry(id)?;
        let chain = entry.chain.read().unwrap();
        let latest = chain.last().cloned().expect("chain never empty");
        Ok(Certificate {
            latest,
            version_count: chain.len() as u32,
        })
    }

    /// Look up one specific version.
    pub fn get_version(&self, id: &CertificateId, version: u32) -> Result<Arc<CertificateVersion>> {
        let entry = self.entry(id)?;
        let chain = entry.chain.read().unwrap();
        version
            .checked_sub(1)
            .and_then(|index| chain.get(index as usize))
            .cloned()
            .ok_or(StoreError::VersionNotFound {
                id: id.clone(),
                version,
            })
    }

    /// Snapshot the full version chain, oldest first.
    pub fn get_chain(&self, id: &CertificateId) -> Result<Vec<Arc<CertificateVersion>>> {
        let entry = self.entry(id)?;
        let chain = entry.chain.read().unwrap();
        Ok(chain.clone())
    }

    /// Whether a certificate with this id exists.
    pub fn has_certificate(&self, id: &CertificateId) -> bool {
        self.entries.read().unwrap().contains_key(id)
    }

    /// Look up several certificates at once, skipping missing ids.
    ///
    /// Results come back in request order.
    pub fn get_certificates(&self, ids: &[CertificateId]) -> Vec<Certificate> {
        ids.iter()
            .filter_map(|id| self.get_certificate(id).ok())
            .collect()
    }

    /// A certificate's audit trail, filtered, ordered by
    /// `(timestamp, sequence)`.
    pub fn get_audit_trail(
        &self,
        id: &CertificateId,
        filter: &AuditFilter,
    ) -> Result<Vec<Arc<AuditTrailEntry>>> {
        let entry = self.entry(id)?;
        let audit = entry.audit.read().unwrap();
        let mut entries: Vec<Arc<AuditTrailEntry>> = audit
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.timestamp, e.sequence));
        Ok(entries)
    }

    /// Run a search and freeze its ranked results as a new snapshot.
    ///
    /// Returns the first page; subsequent pages come from
    /// [`search_page`](Self::search_page) with the returned token.
    pub fn advanced_search(
        &self,
        criteria: &SearchCriteria,
        page_size: usize,
    ) -> Result<SearchPage> {
        if criteria.is_empty() {
            return Err(StoreError::EmptyCriteria);
        }

        let latests: Vec<Arc<CertificateVersion>> = {
            let entries = self.entries.read().unwrap();
            entries.values().map(|entry| entry.latest()).collect()
        };

        let mut results = Vec::new();
        for latest in &latests {
            if let Some((score, matched)) = evaluate(criteria, latest) {
                results.push(result_row(latest, score, matched));
            }
        }
        rank_results(&mut results);

        let results = Arc::new(results);
        let token = {
            let mut snapshots = self.snapshots.lock().unwrap();
            snapshots.insert(results.clone(), self.max_snapshots)
        };
        Ok(page_of(&results, token, 0, page_size))
    }

    /// Fetch a page from an existing search snapshot.
    ///
    /// The snapshot is immutable: writes that landed after the search
    /// never appear in its pages, and no result is skipped or repeated.
    pub fn search_page(
        &self,
        token: SnapshotToken,
        offset: usize,
        page_size: usize,
    ) -> Result<SearchPage> {
        let snapshot = {
            let snapshots = self.snapshots.lock().unwrap();
            snapshots.get(token).ok_or(StoreError::UnknownSnapshot)?
        };
        Ok(page_of(&snapshot, token, offset, page_size))
    }

    /// Compute store-wide aggregates from live state.
    pub fn statistics(&self) -> Statistics {
        let entries: Vec<Arc<CertEntry>> = {
            let entries = self.entries.read().unwrap();
            entries.values().cloned().collect()
        };

        let mut stats = Statistics {
            total_certificates: entries.len(),
            total_versions: 0,
            total_events: 0,
            sealed_certificates: 0,
            certificates_by_crop: BTreeMap::new(),
            certificates_by_farm_type: BTreeMap::new(),
            average_events_per_certificate: 0.0,
        };

        for entry in &entries {
            let chain = entry.chain.read().unwrap();
            stats.total_versions += chain.len();
            let latest = chain.last().expect("chain never empty");
            stats.total_events += latest.content.supply_chain_events.len();
            if latest.is_sealed() {
                stats.sealed_certificates += 1;
            }
            *stats
                .certificates_by_crop
                .entry(latest.content.harvest.crop_type.clone())
                .or_default() += 1;
            *stats
                .certificates_by_farm_type
                .entry(latest.content.farm.farm_type.clone())
                .or_default() += 1;
        }

        if stats.total_certificates > 0 {
            stats.average_events_per_certificate =
                stats.total_events as f64 / stats.total_certificates as f64;
        }
        stats
    }

    fn entry(&self, id: &CertificateId) -> Result<Arc<CertEntry>> {
        self.entries
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

impl Default for CertificateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive update slot for one certificate.
///
/// Holding the guard blocks other updates to the same certificate but
/// never blocks readers. Dropping the guard without committing releases
/// the slot with no change.
pub struct UpdateGuard {
    entry: Arc<CertEntry>,
    certificate_id: CertificateId,
    audit_seq: Arc<AtomicU64>,
    _permit: OwnedMutexGuard<()>,
}

impl UpdateGuard {
    /// The certificate this guard locks.
    pub fn certificate_id(&self) -> &CertificateId {
        &self.certificate_id
    }

    /// The chain head as of this guard. Stable until this guard commits:
    /// no other update can land while the guard is held.
    pub fn latest(&self) -> Arc<CertificateVersion> {
        self.entry.latest()
    }

    /// Append the next version and its audit entry, then release the slot.
    ///
    /// The version must continue the chain: its number one past the
    /// current head, its previous-version link the head's content hash.
    pub fn commit(
        self,
        version: CertificateVersion,
        audit: NewAuditEntry,
    ) -> Result<Arc<CertificateVersion>> {
        let mut chain = self.entry.chain.write().unwrap();
        let head = chain.last().expect("chain never empty");

        if version.version != head.version + 1 {
            tracing::warn!(
                "Commit rejected for {}: expected version {}, got {}",
                self.certificate_id,
                head.version + 1,
                version.version
            );
            return Err(StoreError::InvalidData(format!(
                "expected version {}, got {}",
                head.version + 1,
                version.version
            )));
        }
        if version.previous_version_hash != Some(head.content_hash) {
            tracing::warn!(
                "Commit rejected for {}: previous-version link does not match chain head",
                self.certificate_id
            );
            return Err(StoreError::InvalidData(
                "previous-version link does not match chain head".to_string(),
            ));
        }

        let stamped = stamp(&self.audit_seq, &self.certificate_id, audit);
        let version = Arc::new(version);
        chain.push(version.clone());
        drop(chain);

        self.entry.audit.write().unwrap().push(Arc::new(stamped));
        Ok(version)
    }
}

/// Stamp a new audit entry with the next store-wide sequence and the
/// current time, sanitizing its detail map.
fn stamp(seq: &AtomicU64, certificate_id: &CertificateId, new: NewAuditEntry) -> AuditTrailEntry {
    AuditTrailEntry {
        sequence: seq.fetch_add(1, Ordering::SeqCst) + 1,
        certificate_id: certificate_id.clone(),
        actor: new.actor,
        action: new.action,
        reason: new.reason,
        timestamp: now_millis(),
        detail: sanitize_detail(new.detail),
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
