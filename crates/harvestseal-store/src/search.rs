//! Advanced certificate search.
//!
//! Criteria combine with AND semantics: a certificate matches only if
//! every provided criterion matches its latest version. Relevance scoring
//! rewards exact field matches over substring matches, summed across
//! criteria. Pagination runs against a frozen snapshot of the ranked
//! results, so concurrent inserts and updates never skip or duplicate
//! rows within one snapshot's pages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use harvestseal_core::{CertificateContent, CertificateId, CertificateVersion, EventType};

/// Score contribution for an exact field match.
pub const EXACT_MATCH_WEIGHT: u32 = 10;

/// Score contribution for a substring match.
pub const PARTIAL_MATCH_WEIGHT: u32 = 4;

/// An inclusive timestamp range (Unix milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: i64,
    pub to: i64,
}

impl DateRange {
    /// True if `timestamp` falls inside the range, bounds included.
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.from && timestamp <= self.to
    }
}

/// What to search for. Every present field must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Free text matched against names, types, varieties, certification
    /// bodies, and participants.
    pub free_text: Option<String>,

    /// Exact farmer id.
    pub farmer_id: Option<String>,

    /// Crop type (exact or substring).
    pub crop_type: Option<String>,

    /// Harvest date window.
    pub harvest_date_range: Option<DateRange>,

    /// Certification kind (exact or substring), e.g. `ORGANIC`.
    pub certification_kind: Option<String>,

    /// Supply-chain event type.
    pub event_type: Option<EventType>,

    /// Supply-chain participant id (exact or substring).
    pub event_participant: Option<String>,
}

impl SearchCriteria {
    /// True if no criterion is present. Empty criteria are rejected
    /// upstream to prevent accidental full scans.
    pub fn is_empty(&self) -> bool {
        self.free_text.is_none()
            && self.farmer_id.is_none()
            && self.crop_type.is_none()
            && self.harvest_date_range.is_none()
            && self.certification_kind.is_none()
            && self.event_type.is_none()
            && self.event_participant.is_none()
    }
}

/// Which criterion a result matched. Reported for explainability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchField {
    FreeText,
    FarmerId,
    CropType,
    HarvestDate,
    CertificationKind,
    EventType,
    EventParticipant,
}

/// One ranked search hit. Derived data; never a source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub certificate_id: CertificateId,

    /// Summed match weights across criteria.
    pub relevance_score: u32,

    /// The criteria this certificate matched, in criteria order.
    pub matched_criteria: Vec<SearchField>,

    /// Latest version number at snapshot time.
    pub version: u32,

    /// Denormalized display fields.
    pub crop_type: String,
    pub farm_name: String,

    /// When the latest version was created (Unix milliseconds).
    pub updated_at: i64,
}

/// Opaque handle to a frozen result snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotToken(pub(crate) u64);

/// One page of ranked results plus the token to fetch the next page
/// from the same snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,

    /// Total hits in the snapshot, across all pages.
    pub total: usize,

    /// Offset of the first result in this page.
    pub offset: usize,

    /// Token identifying the snapshot this page came from.
    pub snapshot: SnapshotToken,

    /// Whether more results follow this page.
    pub has_more: bool,
}

/// Registry of frozen result snapshots, bounded in size.
///
/// Tokens are handed out in ascending order; when the registry is full
/// the oldest snapshot is evicted. A request against an evicted token
/// fails upstream as an invalid argument and the caller restarts the
/// search.
#[derive(Debug, Default)]
pub(crate) struct SnapshotRegistry {
    next_token: u64,
    snapshots: BTreeMap<u64, Arc<Vec<SearchResult>>>,
}

impl SnapshotRegistry {
    /// Freeze a result set and return its token.
    pub(crate) fn insert(
        &mut self,
        results: Arc<Vec<SearchResult>>,
        capacity: usize,
    ) -> SnapshotToken {
        let token = self.next_token;
        self.next_token += 1;
        self.snapshots.insert(token, results);
        while self.snapshots.len() > capacity.max(1) {
            self.snapshots.pop_first();
        }
        SnapshotToken(token)
    }

    /// Look up a snapshot, if it has not been evicted.
    pub(crate) fn get(&self, token: SnapshotToken) -> Option<Arc<Vec<SearchResult>>> {
        self.snapshots.get(&token.0).cloned()
    }
}

/// Slice one page out of a snapshot.
pub(crate) fn page_of(
    snapshot: &Arc<Vec<SearchResult>>,
    token: SnapshotToken,
    offset: usize,
    page_size: usize,
) -> SearchPage {
    let total = snapshot.len();
    let start = offset.min(total);
    let end = start.saturating_add(page_size).min(total);
    SearchPage {
        results: snapshot[start..end].to_vec(),
        total,
        offset: start,
        snapshot: token,
        has_more: end < total,
    }
}

/// Rank results: score descending, then most recently updated, then id
/// for a stable total order.
pub(crate) fn rank_results(results: &mut [SearchResult]) {
    results.sort_by(|a, b| {
        b.relevance_score
            .cmp(&a.relevance_score)
            .then(b.updated_at.cmp(&a.updated_at))
            .then(a.certificate_id.cmp(&b.certificate_id))
    });
}

/// How a text criterion matched a field.
enum TextMatch {
    Exact,
    Partial,
    Miss,
}

fn text_match(haystack: &str, needle: &str) -> TextMatch {
    if haystack.eq_ignore_ascii_case(needle) {
        TextMatch::Exact
    } else if haystack.to_lowercase().contains(&needle.to_lowercase()) {
        TextMatch::Partial
    } else {
        TextMatch::Miss
    }
}

/// Best match across several candidate fields.
fn best_text_match<'a, I>(haystacks: I, needle: &str) -> TextMatch
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best = TextMatch::Miss;
    for haystack in haystacks {
        match text_match(haystack, needle) {
            TextMatch::Exact => return TextMatch::Exact,
            TextMatch::Partial => best = TextMatch::Partial,
            TextMatch::Miss => {}
        }
    }
    best
}

/// Fields the free-text criterion is matched against.
fn free_text_haystacks<'a>(content: &'a CertificateContent) -> impl Iterator<Item = &'a str> {
    let farm = [
        content.farm.farm_name.as_str(),
        content.farm.farm_type.as_str(),
    ];
    let harvest = [
        content.harvest.crop_type.as_str(),
        content.harvest.variety.as_str(),
    ];
    let soil = [content.soil.soil_type.as_str()];
    let certifications = content
        .certifications
        .iter()
        .flat_map(|c| [c.kind.as_str(), c.issuing_body.as_str()]);
    let participants = content
        .supply_chain_events
        .iter()
        .map(|e| e.participant_id.as_str());
    farm.into_iter()
        .chain(harvest)
        .chain(soil)
        .chain(certifications)
        .chain(participants)
}

/// Evaluate criteria against a certificate's latest version.
///
/// Returns the summed relevance score and the matched criteria, or
/// `None` if any provided criterion fails to match.
pub(crate) fn evaluate(
    criteria: &SearchCriteria,
    latest: &CertificateVersion,
) -> Option<(u32, Vec<SearchField>)> {
    let content = &latest.content;
    let mut score = 0u32;
    let mut matched = Vec::new();

    if let Some(text) = &criteria.free_text {
        match best_text_match(free_text_haystacks(content), text) {
            TextMatch::Exact => {
                score += EXACT_MATCH_WEIGHT;
                matched.push(SearchField::FreeText);
            }
            TextMatch::Partial => {
                score += PARTIAL_MATCH_WEIGHT;
                matched.push(SearchField::FreeText);
            }
            TextMatch::Miss => return None,
        }
    }

    if let Some(farmer_id) = &criteria.farmer_id {
        if content.farm.farmer_id == *farmer_id {
            score += EXACT_MATCH_WEIGHT;
            matched.push(SearchField::FarmerId);
        } else {
            return None;
        }
    }

    if let Some(crop) = &criteria.crop_type {
        match text_match(&content.harvest.crop_type, crop) {
            TextMatch::Exact => {
                score += EXACT_MATCH_WEIGHT;
                matched.push(SearchField::CropType);
            }
            TextMatch::Partial => {
                score += PARTIAL_MATCH_WEIGHT;
                matched.push(SearchField::CropType);
            }
            TextMatch::Miss => return None,
        }
    }

    if let Some(range) = &criteria.harvest_date_range {
        if range.contains(content.harvest.harvest_date) {
            score += EXACT_MATCH_WEIGHT;
            matched.push(SearchField::HarvestDate);
        } else {
            return None;
        }
    }

    if let Some(kind) = &criteria.certification_kind {
        match best_text_match(
            content.certifications.iter().map(|c| c.kind.as_str()),
            kind,
        ) {
            TextMatch::Exact => {
                score += EXACT_MATCH_WEIGHT;
                matched.push(SearchField::CertificationKind);
            }
            TextMatch::Partial => {
                score += PARTIAL_MATCH_WEIGHT;
                matched.push(SearchField::CertificationKind);
            }
            TextMatch::Miss => return None,
        }
    }

    if let Some(event_type) = criteria.event_type {
        if content
            .supply_chain_events
            .iter()
            .any(|e| e.event_type == event_type)
        {
            score += EXACT_MATCH_WEIGHT;
            matched.push(SearchField::EventType);
        } else {
            return None;
        }
    }

    if let Some(participant) = &criteria.event_participant {
        match best_text_match(
            content
                .supply_chain_events
                .iter()
                .map(|e| e.participant_id.as_str()),
            participant,
        ) {
            TextMatch::Exact => {
                score += EXACT_MATCH_WEIGHT;
                matched.push(SearchField::EventParticipant);
            }
            TextMatch::Partial => {
                score += PARTIAL_MATCH_WEIGHT;
                matched.push(SearchField::EventParticipant);
            }
            TextMatch::Miss => return None,
        }
    }

    Some((score, matched))
}

/// Build a result row from an evaluated version.
pub(crate) fn result_row(
    latest: &CertificateVersion,
    score: u32,
    matched: Vec<SearchField>,
) -> SearchResult {
    SearchResult {
        certificate_id: latest.id.clone(),
        relevance_score: score,
        matched_criteria: matched,
        version: latest.version,
        crop_type: latest.content.harvest.crop_type.clone(),
        farm_name: latest.content.farm.farm_name.clone(),
        updated_at: latest.created_at,
    }
}
