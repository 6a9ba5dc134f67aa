//! Certificate content: the data a provenance certificate attests.
//!
//! Content is immutable per version. Updates never edit content in place;
//! they produce a new version whose content was derived from the previous
//! one via a [`CertificateDelta`]. Supply-chain events are append-only
//! within a version lineage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Geographic coordinates captured in the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Degrees, positive north. Valid range [-90, 90].
    pub latitude: f64,

    /// Degrees, positive east. Valid range [-180, 180].
    pub longitude: f64,

    /// GPS accuracy radius in meters, when the capture device reported one.
    pub accuracy_meters: Option<f64>,

    /// When the fix was taken (Unix milliseconds).
    pub captured_at: Option<i64>,
}

impl GeoPoint {
    /// A point with just coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters: None,
            captured_at: None,
        }
    }
}

/// Identity and registration of the originating farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmProfile {
    /// Registered farmer identifier.
    pub farmer_id: String,

    /// Human-readable farm name.
    pub farm_name: String,

    /// Where the farm is.
    pub location: GeoPoint,

    /// Cultivated area in hectares.
    pub farm_size_hectares: f64,

    /// Production style, e.g. `ORGANIC` or `CONVENTIONAL`.
    pub farm_type: String,

    /// Government registration number, if the farm has one.
    pub registration_number: Option<String>,

    /// Names of certifications the farm holds (free-form, distinct from
    /// the batch-level [`Certification`] records).
    pub certifications: Vec<String>,
}

/// Laboratory soil analysis for the growing plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilReport {
    /// Lab-assigned report identifier.
    pub report_id: String,

    /// The testing laboratory.
    pub testing_lab_id: String,

    /// When the sample was tested (Unix milliseconds).
    pub test_date: i64,

    /// Soil classification, e.g. `LOAMY`.
    pub soil_type: String,

    /// Measured pH.
    pub ph_level: f64,

    /// Organic matter, percent by weight.
    pub organic_matter_pct: f64,

    /// Nitrogen, parts per million.
    pub nitrogen_ppm: f64,

    /// Phosphorus, parts per million.
    pub phosphorus_ppm: f64,

    /// Potassium, parts per million.
    pub potassium_ppm: f64,

    /// Lab certification outcome, e.g. `CERTIFIED`.
    pub certification_status: String,
}

/// What was harvested, when, and in what quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestDetails {
    /// Identifier of this harvest batch.
    pub harvest_id: String,

    /// Crop, e.g. `Tomato`.
    pub crop_type: String,

    /// Cultivar, e.g. `Cherry Tomato`.
    pub variety: String,

    /// Planting date (Unix milliseconds).
    pub planting_date: i64,

    /// Harvest date (Unix milliseconds).
    pub harvest_date: i64,

    /// Harvested quantity in `unit`s.
    pub quantity: f64,

    /// Unit of `quantity`, e.g. `KG`.
    pub unit: String,

    /// Assessed quality grade, e.g. `A`.
    pub quality_grade: String,
}

/// A third-party certification attached to the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    /// Identifier of this certification record.
    pub certification_id: String,

    /// Certification kind, e.g. `ORGANIC` or `FAIR_TRADE`.
    pub kind: String,

    /// Who issued it.
    pub issuing_body: String,

    /// Issue date (Unix milliseconds).
    pub issue_date: i64,

    /// Expiry date (Unix milliseconds).
    pub expiry_date: i64,

    /// The certificate number printed on the paper document.
    pub certificate_number: String,
}

/// Stage of the supply chain an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Processing,
    Transport,
    Retail,
}

impl EventType {
    /// Wire/display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Processing => "PROCESSING",
            EventType::Transport => "TRANSPORT",
            EventType::Retail => "RETAIL",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A primitive value in an event's open data map.
///
/// `event_data` is domain-defined; the engine constrains it to this closed
/// set of primitive kinds instead of accepting arbitrary dynamic values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventValue {
    Text(String),
    Number(f64),
    Flag(bool),
    Timestamp(i64),
}

impl EventValue {
    /// A timestamp value (Unix milliseconds).
    ///
    /// Explicit constructor because a bare integer would be ambiguous
    /// between `Number` and `Timestamp`.
    pub fn timestamp(millis: i64) -> Self {
        EventValue::Timestamp(millis)
    }
}

impl From<&str> for EventValue {
    fn from(s: &str) -> Self {
        EventValue::Text(s.to_owned())
    }
}

impl From<String> for EventValue {
    fn from(s: String) -> Self {
        EventValue::Text(s)
    }
}

impl From<f64> for EventValue {
    fn from(n: f64) -> Self {
        EventValue::Number(n)
    }
}

impl From<bool> for EventValue {
    fn from(b: bool) -> Self {
        EventValue::Flag(b)
    }
}

/// One hop in the batch's supply-chain journey.
///
/// Submitted by supply-chain participants through certificate updates.
/// The engine validates the envelope fields only; `event_data` content is
/// the participant's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyChainEvent {
    /// Identifier of this event.
    pub event_id: String,

    /// The certificate this event belongs to. Must match the certificate
    /// being updated.
    pub certificate_id: String,

    /// Supply-chain stage.
    pub event_type: EventType,

    /// The participant that recorded the event.
    pub participant_id: String,

    /// When the event happened (Unix milliseconds).
    pub timestamp: i64,

    /// Where the event happened, if captured.
    pub location: Option<GeoPoint>,

    /// Open, domain-defined details.
    pub event_data: BTreeMap<String, EventValue>,

    /// Participant attestation, carried opaquely. The engine verifies
    /// issuer seals only; participant signatures are between participants.
    pub participant_signature: Option<String>,
}

/// Everything a certificate version attests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateContent {
    pub farm: FarmProfile,
    pub harvest: HarvestDetails,
    pub soil: SoilReport,
    pub certifications: Vec<Certification>,
    pub supply_chain_events: Vec<SupplyChainEvent>,
}

impl CertificateContent {
    /// Derive the content of the next version by applying a delta.
    ///
    /// Events append after the existing journey; a certification
    /// replacement swaps the whole list. The delta must already be
    /// validated against this content.
    pub fn with_delta(&self, delta: &CertificateDelta) -> CertificateContent {
        let mut next = self.clone();
        next.supply_chain_events
            .extend(delta.append_events.iter().cloned());
        if let Some(certifications) = &delta.replace_certifications {
            next.certifications = certifications.clone();
        }
        next
    }
}

/// The changes an update applies to the latest content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificateDelta {
    /// Events to append to the journey, in order.
    pub append_events: Vec<SupplyChainEvent>,

    /// Replacement certification list, when certifications are amended.
    pub replace_certifications: Option<Vec<Certification>>,
}

impl CertificateDelta {
    /// True if the delta would change nothing.
    pub fn is_empty(&self) -> bool {
        self.append_events.is_empty() && self.replace_certifications.is_none()
    }

    /// A delta that only appends events.
    pub fn events(events: Vec<SupplyChainEvent>) -> Self {
        Self {
            append_events: events,
            ..Self::default()
        }
    }
}
