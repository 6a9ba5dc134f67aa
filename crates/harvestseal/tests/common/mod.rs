//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use harvestseal::capability::{CapabilityError, IdGenerator, SigningKeyProvider, StaticKeyProvider};
use harvestseal::core::{
    Certification, CertificateContent, EventType, EventValue, FarmProfile, GeoPoint,
    HarvestDetails, IssuerKeypair, SoilReport, SupplyChainEvent,
};
use harvestseal::{CertificateStore, Engine, EngineConfig};

pub fn sample_content() -> CertificateContent {
    CertificateContent {
        farm: FarmProfile {
            farmer_id: "FARMER-001".into(),
            farm_name: "Green Valley Organic Farm".into(),
            location: GeoPoint {
                latitude: 28.6139,
                longitude: 77.2090,
                accuracy_meters: Some(5.0),
                captured_at: Some(1_724_300_000_000),
            },
            farm_size_hectares: 12.5,
            farm_type: "ORGANIC".into(),
            registration_number: Some("REG-4431".into()),
            certifications: vec!["NPOP".into()],
        },
        harvest: HarvestDetails {
            harvest_id: "HARVEST-001".into(),
            crop_type: "Tomato".into(),
            variety: "Cherry Tomato".into(),
            planting_date: 1_717_200_000_000,
            harvest_date: 1_724_200_000_000,
            quantity: 2500.0,
            unit: "KG".into(),
            quality_grade: "A".into(),
        },
        soil: SoilReport {
            report_id: "SOIL-001".into(),
            testing_lab_id: "LAB-22".into(),
            test_date: 1_716_000_000_000,
            soil_type: "LOAMY".into(),
            ph_level: 6.8,
            organic_matter_pct: 3.2,
            nitrogen_ppm: 42.0,
            phosphorus_ppm: 18.0,
            potassium_ppm: 156.0,
            certification_status: "CERTIFIED".into(),
        },
        certifications: vec![Certification {
            certification_id: "CERTN-001".into(),
            kind: "ORGANIC".into(),
            issuing_body: "India Organic".into(),
            issue_date: 1_700_000_000_000,
            expiry_date: 1_763_000_000_000,
            certificate_number: "IO-2024-8812".into(),
        }],
        supply_chain_events: Vec::new(),
    }
}

/// Sample content with a different crop and farm, for search scenarios.
pub fn content_with_crop(crop: &str, farm_name: &str) -> CertificateContent {
    let mut content = sample_content();
    content.harvest.crop_type = crop.into();
    content.farm.farm_name = farm_name.into();
    content
}

pub fn sample_event(certificate_id: &str, event_id: &str) -> SupplyChainEvent {
    let mut event_data = BTreeMap::new();
    event_data.insert("facility".to_string(), EventValue::from("Sunrise Packing"));
    event_data.insert("batch_weight_kg".to_string(), EventValue::from(2480.0));
    event_data.insert("organic_line".to_string(), EventValue::from(true));
    SupplyChainEvent {
        event_id: event_id.into(),
        certificate_id: certificate_id.into(),
        event_type: EventType::Processing,
        participant_id: "PROCESSOR-07".into(),
        timestamp: 1_724_400_000_000,
        location: Some(GeoPoint::new(28.7041, 77.1025)),
        event_data,
        participant_signature: None,
    }
}

/// Deterministic id generator: `<PREFIX>-000001`, `<PREFIX>-000002`, ...
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl IdGenerator for SequentialIdGenerator {
    async fn generate_id(&self, prefix: &str) -> Result<String, CapabilityError> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}-{:06}", prefix, n))
    }
}

/// Id generator that always fails.
pub struct FailingIdGenerator;

#[async_trait]
impl IdGenerator for FailingIdGenerator {
    async fn generate_id(&self, _prefix: &str) -> Result<String, CapabilityError> {
        Err(CapabilityError::IdGeneration(
            "id registry unavailable".to_string(),
        ))
    }
}

/// Id generator that returns the same id every time.
pub struct CollidingIdGenerator;

#[async_trait]
impl IdGenerator for CollidingIdGenerator {
    async fn generate_id(&self, prefix: &str) -> Result<String, CapabilityError> {
        Ok(format!("{}-SAME", prefix))
    }
}

/// Key provider that always fails.
pub struct FailingKeyProvider;

#[async_trait]
impl SigningKeyProvider for FailingKeyProvider {
    async fn issuer_keypair(&self) -> Result<IssuerKeypair, CapabilityError> {
        Err(CapabilityError::SigningKey("key store offline".to_string()))
    }
}

pub fn issuer() -> IssuerKeypair {
    IssuerKeypair::from_seed(&[0x42; 32])
}

/// Route engine warnings to test output. Safe to call from every test;
/// only the first call installs the subscriber.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

/// Engine with deterministic ids, a fixed issuer key, and sealing on.
pub fn sealed_engine() -> Engine {
    init_tracing();
    Engine::new(
        Arc::new(CertificateStore::new()),
        Arc::new(SequentialIdGenerator::new()),
        Arc::new(StaticKeyProvider::new(issuer())),
        EngineConfig::default(),
    )
}

/// Engine identical to [`sealed_engine`] but with sealing off.
pub fn unsealed_engine() -> Engine {
    init_tracing();
    Engine::new(
        Arc::new(CertificateStore::new()),
        Arc::new(SequentialIdGenerator::new()),
        Arc::new(StaticKeyProvider::new(issuer())),
        EngineConfig {
            enable_seals: false,
            ..EngineConfig::default()
        },
    )
}
