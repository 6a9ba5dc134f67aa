//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a ready-made engine with
//! deterministic ids and keys, sample certificate content, and failing
//! capability stubs for dependency-failure paths.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;

use harvestseal::capability::{
    CapabilityError, IdGenerator, SigningKeyProvider, StaticKeyProvider,
};
use harvestseal::{CertificateStore, Engine, EngineConfig, UpdateRequest};
use harvestseal_core::{
    Certification, CertificateContent, CertificateDelta, CertificateId, CertificateVersion,
    EventType, EventValue, FarmProfile, GeoPoint, HarvestDetails, IssuerKeypair, IssuerPublicKey,
    SoilReport, SupplyChainEvent,
};
use harvestseal_store::SearchCriteria;

/// A test fixture with an engine, its store, and the issuer keypair.
pub struct EngineFixture {
    pub engine: Engine,
    pub store: Arc<CertificateStore>,
    pub keypair: IssuerKeypair,
}

impl EngineFixture {
    /// Create a fixture with the default deterministic seed.
    pub fn new() -> Self {
        Self::with_seed([0x42; 32])
    }

    /// Create with a deterministic issuer keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::build(seed, EngineConfig::default())
    }

    /// Create a fixture whose engine does not seal new versions.
    pub fn unsealed() -> Self {
        Self::build(
            [0x42; 32],
            EngineConfig {
                enable_seals: false,
                ..EngineConfig::default()
            },
        )
    }

    fn build(seed: [u8; 32], config: EngineConfig) -> Self {
        let keypair = IssuerKeypair::from_seed(&seed);
        let store = Arc::new(CertificateStore::new());
        let engine = Engine::new(
            Arc::clone(&store),
            Arc::new(SequentialIdGenerator::new()),
            Arc::new(StaticKeyProvider::new(keypair.clone())),
            config,
        );
        Self {
            engine,
            store,
            keypair,
        }
    }

    /// Get the issuer's public key.
    pub fn public_key(&self) -> IssuerPublicKey {
        self.keypair.public_key()
    }

    /// Create a certificate from [`sample_content`].
    pub async fn create_sample(&self) -> Arc<CertificateVersion> {
        self.engine
            .create_certificate(sample_content(), "inspector-1")
            .await
            .expect("create sample certificate")
    }

    /// Create a certificate with the given crop and farm name.
    pub async fn create_crop(&self, crop: &str, farm_name: &str) -> Arc<CertificateVersion> {
        self.engine
            .create_certificate(content_with_crop(crop, farm_name), "inspector-1")
            .await
            .expect("create crop certificate")
    }

    /// Append one processing event at the given observed version.
    pub async fn append_event(
        &self,
        id: &CertificateId,
        observed_version: u32,
    ) -> Arc<CertificateVersion> {
        let event = sample_event(id.as_str(), &random_event_id());
        let request = UpdateRequest::new(
            id.clone(),
            observed_version,
            CertificateDelta::events(vec![event]),
            "PROCESSOR-07",
            "journey update",
        );
        self.engine
            .update_certificate(request)
            .await
            .expect("append event")
    }
}

impl Default for EngineFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple fixtures with distinct issuer keys.
pub fn multi_issuer_fixtures(count: usize) -> Vec<EngineFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            EngineFixture::with_seed(seed)
        })
        .collect()
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

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdGenerator for SequentialIdGenerator {
    async fn generate_id(&self, prefix: &str) -> Result<String, CapabilityError> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}-{:06}", prefix, n))
    }
}

/// Id generator that always fails, for dependency-failure tests.
pub struct FailingIdGenerator;

#[async_trait]
impl IdGenerator for FailingIdGenerator {
    async fn generate_id(&self, _prefix: &str) -> Result<String, CapabilityError> {
        Err(CapabilityError::IdGeneration(
            "id registry unavailable".to_string(),
        ))
    }
}

/// Key provider that always fails, for dependency-failure tests.
pub struct FailingKeyProvider;

#[async_trait]
impl SigningKeyProvider for FailingKeyProvider {
    async fn issuer_keypair(&self) -> Result<IssuerKeypair, CapabilityError> {
        Err(CapabilityError::SigningKey("key store offline".to_string()))
    }
}

/// A random event id, unique enough for a test run.
pub fn random_event_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("EVT-{}", suffix.to_uppercase())
}

/// Valid certificate content for a tomato batch from an organic farm.
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

/// Sample content with a different crop and farm name.
pub fn content_with_crop(crop: &str, farm_name: &str) -> CertificateContent {
    let mut content = sample_content();
    content.harvest.crop_type = crop.into();
    content.farm.farm_name = farm_name.into();
    content
}

/// Search criteria matching a single crop type.
pub fn crop_criteria(crop: &str) -> SearchCriteria {
    SearchCriteria {
        crop_type: Some(crop.to_owned()),
        ..SearchCriteria::default()
    }
}

/// A processing event referencing the given certificate.
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

#[cfg(test)]
mod tests {
    use super::*;
    use harvestseal_core::{validate_new_content, ConfidenceLevel};

    #[tokio::test]
    async fn test_fixture_creates_valid_certificate() {
        let fixture = EngineFixture::new();
        let v1 = fixture.create_sample().await;

        assert_eq!(v1.version, 1);
        assert!(v1.is_sealed());
        assert!(v1.id.as_str().starts_with("AGRI-"));
    }

    #[tokio::test]
    async fn test_fixture_appends_events() {
        let fixture = EngineFixture::new();
        let v1 = fixture.create_sample().await;
        let v2 = fixture.append_event(&v1.id, 1).await;
        let v3 = fixture.append_event(&v1.id, 2).await;

        assert_eq!(v3.version, 3);
        assert_eq!(v2.previous_version_hash, Some(v1.content_hash));
        assert_eq!(v3.previous_version_hash, Some(v2.content_hash));

        let report = fixture.engine.verify_certificate(&v1.id).expect("verify");
        assert_eq!(report.confidence, ConfidenceLevel::High);
    }

    #[tokio::test]
    async fn test_unsealed_fixture() {
        let fixture = EngineFixture::unsealed();
        let v1 = fixture.create_sample().await;
        assert!(!v1.is_sealed());
    }

    #[test]
    fn test_multi_issuer_keys_are_distinct() {
        let fixtures = multi_issuer_fixtures(3);
        let pks: Vec<_> = fixtures.iter().map(|f| f.public_key()).collect();
        assert_ne!(pks[0], pks[1]);
        assert_ne!(pks[1], pks[2]);
        assert_ne!(pks[0], pks[2]);
    }

    #[tokio::test]
    async fn test_crop_criteria_finds_fixture_certificates() {
        let fixture = EngineFixture::new();
        fixture.create_crop("Tomato", "Farm A").await;
        fixture.create_crop("Potato", "Farm B").await;

        let page = fixture
            .engine
            .advanced_search(&crop_criteria("Tomato"), None)
            .expect("search");
        assert_eq!(page.total, 1);
        assert_eq!(page.results[0].farm_name, "Farm A");
    }

    #[test]
    fn test_sample_content_is_valid() {
        assert!(validate_new_content(&sample_content()).is_ok());
        assert!(validate_new_content(&content_with_crop("Potato", "Farm B")).is_ok());
    }

    #[test]
    fn test_random_event_ids_differ() {
        assert_ne!(random_event_id(), random_event_id());
    }
}
