//! Shared fixtures for store tests.

use std::collections::BTreeMap;

use harvestseal_core::{
    CertificateContent, CertificateDelta, CertificateId, CertificateVersion, Certification,
    EventType, EventValue, FarmProfile, GeoPoint, HarvestDetails, SoilReport, SupplyChainEvent,
};

pub(crate) fn sample_content() -> CertificateContent {
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

pub(crate) fn sample_event(certificate_id: &str, event_id: &str) -> SupplyChainEvent {
    let mut event_data = BTreeMap::new();
    event_data.insert("facility".to_string(), EventValue::from("Sunrise Packing"));
    event_data.insert("batch_weight_kg".to_string(), EventValue::from(2480.0));
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

/// An unsealed version 1 over `content` with a fixed timestamp.
pub(crate) fn version_one(id: &str, content: CertificateContent) -> CertificateVersion {
    CertificateVersion::build(
        CertificateId::new(id),
        1,
        content,
        None,
        1_724_000_000_000,
        "inspector-1",
    )
    .unwrap()
}

/// The next version after `prev`, appending one event.
pub(crate) fn next_version(prev: &CertificateVersion, event_id: &str) -> CertificateVersion {
    let event = sample_event(prev.id.as_str(), event_id);
    let content = prev.content.with_delta(&CertificateDelta::events(vec![event]));
    CertificateVersion::build(
        prev.id.clone(),
        prev.version + 1,
        content,
        Some(prev.content_hash),
        prev.created_at + 1_000,
        "updater-1",
    )
    .unwrap()
}
