//! Proptest generators for property-based testing.

use proptest::prelude::*;

use harvestseal_core::{
    Certification, CertificateContent, CertificateDelta, CertificateId, CertificateVersion,
    EventType, EventValue, FarmProfile, GeoPoint, HarvestDetails, IssuerKeypair, SoilReport,
    SupplyChainEvent,
};

use crate::fixtures::sample_event;

/// Generate a random issuer keypair.
pub fn issuer_keypair() -> impl Strategy<Value = IssuerKeypair> {
    any::<[u8; 32]>().prop_map(|seed| IssuerKeypair::from_seed(&seed))
}

/// Generate an identifier like `FARMER-0042`.
pub fn identifier(prefix: &'static str) -> impl Strategy<Value = String> {
    (0u32..10_000).prop_map(move |n| format!("{}-{:04}", prefix, n))
}

/// Generate a short display name of one to three capitalized words.
pub fn display_name() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,11}( [A-Z][a-z]{2,11}){0,2}"
}

/// Generate a reasonable timestamp (Unix milliseconds, 2001-2030).
pub fn timestamp() -> impl Strategy<Value = i64> {
    1_000_000_000_000i64..1_900_000_000_000
}

/// Generate a valid geographic point.
pub fn geo_point() -> impl Strategy<Value = GeoPoint> {
    (
        -90.0f64..90.0,
        -180.0f64..180.0,
        prop::option::of(0.0f64..500.0),
        prop::option::of(timestamp()),
    )
        .prop_map(|(latitude, longitude, accuracy_meters, captured_at)| GeoPoint {
            latitude,
            longitude,
            accuracy_meters,
            captured_at,
        })
}

/// Generate a farm type.
pub fn farm_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("ORGANIC".to_string()),
        Just("CONVENTIONAL".to_string()),
        Just("HYDROPONIC".to_string()),
    ]
}

/// Generate a farm profile.
pub fn farm_profile() -> impl Strategy<Value = FarmProfile> {
    (
        identifier("FARMER"),
        display_name(),
        geo_point(),
        0.1f64..5_000.0, // hectares
        farm_type(),
        prop::option::of(identifier("REG")),
        prop::collection::vec("[A-Z]{3,6}", 0..3),
    )
        .prop_map(
            |(
                farmer_id,
                farm_name,
                location,
                farm_size_hectares,
                farm_type,
                registration_number,
                certifications,
            )| FarmProfile {
                farmer_id,
                farm_name,
                location,
                farm_size_hectares,
                farm_type,
                registration_number,
                certifications,
            },
        )
}

/// Generate a crop type.
pub fn crop_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Tomato".to_string()),
        Just("Potato".to_string()),
        Just("Wheat".to_string()),
        Just("Rice".to_string()),
        Just("Mango".to_string()),
    ]
}

/// Generate a harvest record.
pub fn harvest_details() -> impl Strategy<Value = HarvestDetails> {
    (
        (identifier("HARVEST"), crop_type(), display_name(), timestamp()),
        (
            timestamp(),
            0.0f64..100_000.0, // quantity
            prop_oneof![Just("KG".to_string()), Just("TON".to_string())],
            "[A-C]",
        ),
    )
        .prop_map(
            |(
                (harvest_id, crop_type, variety, planting_date),
                (harvest_date, quantity, unit, quality_grade),
            )| HarvestDetails {
                harvest_id,
                crop_type,
                variety,
                planting_date,
                harvest_date,
                quantity,
                unit,
                quality_grade,
            },
        )
}

/// Generate a soil report.
pub fn soil_report() -> impl Strategy<Value = SoilReport> {
    (
        (
            identifier("SOIL"),
            identifier("LAB"),
            timestamp(),
            prop_oneof![
                Just("LOAMY".to_string()),
                Just("CLAY".to_string()),
                Just("SANDY".to_string()),
            ],
            3.5f64..9.5, // pH
        ),
        (
            0.0f64..15.0,  // organic matter %
            0.0f64..200.0, // N ppm
            0.0f64..100.0, // P ppm
            0.0f64..400.0, // K ppm
            prop_oneof![
                Just("CERTIFIED".to_string()),
                Just("PROVISIONAL".to_string()),
            ],
        ),
    )
        .prop_map(
            |(
                (report_id, testing_lab_id, test_date, soil_type, ph_level),
                (
                    organic_matter_pct,
                    nitrogen_ppm,
                    phosphorus_ppm,
                    potassium_ppm,
                    certification_status,
                ),
            )| SoilReport {
                report_id,
                testing_lab_id,
                test_date,
                soil_type,
                ph_level,
                organic_matter_pct,
                nitrogen_ppm,
                phosphorus_ppm,
                potassium_ppm,
                certification_status,
            },
        )
}

/// Generate a certification record.
pub fn certification() -> impl Strategy<Value = Certification> {
    (
        identifier("CERTN"),
        prop_oneof![
            Just("ORGANIC".to_string()),
            Just("FAIR_TRADE".to_string()),
            Just("GLOBAL_GAP".to_string()),
        ],
        display_name(),
        timestamp(),
        timestamp(),
        identifier("DOC"),
    )
        .prop_map(
            |(certification_id, kind, issuing_body, issue_date, expiry_date, certificate_number)| {
                Certification {
                    certification_id,
                    kind,
                    issuing_body,
                    issue_date,
                    expiry_date,
                    certificate_number,
                }
            },
        )
}

/// Generate valid content for a new certificate. The journey starts
/// empty; events arrive through updates.
pub fn certificate_content() -> impl Strategy<Value = CertificateContent> {
    (
        farm_profile(),
        harvest_details(),
        soil_report(),
        prop::collection::vec(certification(), 0..3),
    )
        .prop_map(|(farm, harvest, soil, certifications)| CertificateContent {
            farm,
            harvest,
            soil,
            certifications,
            supply_chain_events: Vec::new(),
        })
}

/// Generate an event type.
pub fn event_type() -> impl Strategy<Value = EventType> {
    prop_oneof![
        Just(EventType::Processing),
        Just(EventType::Transport),
        Just(EventType::Retail),
    ]
}

/// Generate an event data value.
pub fn event_value() -> impl Strategy<Value = EventValue> {
    prop_oneof![
        "[a-zA-Z0-9 ]{1,20}".prop_map(EventValue::Text),
        (-1.0e6f64..1.0e6).prop_map(EventValue::Number),
        any::<bool>().prop_map(EventValue::Flag),
        timestamp().prop_map(EventValue::Timestamp),
    ]
}

/// Generate a valid supply-chain event for the given certificate.
pub fn supply_chain_event(certificate_id: &str) -> impl Strategy<Value = SupplyChainEvent> {
    let certificate_id = certificate_id.to_owned();
    (
        (identifier("EVT"), event_type(), identifier("PARTY"), timestamp()),
        (
            prop::option::of(geo_point()),
            prop::collection::btree_map("[a-z_]{3,12}", event_value(), 0..4),
            prop::option::of("[0-9a-f]{16}"),
        ),
    )
        .prop_map(
            move |(
                (event_id, event_type, participant_id, timestamp),
                (location, event_data, participant_signature),
            )| SupplyChainEvent {
                event_id,
                certificate_id: certificate_id.clone(),
                event_type,
                participant_id,
                timestamp,
                location,
                event_data,
                participant_signature,
            },
        )
}

/// Parameters for generating a sealed version chain.
#[derive(Debug, Clone)]
pub struct ChainParams {
    pub keypair: IssuerKeypair,
    pub certificate_id: String,
    pub content: CertificateContent,
    pub extra_versions: usize,
    pub base_timestamp: i64,
}

impl Arbitrary for ChainParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(), // issuer seed
            identifier("CERT"),
            certificate_content(),
            0usize..4, // versions beyond the first
            timestamp(),
        )
            .prop_map(
                |(seed, certificate_id, content, extra_versions, base_timestamp)| ChainParams {
                    keypair: IssuerKeypair::from_seed(&seed),
                    certificate_id,
                    content,
                    extra_versions,
                    base_timestamp,
                },
            )
            .boxed()
    }
}

/// Build a sealed, hash-linked chain from parameters.
///
/// Version 1 carries the generated content; each extra version appends
/// one event with an index-derived id so ids never collide.
pub fn chain_from_params(params: &ChainParams) -> Vec<CertificateVersion> {
    let id = CertificateId::new(params.certificate_id.clone());
    let mut chain = Vec::with_capacity(params.extra_versions + 1);

    let v1 = CertificateVersion::build(
        id.clone(),
        1,
        params.content.clone(),
        None,
        params.base_timestamp,
        "inspector-1",
    )
    .expect("build version 1")
    .with_seal(&params.keypair);
    chain.push(v1);

    for n in 0..params.extra_versions {
        let head = chain.last().expect("chain head");
        let event = sample_event(id.as_str(), &format!("EVT-{:04}", n));
        let content = head
            .content
            .with_delta(&CertificateDelta::events(vec![event]));
        let next = CertificateVersion::build(
            id.clone(),
            head.version + 1,
            content,
            Some(head.content_hash),
            head.created_at + 1_000,
            "PROCESSOR-07",
        )
        .expect("build next version")
        .with_seal(&params.keypair);
        chain.push(next);
    }

    chain
}
