//! Structural validation for certificate content and update deltas.
//!
//! All checks run before any mutation; a failed check leaves no partial
//! state behind. Geolocation bounds and required identifiers are hard
//! rules; everything else in the content (grades, units, event data) is
//! the submitter's business.

use std::collections::HashSet;

use crate::content::{CertificateContent, CertificateDelta, EventValue, GeoPoint, SupplyChainEvent};
use crate::error::ValidationError;
use crate::types::CertificateId;

/// Validate content for certificate creation.
///
/// This performs:
/// - Required-identifier checks for every section
/// - Geolocation bounds checks
/// - Finiteness checks on measured values
/// - Rejection of pre-populated supply-chain events
pub fn validate_new_content(content: &CertificateContent) -> Result<(), ValidationError> {
    // 1. Events arrive through updates, once the certificate id exists
    //    for them to reference.
    if !content.supply_chain_events.is_empty() {
        return Err(ValidationError::EventsPresentAtCreation);
    }

    validate_sections(content)
}

/// Validate the static sections (farm, harvest, soil, certifications).
fn validate_sections(content: &CertificateContent) -> Result<(), ValidationError> {
    // 2. Farm identity
    require_id(&content.farm.farmer_id, "farm.farmer_id")?;
    require_id(&content.farm.farm_name, "farm.farm_name")?;

    // 3. Farm geolocation
    validate_geo_point(&content.farm.location)?;
    require_finite(content.farm.farm_size_hectares, "farm.farm_size_hectares")?;
    require_non_negative(content.farm.farm_size_hectares, "farm.farm_size_hectares")?;

    // 4. Harvest identity and measures
    require_id(&content.harvest.harvest_id, "harvest.harvest_id")?;
    require_id(&content.harvest.crop_type, "harvest.crop_type")?;
    require_finite(content.harvest.quantity, "harvest.quantity")?;
    require_non_negative(content.harvest.quantity, "harvest.quantity")?;

    // 5. Soil report identity and measures
    require_id(&content.soil.report_id, "soil.report_id")?;
    require_id(&content.soil.testing_lab_id, "soil.testing_lab_id")?;
    require_finite(content.soil.ph_level, "soil.ph_level")?;
    require_finite(content.soil.organic_matter_pct, "soil.organic_matter_pct")?;
    require_finite(content.soil.nitrogen_ppm, "soil.nitrogen_ppm")?;
    require_finite(content.soil.phosphorus_ppm, "soil.phosphorus_ppm")?;
    require_finite(content.soil.potassium_ppm, "soil.potassium_ppm")?;

    // 6. Certification identity
    for certification in &content.certifications {
        require_id(
            &certification.certification_id,
            "certification.certification_id",
        )?;
    }

    Ok(())
}

/// Validate an update delta against the latest content.
///
/// This performs:
/// - Rejection of empty deltas
/// - Envelope checks for each appended event
/// - Duplicate event-id rejection, against existing events and within
///   the batch
/// - Identifier checks for a certification replacement
pub fn validate_delta(
    delta: &CertificateDelta,
    latest: &CertificateContent,
    certificate_id: &CertificateId,
) -> Result<(), ValidationError> {
    // 1. An empty delta would mint a version indistinguishable from its
    //    predecessor.
    if delta.is_empty() {
        return Err(ValidationError::EmptyDelta);
    }

    // 2. Each appended event envelope
    for event in &delta.append_events {
        validate_event(event, certificate_id)?;
    }

    // 3. Event ids are unique across the whole journey
    let mut seen: HashSet<&str> = latest
        .supply_chain_events
        .iter()
        .map(|e| e.event_id.as_str())
        .collect();
    for event in &delta.append_events {
        if !seen.insert(event.event_id.as_str()) {
            return Err(ValidationError::DuplicateEventId(event.event_id.clone()));
        }
    }

    // 4. A certification replacement must carry identified records
    if let Some(certifications) = &delta.replace_certifications {
        for certification in certifications {
            require_id(
                &certification.certification_id,
                "certification.certification_id",
            )?;
        }
    }

    Ok(())
}

/// Validate one supply-chain event envelope.
pub fn validate_event(
    event: &SupplyChainEvent,
    certificate_id: &CertificateId,
) -> Result<(), ValidationError> {
    require_id(&event.event_id, "event.event_id")?;
    require_id(&event.participant_id, "event.participant_id")?;

    if event.certificate_id != certificate_id.as_str() {
        return Err(ValidationError::EventCertificateMismatch {
            event_id: event.event_id.clone(),
            expected: certificate_id.as_str().to_owned(),
        });
    }

    if let Some(location) = &event.location {
        validate_geo_point(location)?;
    }

    // Numeric payload values must survive canonical encoding later
    for value in event.event_data.values() {
        if let EventValue::Number(n) = value {
            require_finite(*n, "event.event_data")?;
        }
    }

    Ok(())
}

/// Check geographic bounds.
///
/// Latitude must fall in [-90, 90] and longitude in [-180, 180]; NaN
/// fails both comparisons and is rejected the same way.
pub fn validate_geo_point(point: &GeoPoint) -> Result<(), ValidationError> {
    if !(point.latitude >= -90.0 && point.latitude <= 90.0) {
        return Err(ValidationError::LatitudeOutOfRange(point.latitude));
    }
    if !(point.longitude >= -180.0 && point.longitude <= 180.0) {
        return Err(ValidationError::LongitudeOutOfRange(point.longitude));
    }
    if let Some(accuracy) = point.accuracy_meters {
        require_finite(accuracy, "location.accuracy_meters")?;
        require_non_negative(accuracy, "location.accuracy_meters")?;
    }
    Ok(())
}

fn require_id(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingIdentifier(field));
    }
    Ok(())
}

fn require_finite(value: f64, field: &'static str) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteNumber(field));
    }
    Ok(())
}

fn require_non_negative(value: f64, field: &'static str) -> Result<(), ValidationError> {
    if value < 0.0 {
        return Err(ValidationError::NegativeNumber(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::test_support::{sample_content, sample_event};

    fn cert_id() -> CertificateId {
        CertificateId::new("CERT-1")
    }

    #[test]
    fn test_valid_content_passes() {
        assert!(validate_new_content(&sample_content()).is_ok());
    }

    #[test]
    fn test_latitude_out_of_range() {
        let mut content = sample_content();
        content.farm.location.latitude = 91.0;
        assert_eq!(
            validate_new_content(&content),
            Err(ValidationError::LatitudeOutOfRange(91.0))
        );
    }

    #[test]
    fn test_longitude_out_of_range() {
        let mut content = sample_content();
        content.farm.location.longitude = -180.5;
        assert_eq!(
            validate_new_content(&content),
            Err(ValidationError::LongitudeOutOfRange(-180.5))
        );
    }

    #[test]
    fn test_nan_latitude_rejected() {
        let mut content = sample_content();
        content.farm.location.latitude = f64::NAN;
        assert!(matches!(
            validate_new_content(&content),
            Err(ValidationError::LatitudeOutOfRange(_))
        ));
    }

    #[test]
    fn test_boundary_coordinates_accepted() {
        let mut content = sample_content();
        content.farm.location.latitude = -90.0;
        content.farm.location.longitude = 180.0;
        assert!(validate_new_content(&content).is_ok());
    }

    #[test]
    fn test_missing_farmer_id() {
        let mut content = sample_content();
        content.farm.farmer_id = "  ".into();
        assert_eq!(
            validate_new_content(&content),
            Err(ValidationError::MissingIdentifier("farm.farmer_id"))
        );
    }

    #[test]
    fn test_missing_harvest_id() {
        let mut content = sample_content();
        content.harvest.harvest_id = String::new();
        assert_eq!(
            validate_new_content(&content),
            Err(ValidationError::MissingIdentifier("harvest.harvest_id"))
        );
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let mut content = sample_content();
        content.harvest.quantity = -5.0;
        assert_eq!(
            validate_new_content(&content),
            Err(ValidationError::NegativeNumber("harvest.quantity"))
        );
    }

    #[test]
    fn test_non_finite_ph_rejected() {
        let mut content = sample_content();
        content.soil.ph_level = f64::INFINITY;
        assert_eq!(
            validate_new_content(&content),
            Err(ValidationError::NonFiniteNumber("soil.ph_level"))
        );
    }

    #[test]
    fn test_events_rejected_at_creation() {
        let mut content = sample_content();
        content.supply_chain_events.push(sample_event("CERT-1", "EVT-1"));
        assert_eq!(
            validate_new_content(&content),
            Err(ValidationError::EventsPresentAtCreation)
        );
    }

    #[test]
    fn test_empty_delta_rejected() {
        let delta = CertificateDelta::default();
        assert_eq!(
            validate_delta(&delta, &sample_content(), &cert_id()),
            Err(ValidationError::EmptyDelta)
        );
    }

    #[test]
    fn test_valid_delta_passes() {
        let delta = CertificateDelta::events(vec![sample_event("CERT-1", "EVT-1")]);
        assert!(validate_delta(&delta, &sample_content(), &cert_id()).is_ok());
    }

    #[test]
    fn test_event_for_other_certificate_rejected() {
        let delta = CertificateDelta::events(vec![sample_event("CERT-OTHER", "EVT-1")]);
        assert!(matches!(
            validate_delta(&delta, &sample_content(), &cert_id()),
            Err(ValidationError::EventCertificateMismatch { .. })
        ));
    }

    #[test]
    fn test_duplicate_event_id_within_batch_rejected() {
        let delta = CertificateDelta::events(vec![
            sample_event("CERT-1", "EVT-1"),
            sample_event("CERT-1", "EVT-1"),
        ]);
        assert_eq!(
            validate_delta(&delta, &sample_content(), &cert_id()),
            Err(ValidationError::DuplicateEventId("EVT-1".into()))
        );
    }

    #[test]
    fn test_duplicate_event_id_against_existing_rejected() {
        let mut latest = sample_content();
        latest.supply_chain_events.push(sample_event("CERT-1", "EVT-1"));

        let delta = CertificateDelta::events(vec![sample_event("CERT-1", "EVT-1")]);
        assert_eq!(
            validate_delta(&delta, &latest, &cert_id()),
            Err(ValidationError::DuplicateEventId("EVT-1".into()))
        );
    }

    #[test]
    fn test_event_location_bounds_checked() {
        let mut event = sample_event("CERT-1", "EVT-1");
        event.location.as_mut().unwrap().latitude = 123.0;

        let delta = CertificateDelta::events(vec![event]);
        assert_eq!(
            validate_delta(&delta, &sample_content(), &cert_id()),
            Err(ValidationError::LatitudeOutOfRange(123.0))
        );
    }

    #[test]
    fn test_non_finite_event_data_rejected() {
        let mut event = sample_event("CERT-1", "EVT-1");
        event
            .event_data
            .insert("moisture_pct".into(), EventValue::Number(f64::NAN));

        let delta = CertificateDelta::events(vec![event]);
        assert_eq!(
            validate_delta(&delta, &sample_content(), &cert_id()),
            Err(ValidationError::NonFiniteNumber("event.event_data"))
        );
    }

    #[test]
    fn test_replacement_certification_requires_id() {
        let mut certification = sample_content().certifications[0].clone();
        certification.certification_id = String::new();

        let delta = CertificateDelta {
            append_events: Vec::new(),
            replace_certifications: Some(vec![certification]),
        };
        assert_eq!(
            validate_delta(&delta, &sample_content(), &cert_id()),
            Err(ValidationError::MissingIdentifier(
                "certification.certification_id"
            ))
        );
    }
}
