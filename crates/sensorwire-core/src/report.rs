use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::codec::{Profile, decode_channels};
use crate::derived::DerivedMetrics;
use crate::envelope::{Envelope, EnvelopeError};
use crate::{DEFAULT_GENERATED_AT, Report, make_stub_report};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Envelope error: {0}")]
    Envelope(#[from] EnvelopeError),
}

#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// Attach dew point and heat index when temperature and humidity decode.
    pub derived: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { derived: true }
    }
}

/// Reads a JSON envelope from `path` and decodes it with `profile`.
///
/// Returns `Ok(None)` when the envelope's port does not belong to `profile`.
pub fn decode_envelope_file(
    profile: &Profile,
    path: &Path,
    options: ReportOptions,
) -> Result<Option<Report>, ReportError> {
    let json = fs::read_to_string(path)?;
    let envelope = Envelope::from_json(&json)?;
    Ok(build_report(
        profile,
        &envelope,
        &path.display().to_string(),
        options,
    )?)
}

/// Decodes one envelope into a report.
///
/// Returns `Ok(None)` when the envelope's port does not belong to `profile`,
/// before the payload or timestamp is looked at. Otherwise envelope errors
/// (bad encoding, bad timestamp) are returned as `Err`.
/// Decode errors are not: they are recorded in `report.decoded.error`.
pub fn build_report(
    profile: &Profile,
    envelope: &Envelope,
    source: &str,
    options: ReportOptions,
) -> Result<Option<Report>, EnvelopeError> {
    if let Err(mismatch) = profile.check_port(envelope.port) {
        debug!(source, %mismatch, "envelope skipped");
        return Ok(None);
    }
    let bytes = envelope.payload_bytes()?;
    let received_at = envelope.received_at_rfc3339()?;
    let decoded = decode_channels(profile, &bytes);

    let mut report = make_stub_report(profile, source, bytes.len() as u64);
    report.input.device = envelope.device.clone();
    report.input.port = envelope.port;
    report.generated_at = received_at
        .clone()
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    report.input.received_at = received_at;
    if options.derived {
        report.derived = DerivedMetrics::from_decoded(&decoded);
    }
    report.decoded = decoded;
    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldValue;
    use crate::profiles::{AMBIENCE, SOIL};

    fn envelope(hex: &str, port: Option<u16>) -> Envelope {
        Envelope {
            payload_hex: Some(hex.to_string()),
            port,
            ..Envelope::default()
        }
    }

    #[test]
    fn report_carries_fields_and_metadata() {
        let mut env = envelope("03670e01 046864", Some(85));
        env.device = Some("a84041000181c8f1".to_string());
        env.received_at = Some("2024-05-01T10:30:00Z".to_string());

        let report = build_report(&AMBIENCE, &env, "uplink.json", ReportOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(report.sensor.profile, "ambience");
        assert_eq!(report.input.bytes, 7);
        assert_eq!(report.input.port, Some(85));
        assert_eq!(report.generated_at, "2024-05-01T10:30:00Z");
        assert_eq!(
            report.decoded.get("humidity"),
            Some(&FieldValue::Number(50.0))
        );
        let derived = report.derived.expect("derived metrics");
        assert!(derived.dew_point.is_some());
    }

    #[test]
    fn port_mismatch_yields_no_report() {
        let report = build_report(
            &AMBIENCE,
            &envelope("017564", Some(2)),
            "-",
            ReportOptions::default(),
        )
        .unwrap();
        assert!(report.is_none());
    }

    #[test]
    fn foreign_port_is_skipped_before_payload_is_parsed() {
        let report = build_report(
            &AMBIENCE,
            &envelope("zz", Some(1)),
            "-",
            ReportOptions::default(),
        )
        .unwrap();
        assert!(report.is_none());

        let mut env = envelope("017564", Some(1));
        env.received_at = Some("yesterday".to_string());
        let report = build_report(&AMBIENCE, &env, "-", ReportOptions::default()).unwrap();
        assert!(report.is_none());
    }

    #[test]
    fn derived_can_be_disabled() {
        let report = build_report(
            &AMBIENCE,
            &envelope("03670e01046864", None),
            "-",
            ReportOptions { derived: false },
        )
        .unwrap()
        .unwrap();
        assert!(report.derived.is_none());
    }

    #[test]
    fn soil_moisture_is_not_humidity() {
        let report = build_report(
            &SOIL,
            &envelope("03670e01046864", None),
            "-",
            ReportOptions::default(),
        )
        .unwrap()
        .unwrap();
        assert!(report.derived.is_none());
    }

    #[test]
    fn decode_error_is_in_band() {
        let report = build_report(
            &AMBIENCE,
            &envelope("0299", None),
            "-",
            ReportOptions::default(),
        )
        .unwrap()
        .unwrap();
        assert!(report.decoded.has_error());
        assert_eq!(report.generated_at, DEFAULT_GENERATED_AT);
    }

    #[test]
    fn bad_payload_encoding_is_an_error() {
        let err = build_report(
            &AMBIENCE,
            &envelope("zz", None),
            "-",
            ReportOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EnvelopeError::Hex(_)));
    }
}
