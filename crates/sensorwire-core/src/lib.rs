//! Sensorwire core library: channel-record decoding for LoRaWAN
//! environmental sensors.
//!
//! Payloads are flat sequences of `(channel id, channel type, data)` records.
//! One decode loop (`codec`) walks them against a declarative channel table
//! (`profiles`) and produces a [`DecodedPayload`]. Decoding is byte-oriented
//! and side-effect free; envelope extraction, derived metrics and report
//! assembly sit around it and never feed back into it.
//!
//! Invariants:
//! - Exactly one profile is active per decode call.
//! - The cursor only advances by the width a channel declares.
//! - Malformed input is reported in-band: decoding stops, fields decoded so
//!   far are kept, and nothing panics.
//!
//! # Examples
//! ```
//! use sensorwire_core::{FieldValue, decode, profiles};
//!
//! let profile = profiles::from_name("ambience")?;
//! let decoded = decode(profile, &[0x01, 0x75, 0x64], None).expect("port accepted");
//! assert_eq!(decoded.get("battery"), Some(&FieldValue::Integer(100)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod codec;
pub mod derived;
pub mod envelope;
pub mod profiles;
mod report;

pub use codec::{
    Channel, ChannelDef, DecodeError, FieldValue, PortMismatch, Profile, Scalar, SystemChannel,
    ValueKind, decode, decode_channels,
};
pub use derived::DerivedMetrics;
pub use envelope::{Envelope, EnvelopeError};
pub use profiles::ProfileError;
pub use report::{ReportError, ReportOptions, build_report, decode_envelope_file};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when the envelope has no receive time.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Fields decoded from one payload, plus the reason decoding stopped early.
///
/// # Examples
/// ```
/// use sensorwire_core::{DecodedPayload, FieldValue};
///
/// let mut decoded = DecodedPayload::default();
/// decoded.insert("battery", FieldValue::Integer(90));
/// assert_eq!(decoded.len(), 1);
/// assert!(!decoded.has_error());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodedPayload {
    /// Field name to value, in stable (sorted) order.
    pub fields: BTreeMap<String, FieldValue>,
    /// Set when an unrecognized or truncated record stopped decoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DecodeError>,
}

impl DecodedPayload {
    pub fn insert(&mut self, field: &str, value: FieldValue) {
        self.fields.insert(field.to_string(), value);
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Callers should check this before trusting that every record decoded.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Decode report for one uplink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 receive time of the uplink, or the epoch when unknown.
    pub generated_at: String,
    /// Input metadata.
    pub input: InputInfo,
    /// Sensor model the payload was decoded as.
    pub sensor: SensorInfo,
    /// Decoded fields and decode status.
    pub decoded: DecodedPayload,
    /// Dew point and heat index, when temperature and humidity decoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived: Option<DerivedMetrics>,
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use sensorwire_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "sensorwire".to_string(),
///     version: "0.1.0".to_string(),
///     build: None,
/// };
/// assert_eq!(tool.name, "sensorwire");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "sensorwire").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
    /// Build commit, when the binary recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
}

/// Input metadata embedded in reports.
///
/// # Examples
/// ```
/// use sensorwire_core::InputInfo;
///
/// let input = InputInfo {
///     source: "uplink.json".to_string(),
///     device: None,
///     port: Some(85),
///     received_at: None,
///     bytes: 3,
/// };
/// assert_eq!(input.bytes, 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Envelope path, or a label such as `hex` for inline payloads.
    pub source: String,
    /// Device identifier from the envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// LoRaWAN port the payload arrived on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// RFC3339 receive time, normalized to UTC.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<String>,
    /// Payload size in bytes.
    pub bytes: u64,
}

/// Sensor profile metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorInfo {
    /// Profile selection name (e.g., "ambience").
    pub profile: String,
    /// Sensor model description.
    pub model: String,
    /// Application port the profile expects.
    pub application_port: u16,
}

/// Build a report with base fields filled and nothing decoded.
///
/// # Examples
/// ```
/// use sensorwire_core::{make_stub_report, profiles::LIGHT};
///
/// let report = make_stub_report(&LIGHT, "hex", 6);
/// assert_eq!(report.report_version, sensorwire_core::REPORT_VERSION);
/// assert!(report.decoded.is_empty());
/// ```
pub fn make_stub_report(profile: &Profile, source: &str, bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "sensorwire".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            build: None,
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            source: source.to_string(),
            device: None,
            port: None,
            received_at: None,
            bytes,
        },
        sensor: SensorInfo {
            profile: profile.name.to_string(),
            model: profile.model.to_string(),
            application_port: profile.application_port,
        },
        decoded: DecodedPayload::default(),
        derived: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::AMBIENCE;

    #[test]
    fn report_omits_optional_fields_when_none() {
        let report = make_stub_report(&AMBIENCE, "hex", 0);

        let value = serde_json::to_value(&report).expect("report json");
        assert!(value["tool"].get("build").is_none());
        let input = value.get("input").expect("input");
        assert!(input.get("device").is_none());
        assert!(input.get("port").is_none());
        assert!(input.get("received_at").is_none());
        assert!(value["decoded"].get("error").is_none());
        assert!(value.get("derived").is_none());
    }

    #[test]
    fn decoded_payload_serializes_typed_values() {
        let mut decoded = DecodedPayload::default();
        decoded.insert("battery", FieldValue::Integer(100));
        decoded.insert("temperature", FieldValue::Number(23.0));
        decoded.insert("SerialNumber", FieldValue::Text("aa-bb".to_string()));
        decoded.insert("PowerOn", FieldValue::Flag(true));
        decoded.error = Some(DecodeError::UnrecognizedChannel {
            id: 0x02,
            ty: 0x99,
            offset: 9,
        });

        let value = serde_json::to_value(&decoded).expect("decoded json");
        assert_eq!(
            value,
            serde_json::json!({
                "fields": {
                    "PowerOn": true,
                    "SerialNumber": "aa-bb",
                    "battery": 100,
                    "temperature": 23.0
                },
                "error": {
                    "kind": "unrecognized_channel",
                    "channel_id": 2,
                    "channel_type": 153,
                    "offset": 9
                }
            })
        );
    }

    #[test]
    fn decoded_payload_deserializes_back() {
        let mut decoded = DecodedPayload::default();
        decoded.insert("humidity", FieldValue::Number(56.5));
        decoded.insert("co2", FieldValue::Integer(800));
        let json = serde_json::to_string(&decoded).expect("serialize");
        let back: DecodedPayload = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, decoded);
    }
}
