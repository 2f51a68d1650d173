//! Uplink envelopes as delivered by a network server.
//!
//! An envelope carries the raw payload (base64 `data` or `payload_hex`), the
//! LoRaWAN port and optional device metadata. This module only extracts the
//! bytes; decoding lives in [`crate::codec`].

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("envelope has no payload (expected `data` or `payload_hex`)")]
    MissingPayload,
    #[error("envelope has both `data` and `payload_hex`")]
    AmbiguousPayload,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid hex payload: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("invalid received_at timestamp '{value}': {message}")]
    Timestamp { value: String, message: String },
    #[error("invalid envelope JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One uplink as received from the network.
///
/// # Examples
/// ```
/// use sensorwire_core::Envelope;
///
/// let envelope = Envelope::from_json(r#"{"data": "AXVk", "port": 85}"#)?;
/// assert_eq!(envelope.payload_bytes()?, vec![0x01, 0x75, 0x64]);
/// # Ok::<(), sensorwire_core::EnvelopeError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Base64 payload (network-server convention).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Hex payload, for hand-written fixtures and tooling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_hex: Option<String>,
    /// LoRaWAN FPort; absent means the port is not checked.
    #[serde(default, alias = "fPort", skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// RFC3339 receive time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_at: Option<String>,
    /// Device identifier (DevEUI or name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl Envelope {
    pub fn from_json(json: &str) -> Result<Self, EnvelopeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_bytes(bytes: &[u8], port: Option<u16>) -> Self {
        Self {
            payload_hex: Some(hex::encode(bytes)),
            port,
            ..Self::default()
        }
    }

    pub fn payload_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
        match (&self.data, &self.payload_hex) {
            (Some(data), None) => parse_payload_base64(data),
            (None, Some(hex)) => parse_payload_hex(hex),
            (Some(_), Some(_)) => Err(EnvelopeError::AmbiguousPayload),
            (None, None) => Err(EnvelopeError::MissingPayload),
        }
    }

    /// The receive time normalized to UTC RFC3339, if present.
    pub fn received_at_rfc3339(&self) -> Result<Option<String>, EnvelopeError> {
        let Some(value) = self.received_at.as_deref() else {
            return Ok(None);
        };
        let invalid = |message: String| EnvelopeError::Timestamp {
            value: value.to_string(),
            message,
        };
        let parsed = OffsetDateTime::parse(value, &Rfc3339).map_err(|e| invalid(e.to_string()))?;
        parsed
            .to_offset(time::UtcOffset::UTC)
            .format(&Rfc3339)
            .map(Some)
            .map_err(|e| invalid(e.to_string()))
    }
}

/// Hex with optional `0x` prefix; whitespace is ignored.
pub fn parse_payload_hex(input: &str) -> Result<Vec<u8>, EnvelopeError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let compact: String = digits.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(hex::decode(compact)?)
}

pub fn parse_payload_base64(input: &str) -> Result<Vec<u8>, EnvelopeError> {
    Ok(STANDARD.decode(input.trim())?)
}
