use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a decode stopped before the end of the payload.
///
/// These are reported in-band on [`DecodedPayload`](crate::DecodedPayload);
/// fields decoded before the failing record are kept.
///
/// # Examples
/// ```
/// use sensorwire_core::DecodeError;
///
/// let err = DecodeError::UnrecognizedChannel { id: 0x02, ty: 0x99, offset: 0 };
/// assert!(err.to_string().contains("unrecognized channel"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeError {
    #[error("truncated record at offset {offset}: need {needed} bytes, got {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("unrecognized channel 0x{id:02x}/0x{ty:02x} at offset {offset}")]
    UnrecognizedChannel {
        #[serde(rename = "channel_id")]
        id: u8,
        #[serde(rename = "channel_type")]
        ty: u8,
        offset: usize,
    },
}

/// A caller-supplied port that does not belong to the selected profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("port mismatch: expected {expected}, got {actual}")]
pub struct PortMismatch {
    pub expected: u16,
    pub actual: u16,
}
