use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::layout;

/// A decoded channel value.
///
/// Serialized untagged, so a report reads `"battery": 100`,
/// `"temperature": 23.0` or `"SerialNumber": "aa-bb-cc-dd-ee-ff"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Number(f64),
    Text(String),
    Flag(bool),
    Flags(BTreeMap<String, bool>),
}

impl FieldValue {
    /// Numeric view of the value, for consumers deriving further metrics.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(value) => Some(*value as f64),
            FieldValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

/// Battery percentage; anything above 100 saturates.
pub fn battery_percent(raw: u8) -> i64 {
    i64::from(raw.min(layout::BATTERY_MAX_PERCENT))
}

/// One packed BCD byte as its two-digit decimal value, or 0 when either
/// nibble is not a decimal digit.
pub fn bcd_byte(raw: u8) -> u8 {
    let high = raw >> 4;
    let low = raw & 0x0F;
    if low > 9 || raw >= layout::BCD_LIMIT {
        return 0;
    }
    high * 10 + low
}

/// `major.minor` from a big-endian BCD word: `0x0201` is `2.01`.
pub fn bcd_version(word: u16) -> f64 {
    let [major, minor] = word.to_be_bytes();
    f64::from(u16::from(bcd_byte(major)) * 100 + u16::from(bcd_byte(minor))) / 100.0
}

/// Lowercase hex pairs joined by `-`.
pub fn serial_number(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join("-")
}

pub fn sensor_flags(mask: u16, names: &[&str]) -> BTreeMap<String, bool> {
    names
        .iter()
        .enumerate()
        .map(|(bit, name)| (name.to_string(), mask & (1 << bit) != 0))
        .collect()
}

pub fn ipso_version(raw: u8) -> String {
    format!("v{}.{}", raw >> 4, raw & 0x0F)
}

pub fn device_class(raw: u8) -> String {
    layout::DEVICE_CLASSES
        .get(usize::from(raw))
        .copied()
        .unwrap_or("Unknown")
        .to_string()
}
