//! Metrics derived from decoded temperature and relative humidity.

use serde::{Deserialize, Serialize};

use crate::DecodedPayload;

/// Magnus coefficients (Alduchov & Eskridge).
const MAGNUS_B: f64 = 17.625;
const MAGNUS_C: f64 = 243.04;

/// Dew point and heat index, both in °C, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dew_point: Option<f64>,
    pub heat_index: f64,
}

impl DerivedMetrics {
    /// Computes metrics when the payload carries `temperature` and
    /// `humidity`; `None` otherwise.
    pub fn from_decoded(decoded: &DecodedPayload) -> Option<Self> {
        let temperature = decoded.get("temperature")?.as_f64()?;
        let humidity = decoded.get("humidity")?.as_f64()?;
        Some(Self {
            dew_point: dew_point(temperature, humidity).map(round2),
            heat_index: round2(heat_index(temperature, humidity)),
        })
    }
}

/// Dew point in °C via the Magnus approximation. `None` for non-positive or
/// non-finite humidity.
pub fn dew_point(temp_c: f64, relative_humidity: f64) -> Option<f64> {
    if !relative_humidity.is_finite() || relative_humidity <= 0.0 || !temp_c.is_finite() {
        return None;
    }
    let gamma = (relative_humidity / 100.0).ln() + MAGNUS_B * temp_c / (MAGNUS_C + temp_c);
    Some(MAGNUS_C * gamma / (MAGNUS_B - gamma))
}

/// NWS heat index in °C.
///
/// Uses the simple Steadman form when its average with the temperature stays
/// below 80 °F, otherwise the Rothfusz regression with the low- and
/// high-humidity adjustments.
pub fn heat_index(temp_c: f64, relative_humidity: f64) -> f64 {
    let t = temp_c * 9.0 / 5.0 + 32.0;
    let rh = relative_humidity;

    let simple = 0.5 * (t + 61.0 + (t - 68.0) * 1.2 + rh * 0.094);
    let hi_f = if (simple + t) / 2.0 < 80.0 {
        simple
    } else {
        let mut hi = -42.379 + 2.049_015_23 * t + 10.143_331_27 * rh
            - 0.224_755_41 * t * rh
            - 0.006_837_83 * t * t
            - 0.054_817_17 * rh * rh
            + 0.001_228_74 * t * t * rh
            + 0.000_852_82 * t * rh * rh
            - 0.000_001_99 * t * t * rh * rh;
        if rh < 13.0 && (80.0..=112.0).contains(&t) {
            hi -= ((13.0 - rh) / 4.0) * ((17.0 - (t - 95.0).abs()) / 17.0).sqrt();
        } else if rh > 85.0 && (80.0..=87.0).contains(&t) {
            hi += ((rh - 85.0) / 10.0) * ((87.0 - t) / 5.0);
        }
        hi
    };

    (hi_f - 32.0) * 5.0 / 9.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
