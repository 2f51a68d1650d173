use tracing::{debug, warn};

use super::error::DecodeError;
use super::reader::ChannelReader;
use super::table::Profile;
use crate::DecodedPayload;

/// Decodes `payload` with `profile`.
///
/// Returns `None` without reading anything when `port` is supplied and is
/// not the profile's application port. Malformed input never fails the call:
/// the returned payload carries the error and the fields decoded before it.
///
/// # Examples
/// ```
/// use sensorwire_core::{FieldValue, decode, profiles::AMBIENCE};
///
/// let decoded = decode(&AMBIENCE, &[0x03, 0x67, 0xE6, 0x00], Some(85)).unwrap();
/// assert_eq!(decoded.get("temperature"), Some(&FieldValue::Number(23.0)));
/// assert!(!decoded.has_error());
///
/// assert!(decode(&AMBIENCE, &[0x03, 0x67, 0xE6, 0x00], Some(10)).is_none());
/// ```
pub fn decode(profile: &Profile, payload: &[u8], port: Option<u16>) -> Option<DecodedPayload> {
    if let Err(mismatch) = profile.check_port(port) {
        debug!(profile = profile.name, %mismatch, "payload ignored");
        return None;
    }
    Some(decode_channels(profile, payload))
}

/// Decodes every channel record of `payload`, stopping at the first record
/// that is unknown to `profile` or runs past the end.
pub fn decode_channels(profile: &Profile, payload: &[u8]) -> DecodedPayload {
    let mut reader = ChannelReader::new(payload);
    let mut decoded = DecodedPayload::default();

    while !reader.is_empty() {
        if let Err(err) = decode_record(profile, &mut reader, &mut decoded) {
            warn!(
                profile = profile.name,
                fields = decoded.len(),
                %err,
                "payload decoding stopped early"
            );
            decoded.error = Some(err);
            break;
        }
    }

    decoded
}

fn decode_record(
    profile: &Profile,
    reader: &mut ChannelReader<'_>,
    decoded: &mut DecodedPayload,
) -> Result<(), DecodeError> {
    let offset = reader.offset();
    let (id, ty) = reader.read_header()?;
    let channel = profile
        .lookup(id, ty)
        .ok_or(DecodeError::UnrecognizedChannel { id, ty, offset })?;
    let value = channel.kind().decode(reader)?;
    debug!(
        offset,
        channel_id = id,
        channel_type = ty,
        field = channel.field(),
        ?value,
        "decoded channel"
    );
    decoded.insert(channel.field(), value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{decode, decode_channels};
    use crate::codec::error::DecodeError;
    use crate::codec::value::FieldValue;
    use crate::profiles::{AMBIENCE, LIGHT, SOIL};

    fn number(decoded: &crate::DecodedPayload, field: &str) -> f64 {
        decoded
            .get(field)
            .and_then(FieldValue::as_f64)
            .unwrap_or_else(|| panic!("missing numeric field {field}"))
    }

    #[test]
    fn battery_channel() {
        let decoded = decode_channels(&AMBIENCE, &[0x01, 0x75, 0x64]);
        assert_eq!(decoded.get("battery"), Some(&FieldValue::Integer(100)));
        assert_eq!(decoded.len(), 1);
        assert!(!decoded.has_error());
    }

    #[test]
    fn battery_clamps_and_passes_through() {
        let full = decode_channels(&AMBIENCE, &[0x01, 0x75, 200]);
        assert_eq!(full.get("battery"), Some(&FieldValue::Integer(100)));
        let half = decode_channels(&AMBIENCE, &[0x01, 0x75, 50]);
        assert_eq!(half.get("battery"), Some(&FieldValue::Integer(50)));
    }

    #[test]
    fn temperature_channel() {
        let decoded = decode_channels(&AMBIENCE, &[0x03, 0x67, 0xE6, 0x00]);
        assert_eq!(decoded.get("temperature"), Some(&FieldValue::Number(23.0)));
        assert!(!decoded.has_error());
    }

    #[test]
    fn negative_temperature() {
        // -10.5 °C is raw -105 = 0xFF97
        let decoded = decode_channels(&SOIL, &[0x03, 0x67, 0x97, 0xFF]);
        assert!((number(&decoded, "temperature") + 10.5).abs() < 1e-9);
    }

    #[test]
    fn serial_number_channel() {
        let payload = [0xFF, 0x08, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF];
        let decoded = decode_channels(&AMBIENCE, &payload);
        assert_eq!(
            decoded.get("SerialNumber"),
            Some(&FieldValue::Text("aa-bb-cc-dd-ee-ff".to_string()))
        );
        assert!(!decoded.has_error());
    }

    #[test]
    fn hardware_version_channel() {
        let decoded = decode_channels(&AMBIENCE, &[0xFF, 0x09, 0x02, 0x01]);
        assert!((number(&decoded, "HardwareVersion") - 2.01).abs() < 1e-9);
    }

    #[test]
    fn invalid_bcd_is_soft() {
        let decoded = decode_channels(&LIGHT, &[0xFF, 0x0A, 0xFF, 0xFF, 0x01, 0x75, 0x10]);
        assert_eq!(decoded.get("SoftwareVersion"), Some(&FieldValue::Number(0.0)));
        assert_eq!(decoded.get("battery"), Some(&FieldValue::Integer(16)));
        assert!(!decoded.has_error());
    }

    #[test]
    fn sensors_enabled_reads_big_endian() {
        // 0x0041: bit 0 (temperature) and bit 6 (pressure).
        let decoded = decode_channels(&AMBIENCE, &[0xFF, 0x18, 0x00, 0x41]);
        let expected: BTreeMap<String, bool> = [
            ("temperature", true),
            ("humidity", false),
            ("activity", false),
            ("illumination", false),
            ("co2", false),
            ("tvoc", false),
            ("pressure", true),
        ]
        .into_iter()
        .map(|(name, enabled)| (name.to_string(), enabled))
        .collect();
        assert_eq!(decoded.get("SensorsEnabled"), Some(&FieldValue::Flags(expected)));
    }

    #[test]
    fn unknown_channel_stops_with_no_fields() {
        let decoded = decode_channels(&AMBIENCE, &[0x02, 0x99]);
        assert!(decoded.is_empty());
        assert_eq!(
            decoded.error,
            Some(DecodeError::UnrecognizedChannel {
                id: 0x02,
                ty: 0x99,
                offset: 0,
            })
        );
    }

    #[test]
    fn unknown_channel_keeps_earlier_fields() {
        let payload = [0x01, 0x75, 0x50, 0x02, 0x99, 0x01, 0x75, 0x10];
        let decoded = decode_channels(&AMBIENCE, &payload);
        assert_eq!(decoded.get("battery"), Some(&FieldValue::Integer(80)));
        assert_eq!(decoded.len(), 1);
        assert!(matches!(
            decoded.error,
            Some(DecodeError::UnrecognizedChannel { offset: 3, .. })
        ));
    }

    #[test]
    fn single_byte_is_truncated() {
        for byte in [0x00, 0x01, 0xFF] {
            let decoded = decode_channels(&AMBIENCE, &[byte]);
            assert!(decoded.is_empty());
            assert_eq!(
                decoded.error,
                Some(DecodeError::Truncated {
                    offset: 0,
                    needed: 2,
                    available: 1,
                })
            );
        }
    }

    #[test]
    fn truncated_data_keeps_earlier_fields() {
        let payload = [0x01, 0x75, 0x64, 0x03, 0x67, 0xE6];
        let decoded = decode_channels(&AMBIENCE, &payload);
        assert_eq!(decoded.len(), 1);
        assert_eq!(
            decoded.error,
            Some(DecodeError::Truncated {
                offset: 5,
                needed: 2,
                available: 1,
            })
        );
    }

    #[test]
    fn empty_payload_is_clean() {
        let decoded = decode_channels(&SOIL, &[]);
        assert!(decoded.is_empty());
        assert!(!decoded.has_error());
    }

    #[test]
    fn system_channel_not_in_profile_is_unrecognized() {
        let decoded = decode_channels(&SOIL, &[0xFF, 0x18, 0x00, 0x01]);
        assert!(matches!(
            decoded.error,
            Some(DecodeError::UnrecognizedChannel { id: 0xFF, ty: 0x18, .. })
        ));
    }

    #[test]
    fn profiles_do_not_mix() {
        // co2 exists on ambience only.
        let payload = [0x07, 0x7D, 0x90, 0x01];
        assert_eq!(
            decode_channels(&AMBIENCE, &payload).get("co2"),
            Some(&FieldValue::Integer(400))
        );
        assert!(decode_channels(&SOIL, &payload).has_error());
    }

    #[test]
    fn full_ambience_frame() {
        let payload = [
            0x01, 0x75, 0x5C, // battery 92
            0x03, 0x67, 0x0E, 0x01, // temperature 27.0
            0x04, 0x68, 0x71, // humidity 56.5
            0x05, 0x6A, 0x2C, 0x01, // activity 300
            0x06, 0x65, 0x80, 0x02, // illumination 640
            0x07, 0x7D, 0x20, 0x03, // co2 800
            0x08, 0x7D, 0x64, 0x00, // tvoc 100
            0x09, 0x73, 0x95, 0x27, // pressure 1013.3
        ];
        let decoded = decode_channels(&AMBIENCE, &payload);
        assert!(!decoded.has_error());
        assert_eq!(decoded.len(), 8);
        assert_eq!(decoded.get("battery"), Some(&FieldValue::Integer(92)));
        assert!((number(&decoded, "temperature") - 27.0).abs() < 1e-9);
        assert!((number(&decoded, "humidity") - 56.5).abs() < 1e-9);
        assert_eq!(decoded.get("activity"), Some(&FieldValue::Integer(300)));
        assert_eq!(decoded.get("illumination"), Some(&FieldValue::Integer(640)));
        assert_eq!(decoded.get("co2"), Some(&FieldValue::Integer(800)));
        assert_eq!(decoded.get("tvoc"), Some(&FieldValue::Integer(100)));
        assert!((number(&decoded, "pressure") - 1013.3).abs() < 1e-9);
    }

    #[test]
    fn soil_and_light_frames() {
        let soil = decode_channels(&SOIL, &[0x04, 0x68, 0x5B, 0x05, 0x7F, 0xE8, 0x03]);
        assert!((number(&soil, "moisture") - 45.5).abs() < 1e-9);
        assert_eq!(soil.get("conductivity"), Some(&FieldValue::Integer(1000)));

        let light = decode_channels(&LIGHT, &[0x03, 0x94, 0x40, 0xE2, 0x01, 0x00]);
        assert_eq!(light.get("illumination"), Some(&FieldValue::Integer(123_456)));
    }

    #[test]
    fn temperature_round_trips_through_inverse_scale() {
        for celsius in [-40.0_f64, -0.1, 0.0, 21.7, 85.0] {
            let raw = (celsius * 10.0).round() as i16;
            let [lo, hi] = raw.to_le_bytes();
            let decoded = decode_channels(&AMBIENCE, &[0x03, 0x67, lo, hi]);
            assert!((number(&decoded, "temperature") - celsius).abs() < 1e-9);
        }
    }

    #[test]
    fn decoding_is_idempotent() {
        let payload = [0x01, 0x75, 0x64, 0xFF, 0x09, 0x01, 0x10, 0x02];
        let first = decode_channels(&AMBIENCE, &payload);
        let second = decode_channels(&AMBIENCE, &payload);
        assert_eq!(first, second);
    }

    #[test]
    fn port_filter() {
        let payload = [0x01, 0x75, 0x64];
        assert!(decode(&AMBIENCE, &payload, None).is_some());
        assert!(decode(&AMBIENCE, &payload, Some(85)).is_some());
        assert!(decode(&AMBIENCE, &payload, Some(86)).is_none());
    }

    #[test]
    fn decodes_concurrently() {
        let payload = [0x03, 0x67, 0xE6, 0x00];
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(move || decode_channels(&AMBIENCE, &payload)))
            .collect();
        for handle in handles {
            let decoded = handle.join().expect("decode thread");
            assert_eq!(decoded.get("temperature"), Some(&FieldValue::Number(23.0)));
        }
    }
}
