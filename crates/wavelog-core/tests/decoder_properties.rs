//! Property tests for sensor record decoding

use proptest::prelude::*;
use wavelog_core::{decode, DecodeError, DeviceInfo, SensorRecord, SENSOR_RECORD_LEN};

proptest! {
    #[test]
    fn decode_is_deterministic(
        buf in proptest::collection::vec(any::<u8>(), SENSOR_RECORD_LEN..64)
    ) {
        let first = decode(&buf).unwrap();
        let second = decode(&buf).unwrap();
        prop_assert_eq!(first.humidity.to_bits(), second.humidity.to_bits());
        prop_assert_eq!(first.temperature.to_bits(), second.temperature.to_bits());
        prop_assert_eq!(first.pressure.to_bits(), second.pressure.to_bits());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn short_buffers_never_decode(
        buf in proptest::collection::vec(any::<u8>(), 0..SENSOR_RECORD_LEN)
    ) {
        prop_assert_eq!(
            decode(&buf),
            Err(DecodeError::Truncated { len: buf.len(), required: SENSOR_RECORD_LEN })
        );
    }

    #[test]
    fn integer_fields_pass_through(
        radon_short in any::<u16>(),
        radon_long in any::<u16>(),
        co2 in any::<u16>(),
        voc in any::<u16>(),
    ) {
        let mut buf = vec![1u8, 0, 0, 0];
        buf.extend_from_slice(&radon_short.to_le_bytes());
        buf.extend_from_slice(&radon_long.to_le_bytes());
        buf.extend_from_slice(&[0, 0, 0, 0]);
        buf.extend_from_slice(&co2.to_le_bytes());
        buf.extend_from_slice(&voc.to_le_bytes());

        let sample = decode(&buf).unwrap();
        prop_assert_eq!(sample.radon_short, radon_short);
        prop_assert_eq!(sample.radon_long, radon_long);
        prop_assert_eq!(sample.co2, co2);
        prop_assert_eq!(sample.voc, voc);
    }

    #[test]
    fn version_never_rejects(version in any::<u8>()) {
        let mut buf = vec![0u8; SENSOR_RECORD_LEN];
        buf[0] = version;
        let sample = decode(&buf).unwrap();
        prop_assert_eq!(sample.is_supported_version(), version == 1);
    }
}

#[test]
fn reference_acquisition_record() {
    let buf = [
        0x01, 0x96, 0x00, 0x00, 0x1E, 0x00, 0x1E, 0x00, 0x4C, 0x09, 0xF4, 0x88, 0x90, 0x01, 0x64,
        0x00,
    ];
    let sample = decode(&buf).unwrap();
    let record = SensorRecord::new(&DeviceInfo::new("2930", "000123"), &sample);

    assert_eq!(record.serial, "2930000123");
    assert_eq!(record.humidity, 75.0);
    assert_eq!(record.radon_short_term, 30);
    assert_eq!(record.radon_long_term, 30);
    assert_eq!(record.temperature, 23.80);
    assert_eq!(record.pressure, 701.2);
    assert_eq!(record.co2, 400);
    assert_eq!(record.voc, 100);
    assert_eq!(
        record.to_json_line().unwrap(),
        r#"{"serial":"2930000123","humidity":75.0,"radon_short":30,"radon_long":30,"temperature":23.8,"pressure":701.2,"co2":400,"voc":100}"#
    );
}
