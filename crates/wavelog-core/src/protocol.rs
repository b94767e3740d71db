//! GATT identifiers exposed by the sensor

use uuid::Uuid;

// ----------------------------------------------------------------------------
// Vendor Service and Characteristic UUIDs
// ----------------------------------------------------------------------------

/// Primary service advertised by the sensor
pub const SENSOR_SERVICE_UUID: Uuid = Uuid::from_u128(0xb42e1c08_ade7_11e4_89d3_123b93f75cba);

/// Characteristic holding the current-values sensor record
pub const SENSOR_RECORD_CHARACTERISTIC_UUID: Uuid =
    Uuid::from_u128(0xb42e2a68_ade7_11e4_89d3_123b93f75cba);

// ----------------------------------------------------------------------------
// Bluetooth SIG Assigned Numbers
// ----------------------------------------------------------------------------

/// Device Information service (0x180A)
pub const DEVICE_INFORMATION_SERVICE_UUID: Uuid = sig_uuid(0x180A);

/// Model Number String characteristic (0x2A24)
pub const MODEL_NUMBER_STRING_UUID: Uuid = sig_uuid(0x2A24);

/// Serial Number String characteristic (0x2A25)
pub const SERIAL_NUMBER_STRING_UUID: Uuid = sig_uuid(0x2A25);

/// Expand a 16-bit SIG assigned number onto the Bluetooth base UUID
pub const fn sig_uuid(short: u16) -> Uuid {
    Uuid::from_u128(0x0000_0000_0000_1000_8000_0080_5f9b_34fb | ((short as u128) << 96))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_uuids_match_device() {
        assert_eq!(
            SENSOR_SERVICE_UUID.to_string(),
            "b42e1c08-ade7-11e4-89d3-123b93f75cba"
        );
        assert_eq!(
            SENSOR_RECORD_CHARACTERISTIC_UUID.to_string(),
            "b42e2a68-ade7-11e4-89d3-123b93f75cba"
        );
    }

    #[test]
    fn test_sig_uuids() {
        assert_eq!(
            DEVICE_INFORMATION_SERVICE_UUID.to_string(),
            "0000180a-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(
            MODEL_NUMBER_STRING_UUID.to_string(),
            "00002a24-0000-1000-8000-00805f9b34fb"
        );
        assert_eq!(
            SERIAL_NUMBER_STRING_UUID.to_string(),
            "00002a25-0000-1000-8000-00805f9b34fb"
        );
    }
}
