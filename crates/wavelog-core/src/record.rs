//! Decoded measurement types

use serde::{Deserialize, Serialize};

use crate::decoder::SUPPORTED_VERSION;

// ----------------------------------------------------------------------------
// Raw Sample
// ----------------------------------------------------------------------------

/// Physical values decoded from one sensor record buffer
///
/// Produced by [`crate::decode`]. It carries the format version so that the
/// caller can see when the device reported a layout other than version 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// Format version byte as reported by the device
    pub version: u8,
    /// Relative humidity in percent
    pub humidity: f32,
    /// Short-term radon average in Bq/m³
    pub radon_short: u16,
    /// Long-term radon average in Bq/m³
    pub radon_long: u16,
    /// Temperature in °C
    pub temperature: f32,
    /// Atmospheric pressure in hPa
    pub pressure: f32,
    /// CO2 concentration in ppm
    pub co2: u16,
    /// VOC concentration in ppb
    pub voc: u16,
}

impl RawSample {
    /// Whether the record was produced by the one layout version this decoder knows
    pub fn is_supported_version(&self) -> bool {
        self.version == SUPPORTED_VERSION
    }
}

// ----------------------------------------------------------------------------
// Device Information
// ----------------------------------------------------------------------------

/// Identity strings read from the Device Information service
///
/// Either field may be empty when the device did not return a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub model: String,
    pub serial: String,
}

impl DeviceInfo {
    pub fn new(model: impl Into<String>, serial: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            serial: serial.into(),
        }
    }

    /// True once both model and serial have been obtained
    pub fn is_complete(&self) -> bool {
        !self.model.is_empty() && !self.serial.is_empty()
    }

    /// Model followed directly by serial, with no separator
    pub fn combined_serial(&self) -> String {
        let mut combined = String::with_capacity(self.model.len() + self.serial.len());
        combined.push_str(&self.model);
        combined.push_str(&self.serial);
        combined
    }
}

// ----------------------------------------------------------------------------
// Sensor Record
// ----------------------------------------------------------------------------

/// One complete acquisition, as written to the log sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    pub serial: String,
    pub humidity: f32,
    #[serde(rename = "radon_short")]
    pub radon_short_term: u32,
    #[serde(rename = "radon_long")]
    pub radon_long_term: u32,
    pub temperature: f32,
    pub pressure: f32,
    pub co2: u32,
    pub voc: u32,
}

impl SensorRecord {
    /// Combine decoded values with the device identity
    pub fn new(info: &DeviceInfo, sample: &RawSample) -> Self {
        Self {
            serial: info.combined_serial(),
            humidity: sample.humidity,
            radon_short_term: u32::from(sample.radon_short),
            radon_long_term: u32::from(sample.radon_long),
            temperature: sample.temperature,
            pressure: sample.pressure,
            co2: u32::from(sample.co2),
            voc: u32::from(sample.voc),
        }
    }

    /// Serialize as a single JSON line
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
