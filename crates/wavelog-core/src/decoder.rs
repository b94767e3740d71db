//! Binary sensor record decoding
//!
//! The current-values characteristic returns a little-endian record:
//!
//! | offset | width | field                        | scaling  |
//! |--------|-------|------------------------------|----------|
//! | 0      | u8    | format version (expect 1)    |          |
//! | 1      | u8    | humidity                     | / 2.0    |
//! | 2      | 2     | reserved                     |          |
//! | 4      | u16   | radon short-term (Bq/m³)     |          |
//! | 6      | u16   | radon long-term (Bq/m³)      |          |
//! | 8      | i16   | temperature (°C)             | / 100.0  |
//! | 10     | u16   | pressure (hPa)               | / 50.0   |
//! | 12     | u16   | CO2 (ppm)                    |          |
//! | 14     | u16   | VOC (ppb)                    |          |
//!
//! Anything past byte 16 is ignored.

use tracing::warn;

use crate::error::{DecodeError, Result};
use crate::record::RawSample;

// ----------------------------------------------------------------------------
// Layout Constants
// ----------------------------------------------------------------------------

/// Minimum number of bytes a sensor record must contain
pub const SENSOR_RECORD_LEN: usize = 16;

/// The only layout version this decoder was written against
pub const SUPPORTED_VERSION: u8 = 1;

const VERSION_OFFSET: usize = 0;
const HUMIDITY_OFFSET: usize = 1;
const RADON_SHORT_OFFSET: usize = 4;
const RADON_LONG_OFFSET: usize = 6;
const TEMPERATURE_OFFSET: usize = 8;
const PRESSURE_OFFSET: usize = 10;
const CO2_OFFSET: usize = 12;
const VOC_OFFSET: usize = 14;

// ----------------------------------------------------------------------------
// Decoding
// ----------------------------------------------------------------------------

/// Decode a sensor record buffer into physical values
///
/// Unknown format versions are logged and decoded with the version 1 layout;
/// check [`RawSample::is_supported_version`] to see whether that happened.
pub fn decode(buf: &[u8]) -> Result<RawSample> {
    if buf.len() < SENSOR_RECORD_LEN {
        return Err(DecodeError::Truncated {
            len: buf.len(),
            required: SENSOR_RECORD_LEN,
        });
    }

    let sample = RawSample {
        version: buf[VERSION_OFFSET],
        humidity: f32::from(buf[HUMIDITY_OFFSET]) / 2.0,
        radon_short: read_u16(buf, RADON_SHORT_OFFSET),
        radon_long: read_u16(buf, RADON_LONG_OFFSET),
        temperature: f32::from(read_i16(buf, TEMPERATURE_OFFSET)) / 100.0,
        pressure: f32::from(read_u16(buf, PRESSURE_OFFSET)) / 50.0,
        co2: read_u16(buf, CO2_OFFSET),
        voc: read_u16(buf, VOC_OFFSET),
    };

    if !sample.is_supported_version() {
        warn!(
            "Unknown sensor record version {}, only version {} is supported",
            sample.version, SUPPORTED_VERSION
        );
    }
    Ok(sample)
}

// Callers have already checked the buffer length.
fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn read_i16(buf: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([buf[offset], buf[offset + 1]])
}
