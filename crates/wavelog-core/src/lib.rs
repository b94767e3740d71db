//! Core types for the wavelog sensor reader
//!
//! This crate holds everything about a radon / air-quality sensor that does not
//! need a radio: the GATT identifiers the device exposes, the binary layout of
//! its current-values characteristic, the decoded measurement types, and the
//! line-oriented sink that acquisitions are written to.
//!
//! ## Modules
//!
//! - [`protocol`] - Service and characteristic UUIDs
//! - [`decoder`] - Binary sensor record decoding
//! - [`record`] - Decoded measurement types
//! - [`sink`] - Line-oriented output sink
//! - [`error`] - Error types

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod decoder;
pub mod error;
pub mod protocol;
pub mod record;
pub mod sink;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use decoder::{decode, SENSOR_RECORD_LEN, SUPPORTED_VERSION};
pub use error::{DecodeError, Result};
pub use protocol::{
    DEVICE_INFORMATION_SERVICE_UUID, MODEL_NUMBER_STRING_UUID, SENSOR_RECORD_CHARACTERISTIC_UUID,
    SENSOR_SERVICE_UUID, SERIAL_NUMBER_STRING_UUID,
};
pub use record::{DeviceInfo, RawSample, SensorRecord};
pub use sink::{LineSink, LogSink, MemorySink};
