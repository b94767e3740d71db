//! Error types for BLE acquisition
//!
//! Each layer has its own error: [`BleError`] for the stack itself,
//! [`ReadError`] and [`DiscoveryError`] for GATT access, [`SessionError`] for
//! the discovery lifecycle. [`AcquisitionError`] is what the orchestrator
//! returns and follows the failure classes a caller acts on.

use btleplug::api::BDAddr;
use thiserror::Error;
use uuid::Uuid;
use wavelog_core::DecodeError;

use crate::session::SessionState;

// ----------------------------------------------------------------------------
// Transport Errors
// ----------------------------------------------------------------------------

/// Errors raised by a BLE stack implementation
#[derive(Error, Debug)]
pub enum BleError {
    #[error("BLE stack error: {0}")]
    Btleplug(#[from] btleplug::Error),

    #[error("BLE adapter not available")]
    AdapterNotAvailable,

    #[error("BLE adapter not enabled")]
    AdapterNotEnabled,

    #[error("Device not found: {address}")]
    DeviceNotFound { address: BDAddr },

    #[error("Attribute not found on device: {uuid}")]
    UnknownAttribute { uuid: Uuid },

    #[error("Transport error: {0}")]
    Transport(String),
}

// ----------------------------------------------------------------------------
// GATT Errors
// ----------------------------------------------------------------------------

/// Failure reading a characteristic value
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Failed to read characteristic {characteristic}: {source}")]
    Transport {
        characteristic: Uuid,
        #[source]
        source: BleError,
    },
}

/// Failure while scanning or walking the GATT tree
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Scan failed: {0}")]
    Scan(#[source] BleError),

    #[error("Failed to discover services: {0}")]
    ServiceDiscovery(#[source] BleError),

    #[error("Failed to discover characteristics of service {service}: {source}")]
    CharacteristicDiscovery {
        service: Uuid,
        #[source]
        source: BleError,
    },

    #[error("Service not found: {0}")]
    ServiceNotFound(Uuid),

    #[error("Characteristic not found: {0}")]
    CharacteristicNotFound(Uuid),
}

// ----------------------------------------------------------------------------
// Session Errors
// ----------------------------------------------------------------------------

/// Errors from the discovery session lifecycle
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("Failed to enable BLE stack: {0}")]
    Enable(#[source] BleError),

    #[error("Scan failed: {0}")]
    Scan(#[source] BleError),

    #[error("Failed to connect to {address}: {source}")]
    Connect {
        address: BDAddr,
        #[source]
        source: BleError,
    },
}

// ----------------------------------------------------------------------------
// Acquisition Errors
// ----------------------------------------------------------------------------

/// Errors surfaced by the acquisition orchestrator
#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Fatal setup error: {0}")]
    FatalSetup(String),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("Failed to connect to {address}: {source}")]
    Connect {
        address: BDAddr,
        #[source]
        source: BleError,
    },

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("Failed to decode sensor record: {0}")]
    Decode(#[from] DecodeError),

    #[error("Failed to serialize sensor record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Sink(#[source] std::io::Error),

    #[error(transparent)]
    Session(SessionError),
}

impl From<SessionError> for AcquisitionError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Enable(source) => {
                AcquisitionError::FatalSetup(format!("enable BLE stack: {}", source))
            }
            SessionError::Scan(source) => AcquisitionError::Discovery(DiscoveryError::Scan(source)),
            SessionError::Connect { address, source } => {
                AcquisitionError::Connect { address, source }
            }
            other => AcquisitionError::Session(other),
        }
    }
}

/// Result type for acquisition operations
pub type Result<T> = std::result::Result<T, AcquisitionError>;
