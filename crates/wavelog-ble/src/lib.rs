//! Bluetooth Low Energy acquisition pipeline for wavelog
//!
//! This crate drives a radon / air-quality sensor over GATT: it enables the
//! local adapter, scans for the sensor service, connects, walks services and
//! characteristics, reads the current-values record and hands it to the
//! decoder in `wavelog-core`.
//!
//! ## Architecture
//!
//! - [`transport`] - Capability traits over the BLE stack ([`BleAdapter`], [`BleDevice`])
//! - [`platform`] - `btleplug` implementation of those traits
//! - [`mock`] - In-memory implementation for tests and dry runs
//! - [`connection`] - Scoped connection guard with guaranteed disconnect
//! - [`reader`] - Bounded characteristic reads
//! - [`resolver`] - Service / characteristic resolution
//! - [`session`] - Discovery session state machine
//! - [`orchestrator`] - Scan-and-report and connect-and-read run modes
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wavelog_ble::{AcquisitionOrchestrator, BleConfig, BtleplugAdapter};
//! use wavelog_core::LogSink;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let address = "AA:BB:CC:DD:EE:FF".parse()?;
//! let mut orchestrator =
//!     AcquisitionOrchestrator::new(BtleplugAdapter::new(), BleConfig::default());
//!
//! let record = orchestrator.acquire(address, &LogSink::stdout()).await?;
//! println!("CO2: {} ppm", record.co2);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod mock;
pub mod orchestrator;
pub mod platform;
pub mod reader;
pub mod resolver;
pub mod session;
pub mod transport;

// Public API exports
pub use config::BleConfig;
pub use connection::ConnectedDevice;
pub use error::{AcquisitionError, BleError, DiscoveryError, ReadError, SessionError};
pub use orchestrator::{AcquisitionOrchestrator, DeviceReport};
pub use platform::{BtleplugAdapter, BtleplugDevice};
pub use reader::{CharacteristicReader, MAX_READ_LEN};
pub use resolver::ServiceResolver;
pub use session::{DiscoverySession, ScanMode, SessionState};
pub use transport::{
    AdvertisementStream, BleAdapter, BleDevice, CharacteristicHandle, ScanResult, ServiceHandle,
};

pub use btleplug::api::BDAddr;
