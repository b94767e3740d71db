//! Capability traits over the BLE stack
//!
//! The discovery session and the GATT helpers only talk to these traits, so a
//! real radio ([`crate::platform`]) and an in-memory device ([`crate::mock`])
//! are interchangeable.

use std::collections::HashMap;

use async_trait::async_trait;
use btleplug::api::{BDAddr, PeripheralProperties};
use futures::stream::BoxStream;
use uuid::Uuid;

use crate::error::BleError;

// ----------------------------------------------------------------------------
// Scan Results
// ----------------------------------------------------------------------------

/// One advertisement observed during a scan window
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub address: BDAddr,
    pub rssi: Option<i16>,
    pub local_name: Option<String>,
    /// Advertised service UUIDs
    pub services: Vec<Uuid>,
    /// Manufacturer-specific payload, keyed by company identifier
    pub manufacturer_data: HashMap<u16, Vec<u8>>,
    /// Service data payload, keyed by service UUID
    pub service_data: HashMap<Uuid, Vec<u8>>,
}

impl ScanResult {
    pub fn new(address: BDAddr) -> Self {
        Self {
            address,
            rssi: None,
            local_name: None,
            services: Vec::new(),
            manufacturer_data: HashMap::new(),
            service_data: HashMap::new(),
        }
    }

    pub fn with_rssi(mut self, rssi: i16) -> Self {
        self.rssi = Some(rssi);
        self
    }

    pub fn with_local_name(mut self, name: impl Into<String>) -> Self {
        self.local_name = Some(name.into());
        self
    }

    pub fn with_service(mut self, uuid: Uuid) -> Self {
        self.services.push(uuid);
        self
    }

    /// Whether the advertisement carries `uuid` in its service list
    pub fn advertises(&self, uuid: &Uuid) -> bool {
        self.services.contains(uuid) || self.service_data.contains_key(uuid)
    }
}

impl From<PeripheralProperties> for ScanResult {
    fn from(properties: PeripheralProperties) -> Self {
        Self {
            address: properties.address,
            rssi: properties.rssi,
            local_name: properties.local_name,
            services: properties.services,
            manufacturer_data: properties.manufacturer_data,
            service_data: properties.service_data,
        }
    }
}

/// Advertisements delivered while a scan is running
pub type AdvertisementStream = BoxStream<'static, ScanResult>;

// ----------------------------------------------------------------------------
// GATT Handles
// ----------------------------------------------------------------------------

/// A primary service discovered on a connected device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceHandle {
    pub uuid: Uuid,
}

/// A characteristic discovered under a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharacteristicHandle {
    pub uuid: Uuid,
    pub service_uuid: Uuid,
}

// ----------------------------------------------------------------------------
// Capability Traits
// ----------------------------------------------------------------------------

/// The local radio: enable, scan, stop scanning and connect
#[async_trait]
pub trait BleAdapter: Send + Sync {
    /// Connected peripheral type produced by [`BleAdapter::connect`]
    type Device: BleDevice + 'static;

    /// Bring the adapter up; must succeed before any other call
    async fn enable(&mut self) -> Result<(), BleError>;

    /// Start scanning, optionally restricted to advertisements carrying `services`
    ///
    /// An empty slice scans unfiltered. Implementations may ignore the filter,
    /// so callers re-check it on the results.
    async fn start_scan(&self, services: &[Uuid]) -> Result<AdvertisementStream, BleError>;

    /// Stop a running scan
    async fn stop_scan(&self) -> Result<(), BleError>;

    /// Connect to the peripheral at `address`
    async fn connect(&self, address: BDAddr) -> Result<Self::Device, BleError>;
}

/// A connected peripheral
#[async_trait]
pub trait BleDevice: Send + Sync {
    fn address(&self) -> BDAddr;

    /// Discover primary services; an empty filter returns all of them
    async fn discover_services(&self, filter: &[Uuid]) -> Result<Vec<ServiceHandle>, BleError>;

    /// List characteristics of `service`, optionally restricted to `filter`
    async fn discover_characteristics(
        &self,
        service: &ServiceHandle,
        filter: Option<&[Uuid]>,
    ) -> Result<Vec<CharacteristicHandle>, BleError>;

    /// Read the current value of a characteristic
    async fn read(&self, characteristic: &CharacteristicHandle) -> Result<Vec<u8>, BleError>;

    async fn disconnect(&self) -> Result<(), BleError>;
}
