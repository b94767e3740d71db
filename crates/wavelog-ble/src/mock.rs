//! In-memory BLE stack
//!
//! [`MockAdapter`] plays back a fixed list of advertisements and hands out
//! [`MockDevice`]s built from [`MockPeripheral`] descriptions. Every call is
//! recorded in a shared [`MockJournal`] so tests can check ordering, for
//! example that each connect is followed by exactly one disconnect.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use btleplug::api::BDAddr;
use futures::stream::{self, StreamExt};
use uuid::Uuid;

use crate::error::BleError;
use crate::transport::{
    AdvertisementStream, BleAdapter, BleDevice, CharacteristicHandle, ScanResult, ServiceHandle,
};

// ----------------------------------------------------------------------------
// Journal
// ----------------------------------------------------------------------------

/// A call observed by the mock stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    Enabled,
    ScanStarted { filter: Vec<Uuid> },
    ScanStopped,
    Connected(BDAddr),
    ConnectFailed(BDAddr),
    Read { address: BDAddr, uuid: Uuid },
    Disconnected(BDAddr),
}

/// Shared, ordered record of mock calls
#[derive(Debug, Clone, Default)]
pub struct MockJournal {
    events: Arc<Mutex<Vec<MockEvent>>>,
}

impl MockJournal {
    fn record(&self, event: MockEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    pub fn events(&self) -> Vec<MockEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Number of recorded events equal to `event`
    pub fn count(&self, event: &MockEvent) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }
}

// ----------------------------------------------------------------------------
// Peripheral Description
// ----------------------------------------------------------------------------

/// A characteristic with a canned read result
#[derive(Debug, Clone)]
pub struct MockCharacteristic {
    pub uuid: Uuid,
    pub value: Result<Vec<u8>, String>,
}

/// A service and its characteristics
#[derive(Debug, Clone)]
pub struct MockService {
    pub uuid: Uuid,
    pub characteristics: Vec<MockCharacteristic>,
    /// When set, listing the characteristics fails with this reason
    pub discovery_error: Option<String>,
}

impl MockService {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            characteristics: Vec::new(),
            discovery_error: None,
        }
    }

    pub fn failing_discovery(mut self, reason: impl Into<String>) -> Self {
        self.discovery_error = Some(reason.into());
        self
    }

    pub fn with_value(mut self, uuid: Uuid, value: impl Into<Vec<u8>>) -> Self {
        self.characteristics.push(MockCharacteristic {
            uuid,
            value: Ok(value.into()),
        });
        self
    }

    pub fn with_read_error(mut self, uuid: Uuid, reason: impl Into<String>) -> Self {
        self.characteristics.push(MockCharacteristic {
            uuid,
            value: Err(reason.into()),
        });
        self
    }
}

/// Description of a peripheral the mock adapter can connect to
#[derive(Debug, Clone)]
pub struct MockPeripheral {
    pub address: BDAddr,
    pub services: Vec<MockService>,
    /// When set, connecting fails with this reason
    pub connect_error: Option<String>,
    /// When set, service discovery fails with this reason
    pub discovery_error: Option<String>,
    /// Whether characteristic filters are honored; some devices ignore them
    pub honors_characteristic_filter: bool,
}

impl MockPeripheral {
    pub fn new(address: BDAddr) -> Self {
        Self {
            address,
            services: Vec::new(),
            connect_error: None,
            discovery_error: None,
            honors_characteristic_filter: true,
        }
    }

    pub fn with_service(mut self, service: MockService) -> Self {
        self.services.push(service);
        self
    }

    pub fn failing_connect(mut self, reason: impl Into<String>) -> Self {
        self.connect_error = Some(reason.into());
        self
    }

    pub fn failing_discovery(mut self, reason: impl Into<String>) -> Self {
        self.discovery_error = Some(reason.into());
        self
    }

    /// Return nothing for filtered characteristic discovery
    pub fn ignoring_characteristic_filter(mut self) -> Self {
        self.honors_characteristic_filter = false;
        self
    }
}

// ----------------------------------------------------------------------------
// Adapter
// ----------------------------------------------------------------------------

/// Scripted adapter
#[derive(Debug, Clone, Default)]
pub struct MockAdapter {
    pub advertisements: Vec<ScanResult>,
    pub peripherals: Vec<MockPeripheral>,
    pub enable_error: Option<String>,
    enabled: bool,
    journal: MockJournal,
}

impl MockAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_advertisement(mut self, advertisement: ScanResult) -> Self {
        self.advertisements.push(advertisement);
        self
    }

    pub fn with_peripheral(mut self, peripheral: MockPeripheral) -> Self {
        self.peripherals.push(peripheral);
        self
    }

    pub fn failing_enable(mut self, reason: impl Into<String>) -> Self {
        self.enable_error = Some(reason.into());
        self
    }

    /// Handle on the call journal; clones observe the same events
    pub fn journal(&self) -> MockJournal {
        self.journal.clone()
    }

    fn ensure_enabled(&self) -> Result<(), BleError> {
        if self.enabled {
            Ok(())
        } else {
            Err(BleError::AdapterNotEnabled)
        }
    }
}

#[async_trait]
impl BleAdapter for MockAdapter {
    type Device = MockDevice;

    async fn enable(&mut self) -> Result<(), BleError> {
        if let Some(reason) = &self.enable_error {
            return Err(BleError::Transport(reason.clone()));
        }
        self.enabled = true;
        self.journal.record(MockEvent::Enabled);
        Ok(())
    }

    async fn start_scan(&self, services: &[Uuid]) -> Result<AdvertisementStream, BleError> {
        self.ensure_enabled()?;
        self.journal.record(MockEvent::ScanStarted {
            filter: services.to_vec(),
        });

        // Advertisements arrive up front, then the radio stays quiet until stopped
        Ok(stream::iter(self.advertisements.clone())
            .chain(stream::pending())
            .boxed())
    }

    async fn stop_scan(&self) -> Result<(), BleError> {
        self.ensure_enabled()?;
        self.journal.record(MockEvent::ScanStopped);
        Ok(())
    }

    async fn connect(&self, address: BDAddr) -> Result<MockDevice, BleError> {
        self.ensure_enabled()?;
        let Some(peripheral) = self.peripherals.iter().find(|p| p.address == address) else {
            self.journal.record(MockEvent::ConnectFailed(address));
            return Err(BleError::DeviceNotFound { address });
        };
        if let Some(reason) = &peripheral.connect_error {
            self.journal.record(MockEvent::ConnectFailed(address));
            return Err(BleError::Transport(reason.clone()));
        }

        self.journal.record(MockEvent::Connected(address));
        Ok(MockDevice {
            peripheral: peripheral.clone(),
            journal: self.journal.clone(),
        })
    }
}

// ----------------------------------------------------------------------------
// Connected Device
// ----------------------------------------------------------------------------

/// Connection to a [`MockPeripheral`]
#[derive(Debug)]
pub struct MockDevice {
    peripheral: MockPeripheral,
    journal: MockJournal,
}

impl MockDevice {
    fn service(&self, uuid: &Uuid) -> Result<&MockService, BleError> {
        self.peripheral
            .services
            .iter()
            .find(|s| s.uuid == *uuid)
            .ok_or(BleError::UnknownAttribute { uuid: *uuid })
    }
}

#[async_trait]
impl BleDevice for MockDevice {
    fn address(&self) -> BDAddr {
        self.peripheral.address
    }

    async fn discover_services(&self, filter: &[Uuid]) -> Result<Vec<ServiceHandle>, BleError> {
        if let Some(reason) = &self.peripheral.discovery_error {
            return Err(BleError::Transport(reason.clone()));
        }
        Ok(self
            .peripheral
            .services
            .iter()
            .filter(|s| filter.is_empty() || filter.contains(&s.uuid))
            .map(|s| ServiceHandle { uuid: s.uuid })
            .collect())
    }

    async fn discover_characteristics(
        &self,
        service: &ServiceHandle,
        filter: Option<&[Uuid]>,
    ) -> Result<Vec<CharacteristicHandle>, BleError> {
        let mock_service = self.service(&service.uuid)?;
        if let Some(reason) = &mock_service.discovery_error {
            return Err(BleError::Transport(reason.clone()));
        }
        if filter.is_some() && !self.peripheral.honors_characteristic_filter {
            return Ok(Vec::new());
        }
        Ok(mock_service
            .characteristics
            .iter()
            .filter(|c| filter.map_or(true, |wanted| wanted.contains(&c.uuid)))
            .map(|c| CharacteristicHandle {
                uuid: c.uuid,
                service_uuid: service.uuid,
            })
            .collect())
    }

    async fn read(&self, characteristic: &CharacteristicHandle) -> Result<Vec<u8>, BleError> {
        self.journal.record(MockEvent::Read {
            address: self.peripheral.address,
            uuid: characteristic.uuid,
        });
        let value = self
            .service(&characteristic.service_uuid)?
            .characteristics
            .iter()
            .find(|c| c.uuid == characteristic.uuid)
            .ok_or(BleError::UnknownAttribute {
                uuid: characteristic.uuid,
            })?
            .value
            .clone();
        value.map_err(BleError::Transport)
    }

    async fn disconnect(&self) -> Result<(), BleError> {
        self.journal
            .record(MockEvent::Disconnected(self.peripheral.address));
        Ok(())
    }
}
