//! `btleplug` backed implementation of the BLE capability traits

use async_trait::async_trait;
use btleplug::api::{
    BDAddr, Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, ScanFilter,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::stream::StreamExt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::BleError;
use crate::transport::{
    AdvertisementStream, BleAdapter, BleDevice, CharacteristicHandle, ScanResult, ServiceHandle,
};

// ----------------------------------------------------------------------------
// Adapter
// ----------------------------------------------------------------------------

/// The first BLE adapter reported by the host stack
#[derive(Default)]
pub struct BtleplugAdapter {
    adapter: Option<Adapter>,
}

impl BtleplugAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn adapter(&self) -> Result<&Adapter, BleError> {
        self.adapter.as_ref().ok_or(BleError::AdapterNotEnabled)
    }
}

#[async_trait]
impl BleAdapter for BtleplugAdapter {
    type Device = BtleplugDevice;

    async fn enable(&mut self) -> Result<(), BleError> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(BleError::AdapterNotAvailable)?;

        match adapter.adapter_info().await {
            Ok(description) => info!("BLE adapter initialized: {}", description),
            Err(_) => info!("BLE adapter initialized"),
        }
        self.adapter = Some(adapter);
        Ok(())
    }

    async fn start_scan(&self, services: &[Uuid]) -> Result<AdvertisementStream, BleError> {
        let adapter = self.adapter()?.clone();

        // Subscribe before scanning so no discovery event is missed
        let events = adapter.events().await?;
        adapter
            .start_scan(ScanFilter {
                services: services.to_vec(),
            })
            .await?;
        debug!("Started BLE scan (filter: {:?})", services);

        let stream = events.filter_map(move |event| {
            let adapter = adapter.clone();
            async move {
                let id = match event {
                    CentralEvent::DeviceDiscovered(id)
                    | CentralEvent::DeviceUpdated(id)
                    | CentralEvent::ServicesAdvertisement { id, .. }
                    | CentralEvent::ServiceDataAdvertisement { id, .. } => id,
                    _ => return None,
                };
                let peripheral = adapter.peripheral(&id).await.ok()?;
                let properties = peripheral.properties().await.ok()??;
                Some(ScanResult::from(properties))
            }
        });
        Ok(stream.boxed())
    }

    async fn stop_scan(&self) -> Result<(), BleError> {
        self.adapter()?.stop_scan().await?;
        debug!("Stopped BLE scan");
        Ok(())
    }

    async fn connect(&self, address: BDAddr) -> Result<BtleplugDevice, BleError> {
        let peripheral = self
            .adapter()?
            .peripherals()
            .await?
            .into_iter()
            .find(|p| p.address() == address)
            .ok_or(BleError::DeviceNotFound { address })?;

        peripheral.connect().await?;
        info!("Connected to {}", address);
        Ok(BtleplugDevice { peripheral })
    }
}

// ----------------------------------------------------------------------------
// Connected Peripheral
// ----------------------------------------------------------------------------

/// A peripheral connected through `btleplug`
pub struct BtleplugDevice {
    peripheral: Peripheral,
}

impl BtleplugDevice {
    fn find_characteristic(
        &self,
        handle: &CharacteristicHandle,
    ) -> Result<Characteristic, BleError> {
        self.peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == handle.uuid && c.service_uuid == handle.service_uuid)
            .ok_or(BleError::UnknownAttribute { uuid: handle.uuid })
    }
}

#[async_trait]
impl BleDevice for BtleplugDevice {
    fn address(&self) -> BDAddr {
        self.peripheral.address()
    }

    async fn discover_services(&self, filter: &[Uuid]) -> Result<Vec<ServiceHandle>, BleError> {
        self.peripheral.discover_services().await?;
        let services: Vec<ServiceHandle> = self
            .peripheral
            .services()
            .into_iter()
            .filter(|s| filter.is_empty() || filter.contains(&s.uuid))
            .map(|s| ServiceHandle { uuid: s.uuid })
            .collect();
        debug!(
            "Discovered {} matching services on {}",
            services.len(),
            self.address()
        );
        Ok(services)
    }

    async fn discover_characteristics(
        &self,
        service: &ServiceHandle,
        filter: Option<&[Uuid]>,
    ) -> Result<Vec<CharacteristicHandle>, BleError> {
        let discovered = self
            .peripheral
            .services()
            .into_iter()
            .find(|s| s.uuid == service.uuid)
            .ok_or(BleError::UnknownAttribute { uuid: service.uuid })?;

        Ok(discovered
            .characteristics
            .into_iter()
            .filter(|c| filter.map_or(true, |wanted| wanted.contains(&c.uuid)))
            .map(|c| CharacteristicHandle {
                uuid: c.uuid,
                service_uuid: c.service_uuid,
            })
            .collect())
    }

    async fn read(&self, characteristic: &CharacteristicHandle) -> Result<Vec<u8>, BleError> {
        let target = self.find_characteristic(characteristic)?;
        Ok(self.peripheral.read(&target).await?)
    }

    async fn disconnect(&self) -> Result<(), BleError> {
        self.peripheral.disconnect().await?;
        info!("Disconnected from {}", self.address());
        Ok(())
    }
}
