//! Service and characteristic resolution
//!
//! Some sensors ignore characteristic UUID filters and return an empty list,
//! so filtered lookups fall back to listing everything and matching locally.

use std::collections::HashMap;

use tracing::{debug, warn};
use uuid::Uuid;
use wavelog_core::{
    DeviceInfo, MODEL_NUMBER_STRING_UUID, SENSOR_RECORD_CHARACTERISTIC_UUID,
    SERIAL_NUMBER_STRING_UUID,
};

use crate::error::{DiscoveryError, Result};
use crate::reader::CharacteristicReader;
use crate::transport::{BleDevice, CharacteristicHandle, ServiceHandle};

// ----------------------------------------------------------------------------
// Resolver
// ----------------------------------------------------------------------------

/// Walks the GATT tree of one connected device
pub struct ServiceResolver<'a, D: BleDevice> {
    device: &'a D,
}

impl<'a, D: BleDevice> ServiceResolver<'a, D> {
    pub fn new(device: &'a D) -> Self {
        Self { device }
    }

    /// Discover the target services, keyed by UUID
    ///
    /// Targets the device does not expose are simply absent from the map.
    pub async fn resolve(
        &self,
        targets: &[Uuid],
    ) -> std::result::Result<HashMap<Uuid, ServiceHandle>, DiscoveryError> {
        let services = self
            .device
            .discover_services(targets)
            .await
            .map_err(DiscoveryError::ServiceDiscovery)?;

        let resolved: HashMap<Uuid, ServiceHandle> = services
            .into_iter()
            .filter(|s| targets.is_empty() || targets.contains(&s.uuid))
            .map(|s| (s.uuid, s))
            .collect();
        debug!(
            "Resolved {}/{} services on {}",
            resolved.len(),
            targets.len(),
            self.device.address()
        );
        Ok(resolved)
    }

    /// List characteristics of `service`, matching `filter` on this side as well
    pub async fn characteristics(
        &self,
        service: &ServiceHandle,
        filter: Option<&[Uuid]>,
    ) -> std::result::Result<Vec<CharacteristicHandle>, DiscoveryError> {
        let discovered = self.discover(service, filter).await?;
        let Some(wanted) = filter else {
            return Ok(discovered);
        };

        let matched: Vec<CharacteristicHandle> = discovered
            .into_iter()
            .filter(|c| wanted.contains(&c.uuid))
            .collect();
        if !matched.is_empty() {
            return Ok(matched);
        }

        debug!(
            "Filtered characteristic discovery on {} found nothing, listing all",
            service.uuid
        );
        Ok(self
            .discover(service, None)
            .await?
            .into_iter()
            .filter(|c| wanted.contains(&c.uuid))
            .collect())
    }

    async fn discover(
        &self,
        service: &ServiceHandle,
        filter: Option<&[Uuid]>,
    ) -> std::result::Result<Vec<CharacteristicHandle>, DiscoveryError> {
        self.device
            .discover_characteristics(service, filter)
            .await
            .map_err(|source| DiscoveryError::CharacteristicDiscovery {
                service: service.uuid,
                source,
            })
    }

    /// Read model and serial strings from the Device Information service
    ///
    /// Read failures and empty values leave the field empty; only failing to
    /// list the characteristics is an error.
    pub async fn device_info(
        &self,
        service: &ServiceHandle,
    ) -> std::result::Result<DeviceInfo, DiscoveryError> {
        let reader = CharacteristicReader::new(self.device);
        let mut info = DeviceInfo::default();

        for characteristic in self.characteristics(service, None).await? {
            if info.is_complete() {
                break;
            }
            let field = match characteristic.uuid {
                uuid if uuid == MODEL_NUMBER_STRING_UUID => &mut info.model,
                uuid if uuid == SERIAL_NUMBER_STRING_UUID => &mut info.serial,
                _ => continue,
            };
            match reader.read_string(&characteristic).await {
                Ok(Some(value)) => *field = value,
                Ok(None) => debug!(
                    "Characteristic {} on {} is empty",
                    characteristic.uuid,
                    self.device.address()
                ),
                Err(e) => warn!("{}", e),
            }
        }
        Ok(info)
    }

    /// Read the raw sensor record from the sensor service
    pub async fn sensor_record(&self, service: &ServiceHandle) -> Result<Vec<u8>> {
        let wanted = [SENSOR_RECORD_CHARACTERISTIC_UUID];
        let characteristic = self
            .characteristics(service, Some(&wanted[..]))
            .await?
            .into_iter()
            .next()
            .ok_or(DiscoveryError::CharacteristicNotFound(
                SENSOR_RECORD_CHARACTERISTIC_UUID,
            ))?;

        let value = CharacteristicReader::new(self.device)
            .read(&characteristic)
            .await?;
        debug!(
            "Read {} byte sensor record from {}",
            value.len(),
            self.device.address()
        );
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AcquisitionError;
    use crate::mock::{MockAdapter, MockDevice, MockEvent, MockJournal, MockPeripheral, MockService};
    use crate::transport::BleAdapter;
    use btleplug::api::BDAddr;
    use wavelog_core::{DEVICE_INFORMATION_SERVICE_UUID, SENSOR_SERVICE_UUID};

    const OTHER: Uuid = Uuid::from_u128(0x2A29);

    fn address() -> BDAddr {
        BDAddr::from([0x10, 0x20, 0x30, 0x40, 0x50, 0x60])
    }

    async fn connect(peripheral: MockPeripheral) -> (MockDevice, MockJournal) {
        let mut adapter = MockAdapter::new().with_peripheral(peripheral);
        let journal = adapter.journal();
        adapter.enable().await.unwrap();
        (adapter.connect(address()).await.unwrap(), journal)
    }

    fn dis(service: MockService) -> MockPeripheral {
        MockPeripheral::new(address()).with_service(service)
    }

    fn dis_handle() -> ServiceHandle {
        ServiceHandle {
            uuid: DEVICE_INFORMATION_SERVICE_UUID,
        }
    }

    #[tokio::test]
    async fn test_resolve_returns_present_targets() {
        let (device, _) = connect(
            MockPeripheral::new(address())
                .with_service(MockService::new(SENSOR_SERVICE_UUID))
                .with_service(MockService::new(OTHER)),
        )
        .await;
        let resolver = ServiceResolver::new(&device);

        let services = resolver
            .resolve(&[SENSOR_SERVICE_UUID, DEVICE_INFORMATION_SERVICE_UUID])
            .await
            .unwrap();
        assert_eq!(services.len(), 1);
        assert!(services.contains_key(&SENSOR_SERVICE_UUID));
    }

    #[tokio::test]
    async fn test_resolve_reports_discovery_failure() {
        let (device, _) =
            connect(MockPeripheral::new(address()).failing_discovery("link lost")).await;
        let err = ServiceResolver::new(&device)
            .resolve(&[SENSOR_SERVICE_UUID])
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::ServiceDiscovery(_)));
    }

    #[tokio::test]
    async fn test_filtered_discovery_falls_back_to_unfiltered() {
        let service = MockService::new(SENSOR_SERVICE_UUID)
            .with_value(OTHER, b"x".to_vec())
            .with_value(SENSOR_RECORD_CHARACTERISTIC_UUID, vec![1; 16]);
        let (device, _) = connect(
            MockPeripheral::new(address())
                .with_service(service)
                .ignoring_characteristic_filter(),
        )
        .await;
        let resolver = ServiceResolver::new(&device);
        let handle = ServiceHandle {
            uuid: SENSOR_SERVICE_UUID,
        };

        let found = resolver
            .characteristics(&handle, Some(&[SENSOR_RECORD_CHARACTERISTIC_UUID][..]))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].uuid, SENSOR_RECORD_CHARACTERISTIC_UUID);

        let all = resolver.characteristics(&handle, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_device_info_reads_model_and_serial() {
        let (device, _) = connect(dis(MockService::new(DEVICE_INFORMATION_SERVICE_UUID)
            .with_value(OTHER, b"Vendor AS".to_vec())
            .with_value(MODEL_NUMBER_STRING_UUID, b"2930".to_vec())
            .with_value(SERIAL_NUMBER_STRING_UUID, b"123456".to_vec())))
        .await;

        let info = ServiceResolver::new(&device)
            .device_info(&dis_handle())
            .await
            .unwrap();
        assert_eq!(info, DeviceInfo::new("2930", "123456"));
        assert_eq!(info.combined_serial(), "2930123456");
    }

    #[tokio::test]
    async fn test_device_info_empty_serial_is_not_an_error() {
        let (device, _) = connect(dis(MockService::new(DEVICE_INFORMATION_SERVICE_UUID)
            .with_value(MODEL_NUMBER_STRING_UUID, b"2930".to_vec())
            .with_value(SERIAL_NUMBER_STRING_UUID, Vec::new())))
        .await;

        let info = ServiceResolver::new(&device)
            .device_info(&dis_handle())
            .await
            .unwrap();
        assert_eq!(info.model, "2930");
        assert_eq!(info.serial, "");
        assert_eq!(info.combined_serial(), "2930");
    }

    #[tokio::test]
    async fn test_device_info_read_error_leaves_field_empty() {
        let (device, _) = connect(dis(MockService::new(DEVICE_INFORMATION_SERVICE_UUID)
            .with_read_error(MODEL_NUMBER_STRING_UUID, "insufficient authentication")
            .with_value(SERIAL_NUMBER_STRING_UUID, b"123456".to_vec())))
        .await;

        let info = ServiceResolver::new(&device)
            .device_info(&dis_handle())
            .await
            .unwrap();
        assert_eq!(info.combined_serial(), "123456");
    }

    #[tokio::test]
    async fn test_device_info_stops_once_complete() {
        let (device, journal) = connect(dis(MockService::new(DEVICE_INFORMATION_SERVICE_UUID)
            .with_value(MODEL_NUMBER_STRING_UUID, b"2930".to_vec())
            .with_value(SERIAL_NUMBER_STRING_UUID, b"1".to_vec())
            .with_value(MODEL_NUMBER_STRING_UUID, b"again".to_vec())))
        .await;

        let info = ServiceResolver::new(&device)
            .device_info(&dis_handle())
            .await
            .unwrap();
        assert_eq!(info.model, "2930");

        let reads = journal
            .events()
            .into_iter()
            .filter(|e| matches!(e, MockEvent::Read { .. }))
            .count();
        assert_eq!(reads, 2);
    }

    #[tokio::test]
    async fn test_sensor_record_missing_characteristic() {
        let (device, _) = connect(
            MockPeripheral::new(address()).with_service(MockService::new(SENSOR_SERVICE_UUID)),
        )
        .await;
        let err = ServiceResolver::new(&device)
            .sensor_record(&ServiceHandle {
                uuid: SENSOR_SERVICE_UUID,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AcquisitionError::Discovery(DiscoveryError::CharacteristicNotFound(uuid))
                if uuid == SENSOR_RECORD_CHARACTERISTIC_UUID
        ));
    }

    #[tokio::test]
    async fn test_sensor_record_reads_once() {
        let (device, journal) = connect(MockPeripheral::new(address()).with_service(
            MockService::new(SENSOR_SERVICE_UUID)
                .with_value(SENSOR_RECORD_CHARACTERISTIC_UUID, vec![1; 20]),
        ))
        .await;
        let value = ServiceResolver::new(&device)
            .sensor_record(&ServiceHandle {
                uuid: SENSOR_SERVICE_UUID,
            })
            .await
            .unwrap();
        assert_eq!(value.len(), 20);
        assert_eq!(
            journal.count(&MockEvent::Read {
                address: address(),
                uuid: SENSOR_RECORD_CHARACTERISTIC_UUID,
            }),
            1
        );
    }
}
