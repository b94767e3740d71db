//! Acquisition run modes
//!
//! - [`AcquisitionOrchestrator::report_nearby`] scans for sensors and prints
//!   one identity line per device. Failures are isolated per device.
//! - [`AcquisitionOrchestrator::acquire`] connects to one known address,
//!   reads and decodes the sensor record and writes it to a sink. Any failure
//!   outside the optional identity strings aborts the run.

use btleplug::api::BDAddr;
use tracing::{debug, error, info, warn};
use wavelog_core::{
    decode, DeviceInfo, LineSink, SensorRecord, DEVICE_INFORMATION_SERVICE_UUID,
    SENSOR_SERVICE_UUID,
};

use crate::config::BleConfig;
use crate::connection::ConnectedDevice;
use crate::error::{AcquisitionError, DiscoveryError, Result};
use crate::resolver::ServiceResolver;
use crate::session::DiscoverySession;
use crate::transport::{BleAdapter, BleDevice, ScanResult};

// ----------------------------------------------------------------------------
// Device Report
// ----------------------------------------------------------------------------

/// Identity of one sensor found by a report scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceReport {
    pub address: BDAddr,
    pub rssi: Option<i16>,
    pub local_name: Option<String>,
    pub info: DeviceInfo,
}

impl DeviceReport {
    fn new(advertisement: &ScanResult, info: DeviceInfo) -> Self {
        Self {
            address: advertisement.address,
            rssi: advertisement.rssi,
            local_name: advertisement.local_name.clone(),
            info,
        }
    }

    /// `address rssi name model+serial`, with fixed-width rssi and name columns
    pub fn to_line(&self) -> String {
        format!(
            "{} {:>4} {:>20} {}",
            self.address,
            self.rssi.unwrap_or_default(),
            self.local_name.as_deref().unwrap_or_default(),
            self.info.combined_serial()
        )
    }
}

// ----------------------------------------------------------------------------
// Orchestrator
// ----------------------------------------------------------------------------

/// Runs one acquisition mode over a discovery session
pub struct AcquisitionOrchestrator<A: BleAdapter> {
    session: DiscoverySession<A>,
}

impl<A: BleAdapter> AcquisitionOrchestrator<A> {
    pub fn new(adapter: A, config: BleConfig) -> Self {
        Self {
            session: DiscoverySession::new(adapter, config),
        }
    }

    pub fn session(&self) -> &DiscoverySession<A> {
        &self.session
    }

    /// Scan for sensors and write one identity line per reachable device
    pub async fn report_nearby<S: LineSink + ?Sized>(
        &mut self,
        output: &S,
    ) -> Result<Vec<DeviceReport>> {
        self.session.enable().await?;
        info!("Scanning...");
        let advertisements = self.session.scan_report(SENSOR_SERVICE_UUID).await?;

        let mut reports = Vec::with_capacity(advertisements.len());
        for advertisement in &advertisements {
            match self.report_device(advertisement).await {
                Ok(report) => {
                    output
                        .write_line(&report.to_line())
                        .map_err(AcquisitionError::Sink)?;
                    reports.push(report);
                }
                Err(e) => warn!("Skipping {}: {}", advertisement.address, e),
            }
        }
        Ok(reports)
    }

    async fn report_device(&mut self, advertisement: &ScanResult) -> Result<DeviceReport> {
        let device = self.session.connect(advertisement.address).await?;
        let outcome = read_identity(device.device()).await;
        release(device).await;
        Ok(DeviceReport::new(advertisement, outcome?))
    }

    /// Connect to `address`, read one sensor record and write it to `sink`
    pub async fn acquire<S: LineSink + ?Sized>(
        &mut self,
        address: BDAddr,
        sink: &S,
    ) -> Result<SensorRecord> {
        self.session.enable().await?;
        self.session.warm_up_scan().await?;

        let device = self.session.connect(address).await?;
        let outcome = read_record(device.device()).await;
        release(device).await;
        let record = outcome?;

        let line = record.to_json_line()?;
        sink.write_line(&line).map_err(AcquisitionError::Sink)?;
        info!("Recorded sample from {}", address);
        Ok(record)
    }
}

// ----------------------------------------------------------------------------
// Per-Device Steps
// ----------------------------------------------------------------------------

async fn release<D: BleDevice + 'static>(device: ConnectedDevice<D>) {
    let address = device.address();
    if let Err(e) = device.close().await {
        error!("Disconnect from {}: {}", address, e);
    }
}

async fn read_identity<D: BleDevice>(device: &D) -> Result<DeviceInfo> {
    let resolver = ServiceResolver::new(device);
    let services = resolver.resolve(&[DEVICE_INFORMATION_SERVICE_UUID]).await?;
    match services.get(&DEVICE_INFORMATION_SERVICE_UUID) {
        Some(service) => Ok(resolver.device_info(service).await?),
        None => {
            debug!("{} has no Device Information service", device.address());
            Ok(DeviceInfo::default())
        }
    }
}

async fn read_record<D: BleDevice>(device: &D) -> Result<SensorRecord> {
    let resolver = ServiceResolver::new(device);
    let services = resolver
        .resolve(&[SENSOR_SERVICE_UUID, DEVICE_INFORMATION_SERVICE_UUID])
        .await?;

    let info = match services.get(&DEVICE_INFORMATION_SERVICE_UUID) {
        Some(service) => resolver.device_info(service).await.unwrap_or_else(|e| {
            warn!("Reading device information from {}: {}", device.address(), e);
            DeviceInfo::default()
        }),
        None => DeviceInfo::default(),
    };

    let sensor = services
        .get(&SENSOR_SERVICE_UUID)
        .ok_or(DiscoveryError::ServiceNotFound(SENSOR_SERVICE_UUID))?;
    let raw = resolver.sensor_record(sensor).await?;
    let sample = decode(&raw)?;
    Ok(SensorRecord::new(&info, &sample))
}
