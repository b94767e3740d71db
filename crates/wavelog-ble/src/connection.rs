//! Scoped device connections
//!
//! A [`ConnectedDevice`] owns a live connection. Callers finish with
//! [`ConnectedDevice::close`]; if the guard is dropped first (early return,
//! panic, cancelled future) the disconnect is handed to the tokio runtime.

use std::sync::Arc;

use btleplug::api::BDAddr;
use tracing::{debug, warn};

use crate::error::BleError;
use crate::transport::BleDevice;

// ----------------------------------------------------------------------------
// Connection Guard
// ----------------------------------------------------------------------------

/// A connected peripheral that is disconnected when the guard goes away
pub struct ConnectedDevice<D: BleDevice + 'static> {
    device: Arc<D>,
    address: BDAddr,
    closed: bool,
}

impl<D: BleDevice + 'static> ConnectedDevice<D> {
    pub(crate) fn new(device: D) -> Self {
        let address = device.address();
        Self {
            device: Arc::new(device),
            address,
            closed: false,
        }
    }

    pub fn address(&self) -> BDAddr {
        self.address
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Disconnect now and report the result
    pub async fn close(mut self) -> Result<(), BleError> {
        self.closed = true;
        self.device.disconnect().await
    }
}

impl<D: BleDevice + 'static> Drop for ConnectedDevice<D> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        let address = self.address;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("Connection to {} dropped, disconnecting in background", address);
                let device = Arc::clone(&self.device);
                handle.spawn(async move {
                    if let Err(e) = device.disconnect().await {
                        warn!("Background disconnect from {} failed: {}", address, e);
                    }
                });
            }
            Err(_) => {
                warn!("Connection to {} dropped outside a runtime, not disconnected", address);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockAdapter, MockEvent, MockPeripheral};
    use crate::transport::BleAdapter;

    fn address() -> BDAddr {
        BDAddr::from([0xAA, 0xBB, 0xCC, 0x00, 0x00, 0x01])
    }

    async fn connected() -> (ConnectedDevice<crate::mock::MockDevice>, crate::mock::MockJournal) {
        let mut adapter = MockAdapter::new().with_peripheral(MockPeripheral::new(address()));
        let journal = adapter.journal();
        adapter.enable().await.unwrap();
        let device = adapter.connect(address()).await.unwrap();
        (ConnectedDevice::new(device), journal)
    }

    #[tokio::test]
    async fn test_close_disconnects_once() {
        let (device, journal) = connected().await;
        assert_eq!(device.address(), address());

        device.close().await.unwrap();
        tokio::task::yield_now().await;

        assert_eq!(journal.count(&MockEvent::Disconnected(address())), 1);
    }

    #[tokio::test]
    async fn test_drop_disconnects_in_background() {
        let (device, journal) = connected().await;
        drop(device);

        // Let the spawned disconnect run
        tokio::task::yield_now().await;

        assert_eq!(journal.count(&MockEvent::Disconnected(address())), 1);
    }
}
