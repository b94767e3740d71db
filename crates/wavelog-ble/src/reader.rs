//! Bounded characteristic reads

use tracing::debug;

use crate::error::ReadError;
use crate::transport::{BleDevice, CharacteristicHandle};

/// Largest value accepted from a single characteristic read
pub const MAX_READ_LEN: usize = 128;

/// Reads characteristic values from a connected device
pub struct CharacteristicReader<'a, D: BleDevice> {
    device: &'a D,
}

impl<'a, D: BleDevice> CharacteristicReader<'a, D> {
    pub fn new(device: &'a D) -> Self {
        Self { device }
    }

    /// Read up to [`MAX_READ_LEN`] bytes; only the bytes the device produced are returned
    pub async fn read(&self, characteristic: &CharacteristicHandle) -> Result<Vec<u8>, ReadError> {
        let mut value =
            self.device
                .read(characteristic)
                .await
                .map_err(|source| ReadError::Transport {
                    characteristic: characteristic.uuid,
                    source,
                })?;

        if value.len() > MAX_READ_LEN {
            debug!(
                "Characteristic {} returned {} bytes, keeping {}",
                characteristic.uuid,
                value.len(),
                MAX_READ_LEN
            );
            value.truncate(MAX_READ_LEN);
        }
        Ok(value)
    }

    /// Read a string value; an empty read means the value was not obtained
    pub async fn read_string(
        &self,
        characteristic: &CharacteristicHandle,
    ) -> Result<Option<String>, ReadError> {
        let value = self.read(characteristic).await?;
        if value.is_empty() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&value).into_owned()))
    }
}
