//! BLE acquisition configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Timing configuration for discovery sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BleConfig {
    /// Scan window used to collect advertisements in report mode (milliseconds)
    pub report_scan_ms: u64,
    /// Warm-up scan before a direct connect (milliseconds)
    pub connect_scan_ms: u64,
}

impl Default for BleConfig {
    fn default() -> Self {
        Self {
            report_scan_ms: 3_000,
            // Some stacks refuse to connect until at least one scan pass has run
            connect_scan_ms: 1_000,
        }
    }
}

impl BleConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the report-mode scan window
    pub fn with_report_scan_duration(mut self, duration: Duration) -> Self {
        self.report_scan_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the warm-up scan window used before connecting
    pub fn with_connect_scan_duration(mut self, duration: Duration) -> Self {
        self.connect_scan_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn report_scan_duration(&self) -> Duration {
        Duration::from_millis(self.report_scan_ms)
    }

    pub fn connect_scan_duration(&self) -> Duration {
        Duration::from_millis(self.connect_scan_ms)
    }
}
