//! wavelog configuration
//!
//! Configuration comes from an optional TOML file; every section and field
//! falls back to its default when omitted. Command-line flags are applied on
//! top by the command dispatcher.
//!
//! ```toml
//! [ble]
//! report_scan_ms = 3000
//! connect_scan_ms = 1000
//!
//! [log]
//! path = "/var/log/wavelog.jsonl"
//!
//! [cloud]
//! client_id = "..."
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wavelog_ble::BleConfig;
use wavelog_cloud::CloudConfig;

use crate::error::{CliError, Result};

// ----------------------------------------------------------------------------
// Application Configuration
// ----------------------------------------------------------------------------

/// Complete configuration for the wavelog CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scan timing
    pub ble: BleConfig,
    /// Where sensor records are written
    pub log: LogConfig,
    /// Cloud API endpoints and credentials
    pub cloud: CloudConfig,
}

/// Sensor record output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Append records to this file; stdout when unset
    pub path: Option<PathBuf>,
}

impl AppConfig {
    /// Load and validate a configuration file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot work
    pub fn validate(&self) -> Result<()> {
        if self.ble.report_scan_ms == 0 {
            return Err(CliError::Config(
                "ble.report_scan_ms must be greater than 0".to_string(),
            ));
        }
        if self.cloud.token_url.is_empty() || self.cloud.api_base.is_empty() {
            return Err(CliError::Config(
                "cloud.token_url and cloud.api_base must be set".to_string(),
            ));
        }
        if self.cloud.timeout_secs == 0 {
            return Err(CliError::Config(
                "cloud.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
