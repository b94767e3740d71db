//! Error handling for the wavelog CLI

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parsing bluetooth address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error(transparent)]
    Acquisition(#[from] wavelog_ble::AcquisitionError),

    #[error("Cloud API error: {0}")]
    Cloud(#[from] wavelog_cloud::CloudError),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
