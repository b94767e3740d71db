//! Cloud client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TOKEN_URL: &str = "https://accounts-api.airthings.com/v1/token";
pub const DEFAULT_API_BASE: &str = "https://ext-api.airthings.com/v1";
pub const DEFAULT_SCOPE: &str = "read:device:current_values";

/// Endpoints, scope and credentials for the cloud API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub token_url: String,
    pub api_base: String,
    pub scope: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            client_id: None,
            client_secret: None,
            timeout_secs: 30,
        }
    }
}

impl CloudConfig {
    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    pub fn with_endpoints(
        mut self,
        token_url: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        self.token_url = token_url.into();
        self.api_base = api_base.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
