//! OAuth-authenticated HTTP client

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde::Deserialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use crate::config::CloudConfig;
use crate::error::{CloudError, Result};

/// Tokens are refreshed this long before the server-side expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(10);

// ----------------------------------------------------------------------------
// Resources
// ----------------------------------------------------------------------------

/// An API resource the client can fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudResource {
    /// `GET /devices`
    Devices,
    /// `GET /devices/{id}`
    Device(String),
    /// `GET /devices/{id}/latest-samples`
    LatestSamples(String),
}

impl CloudResource {
    fn segments(&self) -> Vec<&str> {
        match self {
            CloudResource::Devices => vec!["devices"],
            CloudResource::Device(id) => vec!["devices", id],
            CloudResource::LatestSamples(id) => vec!["devices", id, "latest-samples"],
        }
    }
}

impl fmt::Display for CloudResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudResource::Devices => write!(f, "device list"),
            CloudResource::Device(id) => write!(f, "device {:?}", id),
            CloudResource::LatestSamples(id) => write!(f, "latest samples of device {:?}", id),
        }
    }
}

// ----------------------------------------------------------------------------
// Access Token
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: Option<Instant>,
}

impl AccessToken {
    fn from_response(response: TokenResponse, now: Instant) -> Self {
        Self {
            value: response.access_token,
            expires_at: response
                .expires_in
                .map(|secs| now + Duration::from_secs(secs)),
        }
    }

    /// A token without an expiry is reused for the lifetime of the client
    fn is_fresh(&self, now: Instant) -> bool {
        self.expires_at
            .map_or(true, |expires_at| now + EXPIRY_MARGIN < expires_at)
    }
}

// ----------------------------------------------------------------------------
// Client
// ----------------------------------------------------------------------------

/// Client for the cloud API
pub struct CloudClient {
    http: reqwest::Client,
    token_url: Url,
    api_base: Url,
    scope: String,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<AccessToken>>,
}

impl CloudClient {
    pub fn new(config: CloudConfig) -> Result<Self> {
        let client_id = config
            .client_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or(CloudError::MissingCredentials("client id"))?;
        let client_secret = config
            .client_secret
            .clone()
            .filter(|secret| !secret.is_empty())
            .ok_or(CloudError::MissingCredentials("client secret"))?;

        let token_url = Url::parse(&config.token_url)?;
        let api_base = Url::parse(&config.api_base)?;
        if api_base.cannot_be_a_base() {
            return Err(CloudError::InvalidBase(config.api_base));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            token_url,
            api_base,
            scope: config.scope,
            client_id,
            client_secret,
            token: Mutex::new(None),
        })
    }

    /// Absolute URL of `resource`; ids are percent-encoded as single path segments
    pub fn url(&self, resource: &CloudResource) -> Result<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| CloudError::InvalidBase(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(resource.segments());
        Ok(url)
    }

    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(token.value.clone());
        }

        debug!("Requesting access token from {}", self.token_url);
        let response = self
            .http
            .post(self.token_url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "client_credentials"),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CloudError::TokenRejected { status });
        }

        let token = AccessToken::from_response(response.json().await?, Instant::now());
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Fetch `resource` and copy the raw body to `out`, followed by a newline
    pub async fn fetch<W>(&self, resource: &CloudResource, out: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let url = self.url(resource)?;
        let token = self.access_token().await?;

        debug!("GET {}", url);
        let mut response = self.http.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(CloudError::Status {
                resource: resource.to_string(),
                status,
            });
        }

        let output_error = |source| CloudError::Output {
            resource: resource.to_string(),
            source,
        };
        while let Some(chunk) = response.chunk().await? {
            out.write_all(&chunk).await.map_err(output_error)?;
        }
        out.write_all(b"\n").await.map_err(output_error)?;
        out.flush().await.map_err(output_error)?;
        Ok(())
    }

    /// `GET /devices`
    pub async fn list_devices<W>(&self, out: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        self.fetch(&CloudResource::Devices, out).await
    }

    /// `GET /devices/{id}` for each id in order, stopping at the first failure
    pub async fn devices<W>(&self, ids: &[String], out: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        for id in ids {
            self.fetch(&CloudResource::Device(id.clone()), out).await?;
        }
        info!("Fetched {} device(s)", ids.len());
        Ok(())
    }

    /// `GET /devices/{id}/latest-samples` for each id in order, stopping at the first failure
    pub async fn latest_samples<W>(&self, ids: &[String], out: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        for id in ids {
            self.fetch(&CloudResource::LatestSamples(id.clone()), out)
                .await?;
        }
        info!("Fetched latest samples of {} device(s)", ids.len());
        Ok(())
    }
}
