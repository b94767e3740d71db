//! Discovery session state machine
//!
//! A session walks a single adapter through
//! `Uninitialized -> AdapterEnabled -> Scanning -> ScanStopped -> Connected | ConnectFailed`.
//! Every operation checks the state it starts from and refuses to run
//! otherwise; there are no backward transitions.
//!
//! Scans are stopped by a timer: the advertisement stream is drained until the
//! scan window elapses, then `stop_scan` is issued.

use std::fmt;
use std::time::Duration;

use btleplug::api::BDAddr;
use futures::stream::StreamExt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::BleConfig;
use crate::connection::ConnectedDevice;
use crate::error::SessionError;
use crate::transport::{BleAdapter, ScanResult};

// ----------------------------------------------------------------------------
// Session State
// ----------------------------------------------------------------------------

/// What a scan is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Collect matching advertisements; connections are per device and recoverable
    Report,
    /// Warm-up pass before a single, direct connect
    DirectConnect,
}

/// Lifecycle state of a [`DiscoverySession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    AdapterEnabled,
    Scanning(ScanMode),
    ScanStopped(ScanMode),
    Connected(ScanMode),
    ConnectFailed(ScanMode),
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Uninitialized => write!(f, "uninitialized"),
            SessionState::AdapterEnabled => write!(f, "adapter enabled"),
            SessionState::Scanning(mode) => write!(f, "scanning ({:?})", mode),
            SessionState::ScanStopped(mode) => write!(f, "scan stopped ({:?})", mode),
            SessionState::Connected(mode) => write!(f, "connected ({:?})", mode),
            SessionState::ConnectFailed(mode) => write!(f, "connect failed ({:?})", mode),
        }
    }
}

impl SessionState {
    fn can_connect(&self) -> Option<ScanMode> {
        match *self {
            SessionState::ScanStopped(mode) => Some(mode),
            // Report mode visits devices one after another
            SessionState::Connected(ScanMode::Report)
            | SessionState::ConnectFailed(ScanMode::Report) => Some(ScanMode::Report),
            _ => None,
        }
    }
}

// ----------------------------------------------------------------------------
// Discovery Session
// ----------------------------------------------------------------------------

/// Drives one adapter through enable, scan and connect
pub struct DiscoverySession<A: BleAdapter> {
    adapter: A,
    config: BleConfig,
    state: SessionState,
}

impl<A: BleAdapter> DiscoverySession<A> {
    pub fn new(adapter: A, config: BleConfig) -> Self {
        Self {
            adapter,
            config,
            state: SessionState::Uninitialized,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &BleConfig {
        &self.config
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    fn require(&self, operation: &'static str, expected: SessionState) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Enable the adapter; allowed once
    pub async fn enable(&mut self) -> Result<(), SessionError> {
        self.require("enable adapter", SessionState::Uninitialized)?;
        self.adapter.enable().await.map_err(SessionError::Enable)?;
        self.state = SessionState::AdapterEnabled;
        info!("BLE adapter enabled");
        Ok(())
    }

    /// Collect advertisements carrying `service` for the report scan window
    ///
    /// Results are in the order first received, one per address. Later
    /// advertisements from the same address replace the earlier properties.
    pub async fn scan_report(&mut self, service: Uuid) -> Result<Vec<ScanResult>, SessionError> {
        self.require("start report scan", SessionState::AdapterEnabled)?;
        let window = self.config.report_scan_duration();
        let advertisements = self.run_scan(ScanMode::Report, &[service], window).await?;

        let mut results: Vec<ScanResult> = Vec::new();
        for advertisement in advertisements {
            if !advertisement.advertises(&service) {
                continue;
            }
            match results
                .iter_mut()
                .find(|r| r.address == advertisement.address)
            {
                Some(existing) => *existing = advertisement,
                None => results.push(advertisement),
            }
        }

        for result in &results {
            info!(
                "Found device: {} {:?} {:?}",
                result.address, result.rssi, result.local_name
            );
        }
        Ok(results)
    }

    /// Short unfiltered scan whose results are discarded
    ///
    /// Some stacks will not connect to an address they have not seen in a scan.
    pub async fn warm_up_scan(&mut self) -> Result<(), SessionError> {
        self.require("start warm-up scan", SessionState::AdapterEnabled)?;
        let window = self.config.connect_scan_duration();
        let seen = self.run_scan(ScanMode::DirectConnect, &[], window).await?;
        debug!("Warm-up scan saw {} advertisements", seen.len());
        Ok(())
    }

    async fn run_scan(
        &mut self,
        mode: ScanMode,
        filter: &[Uuid],
        window: Duration,
    ) -> Result<Vec<ScanResult>, SessionError> {
        self.state = SessionState::Scanning(mode);
        let mut advertisements = self
            .adapter
            .start_scan(filter)
            .await
            .map_err(SessionError::Scan)?;

        let timer = tokio::time::sleep(window);
        tokio::pin!(timer);

        let mut seen = Vec::new();
        loop {
            tokio::select! {
                _ = &mut timer => break,
                next = advertisements.next() => match next {
                    Some(advertisement) => seen.push(advertisement),
                    None => {
                        debug!("Advertisement stream ended before the scan window");
                        (&mut timer).await;
                        break;
                    }
                },
            }
        }
        drop(advertisements);

        self.adapter.stop_scan().await.map_err(SessionError::Scan)?;
        self.state = SessionState::ScanStopped(mode);
        Ok(seen)
    }

    /// Connect to `address` once scanning has stopped
    pub async fn connect(
        &mut self,
        address: BDAddr,
    ) -> Result<ConnectedDevice<A::Device>, SessionError> {
        let mode = self.state.can_connect().ok_or(SessionError::InvalidState {
            operation: "connect",
            state: self.state,
        })?;

        match self.adapter.connect(address).await {
            Ok(device) => {
                self.state = SessionState::Connected(mode);
                Ok(ConnectedDevice::new(device))
            }
            Err(source) => {
                self.state = SessionState::ConnectFailed(mode);
                debug!("Connecting to device {} failed: {}", address, source);
                Err(SessionError::Connect { address, source })
            }
        }
    }
}
