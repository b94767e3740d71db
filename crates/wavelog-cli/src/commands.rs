//! Command handlers for the wavelog CLI

use tokio::io::AsyncWrite;
use tracing::info;

use wavelog_ble::{
    AcquisitionOrchestrator, BDAddr, BleAdapter, BleConfig, BtleplugAdapter, DeviceReport,
};
use wavelog_cloud::{CloudClient, CloudConfig};
use wavelog_core::{LineSink, LogSink, SensorRecord};

use crate::cli::{Cli, CloudAction, Commands};
use crate::config::AppConfig;
use crate::error::{CliError, Result};

/// Command dispatcher for handling CLI commands
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Execute a CLI command against the platform BLE stack and stdout
    pub async fn execute(cli: Cli, config: AppConfig) -> Result<()> {
        match cli.command {
            Commands::Scan => {
                let reports =
                    Self::handle_scan(BtleplugAdapter::new(), config.ble, &LogSink::stdout())
                        .await?;
                info!("Reported {} sensor(s)", reports.len());
                Ok(())
            }
            Commands::Read { dev, log } => {
                let address = Self::parse_address(&dev)?;
                let sink = LogSink::new(log.or(config.log.path));
                Self::handle_read(BtleplugAdapter::new(), config.ble, address, &sink).await?;
                Ok(())
            }
            Commands::Cloud {
                client_id,
                client_secret,
                action,
            } => {
                let cloud = Self::cloud_config(config.cloud, client_id, client_secret);
                let client = CloudClient::new(cloud)?;
                Self::handle_cloud(&client, &action, &mut tokio::io::stdout()).await
            }
        }
    }

    /// Scan for sensors and write one identity line per device to `output`
    pub async fn handle_scan<A: BleAdapter>(
        adapter: A,
        config: BleConfig,
        output: &dyn LineSink,
    ) -> Result<Vec<DeviceReport>> {
        let mut orchestrator = AcquisitionOrchestrator::new(adapter, config);
        Ok(orchestrator.report_nearby(output).await?)
    }

    /// Read one record from `address` and write it to `sink`
    pub async fn handle_read<A: BleAdapter>(
        adapter: A,
        config: BleConfig,
        address: BDAddr,
        sink: &dyn LineSink,
    ) -> Result<SensorRecord> {
        info!("Reading sensor {}", address);
        let mut orchestrator = AcquisitionOrchestrator::new(adapter, config);
        Ok(orchestrator.acquire(address, sink).await?)
    }

    /// Run a cloud query, copying each response body to `out`
    pub async fn handle_cloud<W>(
        client: &CloudClient,
        action: &CloudAction,
        out: &mut W,
    ) -> Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        match action {
            CloudAction::List => client.list_devices(out).await?,
            CloudAction::Dev { ids } => client.devices(ids, out).await?,
            CloudAction::Latest { ids } => client.latest_samples(ids, out).await?,
        }
        Ok(())
    }

    /// Parse a `AA:BB:CC:DD:EE:FF` Bluetooth address
    pub fn parse_address(input: &str) -> Result<BDAddr> {
        input
            .trim()
            .parse::<BDAddr>()
            .map_err(|e| CliError::InvalidAddress {
                input: input.to_string(),
                reason: e.to_string(),
            })
    }

    /// Credentials given on the command line (or via environment) win over the file
    pub fn cloud_config(
        mut config: CloudConfig,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> CloudConfig {
        if client_id.is_some() {
            config.client_id = client_id;
        }
        if client_secret.is_some() {
            config.client_secret = client_secret;
        }
        config
    }
}
