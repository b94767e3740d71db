//! Command-line interface definitions and parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "wavelog", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan for nearby sensors and print one identity line per device
    Scan,
    /// Connect to a sensor, read the current values and log them as JSON
    Read {
        /// Bluetooth address of the sensor (AA:BB:CC:DD:EE:FF)
        #[arg(long = "dev", value_name = "MAC")]
        dev: String,
        /// Append the record to this file instead of printing it
        #[arg(long, value_name = "PATH")]
        log: Option<PathBuf>,
    },
    /// Query the vendor cloud API
    Cloud {
        /// OAuth client ID
        #[arg(long, env = "WAVELOG_CLIENT_ID")]
        client_id: Option<String>,
        /// OAuth client secret
        #[arg(long, env = "WAVELOG_CLIENT_SECRET", hide_env_values = true)]
        client_secret: Option<String>,
        #[command(subcommand)]
        action: CloudAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CloudAction {
    /// List all devices on the account
    List,
    /// Show device metadata
    Dev {
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
    },
    /// Show the latest samples of each device
    Latest {
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_arguments() {
        let cli = Cli::try_parse_from([
            "wavelog",
            "read",
            "--dev",
            "58:93:D8:8B:12:0E",
            "--log",
            "/tmp/wave.log",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Read { dev, log } => {
                assert_eq!(dev, "58:93:D8:8B:12:0E");
                assert_eq!(log, Some(PathBuf::from("/tmp/wave.log")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_read_requires_device() {
        assert!(Cli::try_parse_from(["wavelog", "read"]).is_err());
    }

    #[test]
    fn test_scan_rejects_trailing_arguments() {
        assert!(Cli::try_parse_from(["wavelog", "scan"]).is_ok());
        assert!(Cli::try_parse_from(["wavelog", "scan", "extra"]).is_err());
    }

    #[test]
    fn test_cloud_list_rejects_extra_arguments() {
        assert!(Cli::try_parse_from(["wavelog", "cloud", "list", "12345"]).is_err());
    }

    #[test]
    fn test_cloud_device_ids() {
        let cli = Cli::try_parse_from([
            "wavelog",
            "cloud",
            "--client-id",
            "abc",
            "--client-secret",
            "xyz",
            "latest",
            "12345",
            "12347",
        ])
        .unwrap();
        match cli.command {
            Commands::Cloud {
                client_id,
                client_secret,
                action,
            } => {
                assert_eq!(client_id.as_deref(), Some("abc"));
                assert_eq!(client_secret.as_deref(), Some("xyz"));
                assert_eq!(
                    action,
                    CloudAction::Latest {
                        ids: vec!["12345".to_string(), "12347".to_string()],
                    }
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cloud_dev_requires_ids() {
        assert!(Cli::try_parse_from(["wavelog", "cloud", "dev"]).is_err());
    }
}
