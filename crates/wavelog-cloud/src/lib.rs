//! Cloud API client for wavelog
//!
//! Authenticates with the OAuth 2.0 client-credentials grant and fetches
//! device metadata and latest samples. Response bodies are passed through
//! untouched so they can be piped into other tools.
//!
//! ```rust,no_run
//! use wavelog_cloud::{CloudClient, CloudConfig};
//!
//! # async fn example() -> wavelog_cloud::Result<()> {
//! let config = CloudConfig::default().with_credentials("id", "secret");
//! let client = CloudClient::new(config)?;
//! client.list_devices(&mut tokio::io::stdout()).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{CloudClient, CloudResource};
pub use config::CloudConfig;
pub use error::{CloudError, Result};
