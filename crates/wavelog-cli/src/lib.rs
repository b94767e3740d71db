//! wavelog CLI library
//!
//! Argument parsing, configuration loading and command dispatch for the
//! `wavelog` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::{Cli, CloudAction, Commands};
pub use commands::CommandDispatcher;
pub use config::{AppConfig, LogConfig};
pub use error::{CliError, Result};
