//! CLI, configuration file, agenda rendering and the watch loop.
//!
//! This crate provides the `calcard` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod secret;

pub use cli::Cli;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
