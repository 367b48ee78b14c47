//! CLI, configuration file, output rendering
//!
//! This crate provides the `kalender` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use commands::Session;
pub use error::{ClientError, ClientResult};
