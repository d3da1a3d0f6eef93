//! CLI, configuration, and email delivery
//!
//! This crate provides the `weekmail` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod mailer;
pub mod secret;

pub use cli::Cli;
pub use error::{CliError, CliResult};
pub use mailer::Mailer;
