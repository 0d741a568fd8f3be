//! swx command-line library.
//!
//! This crate provides the CLI interface for the swx activity log.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, PrintArgs, SwitchArgs};
pub use config::Config;
