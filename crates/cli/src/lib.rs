//! Saborê CLI - Fetch order snapshots and print sales analytics as JSON.
//!
//! The binary (`sabore`) is a thin shell over this library: configuration
//! from the environment, a backend client, and one function per analysis.
//! Logs go to stderr; stdout carries only the JSON result.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod commands;
pub mod config;
pub mod error;

pub use client::{BackendClient, ClientError, OrderQuery};
pub use config::{CliConfig, ConfigError, LogFormat};
pub use error::CliError;
