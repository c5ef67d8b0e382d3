//! # Printer Module
//!
//! This module provides the fiscal printer driver and its configuration.
//!
//! ## Modules
//!
//! - [`config`]: Connection and protocol settings (TOML)
//! - [`driver`]: The [`Printer`] command/reply driver

pub mod config;
pub mod driver;

pub use config::{ConfigError, ConfigLoadResult, PrinterConfig};
pub use driver::Printer;
