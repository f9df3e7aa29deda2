//! CLI command handlers

pub mod commands;

pub use commands::{forecast, metrics, periods};
