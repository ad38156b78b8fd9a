//! Configuration module for the recognizer.
//!
//! Provides CLI argument parsing and the JSON settings file.

#[allow(clippy::module_inception)]
mod config;

pub use config::{AppConfig, FileConfig, SessionConfig};
