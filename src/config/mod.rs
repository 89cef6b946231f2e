//! Configuration module for Leakwatch
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use leakwatch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("leakwatch.toml")).unwrap();
//! println!("Gate allows {} requests/minute", config.gate.requests_per_minute);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, GateConfig, OutputConfig, SeedEntry, StorageConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
