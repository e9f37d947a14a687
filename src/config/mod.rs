//! Configuration module for Sumi-Trawl
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and defines the immutable [`ScraperConfig`] handed to every
//! component at construction.
//!
//! # Example
//!
//! ```no_run
//! use sumi_trawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trawl.toml")).unwrap();
//! println!("Stashing instances: {}", config.scraper.stash);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, FieldConfig, IndexConfig, InstancesConfig, OutputConfig, ScraperConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
