//! Configuration module for Sitescout
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. All sections are optional; defaults mirror the pipeline's stock
//! politeness and extraction behavior.
//!
//! # Example
//!
//! ```no_run
//! use sitescout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitescout.toml")).unwrap();
//! println!("Rate ceiling: {}/s", config.rate_limit.requests_per_second);
//! ```

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{Config, HttpConfig, PricingConfig, RateLimitConfig};
pub use validation::validate;
