//! Sitescout: a polite fetch-and-classify pipeline
//!
//! This crate crawls a list of seed websites politely (multi-window rate
//! ceilings, minimum inter-request spacing, selective retries), decodes HTML
//! robustly under misreported encodings and compression, and extracts
//! structured facts: social-media account handles and pricing/promo pages.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod limiter;
pub mod output;
pub mod pipeline;
pub mod pricing;
pub mod retry;
pub mod url;

use thiserror::Error;

/// Main error type for Sitescout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid extraction pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("Site unreachable: {url}")]
    SiteUnreachable { url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Sitescout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use classify::{AccountRecord, LinkClassifier, PlatformSpec};
pub use config::Config;
pub use crawler::{FetchOutcome, Fetcher, RawPage, UnavailableReason};
pub use limiter::RateLimiter;
pub use pipeline::{Orchestrator, SiteResult, SiteStatus};
pub use pricing::{PricingCandidate, PricingPage, PricingPageSelector, PricingReport};
pub use retry::{AttemptOutcome, FailureKind, RetryError, RetryExecutor, RetryPolicy};
