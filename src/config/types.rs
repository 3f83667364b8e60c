use crate::classify::{default_platforms, PlatformSpec};
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sitescout
///
/// Every section has defaults matching the pipeline's stock behavior, so a
/// config file is optional and may override only the knobs it cares about.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    /// Platform table; when absent the built-in table is used
    #[serde(default = "default_platforms", rename = "platform")]
    pub platforms: Vec<PlatformSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            rate_limit: RateLimitConfig::default(),
            pricing: PricingConfig::default(),
            platforms: default_platforms(),
        }
    }
}

/// HTTP request behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of attempts per request (first try included)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Constant delay between retry attempts, in seconds
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: f64,

    /// Minimum spacing between consecutive physical requests, in seconds
    #[serde(default = "default_request_gap_secs")]
    pub request_gap_secs: f64,

    /// Spacing between distinct seed sites, in seconds
    #[serde(default = "default_domain_gap_secs")]
    pub domain_gap_secs: f64,

    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            request_gap_secs: default_request_gap_secs(),
            domain_gap_secs: default_domain_gap_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_delay_secs)
    }

    pub fn request_gap(&self) -> Duration {
        Duration::from_secs_f64(self.request_gap_secs)
    }

    pub fn domain_gap(&self) -> Duration {
        Duration::from_secs_f64(self.domain_gap_secs)
    }
}

/// Rate limiting ceilings for the sliding windows
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RateLimitConfig {
    /// Maximum requests in any 1-second window
    #[serde(default = "default_per_second")]
    pub requests_per_second: u32,

    /// Maximum requests in any 60-second window
    #[serde(default = "default_per_minute")]
    pub requests_per_minute: u32,

    /// Maximum requests in any 3600-second window
    #[serde(default = "default_per_hour")]
    pub requests_per_hour: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_per_second(),
            requests_per_minute: default_per_minute(),
            requests_per_hour: default_per_hour(),
        }
    }
}

/// Pricing page discovery configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PricingConfig {
    /// Maximum number of candidate pages visited per site
    #[serde(default = "default_max_pages_per_site")]
    pub max_pages_per_site: usize,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            max_pages_per_site: default_max_pages_per_site(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_secs() -> f64 {
    1.0
}

fn default_request_gap_secs() -> f64 {
    2.0
}

fn default_domain_gap_secs() -> f64 {
    5.0
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_per_second() -> u32 {
    2
}

fn default_per_minute() -> u32 {
    60
}

fn default_per_hour() -> u32 {
    1000
}

fn default_max_pages_per_site() -> usize {
    15
}
