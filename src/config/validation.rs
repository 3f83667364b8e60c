use crate::config::types::{Config, HttpConfig, PricingConfig, RateLimitConfig};
use crate::classify::PlatformSpec;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_pricing_config(&config.pricing)?;
    validate_platforms(&config.platforms)?;
    Ok(())
}

/// Validates HTTP behavior configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    for (name, value) in [
        ("retry_delay_secs", config.retry_delay_secs),
        ("request_gap_secs", config.request_gap_secs),
        ("domain_gap_secs", config.domain_gap_secs),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Validation(format!(
                "{} must be a non-negative number, got {}",
                name, value
            )));
        }
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates rate limit ceilings; zero ceilings would deadlock every acquire
fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("requests_per_second", config.requests_per_second),
        ("requests_per_minute", config.requests_per_minute),
        ("requests_per_hour", config.requests_per_hour),
    ] {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1, got {}",
                name, value
            )));
        }
    }

    Ok(())
}

/// Validates pricing discovery configuration
fn validate_pricing_config(config: &PricingConfig) -> Result<(), ConfigError> {
    if config.max_pages_per_site < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages_per_site must be >= 1, got {}",
            config.max_pages_per_site
        )));
    }

    Ok(())
}

/// Validates platform table entries
fn validate_platforms(platforms: &[PlatformSpec]) -> Result<(), ConfigError> {
    for spec in platforms {
        if spec.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "platform name cannot be empty".to_string(),
            ));
        }

        if spec.domains.is_empty() {
            return Err(ConfigError::Validation(format!(
                "platform '{}' must declare at least one domain",
                spec.name
            )));
        }

        if spec.patterns.is_empty() {
            return Err(ConfigError::Validation(format!(
                "platform '{}' must declare at least one extraction pattern",
                spec.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_rate_ceiling_rejected() {
        let mut config = Config::default();
        config.rate_limit.requests_per_minute = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_retries_rejected() {
        let mut config = Config::default();
        config.http.max_retries = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_negative_gap_rejected() {
        let mut config = Config::default();
        config.http.request_gap_secs = -1.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_nan_gap_rejected() {
        let mut config = Config::default();
        config.http.retry_delay_secs = f64::NAN;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_platform_without_domains_rejected() {
        let mut config = Config::default();
        config.platforms[0].domains.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_platform_without_patterns_rejected() {
        let mut config = Config::default();
        config.platforms[0].patterns.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_user_agent_rejected() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(validate(&config).is_err());
    }
}
