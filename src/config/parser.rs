use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// The file may override any subset of sections; missing sections fall back
/// to the built-in defaults.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitescout::config::load_config;
///
/// let config = load_config(Path::new("sitescout.toml")).unwrap();
/// println!("Timeout: {}s", config.http.timeout_secs);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}
