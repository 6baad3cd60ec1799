pub mod settings;

pub use settings::Config;

use crate::error::DashboardError;
use std::sync::Arc;

/// Loads the dashboard configuration from the environment (and `.env`, if present)
/// and checks the values the controllers rely on.
pub fn load_config() -> Result<Arc<Config>, DashboardError> {
    dotenv::dotenv().ok(); // Load .env file if present, ignore errors

    let config = Config::from_env();
    validate(&config)?;
    config.validate_and_log();

    Ok(Arc::new(config))
}

pub fn validate(config: &Config) -> Result<(), DashboardError> {
    if config.api_url.trim().is_empty() {
        return Err(DashboardError::ConfigError("RISKLENS_API_URL cannot be empty".to_string()));
    }
    url::Url::parse(&config.api_url)?;
    if config.transaction_limit <= 0 {
        return Err(DashboardError::ConfigError(format!(
            "RISKLENS_TRANSACTION_LIMIT must be positive, got {}",
            config.transaction_limit
        )));
    }
    if !(0.0..=1.0).contains(&config.default_volume_increase) {
        return Err(DashboardError::ConfigError(format!(
            "RISKLENS_DEFAULT_VOLUME_INCREASE must be within [0, 1], got {}",
            config.default_volume_increase
        )));
    }
    Ok(())
}
