use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TRANSACTION_LIMIT: i64 = 10;
pub const DEFAULT_VOLUME_INCREASE: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_ms: Option<u64>,
    pub transaction_limit: i64,
    pub default_volume_increase: f64,
    pub refresh_interval_secs: Option<u64>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_ms: None,
            transaction_limit: DEFAULT_TRANSACTION_LIMIT,
            default_volume_increase: DEFAULT_VOLUME_INCREASE,
            refresh_interval_secs: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            api_url: env::var("RISKLENS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            request_timeout_ms: env::var("RISKLENS_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok()),
            transaction_limit: env::var("RISKLENS_TRANSACTION_LIMIT")
                .unwrap_or_else(|_| DEFAULT_TRANSACTION_LIMIT.to_string())
                .parse()
                .unwrap_or(DEFAULT_TRANSACTION_LIMIT),
            default_volume_increase: env::var("RISKLENS_DEFAULT_VOLUME_INCREASE")
                .unwrap_or_else(|_| DEFAULT_VOLUME_INCREASE.to_string())
                .parse()
                .unwrap_or(DEFAULT_VOLUME_INCREASE),
            refresh_interval_secs: env::var("RISKLENS_REFRESH_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok()),
            log_level: env::var("RISKLENS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    pub fn validate_and_log(&self) {
        log::info!("Dashboard Configuration Loaded: {:?}", self);
        if self.request_timeout_ms.is_none() {
            log::warn!("RISKLENS_REQUEST_TIMEOUT_MS not set; a hung backend request stays pending indefinitely");
        }
    }
}
