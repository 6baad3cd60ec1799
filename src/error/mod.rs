use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    /// Transport failure: connection refused, DNS, timeout, non-2xx status
    #[error("Network Error: {0}")]
    NetworkError(String),

    /// Response body does not match the expected `{ data: ... }` shape
    #[error("Decode Error: {0}")]
    DecodeError(String),

    /// Caller passed an out-of-range argument; no request was sent
    #[error("Validation Error: {0}")]
    ValidationError(String),

    /// Configuration errors
    #[error("Config Error: {0}")]
    ConfigError(String),
}

pub type DashboardResult<T> = Result<T, DashboardError>;

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::DecodeError(format!("JSON deserialization error: {}", err))
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DashboardError::DecodeError(format!("Response decode error: {}", err))
        } else if err.is_timeout() {
            DashboardError::NetworkError(format!("Request timed out: {}", err))
        } else {
            DashboardError::NetworkError(format!("HTTP request failed: {}", err))
        }
    }
}

impl From<url::ParseError> for DashboardError {
    fn from(err: url::ParseError) -> Self {
        DashboardError::ConfigError(format!("Invalid URL: {}", err))
    }
}

impl DashboardError {
    /// Determines if a manual retry of the same call could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            DashboardError::NetworkError(_) => true,
            DashboardError::DecodeError(_) => false, // Backend contract mismatch
            DashboardError::ValidationError(_) => false, // Input needs fixing
            DashboardError::ConfigError(_) => false,
        }
    }

    /// Categorizes error for log output
    pub fn categorize(&self) -> ErrorCategory {
        match self {
            DashboardError::NetworkError(_) => ErrorCategory::Network,
            DashboardError::DecodeError(_) => ErrorCategory::Data,
            DashboardError::ValidationError(_) => ErrorCategory::Input,
            DashboardError::ConfigError(_) => ErrorCategory::Configuration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Input,
    Configuration,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Data => "data",
            ErrorCategory::Input => "input",
            ErrorCategory::Configuration => "configuration",
        }
    }
}
