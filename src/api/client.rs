// src/api/client.rs
//! Typed access to the risk backend.
//!
//! [`RemoteDataClient`] is the seam the controllers depend on; [`HttpDataClient`]
//! is the reqwest implementation. No retries happen here: every failure comes
//! back to the caller as a [`DashboardError`].

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;

use super::types::{
    Envelope, ExplainRequest, Explanation, HealthStatus, SimulationResult, Stats, Transaction,
    TrendPoint, WirePayload, FEATURE_VECTOR_LEN,
};
use crate::{
    config::Config,
    error::{DashboardError, DashboardResult},
    utils::Timer,
};

pub const STATS_PATH: &str = "/dashboard/stats";
pub const TRENDS_PATH: &str = "/dashboard/trends";
pub const TRANSACTIONS_PATH: &str = "/transactions";
pub const SIMULATE_PATH: &str = "/simulate";
pub const EXPLAIN_PATH: &str = "/explain";
pub const HEALTH_PATH: &str = "/health";

const SLOW_REQUEST_THRESHOLD_MS: u64 = 2_000;

#[async_trait]
pub trait RemoteDataClient: Send + Sync {
    async fn fetch_stats(&self) -> DashboardResult<Stats>;

    /// Oldest point first.
    async fn fetch_trends(&self) -> DashboardResult<Vec<TrendPoint>>;

    /// Most recent first, at most `limit` entries. `limit <= 0` is rejected locally.
    async fn fetch_transactions(&self, limit: i64) -> DashboardResult<Vec<Transaction>>;

    /// `volume_increase` must lie in `[0, 1]`; anything else is rejected locally.
    async fn fetch_simulation(&self, volume_increase: f64) -> DashboardResult<SimulationResult>;

    /// `feature_vector` must have exactly [`FEATURE_VECTOR_LEN`] entries.
    async fn post_explanation(&self, feature_vector: &[f64]) -> DashboardResult<Explanation>;

    async fn health(&self) -> DashboardResult<HealthStatus>;
}

pub fn validate_limit(limit: i64) -> DashboardResult<()> {
    if limit <= 0 {
        return Err(DashboardError::ValidationError(format!(
            "transaction limit must be positive, got {}",
            limit
        )));
    }
    Ok(())
}

pub fn validate_volume_increase(volume_increase: f64) -> DashboardResult<()> {
    if !(0.0..=1.0).contains(&volume_increase) {
        return Err(DashboardError::ValidationError(format!(
            "volume_increase must be within [0, 1], got {}",
            volume_increase
        )));
    }
    Ok(())
}

pub fn validate_feature_vector(feature_vector: &[f64]) -> DashboardResult<()> {
    if feature_vector.len() != FEATURE_VECTOR_LEN {
        return Err(DashboardError::ValidationError(format!(
            "feature vector must have {} values, got {}",
            FEATURE_VECTOR_LEN,
            feature_vector.len()
        )));
    }
    if let Some(pos) = feature_vector.iter().position(|v| !v.is_finite()) {
        return Err(DashboardError::ValidationError(format!(
            "feature vector value at index {} is not finite",
            pos
        )));
    }
    Ok(())
}

/// Bounds `fut` by `timeout` when one is set. Expiry is reported as a network error.
pub async fn with_timeout<T, F>(timeout: Option<Duration>, operation: &str, fut: F) -> DashboardResult<T>
where
    F: std::future::Future<Output = DashboardResult<T>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut).await.unwrap_or_else(|_| {
            Err(DashboardError::NetworkError(format!(
                "{} timed out after {}ms",
                operation,
                limit.as_millis()
            )))
        }),
        None => fut.await,
    }
}

/// reqwest-backed client for the risk backend.
#[derive(Debug, Clone)]
pub struct HttpDataClient {
    client: Client,
    base_url: String,
}

impl HttpDataClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> DashboardResult<Self> {
        url::Url::parse(base_url)?;

        let mut builder = Client::builder().user_agent("RiskLensDashboard/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DashboardError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> DashboardResult<Self> {
        Self::new(&config.api_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_data<T, Q>(&self, path: &str, query: Option<&Q>) -> DashboardResult<T>
    where
        T: WirePayload,
        Q: Serialize + ?Sized + Sync,
    {
        let timer = Timer::start(path);
        let mut request = self.client.get(self.url(path));
        if let Some(query) = query {
            request = request.query(query);
        }
        debug!("🔍 GET {}", path);
        let data = match request.send().await {
            Ok(response) => Self::decode(path, response).await,
            Err(e) => Err(e.into()),
        };
        timer.finish_with_threshold(SLOW_REQUEST_THRESHOLD_MS);
        data
    }

    async fn decode<T: WirePayload>(path: &str, response: Response) -> DashboardResult<T> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(DashboardError::NetworkError(format!(
                "HTTP {} from {}: {}",
                status, path, text
            )));
        }

        let body = response.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| DashboardError::DecodeError(format!("{}: {}", path, e)))?;
        envelope
            .data
            .check()
            .map_err(|msg| DashboardError::DecodeError(format!("{}: {}", path, msg)))?;

        debug!("✅ {} decoded ({} bytes)", path, body.len());
        Ok(envelope.data)
    }
}

#[async_trait]
impl RemoteDataClient for HttpDataClient {
    async fn fetch_stats(&self) -> DashboardResult<Stats> {
        self.get_data::<_, [(&str, i64)]>(STATS_PATH, None).await
    }

    async fn fetch_trends(&self) -> DashboardResult<Vec<TrendPoint>> {
        self.get_data::<_, [(&str, i64)]>(TRENDS_PATH, None).await
    }

    async fn fetch_transactions(&self, limit: i64) -> DashboardResult<Vec<Transaction>> {
        validate_limit(limit)?;
        self.get_data(TRANSACTIONS_PATH, Some(&[("limit", limit)])).await
    }

    async fn fetch_simulation(&self, volume_increase: f64) -> DashboardResult<SimulationResult> {
        validate_volume_increase(volume_increase)?;
        self.get_data(SIMULATE_PATH, Some(&[("volume_increase", volume_increase)]))
            .await
    }

    async fn post_explanation(&self, feature_vector: &[f64]) -> DashboardResult<Explanation> {
        validate_feature_vector(feature_vector)?;

        let timer = Timer::start(EXPLAIN_PATH);
        debug!("🔍 POST {} ({} features)", EXPLAIN_PATH, feature_vector.len());
        let sent = self
            .client
            .post(self.url(EXPLAIN_PATH))
            .json(&ExplainRequest { feature_vector })
            .send()
            .await;
        let explanation = match sent {
            Ok(response) => Self::decode(EXPLAIN_PATH, response).await,
            Err(e) => Err(e.into()),
        };
        timer.finish_with_threshold(SLOW_REQUEST_THRESHOLD_MS);
        explanation
    }

    async fn health(&self) -> DashboardResult<HealthStatus> {
        let response = self.client.get(self.url(HEALTH_PATH)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::NetworkError(format!(
                "HTTP {} from {}",
                status, HEALTH_PATH
            )));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
