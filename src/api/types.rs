// src/api/types.rs
//! Wire types for the risk backend's REST contract.
//!
//! Every typed endpoint answers `{ "data": <payload> }`; [`Envelope`] captures that
//! wrapper and [`WirePayload::check`] rejects payloads whose values fall outside
//! the ranges the dashboard relies on.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

/// Number of features the explanation model expects per transaction.
pub const FEATURE_VECTOR_LEN: usize = 30;

/// Top-level response wrapper. Anything without a `data` key fails to decode.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Range checks applied after a payload decodes. A failure is reported as a
/// decode error because the backend broke its contract.
pub trait WirePayload: DeserializeOwned + Send + 'static {
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_transactions: u64,
    pub fraud_detected: u64,
    pub avg_risk: f64,
    pub potential_loss: f64,
}

impl Stats {
    /// Fraction of transactions flagged, as a percentage. Zero when there is no volume.
    pub fn fraud_rate_pct(&self) -> f64 {
        if self.total_transactions == 0 {
            return 0.0;
        }
        self.fraud_detected as f64 / self.total_transactions as f64 * 100.0
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            total_transactions: 0,
            fraud_detected: 0,
            avg_risk: 0.0,
            potential_loss: 0.0,
        }
    }
}

impl WirePayload for Stats {
    fn check(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.avg_risk) {
            return Err(format!("avg_risk {} outside [0, 1]", self.avg_risk));
        }
        if !(self.potential_loss >= 0.0) {
            return Err(format!("potential_loss {} is negative", self.potential_loss));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub fraud_count: u64,
}

impl WirePayload for Vec<TrendPoint> {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub amount: f64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub is_fraud: bool,
    /// Model score, when the backend includes it in the listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
}

impl WirePayload for Vec<Transaction> {
    fn check(&self) -> Result<(), String> {
        match self.iter().find(|tx| !(tx.amount >= 0.0)) {
            Some(tx) => Err(format!("transaction {} has negative amount {}", tx.id, tx.amount)),
            None => Ok(()),
        }
    }
}

/// Accepts RFC 3339 or a naive ISO-8601 timestamp, which is taken as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImpact {
    pub feature: String,
    /// Positive raises the risk score, negative lowers it.
    pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub top_features: Vec<FeatureImpact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_value: Option<f64>,
}

impl WirePayload for Explanation {
    fn check(&self) -> Result<(), String> {
        match self.top_features.iter().find(|f| !f.impact.is_finite()) {
            Some(f) => Err(format!("feature '{}' has non-finite impact", f.feature)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub p95_loss: f64,
    pub mean_projected_loss: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
}

impl WirePayload for SimulationResult {
    fn check(&self) -> Result<(), String> {
        if !(self.p95_loss >= 0.0) || !(self.mean_projected_loss >= 0.0) {
            return Err(format!(
                "projected losses must be non-negative (p95 {}, mean {})",
                self.p95_loss, self.mean_projected_loss
            ));
        }
        Ok(())
    }
}

/// `POST /explain` request body.
#[derive(Debug, Serialize)]
pub struct ExplainRequest<'a> {
    pub feature_vector: &'a [f64],
}

/// `GET /health` response; the one endpoint not wrapped in `data`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
