//! Sample payloads shaped like the backend's responses.

use chrono::{Duration, TimeZone, Utc};

use crate::api::{Explanation, FeatureImpact, SimulationResult, Stats, Transaction, TrendPoint};

pub fn stats(total_transactions: u64, fraud_detected: u64) -> Stats {
    Stats {
        total_transactions,
        fraud_detected,
        avg_risk: 0.42,
        potential_loss: fraud_detected as f64 * 131.0,
    }
}

pub fn trends(counts: &[u64]) -> Vec<TrendPoint> {
    counts.iter().map(|&fraud_count| TrendPoint { fraud_count }).collect()
}

/// Transactions five minutes apart, newest (highest id) first.
pub fn transactions(ids: &[i64]) -> Vec<Transaction> {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap_or_else(Utc::now);
    ids.iter()
        .map(|&id| Transaction {
            id,
            amount: 80.0 + id as f64,
            timestamp: start + Duration::minutes(id * 5),
            is_fraud: id % 25 == 0,
            risk_score: None,
        })
        .collect()
}

pub fn transaction(id: i64) -> Transaction {
    transactions(&[id]).remove(0)
}

pub fn simulation(p95_loss: f64) -> SimulationResult {
    SimulationResult {
        p95_loss,
        mean_projected_loss: p95_loss * 0.8,
        std_dev: Some(p95_loss * 0.1),
        iterations: Some(100),
    }
}

pub fn explanation(features: &[(&str, f64)]) -> Explanation {
    Explanation {
        top_features: features
            .iter()
            .map(|&(feature, impact)| FeatureImpact {
                feature: feature.to_string(),
                impact,
            })
            .collect(),
        base_value: Some(-3.1),
    }
}
