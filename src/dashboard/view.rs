// src/dashboard/view.rs
//! Read-only snapshot handed to the rendering layer, plus the chart math
//! derived from it.

use std::sync::Arc;

use crate::api::{Explanation, Stats, Transaction, TrendPoint};
use crate::error::DashboardError;

/// Lower bound for the trend chart's denominator, so an all-zero series
/// still normalizes without dividing by zero.
pub const TREND_NORMALIZATION_FLOOR: u64 = 1;

/// Scale from a raw impact value to a bar width percentage.
pub const IMPACT_WIDTH_SCALE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshLeg {
    Stats,
    Trends,
    Transactions,
}

impl RefreshLeg {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshLeg::Stats => "stats",
            RefreshLeg::Trends => "trends",
            RefreshLeg::Transactions => "transactions",
        }
    }
}

/// Outcome of one `refresh_all` call after its join barrier.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub generation: u64,
    pub failed_legs: Vec<(RefreshLeg, DashboardError)>,
    /// False when a newer refresh started before this one settled; none of
    /// this refresh's results were applied after that point.
    pub current: bool,
}

impl RefreshReport {
    pub fn is_complete_success(&self) -> bool {
        self.failed_legs.is_empty()
    }

    pub fn failed(&self, leg: RefreshLeg) -> bool {
        self.failed_legs.iter().any(|(l, _)| *l == leg)
    }
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub stats: Arc<Stats>,
    pub trends: Arc<Vec<TrendPoint>>,
    pub transactions: Arc<Vec<Transaction>>,
    pub is_loading: bool,
    pub last_refresh: Option<RefreshReport>,
}

impl DashboardView {
    pub fn trend_denominator(&self) -> u64 {
        trend_denominator(&self.trends)
    }

    pub fn trend_heights_pct(&self) -> Vec<f64> {
        trend_heights_pct(&self.trends)
    }

    pub fn flagged_transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|tx| tx.is_fraud)
    }
}

pub fn trend_denominator(series: &[TrendPoint]) -> u64 {
    series
        .iter()
        .map(|p| p.fraud_count)
        .max()
        .unwrap_or(0)
        .max(TREND_NORMALIZATION_FLOOR)
}

/// Bar height of each point as a percentage of the series maximum.
pub fn trend_heights_pct(series: &[TrendPoint]) -> Vec<f64> {
    let denominator = trend_denominator(series) as f64;
    series
        .iter()
        .map(|p| p.fraud_count as f64 / denominator * 100.0)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactDirection {
    IncreasesRisk,
    DecreasesRisk,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImpactBar {
    pub feature: String,
    pub impact: f64,
    pub direction: ImpactDirection,
    pub width_pct: f64,
}

pub fn impact_direction(impact: f64) -> ImpactDirection {
    if impact > 0.0 {
        ImpactDirection::IncreasesRisk
    } else {
        ImpactDirection::DecreasesRisk
    }
}

pub fn impact_width_pct(impact: f64) -> f64 {
    let width = impact.abs() * IMPACT_WIDTH_SCALE;
    if width.is_nan() {
        return 0.0;
    }
    width.clamp(0.0, 100.0)
}

/// Bars in server order (largest absolute impact first).
pub fn impact_bars(explanation: &Explanation) -> Vec<ImpactBar> {
    explanation
        .top_features
        .iter()
        .map(|f| ImpactBar {
            feature: f.feature.clone(),
            impact: f.impact,
            direction: impact_direction(f.impact),
            width_pct: impact_width_pct(f.impact),
        })
        .collect()
}
