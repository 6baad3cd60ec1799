//! Per-transaction model explanations.
//!
//! Selecting a transaction bumps a selection token. A response is stored only
//! if its token is still the current one, so a slow answer for transaction A
//! is never shown under transaction B.

use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::features::{FeatureVectorSource, SyntheticFeatures};
use crate::api::{with_timeout, Explanation, RemoteDataClient, Transaction};
use crate::dashboard::view::{impact_bars, ImpactBar};
use crate::error::{DashboardError, DashboardResult};

#[derive(Debug, Clone, PartialEq)]
pub enum ExplainOutcome {
    Applied,
    Failed(DashboardError),
    /// The selection changed while the request was in flight; result discarded.
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExplanationView {
    pub selected: Option<Transaction>,
    pub explanation: Option<Explanation>,
    pub pending: bool,
    pub last_error: Option<DashboardError>,
}

impl ExplanationView {
    pub fn impact_bars(&self) -> Vec<ImpactBar> {
        self.explanation.as_ref().map(impact_bars).unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct ExplanationState {
    selected: Option<Transaction>,
    explanation: Option<Explanation>,
    pending: bool,
    last_error: Option<DashboardError>,
    selection: u64,
}

impl ExplanationState {
    fn select(&mut self, tx: Transaction) -> u64 {
        self.selection += 1;
        self.selected = Some(tx);
        self.explanation = None;
        self.last_error = None;
        self.pending = true;
        self.selection
    }

    fn resolve(&mut self, token: u64, result: DashboardResult<Explanation>) -> ExplainOutcome {
        if token != self.selection {
            return ExplainOutcome::Stale;
        }
        self.pending = false;
        match result {
            Ok(explanation) => {
                self.explanation = Some(explanation);
                ExplainOutcome::Applied
            }
            Err(e) => {
                self.last_error = Some(e.clone());
                ExplainOutcome::Failed(e)
            }
        }
    }

    fn dismiss(&mut self) {
        self.selection += 1;
        self.selected = None;
        self.explanation = None;
        self.pending = false;
        self.last_error = None;
    }

    fn view(&self) -> ExplanationView {
        ExplanationView {
            selected: self.selected.clone(),
            explanation: self.explanation.clone(),
            pending: self.pending,
            last_error: self.last_error.clone(),
        }
    }
}

pub struct ExplanationController {
    client: Arc<dyn RemoteDataClient>,
    features: Arc<dyn FeatureVectorSource>,
    request_timeout: Option<Duration>,
    state: RwLock<ExplanationState>,
}

impl ExplanationController {
    pub fn new(client: Arc<dyn RemoteDataClient>) -> Self {
        Self {
            client,
            features: Arc::new(SyntheticFeatures),
            request_timeout: None,
            state: RwLock::new(ExplanationState::default()),
        }
    }

    pub fn with_feature_source(mut self, features: Arc<dyn FeatureVectorSource>) -> Self {
        self.features = features;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub async fn view(&self) -> ExplanationView {
        self.state.read().await.view()
    }

    /// Selects `tx`, clears any previous explanation and requests a new one.
    pub async fn explain(&self, tx: Transaction) -> ExplainOutcome {
        let tx_id = tx.id;
        let feature_vector = self.features.feature_vector(&tx);
        let token = self.state.write().await.select(tx);
        info!("🔎 Explaining transaction {} (selection #{})", tx_id, token);

        let result = with_timeout(
            self.request_timeout,
            "post_explanation",
            self.client.post_explanation(&feature_vector),
        )
        .await;

        let outcome = self.state.write().await.resolve(token, result);
        match &outcome {
            ExplainOutcome::Applied => info!("✅ Explanation ready for transaction {}", tx_id),
            ExplainOutcome::Failed(e) => error!("❌ Explanation for transaction {} failed: {}", tx_id, e),
            ExplainOutcome::Stale => warn!(
                "Discarding explanation for transaction {}: selection changed",
                tx_id
            ),
        }
        outcome
    }

    /// Clears the selection. An in-flight request is not aborted; its result
    /// is discarded when it arrives.
    pub async fn dismiss(&self) {
        self.state.write().await.dismiss();
    }
}
