// src/dashboard/store.rs
//! Latest known stats / trends / transactions, refreshed by three concurrent
//! fetches joined behind a single loading flag.
//!
//! Every `refresh_all` call takes a new generation number. A leg's result is
//! applied only while its generation is still the latest one, so a slow,
//! superseded refresh can never overwrite data from a newer refresh.

use futures::future::join3;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::view::{DashboardView, RefreshLeg, RefreshReport};
use crate::api::{with_timeout, RemoteDataClient, Stats, Transaction, TrendPoint};
use crate::config::settings::DEFAULT_TRANSACTION_LIMIT;
use crate::error::{DashboardError, DashboardResult};
use crate::utils::Timer;

const SLOW_REFRESH_THRESHOLD_MS: u64 = 3_000;

#[derive(Debug)]
struct StoreState {
    stats: Arc<Stats>,
    trends: Arc<Vec<TrendPoint>>,
    transactions: Arc<Vec<Transaction>>,
    is_loading: bool,
    generation: u64,
    last_refresh: Option<RefreshReport>,
}

impl StoreState {
    fn begin_refresh(&mut self) -> u64 {
        self.generation += 1;
        self.is_loading = true;
        self.generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Clears the loading flag only for the refresh that is still the latest.
    fn finish_refresh(&mut self, report: &RefreshReport) -> bool {
        if !self.is_current(report.generation) {
            return false;
        }
        self.is_loading = false;
        self.last_refresh = Some(report.clone());
        true
    }
}

pub struct DashboardStateStore {
    client: Arc<dyn RemoteDataClient>,
    transaction_limit: i64,
    request_timeout: Option<Duration>,
    state: RwLock<StoreState>,
}

impl DashboardStateStore {
    pub fn new(client: Arc<dyn RemoteDataClient>) -> Self {
        Self {
            client,
            transaction_limit: DEFAULT_TRANSACTION_LIMIT,
            request_timeout: None,
            state: RwLock::new(StoreState {
                stats: Arc::new(Stats::default()),
                trends: Arc::new(Vec::new()),
                transactions: Arc::new(Vec::new()),
                is_loading: false,
                generation: 0,
                last_refresh: None,
            }),
        }
    }

    pub fn with_transaction_limit(mut self, limit: i64) -> Self {
        self.transaction_limit = limit;
        self
    }

    /// Bounds each leg; an expired leg counts as a failed leg.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Values shown until the first successful fetch of each field.
    pub fn with_defaults(mut self, stats: Stats, trends: Vec<TrendPoint>, transactions: Vec<Transaction>) -> Self {
        let state = self.state.get_mut();
        state.stats = Arc::new(stats);
        state.trends = Arc::new(trends);
        state.transactions = Arc::new(transactions);
        self
    }

    pub async fn view(&self) -> DashboardView {
        let state = self.state.read().await;
        DashboardView {
            stats: state.stats.clone(),
            trends: state.trends.clone(),
            transactions: state.transactions.clone(),
            is_loading: state.is_loading,
            last_refresh: state.last_refresh.clone(),
        }
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    /// Fetches stats, trends and the latest transactions concurrently.
    ///
    /// Returns once all three legs have settled. Failed legs are logged and
    /// leave their field untouched.
    pub async fn refresh_all(&self) -> RefreshReport {
        let generation = self.state.write().await.begin_refresh();
        info!("🔄 Dashboard refresh #{} started", generation);
        let timer = Timer::start("dashboard refresh");

        let stats_leg = async {
            let result = with_timeout(self.request_timeout, "fetch_stats", self.client.fetch_stats()).await;
            self.settle(generation, RefreshLeg::Stats, result, |state, stats| {
                state.stats = Arc::new(stats)
            })
            .await
        };
        let trends_leg = async {
            let result = with_timeout(self.request_timeout, "fetch_trends", self.client.fetch_trends()).await;
            self.settle(generation, RefreshLeg::Trends, result, |state, trends| {
                state.trends = Arc::new(trends)
            })
            .await
        };
        let transactions_leg = async {
            let result = with_timeout(
                self.request_timeout,
                "fetch_transactions",
                self.client.fetch_transactions(self.transaction_limit),
            )
            .await;
            self.settle(generation, RefreshLeg::Transactions, result, |state, transactions| {
                state.transactions = Arc::new(transactions)
            })
            .await
        };

        let (stats_err, trends_err, transactions_err) = join3(stats_leg, trends_leg, transactions_leg).await;

        let failed_legs: Vec<(RefreshLeg, DashboardError)> = [
            (RefreshLeg::Stats, stats_err),
            (RefreshLeg::Trends, trends_err),
            (RefreshLeg::Transactions, transactions_err),
        ]
        .into_iter()
        .filter_map(|(leg, err)| err.map(|e| (leg, e)))
        .collect();

        let mut report = RefreshReport {
            generation,
            failed_legs,
            current: true,
        };
        report.current = self.state.write().await.finish_refresh(&report);
        timer.finish_with_threshold(SLOW_REFRESH_THRESHOLD_MS);

        if !report.current {
            debug!("Dashboard refresh #{} settled after being superseded", generation);
        } else if report.is_complete_success() {
            info!("✅ Dashboard refresh #{} complete", generation);
        } else {
            warn!(
                "⚠️ Dashboard refresh #{} complete with {} failed leg(s)",
                generation,
                report.failed_legs.len()
            );
        }
        report
    }

    /// Applies one leg's payload if `generation` is still the latest; returns the error of a failed leg.
    async fn settle<T>(
        &self,
        generation: u64,
        leg: RefreshLeg,
        result: DashboardResult<T>,
        apply: impl FnOnce(&mut StoreState, T),
    ) -> Option<DashboardError> {
        match result {
            Ok(payload) => {
                let mut state = self.state.write().await;
                if state.is_current(generation) {
                    apply(&mut *state, payload);
                    debug!("{} updated by refresh #{}", leg.as_str(), generation);
                } else {
                    warn!(
                        "Dropping stale {} from refresh #{} (latest is #{})",
                        leg.as_str(),
                        generation,
                        state.generation
                    );
                }
                None
            }
            Err(e) => {
                warn!(
                    "Refresh #{} failed to fetch {} [{}]: {}",
                    generation,
                    leg.as_str(),
                    e.categorize().as_str(),
                    e
                );
                Some(e)
            }
        }
    }
}
