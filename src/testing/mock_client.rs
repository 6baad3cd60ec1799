//! Scripted in-memory [`RemoteDataClient`].
//!
//! Each endpoint has a FIFO of scripted responses. A response is either ready
//! immediately or gated behind a oneshot channel, which lets a test decide the
//! order in which concurrent requests complete.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::oneshot;

use crate::api::{
    validate_feature_vector, validate_limit, validate_volume_increase, Explanation, HealthStatus,
    RemoteDataClient, SimulationResult, Stats, Transaction, TrendPoint,
};
use crate::error::{DashboardError, DashboardResult};

const MAX_WAIT_YIELDS: usize = 10_000;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

enum Scripted<T> {
    Ready(DashboardResult<T>),
    Gated(oneshot::Receiver<DashboardResult<T>>),
}

pub struct ResponseQueue<T> {
    endpoint: &'static str,
    queue: Mutex<VecDeque<Scripted<T>>>,
    calls: AtomicUsize,
}

impl<T> ResponseQueue<T> {
    fn new(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            queue: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, result: DashboardResult<T>) {
        lock(&self.queue).push_back(Scripted::Ready(result));
    }

    pub fn push_ok(&self, value: T) {
        self.push(Ok(value));
    }

    pub fn push_err(&self, error: DashboardError) {
        self.push(Err(error));
    }

    /// Queues a response that is held until the returned sender fires.
    /// Dropping the sender resolves the request with a network error.
    pub fn push_gated(&self) -> oneshot::Sender<DashboardResult<T>> {
        let (tx, rx) = oneshot::channel();
        lock(&self.queue).push_back(Scripted::Gated(rx));
        tx
    }

    /// Requests that passed validation and reached this endpoint.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Yields to the scheduler until `count` requests have reached this endpoint.
    pub async fn wait_for_calls(&self, count: usize) -> bool {
        for _ in 0..MAX_WAIT_YIELDS {
            if self.calls() >= count {
                return true;
            }
            tokio::task::yield_now().await;
        }
        self.calls() >= count
    }

    async fn next(&self) -> DashboardResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = lock(&self.queue).pop_front();
        match scripted {
            Some(Scripted::Ready(result)) => result,
            Some(Scripted::Gated(rx)) => rx.await.unwrap_or_else(|_| {
                Err(DashboardError::NetworkError(format!(
                    "{}: gated response dropped",
                    self.endpoint
                )))
            }),
            None => Err(DashboardError::NetworkError(format!(
                "{}: no scripted response",
                self.endpoint
            ))),
        }
    }
}

pub struct MockDataClient {
    pub stats: ResponseQueue<Stats>,
    pub trends: ResponseQueue<Vec<TrendPoint>>,
    pub transactions: ResponseQueue<Vec<Transaction>>,
    pub simulation: ResponseQueue<SimulationResult>,
    pub explanation: ResponseQueue<Explanation>,
    pub health: ResponseQueue<HealthStatus>,
    limits: Mutex<Vec<i64>>,
    volumes: Mutex<Vec<f64>>,
    feature_vectors: Mutex<Vec<Vec<f64>>>,
}

impl Default for MockDataClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDataClient {
    pub fn new() -> Self {
        Self {
            stats: ResponseQueue::new("stats"),
            trends: ResponseQueue::new("trends"),
            transactions: ResponseQueue::new("transactions"),
            simulation: ResponseQueue::new("simulation"),
            explanation: ResponseQueue::new("explanation"),
            health: ResponseQueue::new("health"),
            limits: Mutex::new(Vec::new()),
            volumes: Mutex::new(Vec::new()),
            feature_vectors: Mutex::new(Vec::new()),
        }
    }

    pub fn requested_limits(&self) -> Vec<i64> {
        lock(&self.limits).clone()
    }

    pub fn requested_volumes(&self) -> Vec<f64> {
        lock(&self.volumes).clone()
    }

    pub fn requested_feature_vectors(&self) -> Vec<Vec<f64>> {
        lock(&self.feature_vectors).clone()
    }
}

#[async_trait]
impl RemoteDataClient for MockDataClient {
    async fn fetch_stats(&self) -> DashboardResult<Stats> {
        self.stats.next().await
    }

    async fn fetch_trends(&self) -> DashboardResult<Vec<TrendPoint>> {
        self.trends.next().await
    }

    async fn fetch_transactions(&self, limit: i64) -> DashboardResult<Vec<Transaction>> {
        validate_limit(limit)?;
        lock(&self.limits).push(limit);
        self.transactions.next().await
    }

    async fn fetch_simulation(&self, volume_increase: f64) -> DashboardResult<SimulationResult> {
        validate_volume_increase(volume_increase)?;
        lock(&self.volumes).push(volume_increase);
        self.simulation.next().await
    }

    async fn post_explanation(&self, feature_vector: &[f64]) -> DashboardResult<Explanation> {
        validate_feature_vector(feature_vector)?;
        lock(&self.feature_vectors).push(feature_vector.to_vec());
        self.explanation.next().await
    }

    async fn health(&self) -> DashboardResult<HealthStatus> {
        self.health.next().await
    }
}
