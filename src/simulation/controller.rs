//! What-if exposure simulator: a volume-increase parameter plus the outcome of
//! the last completed run. At most one run is in flight at a time.

use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::api::{validate_volume_increase, with_timeout, RemoteDataClient, SimulationResult};
use crate::config::settings::{Config, DEFAULT_VOLUME_INCREASE};
use crate::error::{DashboardError, DashboardResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationStatus {
    Idle,
    Running,
    Success,
    Failed,
}

impl SimulationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationStatus::Idle => "IDLE",
            SimulationStatus::Running => "RUNNING",
            SimulationStatus::Success => "SUCCESS",
            SimulationStatus::Failed => "FAILED",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(SimulationResult),
    Failed(DashboardError),
    /// A run was already in flight; nothing was sent.
    AlreadyRunning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationView {
    pub status: SimulationStatus,
    /// Pending parameter; used by the next `run()`.
    pub volume_increase: f64,
    /// Result of the last successful run, kept across a later failure.
    pub last_result: Option<SimulationResult>,
    /// Parameter the last successful run was issued with.
    pub last_result_volume: Option<f64>,
    pub last_error: Option<DashboardError>,
}

impl SimulationView {
    /// The result to present as current: none while running or after a failure.
    pub fn current_result(&self) -> Option<&SimulationResult> {
        match self.status {
            SimulationStatus::Success => self.last_result.as_ref(),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == SimulationStatus::Running
    }

    pub fn is_failed(&self) -> bool {
        self.status == SimulationStatus::Failed
    }
}

#[derive(Debug, Clone)]
struct SimulationState {
    status: SimulationStatus,
    volume_increase: f64,
    last_result: Option<SimulationResult>,
    last_result_volume: Option<f64>,
    last_error: Option<DashboardError>,
    runs_started: u64,
}

impl SimulationState {
    fn new(volume_increase: f64) -> Self {
        Self {
            status: SimulationStatus::Idle,
            volume_increase,
            last_result: None,
            last_result_volume: None,
            last_error: None,
            runs_started: 0,
        }
    }

    fn set_volume_increase(&mut self, volume_increase: f64) -> DashboardResult<()> {
        validate_volume_increase(volume_increase)?;
        self.volume_increase = volume_increase;
        Ok(())
    }

    /// Enters `Running` and returns the parameter to send, or `None` if a run is already in flight.
    fn begin_run(&mut self) -> Option<(u64, f64)> {
        if self.status == SimulationStatus::Running {
            return None;
        }
        self.status = SimulationStatus::Running;
        self.runs_started += 1;
        Some((self.runs_started, self.volume_increase))
    }

    /// Leaves `Running` for a run whose caller stopped waiting. A no-op once
    /// that run has finished or a newer one started.
    fn abandon_run(&mut self, run_id: u64) -> bool {
        if self.status != SimulationStatus::Running || self.runs_started != run_id {
            return false;
        }
        self.status = SimulationStatus::Failed;
        self.last_error = Some(DashboardError::NetworkError(format!(
            "simulation run #{} cancelled before completion",
            run_id
        )));
        true
    }

    fn finish_run(&mut self, volume_increase: f64, result: DashboardResult<SimulationResult>) -> RunOutcome {
        match result {
            Ok(result) => {
                self.status = SimulationStatus::Success;
                self.last_result = Some(result.clone());
                self.last_result_volume = Some(volume_increase);
                self.last_error = None;
                RunOutcome::Completed(result)
            }
            Err(e) => {
                self.status = SimulationStatus::Failed;
                self.last_error = Some(e.clone());
                RunOutcome::Failed(e)
            }
        }
    }

    fn view(&self) -> SimulationView {
        SimulationView {
            status: self.status,
            volume_increase: self.volume_increase,
            last_result: self.last_result.clone(),
            last_result_volume: self.last_result_volume,
            last_error: self.last_error.clone(),
        }
    }
}

/// Held for the duration of a run; releases the single-flight slot if the
/// `run()` future is dropped before `finish_run`.
struct RunGuard {
    state: Arc<RwLock<SimulationState>>,
    run_id: u64,
    armed: bool,
}

impl RunGuard {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let run_id = self.run_id;
        warn!("Simulation run #{} dropped while in flight", run_id);
        match self.state.try_write() {
            Ok(mut state) => {
                state.abandon_run(run_id);
            }
            Err(_) => {
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    let state = self.state.clone();
                    handle.spawn(async move {
                        state.write().await.abandon_run(run_id);
                    });
                }
            }
        }
    }
}

pub struct SimulationController {
    client: Arc<dyn RemoteDataClient>,
    request_timeout: Option<Duration>,
    state: Arc<RwLock<SimulationState>>,
}

impl SimulationController {
    pub fn new(client: Arc<dyn RemoteDataClient>) -> Self {
        Self {
            client,
            request_timeout: None,
            state: Arc::new(RwLock::new(SimulationState::new(DEFAULT_VOLUME_INCREASE))),
        }
    }

    /// Starting parameter from `RISKLENS_DEFAULT_VOLUME_INCREASE`, with the configured request timeout.
    pub fn from_config(client: Arc<dyn RemoteDataClient>, config: &Config) -> DashboardResult<Self> {
        Ok(Self::new(client)
            .with_volume_increase(config.default_volume_increase)?
            .with_request_timeout(config.request_timeout()))
    }

    /// Starting parameter; must lie in `[0, 1]`.
    pub fn with_volume_increase(mut self, volume_increase: f64) -> DashboardResult<Self> {
        validate_volume_increase(volume_increase)?;
        self.state = Arc::new(RwLock::new(SimulationState::new(volume_increase)));
        Ok(self)
    }

    /// A run that exceeds `timeout` ends in `Failed` instead of staying `Running`.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub async fn view(&self) -> SimulationView {
        self.state.read().await.view()
    }

    /// Updates the pending parameter in any state. Does not start a run and
    /// leaves the displayed result alone. Values outside `[0, 1]` are rejected.
    pub async fn set_volume_increase(&self, volume_increase: f64) -> DashboardResult<()> {
        let result = self.state.write().await.set_volume_increase(volume_increase);
        if let Err(e) = &result {
            warn!("Rejected simulation parameter: {}", e);
        }
        result
    }

    /// Requests a projection for the current parameter. A call made while a run
    /// is in flight returns [`RunOutcome::AlreadyRunning`] without a request.
    pub async fn run(&self) -> RunOutcome {
        let Some((run_id, volume_increase)) = self.state.write().await.begin_run() else {
            warn!("Simulation already running; ignoring run request");
            return RunOutcome::AlreadyRunning;
        };
        info!(
            "🎲 Simulation run #{} started (volume_increase={:.2})",
            run_id, volume_increase
        );
        let guard = RunGuard {
            state: self.state.clone(),
            run_id,
            armed: true,
        };

        let result = with_timeout(
            self.request_timeout,
            "fetch_simulation",
            self.client.fetch_simulation(volume_increase),
        )
        .await;

        let outcome = self.state.write().await.finish_run(volume_increase, result);
        guard.disarm();
        match &outcome {
            RunOutcome::Completed(result) => info!(
                "✅ Simulation run #{} complete: p95 loss {:.2}, mean projected loss {:.2}",
                run_id, result.p95_loss, result.mean_projected_loss
            ),
            RunOutcome::Failed(e) => error!("❌ Simulation run #{} failed: {}", run_id, e),
            RunOutcome::AlreadyRunning => {}
        }
        outcome
    }
}
