pub mod api;
pub mod config;
pub mod dashboard; // Stats / trends / transactions snapshot store
pub mod error;
pub mod explain; // Per-transaction model explanations
pub mod simulation; // What-if exposure simulator
pub mod testing; // Scripted client + fixtures for tests
pub mod utils;

pub use api::{HttpDataClient, RemoteDataClient};
pub use dashboard::{DashboardStateStore, DashboardView};
pub use error::{DashboardError, DashboardResult};
pub use explain::{ExplanationController, ExplanationView};
pub use simulation::{SimulationController, SimulationView};
