pub mod controller;

pub use controller::{RunOutcome, SimulationController, SimulationStatus, SimulationView};
