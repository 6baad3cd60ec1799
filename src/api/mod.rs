// src/api/mod.rs
//! Backend access layer
//!
//! - Wire types mirroring the backend's `{ data: ... }` JSON contract
//! - The `RemoteDataClient` trait the controllers are written against
//! - `HttpDataClient`, the reqwest implementation

pub mod client;
pub mod types;

pub use client::{
    validate_feature_vector, validate_limit, validate_volume_increase, with_timeout,
    HttpDataClient, RemoteDataClient,
};

pub use types::{
    Explanation, FeatureImpact, HealthStatus, SimulationResult, Stats, Transaction, TrendPoint,
    FEATURE_VECTOR_LEN,
};
