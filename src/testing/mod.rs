//! Test support: a scripted backend client and sample payloads.

pub mod fixtures;
pub mod mock_client;

pub use mock_client::{MockDataClient, ResponseQueue};
