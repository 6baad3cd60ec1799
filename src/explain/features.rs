//! Feature vectors sent to the explanation endpoint.
//!
//! No feature-extraction pipeline is wired to the dashboard, so the default
//! source produces synthetic values. Swap in another [`FeatureVectorSource`]
//! to derive vectors from real transaction data.

use rand::Rng;

use crate::api::{Transaction, FEATURE_VECTOR_LEN};

pub trait FeatureVectorSource: Send + Sync {
    /// Must return exactly [`FEATURE_VECTOR_LEN`] values.
    fn feature_vector(&self, tx: &Transaction) -> Vec<f64>;
}

/// Uniform values in `[0, 1)`, independent of the transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticFeatures;

impl FeatureVectorSource for SyntheticFeatures {
    fn feature_vector(&self, _tx: &Transaction) -> Vec<f64> {
        let mut rng = rand::thread_rng();
        (0..FEATURE_VECTOR_LEN).map(|_| rng.gen::<f64>()).collect()
    }
}

/// Always returns the same vector.
#[derive(Debug, Clone)]
pub struct FixedFeatures(pub Vec<f64>);

impl FeatureVectorSource for FixedFeatures {
    fn feature_vector(&self, _tx: &Transaction) -> Vec<f64> {
        self.0.clone()
    }
}
