pub mod controller;
pub mod features;

pub use controller::{ExplainOutcome, ExplanationController, ExplanationView};
pub use features::{FeatureVectorSource, FixedFeatures, SyntheticFeatures};
