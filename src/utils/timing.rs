//! Timing helpers for logging how long backend round-trips take.

use log::{debug, warn};
use std::time::{Duration, Instant};

/// Measures a single named operation.
#[derive(Debug)]
pub struct Timer {
    start_time: Instant,
    operation_name: String,
}

impl Timer {
    pub fn start(operation_name: &str) -> Self {
        debug!("⏱️ Starting timer for: {}", operation_name);
        Self {
            start_time: Instant::now(),
            operation_name: operation_name.to_string(),
        }
    }

    /// Finish the timer, logging at debug level, or warn when slower than `threshold_ms`.
    pub fn finish_with_threshold(self, threshold_ms: u64) -> Duration {
        let total_duration = self.start_time.elapsed();
        if total_duration.as_millis() > threshold_ms as u128 {
            warn!(
                "🐌 {} took {}ms (threshold {}ms)",
                self.operation_name,
                total_duration.as_millis(),
                threshold_ms
            );
        } else {
            debug!("🕐 {} completed in {}ms", self.operation_name, total_duration.as_millis());
        }
        total_duration
    }
}
