//! Console logging backend.

use super::MetricLogger;
use std::collections::HashMap;

/// Logger that emits metrics as `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleLogger;

impl ConsoleLogger {
    pub fn new() -> Self {
        Self
    }
}

impl MetricLogger for ConsoleLogger {
    fn log_scalar(&self, name: &str, value: f64, step: u64) {
        tracing::info!("Tick {}: {} = {:.4}", step, name, value);
    }

    fn log_metrics(&self, metrics: &HashMap<String, f64>, step: u64) {
        // One line per report
        let mut keys: Vec<_> = metrics.keys().collect();
        keys.sort();
        let fields: Vec<String> = keys
            .iter()
            .map(|key| format!("{}={:.4}", key, metrics[*key]))
            .collect();

        tracing::info!("Tick {}: {}", step, fields.join(", "));
    }
}
