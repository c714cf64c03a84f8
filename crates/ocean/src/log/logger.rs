//! Metric logger trait and composites.

use std::collections::HashMap;

/// Sink for scalar diagnostics keyed by tick.
pub trait MetricLogger: Send + Sync {
    /// Log a scalar value (e.g. mean reward).
    fn log_scalar(&self, name: &str, value: f64, step: u64);

    /// Log a set of metrics reported on the same tick.
    fn log_metrics(&self, metrics: &HashMap<String, f64>, step: u64) {
        let mut keys: Vec<_> = metrics.keys().collect();
        keys.sort();
        for key in keys {
            self.log_scalar(key, metrics[key], step);
        }
    }

    /// Flush any pending writes.
    fn close(&self) {}
}

/// A logger that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpLogger;

impl MetricLogger for NoOpLogger {
    fn log_scalar(&self, _name: &str, _value: f64, _step: u64) {}
    fn log_metrics(&self, _metrics: &HashMap<String, f64>, _step: u64) {}
}

/// Dispatches every call to each of its backends in order.
#[derive(Default)]
pub struct CompositeLogger {
    loggers: Vec<Box<dyn MetricLogger>>,
}

impl CompositeLogger {
    pub fn new(loggers: Vec<Box<dyn MetricLogger>>) -> Self {
        Self { loggers }
    }

    pub fn add(&mut self, logger: Box<dyn MetricLogger>) {
        self.loggers.push(logger);
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl MetricLogger for CompositeLogger {
    fn log_scalar(&self, name: &str, value: f64, step: u64) {
        for logger in &self.loggers {
            logger.log_scalar(name, value, step);
        }
    }

    fn log_metrics(&self, metrics: &HashMap<String, f64>, step: u64) {
        for logger in &self.loggers {
            logger.log_metrics(metrics, step);
        }
    }

    fn close(&self) {
        for logger in &self.loggers {
            logger.close();
        }
    }
}
