//! Metric logging backends.
//!
//! Environments push their periodic reports through a `MetricLogger`:
//! - `ConsoleLogger` writes through `tracing`
//! - `CompositeLogger` fans out to several backends
//! - `NoOpLogger` drops everything (the default)

mod console;
mod logger;

pub use console::ConsoleLogger;
pub use logger::{CompositeLogger, MetricLogger, NoOpLogger};
