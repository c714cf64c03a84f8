//! # Ocean
//!
//! Shared plumbing for the Ocean reinforcement learning environments.
//!
//! ## Overview
//!
//! Ocean provides:
//! - The multi-agent `PufferEnv` trait with host-owned shared buffers
//! - Gymnasium-style observation and action spaces
//! - Serial vectorization of several environments into one agent batch
//! - Metric loggers for periodic environment reports
//! - A headless `GraphicsBackend` for optional rendering
//!
//! Concrete environments live in the `ocean-envs` crate.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ocean::prelude::*;
//! use ocean_envs::{GridConfig, PufferGrid};
//!
//! let mut env = PufferGrid::new(GridConfig::default().with_num_agents(2))?;
//! let (obs, _) = env.reset(Some(0));
//!
//! let actions = Array2::from_elem((2, 2), 1.0);
//! let result = env.step(&actions)?;
//! ```

pub mod env;
pub mod log;
pub mod render;
pub mod spaces;
pub mod vector;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::env::{EnvBuffers, EnvInfo, PufferEnv, StepResult};
    pub use crate::log::{CompositeLogger, ConsoleLogger, MetricLogger, NoOpLogger};
    pub use crate::render::{Canvas, Frame, GraphicsBackend, Key, Rgba};
    pub use crate::spaces::*;
    pub use crate::vector::Serial;
    pub use crate::{OceanError, Result};
    pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use std::path::PathBuf;

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum OceanError {
    #[error("Environment error: {0}")]
    EnvError(String),

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Failed to load asset {path:?}: {reason}")]
    Asset { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, OceanError>;
