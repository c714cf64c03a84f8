//! Environment traits and shared buffers.
//!
//! Provides the core `PufferEnv` trait that all environments implement,
//! plus the host-owned `EnvBuffers` every step writes into.

mod buffers;
mod traits;

pub use buffers::{check_actions, EnvBuffers};
pub use traits::{EnvInfo, PufferEnv, StepResult};
