//! Host-owned shared buffers.

use crate::{OceanError, Result};
use ndarray::{Array1, Array2};

/// Per-agent buffers shared between an environment host and its engine.
///
/// The host allocates them once and overwrites them every tick.
#[derive(Clone, Debug)]
pub struct EnvBuffers<O> {
    /// Observations, shape `(num_agents, obs_len)`
    pub observations: Array2<O>,
    /// Rewards for the last tick
    pub rewards: Array1<f32>,
    /// Terminal flags for the last tick
    pub terminals: Array1<bool>,
    /// Truncation flags for the last tick
    pub truncations: Array1<bool>,
    /// Which agents are present; all set unless an environment says otherwise
    pub masks: Array1<bool>,
}

impl<O: Clone + Default> EnvBuffers<O> {
    /// Allocate zeroed buffers for `num_agents` agents
    pub fn new(num_agents: usize, obs_len: usize) -> Self {
        Self {
            observations: Array2::from_elem((num_agents, obs_len), O::default()),
            rewards: Array1::zeros(num_agents),
            terminals: Array1::from_elem(num_agents, false),
            truncations: Array1::from_elem(num_agents, false),
            masks: Array1::from_elem(num_agents, true),
        }
    }
}

impl<O> EnvBuffers<O> {
    pub fn num_agents(&self) -> usize {
        self.rewards.len()
    }

    /// Length of one agent's observation row
    pub fn obs_len(&self) -> usize {
        self.observations.ncols()
    }

    /// Clear the per-tick reward and done flags
    pub fn clear_step(&mut self) {
        self.rewards.fill(0.0);
        self.terminals.fill(false);
        self.truncations.fill(false);
    }
}

/// Check that `actions` has one row per agent and `width` columns.
pub fn check_actions(actions: &Array2<f32>, num_agents: usize, width: usize) -> Result<()> {
    if actions.dim() != (num_agents, width) {
        return Err(OceanError::ShapeMismatch {
            expected: vec![num_agents, width],
            actual: actions.shape().to_vec(),
        });
    }
    Ok(())
}
