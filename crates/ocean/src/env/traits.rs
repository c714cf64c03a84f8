//! Core environment trait definitions.

use super::EnvBuffers;
use crate::render::Frame;
use crate::spaces::DynSpace;
use crate::Result;
use ndarray::{Array2, ArrayView1, ArrayView2};

/// Information returned from environment resets and steps
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvInfo {
    /// Mean episode return (if episodes were logged)
    pub episode_return: Option<f32>,
    /// Mean episode length (if episodes were logged)
    pub episode_length: Option<f32>,
    /// Custom metrics (kept minimal for performance)
    pub extra: smallvec::SmallVec<[(&'static str, f32); 4]>,
}

impl EnvInfo {
    /// Create empty info
    pub fn new() -> Self {
        Self::default()
    }

    /// Add episode stats
    pub fn with_episode_stats(mut self, ret: f32, len: f32) -> Self {
        self.episode_return = Some(ret);
        self.episode_length = Some(len);
        self
    }

    /// Add a custom metric
    pub fn with_extra(mut self, key: &'static str, value: f32) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a custom metric, replacing any previous value for `key`
    pub fn insert(&mut self, key: &'static str, value: f32) {
        match self.extra.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.extra.push((key, value)),
        }
    }

    /// Get a value by key (including episode stats)
    pub fn get(&self, key: &str) -> Option<f32> {
        match key {
            "episode_return" => self.episode_return,
            "episode_length" => self.episode_length,
            _ => self.extra.iter().find(|(k, _)| *k == key).map(|(_, v)| *v),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.episode_return.is_none() && self.episode_length.is_none() && self.extra.is_empty()
    }

    /// Iterate over every populated key
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        let stats = [
            ("episode_return", self.episode_return),
            ("episode_length", self.episode_length),
        ];
        stats
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .chain(self.extra.iter().copied())
    }

    /// Average each key over the infos that report it.
    pub fn merge_mean<'a>(infos: impl IntoIterator<Item = &'a EnvInfo>) -> EnvInfo {
        let mut sums: Vec<(&'static str, f32, u32)> = Vec::new();
        for info in infos {
            for (key, value) in info.iter() {
                match sums.iter_mut().find(|(k, _, _)| *k == key) {
                    Some(entry) => {
                        entry.1 += value;
                        entry.2 += 1;
                    }
                    None => sums.push((key, value, 1)),
                }
            }
        }

        let mut merged = EnvInfo::new();
        for (key, sum, count) in sums {
            let mean = sum / count as f32;
            match key {
                "episode_return" => merged.episode_return = Some(mean),
                "episode_length" => merged.episode_length = Some(mean),
                _ => merged.insert(key, mean),
            }
        }
        merged
    }
}

/// Borrowed view of the shared buffers after a step
#[derive(Clone, Debug)]
pub struct StepResult<'a, O> {
    /// Observations, one row per agent
    pub observations: ArrayView2<'a, O>,
    /// Rewards received this tick
    pub rewards: ArrayView1<'a, f32>,
    /// Whether each agent's episode terminated
    pub terminals: ArrayView1<'a, bool>,
    /// Whether each agent's episode was truncated
    pub truncations: ArrayView1<'a, bool>,
    /// Periodic diagnostics; most ticks carry none
    pub info: EnvInfo,
}

impl<'a, O> StepResult<'a, O> {
    /// Borrow every buffer of `buffers` alongside `info`
    pub fn from_buffers(buffers: &'a EnvBuffers<O>, info: EnvInfo) -> Self {
        Self {
            observations: buffers.observations.view(),
            rewards: buffers.rewards.view(),
            terminals: buffers.terminals.view(),
            truncations: buffers.truncations.view(),
            info,
        }
    }

    /// Per-agent done flags (terminated or truncated)
    pub fn dones(&self) -> Vec<bool> {
        self.terminals
            .iter()
            .zip(self.truncations.iter())
            .map(|(&t, &tr)| t || tr)
            .collect()
    }
}

/// Core trait for Ocean environments.
///
/// An environment hosts `num_agents` agents and owns one row of each shared
/// buffer per agent. `reset` and `step` overwrite those buffers in place and
/// hand back borrowed views; callers copy what they need to keep.
///
/// # Example
///
/// ```rust,ignore
/// let mut env = PufferGrid::new(GridConfig::default())?;
/// let (obs, _) = env.reset(Some(0));
/// assert_eq!(obs.nrows(), env.num_agents());
///
/// let actions = Array2::zeros((env.num_agents(), 2));
/// let result = env.step(&actions)?;
/// let dones = result.dones();
/// ```
pub trait PufferEnv: Send {
    /// Element type of the observation buffer
    type Obs: Copy + Send + Sync + 'static;

    /// Observation space of a single agent
    fn observation_space(&self) -> DynSpace;

    /// Action space of a single agent
    fn action_space(&self) -> DynSpace;

    /// Number of agents hosted; fixed for the lifetime of the environment
    fn num_agents(&self) -> usize;

    /// Reset the environment to an initial state
    ///
    /// # Arguments
    /// * `seed` - Optional seed; `None` continues the current random stream
    fn reset(&mut self, seed: Option<u64>) -> (ArrayView2<'_, Self::Obs>, EnvInfo);

    /// Advance every agent by one tick
    ///
    /// # Arguments
    /// * `actions` - One row per agent, laid out as the action space describes
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if `actions` does not have one row per agent
    /// with the action space's width. Nothing is stepped in that case.
    fn step(&mut self, actions: &Array2<f32>) -> Result<StepResult<'_, Self::Obs>>;

    /// The shared buffers as of the last reset or step
    fn buffers(&self) -> &EnvBuffers<Self::Obs>;

    /// Optional: Render the environment into an RGB frame
    fn render(&mut self) -> Option<Frame> {
        None
    }

    /// Optional: Close the environment and free resources
    fn close(&mut self) {}
}
