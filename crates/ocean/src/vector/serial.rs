//! Serial (sequential) vectorization backend.

use crate::env::{check_actions, EnvBuffers, EnvInfo, PufferEnv, StepResult};
use crate::spaces::DynSpace;
use crate::{OceanError, Result};
use ndarray::{s, Array2, ArrayView2};

/// Serial vectorization backend.
///
/// Agents of environment `i` occupy rows `i * agents_per_env ..` of the
/// combined buffers.
pub struct Serial<E: PufferEnv> {
    envs: Vec<E>,
    agents_per_env: usize,
    action_width: usize,
    buffers: EnvBuffers<E::Obs>,
}

impl<E: PufferEnv> Serial<E>
where
    E::Obs: Default,
{
    /// Create `num_envs` environments with `env_creator`.
    ///
    /// # Errors
    /// Fails if `num_envs` is zero, if `env_creator` fails, or if the created
    /// environments disagree on agent count or observation width.
    pub fn new<F>(env_creator: F, num_envs: usize) -> Result<Self>
    where
        F: Fn() -> Result<E>,
    {
        if num_envs == 0 {
            return Err(OceanError::InvalidConfig(
                "Number of environments must be > 0".into(),
            ));
        }

        let envs = (0..num_envs)
            .map(|_| env_creator())
            .collect::<Result<Vec<_>>>()?;

        let agents_per_env = envs[0].num_agents();
        let obs_len = envs[0].observation_space().num_elements();
        let action_width = envs[0].action_space().num_elements();
        for env in &envs[1..] {
            if env.num_agents() != agents_per_env
                || env.observation_space().num_elements() != obs_len
            {
                return Err(OceanError::ShapeMismatch {
                    expected: vec![agents_per_env, obs_len],
                    actual: vec![env.num_agents(), env.observation_space().num_elements()],
                });
            }
        }

        tracing::debug!(num_envs, agents_per_env, "Created serial vector env");

        Ok(Self {
            buffers: EnvBuffers::new(num_envs * agents_per_env, obs_len),
            envs,
            agents_per_env,
            action_width,
        })
    }
}

impl<E: PufferEnv> Serial<E> {
    pub fn num_envs(&self) -> usize {
        self.envs.len()
    }

    pub fn envs(&self) -> &[E] {
        &self.envs
    }

    /// Copy env `i`'s buffers into its slot of the combined buffers
    fn gather(&mut self, i: usize) {
        let rows = i * self.agents_per_env..(i + 1) * self.agents_per_env;
        let src = self.envs[i].buffers();
        let dst = &mut self.buffers;
        dst.observations
            .slice_mut(s![rows.clone(), ..])
            .assign(&src.observations);
        dst.rewards.slice_mut(s![rows.clone()]).assign(&src.rewards);
        dst.terminals.slice_mut(s![rows.clone()]).assign(&src.terminals);
        dst.truncations.slice_mut(s![rows.clone()]).assign(&src.truncations);
        dst.masks.slice_mut(s![rows]).assign(&src.masks);
    }
}

impl<E: PufferEnv> PufferEnv for Serial<E> {
    type Obs = E::Obs;

    fn observation_space(&self) -> DynSpace {
        self.envs[0].observation_space()
    }

    fn action_space(&self) -> DynSpace {
        self.envs[0].action_space()
    }

    fn num_agents(&self) -> usize {
        self.envs.len() * self.agents_per_env
    }

    fn reset(&mut self, seed: Option<u64>) -> (ArrayView2<'_, Self::Obs>, EnvInfo) {
        let mut infos = Vec::with_capacity(self.envs.len());
        for i in 0..self.envs.len() {
            let env_seed = seed.map(|s| s + i as u64);
            let (_, info) = self.envs[i].reset(env_seed);
            infos.push(info);
            self.gather(i);
        }

        (self.buffers.observations.view(), EnvInfo::merge_mean(&infos))
    }

    fn step(&mut self, actions: &Array2<f32>) -> Result<StepResult<'_, Self::Obs>> {
        check_actions(actions, self.num_agents(), self.action_width)?;

        let mut infos = Vec::with_capacity(self.envs.len());
        for i in 0..self.envs.len() {
            let rows = i * self.agents_per_env..(i + 1) * self.agents_per_env;
            let env_actions = actions.slice(s![rows, ..]).to_owned();
            let info = self.envs[i].step(&env_actions)?.info;
            infos.push(info);
            self.gather(i);
        }

        let info = EnvInfo::merge_mean(&infos);
        Ok(StepResult::from_buffers(&self.buffers, info))
    }

    fn buffers(&self) -> &EnvBuffers<Self::Obs> {
        &self.buffers
    }

    fn close(&mut self) {
        for env in &mut self.envs {
            env.close();
        }
    }
}
