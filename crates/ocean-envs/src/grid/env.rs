//! `PufferGrid`: the environment host.

use super::{
    AgentActions, Engine, EngineView, GridConfig, GridEngine, InitKind, InitStrategy,
    PufferMask, RenderClient, RenderMode, RewardKind, RewardStrategy, World, WorldView, COLORS,
};
use ndarray::{s, Array2, Array3, ArrayView2};
use ocean::env::{check_actions, EnvBuffers, EnvInfo, PufferEnv, StepResult};
use ocean::log::{MetricLogger, NoOpLogger};
use ocean::render::{Canvas, Frame};
use ocean::spaces::{Box as BoxSpace, Dtype, DynSpace, MultiDiscrete};
use ocean::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

/// Multi-agent grid world host.
///
/// Owns the world and every shared buffer. Each `step` casts the actions,
/// lets the engine move agents and write observation windows, adds the
/// selected reward strategy and fills the three summary bytes at the end of
/// each observation row.
pub struct PufferGrid {
    config: GridConfig,
    world: World,
    buffers: EnvBuffers<u8>,
    engine: Box<dyn Engine>,
    init: InitStrategy,
    reward: RewardStrategy,
    rng: ChaCha8Rng,

    tick: usize,
    // Summed reward of every tick since the last report
    report_sum: f32,
    report_ticks: usize,
    episode_rewards: Array2<f32>,
    logger: Box<dyn MetricLogger>,

    client: Option<RenderClient<Canvas>>,
    human_action: Option<[f32; 2]>,
}

impl PufferGrid {
    /// Build a host with the strategies named in `config`.
    ///
    /// # Errors
    /// Fails on an invalid config or when a puffer strategy is selected and
    /// the bitmap cannot be loaded.
    pub fn new(config: GridConfig) -> Result<Self> {
        config.validate()?;

        // Decoded at most once and shared by both strategies
        let mut mask: Option<Arc<PufferMask>> = None;
        let mut puffer_mask = || -> Result<Arc<PufferMask>> {
            if let Some(mask) = &mask {
                return Ok(mask.clone());
            }
            let loaded = Arc::new(PufferMask::open(&config.puffer_bitmap)?);
            mask = Some(loaded.clone());
            Ok(loaded)
        };

        let init = match config.init {
            InitKind::Empty => InitStrategy::Empty,
            InitKind::Foraging => InitStrategy::Foraging {
                food_prob: config.food_prob,
            },
            InitKind::PredatorPrey => InitStrategy::PredatorPrey,
            InitKind::Puffer => InitStrategy::Puffer(puffer_mask()?),
        };
        let reward = match config.reward {
            RewardKind::Introvert => RewardStrategy::Introvert,
            RewardKind::Centralized => RewardStrategy::Centralized,
            RewardKind::Foraging => RewardStrategy::Foraging,
            RewardKind::PredatorPrey => RewardStrategy::PredatorPrey,
            RewardKind::Group => RewardStrategy::Group,
            RewardKind::Puffer => RewardStrategy::Puffer(puffer_mask()?),
            RewardKind::Center => RewardStrategy::Center,
        };

        Self::with_strategies(config, init, reward)
    }

    /// Build a host with explicit strategies; `config.init`/`config.reward`
    /// are ignored.
    pub fn with_strategies(
        config: GridConfig,
        init: InitStrategy,
        reward: RewardStrategy,
    ) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::from_entropy();
        let world = World::new(
            config.width,
            config.height,
            config.num_agents,
            config.vision_range,
            &mut rng,
        );
        let engine = GridEngine::new(
            config.num_agents,
            config.horizon,
            config.agent_speed,
            config.food_reward,
            config.expected_lifespan,
        );
        let client = match config.render_mode {
            RenderMode::Human => Some(RenderClient::headless(&config.render)),
            RenderMode::RgbArray | RenderMode::None => None,
        };

        tracing::info!(
            width = config.width,
            height = config.height,
            num_agents = config.num_agents,
            vision_range = config.vision_range,
            discretize = config.discretize,
            "Created grid environment"
        );

        Ok(Self {
            buffers: EnvBuffers::new(config.num_agents, config.obs_len()),
            episode_rewards: Array2::zeros((config.horizon, config.num_agents)),
            world,
            engine: Box::new(engine),
            init,
            reward,
            rng,
            tick: 0,
            report_sum: 0.0,
            report_ticks: 0,
            logger: Box::new(NoOpLogger),
            client,
            human_action: None,
            config,
        })
    }

    /// Replace the stepping engine
    pub fn with_engine(mut self, engine: Box<dyn Engine>) -> Self {
        self.engine = engine;
        self
    }

    /// Send `reward` reports to `logger`
    pub fn with_logger(mut self, logger: Box<dyn MetricLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Ticks since the last reset
    pub fn tick(&self) -> usize {
        self.tick
    }

    /// Per-tick rewards of the current episode, shape `(horizon, num_agents)`
    pub fn episode_rewards(&self) -> ArrayView2<'_, f32> {
        self.episode_rewards.view()
    }

    /// Override action polled by the last human-mode render
    pub fn human_action(&self) -> Option<[f32; 2]> {
        self.human_action
    }

    pub fn render_client_mut(&mut self) -> Option<&mut RenderClient<Canvas>> {
        self.client.as_mut()
    }

    fn window_len(&self) -> usize {
        self.world.obs_size() * self.world.obs_size()
    }

    fn cast_actions(&self, actions: &Array2<f32>) -> AgentActions {
        let mut cast = if self.config.discretize {
            let space = MultiDiscrete::new(vec![3, 3]);
            AgentActions::Discrete(
                actions
                    .rows()
                    .into_iter()
                    .map(|row| {
                        let clipped = space.clip(&[row[0], row[1]]);
                        [clipped[0] as u8, clipped[1] as u8]
                    })
                    .collect(),
            )
        } else {
            AgentActions::Continuous(
                actions
                    .rows()
                    .into_iter()
                    .map(|row| [row[0].clamp(-1.0, 1.0), row[1].clamp(-1.0, 1.0)])
                    .collect(),
            )
        };
        if let Some(action) = self.human_action {
            cast.set(0, action);
        }
        cast
    }

    /// Copy the engine's active flags into the done buffers
    fn sync_dones(&mut self) {
        for (i, &active) in self.engine.active().iter().enumerate() {
            self.buffers.terminals[i] = !active;
            self.buffers.truncations[i] = !active;
        }
    }

    /// Write the normalized position and scaled reward summary bytes
    fn fill_observations(&mut self) {
        let base = self.window_len();
        let height = self.world.height() as f32;
        let width = self.world.width() as f32;
        let mut summary = self.buffers.observations.slice_mut(s![.., base..base + 3]);
        for (i, mut row) in summary.rows_mut().into_iter().enumerate() {
            // `as u8` saturates: negatives become 0, overflow becomes 255
            row[0] = (255.0 * self.world.positions[[i, 0]] / height) as u8;
            row[1] = (255.0 * self.world.positions[[i, 1]] / width) as u8;
            row[2] = (255.0 * self.buffers.rewards[i]) as u8;
        }
    }

    /// Color every cell of the grid. Unlike the viewport client, no
    /// `vision_range` border is cropped, so off-band cells are included.
    fn rgb_frame(&self) -> Frame {
        let (height, width) = self.world.grid.dim();
        Array3::from_shape_fn((height, width, 3), |(r, c, ch)| {
            COLORS[(self.world.grid[[r, c]] as usize).min(COLORS.len() - 1)][ch]
        })
    }
}

impl PufferEnv for PufferGrid {
    type Obs = u8;

    fn observation_space(&self) -> DynSpace {
        let space = BoxSpace::uniform(&[self.config.obs_len()], 0.0, 255.0);
        DynSpace::Box(space.with_dtype(Dtype::U8))
    }

    fn action_space(&self) -> DynSpace {
        if self.config.discretize {
            DynSpace::MultiDiscrete(MultiDiscrete::new(vec![3, 3]))
        } else {
            DynSpace::Box(BoxSpace::symmetric(&[2]))
        }
    }

    fn num_agents(&self) -> usize {
        self.config.num_agents
    }

    fn reset(&mut self, seed: Option<u64>) -> (ArrayView2<'_, u8>, EnvInfo) {
        if let Some(s) = seed {
            self.rng = ChaCha8Rng::seed_from_u64(s);
        }

        self.world.clear();
        self.init.apply(&mut self.world, &mut self.rng);
        self.episode_rewards.fill(0.0);
        self.buffers.clear_step();

        let window_len = self.window_len();
        let mut view = EngineView {
            world: &mut self.world,
            windows: self.buffers.observations.slice_mut(s![.., ..window_len]),
            rewards: self.buffers.rewards.view_mut(),
        };
        self.engine.reset(&mut view, seed);

        self.tick = 0;
        self.report_sum = 0.0;
        self.report_ticks = 0;
        self.sync_dones();
        self.fill_observations();

        tracing::debug!(?seed, "Reset grid environment");
        (self.buffers.observations.view(), EnvInfo::new())
    }

    fn step(&mut self, actions: &Array2<f32>) -> Result<StepResult<'_, u8>> {
        check_actions(actions, self.config.num_agents, 2)?;
        let actions = self.cast_actions(actions);

        self.buffers.rewards.fill(0.0);
        let window_len = self.window_len();
        let mut view = EngineView {
            world: &mut self.world,
            windows: self.buffers.observations.slice_mut(s![.., ..window_len]),
            rewards: self.buffers.rewards.view_mut(),
        };
        self.engine.step(&mut view, &actions);

        let windows: ArrayView2<'_, u8> = self.buffers.observations.slice(s![.., ..window_len]);
        let world_view = WorldView::new(&self.world, windows);
        self.reward.apply(&world_view, self.buffers.rewards.view_mut());
        self.sync_dones();

        if self.tick < self.episode_rewards.nrows() {
            self.episode_rewards
                .row_mut(self.tick)
                .assign(&self.buffers.rewards);
        }
        self.report_sum += self.buffers.rewards.sum();
        self.report_ticks += 1;
        self.tick += 1;

        let mut info = EnvInfo::new();
        if self.tick % self.config.report_interval == 0 {
            let mean = self.report_sum / self.report_ticks as f32;
            info.insert("reward", mean);
            self.logger.log_scalar("reward", f64::from(mean), self.tick as u64);
            tracing::debug!(tick = self.tick, reward = mean, "Grid report");
            self.report_sum = 0.0;
            self.report_ticks = 0;
        }

        self.fill_observations();
        Ok(StepResult::from_buffers(&self.buffers, info))
    }

    fn buffers(&self) -> &EnvBuffers<u8> {
        &self.buffers
    }

    fn render(&mut self) -> Option<Frame> {
        match self.config.render_mode {
            RenderMode::RgbArray => Some(self.rgb_frame()),
            RenderMode::Human => {
                let client = self.client.as_mut()?;
                let (frame, action) = client.render(&self.world, self.config.discretize);
                self.human_action = action;
                Some(frame)
            }
            RenderMode::None => None,
        }
    }

    fn close(&mut self) {
        self.client = None;
        self.human_action = None;
        self.logger.close();
    }
}
