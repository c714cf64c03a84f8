//! Grid world configuration.

use ocean::{OceanError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How `render` produces frames
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Color the whole grid with the palette
    RgbArray,
    /// Draw a viewport around agent 0 and poll keys to steer it
    Human,
    /// Rendering disabled
    None,
}

/// Initialization strategy selector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitKind {
    Empty,
    Foraging,
    PredatorPrey,
    Puffer,
}

/// Reward strategy selector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Introvert,
    Centralized,
    Foraging,
    PredatorPrey,
    Group,
    Puffer,
    Center,
}

/// Viewport of the interactive render client
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Viewport width in tiles
    pub viewport_width: u32,
    /// Viewport height in tiles
    pub viewport_height: u32,
    /// Tile edge in pixels
    pub tile_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport_width: 80,
            viewport_height: 45,
            tile_size: 16,
        }
    }
}

/// Configuration for [`PufferGrid`](super::PufferGrid)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    // Map
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// Number of agents
    pub num_agents: usize,

    // Engine
    /// Episode length in ticks
    pub horizon: usize,
    /// Half-width of each agent's observation window
    pub vision_range: usize,
    /// Cells moved per tick at full action
    pub agent_speed: f32,
    /// MultiDiscrete([3, 3]) actions instead of a continuous 2-vector
    pub discretize: bool,
    /// Reward for eating one food pellet
    pub food_reward: f32,
    /// Mean ticks between random respawns of an agent
    pub expected_lifespan: f32,

    // Task
    pub init: InitKind,
    pub reward: RewardKind,
    /// Chance that an empty cell starts as food (foraging init)
    pub food_prob: f32,
    /// Reference bitmap for the puffer init/reward. No bitmap ships with the
    /// crate; the default path is resolved against the working directory and
    /// the caller must provide the file before selecting a puffer task.
    pub puffer_bitmap: PathBuf,

    // Diagnostics
    /// Ticks between `reward` reports
    pub report_interval: usize,
    pub render_mode: RenderMode,
    pub render: RenderConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            num_agents: 4096,

            horizon: 1024,
            vision_range: 5,
            agent_speed: 1.0,
            discretize: false,
            food_reward: 0.1,
            expected_lifespan: 1000.0,

            init: InitKind::Empty,
            reward: RewardKind::Introvert,
            food_prob: 0.1,
            puffer_bitmap: PathBuf::from("resources/pufferlib.png"),

            report_interval: 32,
            render_mode: RenderMode::RgbArray,
            render: RenderConfig::default(),
        }
    }
}

impl GridConfig {
    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Set map size
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_num_agents(mut self, num_agents: usize) -> Self {
        self.num_agents = num_agents;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_vision_range(mut self, vision_range: usize) -> Self {
        self.vision_range = vision_range;
        self
    }

    pub fn with_discretize(mut self, discretize: bool) -> Self {
        self.discretize = discretize;
        self
    }

    pub fn with_expected_lifespan(mut self, expected_lifespan: f32) -> Self {
        self.expected_lifespan = expected_lifespan;
        self
    }

    /// Select the init and reward strategies
    pub fn with_task(mut self, init: InitKind, reward: RewardKind) -> Self {
        self.init = init;
        self.reward = reward;
        self
    }

    pub fn with_food_prob(mut self, food_prob: f32) -> Self {
        self.food_prob = food_prob;
        self
    }

    pub fn with_puffer_bitmap(mut self, path: impl Into<PathBuf>) -> Self {
        self.puffer_bitmap = path.into();
        self
    }

    pub fn with_report_interval(mut self, report_interval: usize) -> Self {
        self.report_interval = report_interval;
        self
    }

    pub fn with_render_mode(mut self, render_mode: RenderMode) -> Self {
        self.render_mode = render_mode;
        self
    }

    /// Side of the square observation window
    pub fn obs_size(&self) -> usize {
        2 * self.vision_range + 1
    }

    /// Flat observation length per agent: window plus three summary bytes
    pub fn obs_len(&self) -> usize {
        self.obs_size() * self.obs_size() + 3
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| -> Result<()> { Err(OceanError::InvalidConfig(msg)) };
        if self.width == 0 || self.height == 0 {
            return fail(format!("map must be non-empty, got {}x{}", self.width, self.height));
        }
        if self.num_agents == 0 {
            return fail("num_agents must be > 0".into());
        }
        if self.num_agents > self.width * self.height {
            return fail(format!(
                "{} agents do not fit on a {}x{} map",
                self.num_agents, self.width, self.height
            ));
        }
        if self.horizon == 0 {
            return fail("horizon must be > 0".into());
        }
        if self.report_interval == 0 {
            return fail("report_interval must be > 0".into());
        }
        if !(0.0..=1.0).contains(&self.food_prob) {
            return fail(format!("food_prob must be in [0, 1], got {}", self.food_prob));
        }
        if !(self.expected_lifespan > 0.0) {
            return fail("expected_lifespan must be > 0".into());
        }
        if !self.agent_speed.is_finite() || self.agent_speed < 0.0 {
            return fail(format!("agent_speed must be >= 0, got {}", self.agent_speed));
        }
        if self.render_mode == RenderMode::Human && self.render.tile_size == 0 {
            return fail("tile_size must be > 0".into());
        }
        Ok(())
    }
}
