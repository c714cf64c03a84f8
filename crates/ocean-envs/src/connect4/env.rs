//! `Connect4`: one board per agent.

use super::game::{opponent_move, Board, Piece, COLS, ROWS};
use crate::grid::RenderMode;
use ndarray::{Array2, ArrayView2};
use ocean::env::{check_actions, EnvBuffers, EnvInfo, PufferEnv, StepResult};
use ocean::log::{MetricLogger, NoOpLogger};
use ocean::render::{Canvas, Frame, GraphicsBackend, Rgba};
use ocean::spaces::{Box as BoxSpace, Discrete, DynSpace};
use ocean::{OceanError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

const BACKGROUND: Rgba = [0, 0, 128, 255];
const EMPTY_SLOT: Rgba = [6, 24, 24, 255];
const PLAYER_PIECE: Rgba = [255, 0, 0, 255];
const OPPONENT_PIECE: Rgba = [255, 255, 0, 255];

/// Configuration for [`Connect4`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Connect4Config {
    /// Number of parallel games, one agent each
    pub num_envs: usize,
    /// Ticks between episode reports
    pub report_interval: usize,
    /// Render surface width in pixels
    pub width: u32,
    /// Render surface height in pixels
    pub height: u32,
    pub piece_width: u32,
    pub piece_height: u32,
    pub render_mode: RenderMode,
}

impl Default for Connect4Config {
    fn default() -> Self {
        Self {
            num_envs: 1,
            report_interval: 128,
            width: 672,
            height: 576,
            piece_width: 96,
            piece_height: 96,
            render_mode: RenderMode::RgbArray,
        }
    }
}

impl Connect4Config {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_num_envs(mut self, num_envs: usize) -> Self {
        self.num_envs = num_envs;
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

    pub fn validate(&self) -> Result<()> {
        if self.num_envs == 0 {
            return Err(OceanError::InvalidConfig("num_envs must be > 0".into()));
        }
        if self.report_interval == 0 {
            return Err(OceanError::InvalidConfig(
                "report_interval must be > 0".into(),
            ));
        }
        Ok(())
    }
}

// Sums over finished episodes since the last report
#[derive(Clone, Copy, Debug, Default)]
struct Log {
    episode_return: f32,
    episode_length: f32,
    score: f32,
    n: f32,
}

/// Connect-4 environment with a win/block/random opponent.
///
/// Rewards are +1 for a win, -1 for a loss or an illegal move and 0
/// otherwise. Finished games restart in place on the same step.
pub struct Connect4 {
    config: Connect4Config,
    boards: Vec<Board>,
    lengths: Vec<u32>,
    buffers: EnvBuffers<f32>,
    rng: ChaCha8Rng,
    tick: usize,
    log: Log,
    logger: Box<dyn MetricLogger>,
    canvas: Option<Canvas>,
}

impl Connect4 {
    pub fn new(config: Connect4Config) -> Result<Self> {
        config.validate()?;
        let n = config.num_envs;
        tracing::info!(num_envs = n, "Created connect4 environment");
        Ok(Self {
            boards: vec![Board::new(); n],
            lengths: vec![0; n],
            buffers: EnvBuffers::new(n, ROWS * COLS),
            rng: ChaCha8Rng::from_entropy(),
            tick: 0,
            log: Log::default(),
            logger: Box::new(NoOpLogger),
            canvas: None,
            config,
        })
    }

    /// Send episode reports to `logger`
    pub fn with_logger(mut self, logger: Box<dyn MetricLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    /// Play one turn of game `i`; returns `(reward, done, won)`
    fn play(&mut self, i: usize, action: f32) -> (f32, bool, bool) {
        let board = &mut self.boards[i];
        self.lengths[i] += 1;

        let col = if (0.0..COLS as f32).contains(&action) {
            action as usize
        } else {
            COLS
        };
        let Some(row) = board.drop_piece(col, Piece::Player) else {
            return (-1.0, true, false);
        };
        if board.wins_at(row, col) {
            return (1.0, true, true);
        }
        if board.is_full() {
            return (0.0, true, false);
        }

        let Some(col) = opponent_move(board, &mut self.rng) else {
            return (0.0, true, false);
        };
        match board.drop_piece(col, Piece::Opponent) {
            Some(row) if board.wins_at(row, col) => (-1.0, true, false),
            _ if board.is_full() => (0.0, true, false),
            _ => (0.0, false, false),
        }
    }

    fn write_observations(&mut self) {
        for (board, mut row) in self
            .boards
            .iter()
            .zip(self.buffers.observations.rows_mut())
        {
            if let Some(out) = row.as_slice_mut() {
                board.write_observation(out);
            }
        }
    }

    fn report(&mut self) -> EnvInfo {
        let log = std::mem::take(&mut self.log);
        let n = log.n;
        let info = EnvInfo::new()
            .with_episode_stats(log.episode_return / n, log.episode_length / n)
            .with_extra("score", log.score / n)
            .with_extra("n", n);

        let step = self.tick as u64;
        for (key, value) in [
            ("episode_return", log.episode_return / n),
            ("episode_length", log.episode_length / n),
            ("score", log.score / n),
        ] {
            self.logger.log_scalar(key, f64::from(value), step);
        }
        tracing::debug!(tick = self.tick, episodes = n, "Connect4 report");
        info
    }
}

impl PufferEnv for Connect4 {
    type Obs = f32;

    fn observation_space(&self) -> DynSpace {
        DynSpace::Box(BoxSpace::uniform(&[ROWS * COLS], 0.0, 1.0))
    }

    fn action_space(&self) -> DynSpace {
        DynSpace::Discrete(Discrete::new(COLS))
    }

    fn num_agents(&self) -> usize {
        self.config.num_envs
    }

    fn reset(&mut self, seed: Option<u64>) -> (ArrayView2<'_, f32>, EnvInfo) {
        if let Some(s) = seed {
            self.rng = ChaCha8Rng::seed_from_u64(s);
        }
        self.boards.iter_mut().for_each(Board::clear);
        self.lengths.fill(0);
        self.buffers.clear_step();
        self.tick = 0;
        self.log = Log::default();
        self.write_observations();
        (self.buffers.observations.view(), EnvInfo::new())
    }

    fn step(&mut self, actions: &Array2<f32>) -> Result<StepResult<'_, f32>> {
        check_actions(actions, self.config.num_envs, 1)?;
        self.buffers.clear_step();

        for i in 0..self.config.num_envs {
            let (reward, done, won) = self.play(i, actions[[i, 0]]);
            self.buffers.rewards[i] = reward;
            self.buffers.terminals[i] = done;
            if done {
                self.log.episode_return += reward;
                self.log.episode_length += self.lengths[i] as f32;
                self.log.score += if won { 1.0 } else { 0.0 };
                self.log.n += 1.0;
                self.boards[i].clear();
                self.lengths[i] = 0;
            }
        }

        self.tick += 1;
        let info = if self.tick % self.config.report_interval == 0 && self.log.n > 0.0 {
            self.report()
        } else {
            EnvInfo::new()
        };

        self.write_observations();
        Ok(StepResult::from_buffers(&self.buffers, info))
    }

    fn buffers(&self) -> &EnvBuffers<f32> {
        &self.buffers
    }

    fn render(&mut self) -> Option<Frame> {
        if self.config.render_mode == RenderMode::None {
            return None;
        }
        let (width, height) = (self.config.width, self.config.height);
        let canvas = self.canvas.get_or_insert_with(|| Canvas::new(width, height));

        let (pw, ph) = (self.config.piece_width, self.config.piece_height);
        // Pieces inset by an eighth of a cell on each side
        let (mx, my) = (pw / 8, ph / 8);
        canvas.begin_frame(BACKGROUND);
        for row in 0..ROWS {
            for col in 0..COLS {
                let color = match self.boards[0].get(row, col) {
                    Piece::Empty => EMPTY_SLOT,
                    Piece::Player => PLAYER_PIECE,
                    Piece::Opponent => OPPONENT_PIECE,
                };
                let x = (col as u32 * pw + mx) as i32;
                let y = (row as u32 * ph + my) as i32;
                canvas.draw_rect(x, y, pw - 2 * mx, ph - 2 * my, color);
            }
        }
        canvas.end_frame();
        Some(canvas.capture())
    }

    fn close(&mut self) {
        self.canvas = None;
        self.logger.close();
    }
}
