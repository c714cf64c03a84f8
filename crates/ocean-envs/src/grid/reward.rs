//! Reward strategies.
//!
//! Each strategy is a pure function of a `WorldView` that adds one reward per
//! agent into the host's reward buffer.

use super::{Team, WorldView, AGENT_1, AGENT_2};
use ndarray::{Array2, ArrayViewMut1, Zip};
use ocean::{OceanError, Result};
use std::path::Path;
use std::sync::Arc;

/// Red and blue pixel masks decoded from a reference bitmap.
#[derive(Clone, Debug, PartialEq)]
pub struct PufferMask {
    /// Shape `(rows, cols)` of the bitmap
    pub red: Array2<bool>,
    pub blue: Array2<bool>,
}

impl PufferMask {
    /// Decode a bitmap from disk.
    ///
    /// # Errors
    /// Returns `OceanError::Asset` if the file is missing or not an image.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| OceanError::Asset {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mask = Self::from_rgba(&image.to_rgba8());
        tracing::debug!(?path, shape = ?mask.red.dim(), "Loaded puffer bitmap");
        Ok(mask)
    }

    /// Classify every pixel: red when channel 0 is saturated, blue when
    /// channel 1 is, in both cases only where alpha is non-zero.
    pub fn from_rgba(image: &image::RgbaImage) -> Self {
        let (cols, rows) = image.dimensions();
        let shape = (rows as usize, cols as usize);
        let mut red = Array2::from_elem(shape, false);
        let mut blue = Array2::from_elem(shape, false);
        for (x, y, pixel) in image.enumerate_pixels() {
            let [r, g, _, a] = pixel.0;
            let filled = a != 0;
            red[[y as usize, x as usize]] = filled && r == 255;
            blue[[y as usize, x as usize]] = filled && g == 255;
        }
        Self { red, blue }
    }

    /// Whether `team`'s color is painted at `(row, col)`; off-bitmap is unpainted
    pub fn painted(&self, team: Team, row: usize, col: usize) -> bool {
        let mask = match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
            Team::None => return false,
        };
        mask.get((row, col)).copied().unwrap_or(false)
    }
}

/// Per-agent reward function selected at construction
#[derive(Clone, Debug)]
pub enum RewardStrategy {
    /// Penalize every agent-coded cell in view, own cell included
    Introvert,
    /// Summed normalized distance to every other agent
    Centralized,
    /// Zero; food reward comes from the engine
    Foraging,
    /// First half hunts the second half
    PredatorPrey,
    /// Same-color neighbours are good, other colors bad
    Group,
    /// Stand on your team's color in the reference bitmap
    Puffer(Arc<PufferMask>),
    /// Stay near the map centre
    Center,
}

impl RewardStrategy {
    /// Add this tick's rewards into `rewards`
    pub fn apply(&self, view: &WorldView<'_>, mut rewards: ArrayViewMut1<'_, f32>) {
        let n = view.num_agents();
        match self {
            RewardStrategy::Introvert => {
                Zip::from(&mut rewards)
                    .and(view.windows.rows())
                    .par_for_each(|r, window| {
                        let agents = window.iter().filter(|&&c| c >= AGENT_1).count() as f32;
                        *r += ((1.0 - agents) / 10.0).clamp(-1.0, 0.0);
                    });
            }
            RewardStrategy::Centralized => {
                let map_size = view.width.max(view.height) as f32;
                let pos = view.positions.mapv(|p| p / map_size);
                Zip::from(&mut rewards)
                    .and(pos.rows())
                    .par_for_each(|r, me| {
                        let total: f32 = pos
                            .rows()
                            .into_iter()
                            .map(|other| {
                                let dr = other[0] - me[0];
                                let dc = other[1] - me[1];
                                (dr * dr + dc * dc).sqrt()
                            })
                            .sum();
                        *r += total / map_size;
                    });
            }
            RewardStrategy::Foraging => {}
            RewardStrategy::PredatorPrey => {
                let predators = n / 2;
                for (i, r) in rewards.iter_mut().enumerate() {
                    let raw = if i < predators {
                        view.count_in_window(i, |c| c == AGENT_2) as f32
                    } else {
                        -(view.count_in_window(i, |c| c == AGENT_1) as f32)
                    };
                    *r += (raw / 10.0).clamp(-1.0, 1.0);
                }
            }
            RewardStrategy::Group => {
                for (i, r) in rewards.iter_mut().enumerate() {
                    let color = view.colors[i];
                    let same = view.count_in_window(i, |c| c == color) as f32 - 1.0;
                    let other = view.count_in_window(i, |c| c >= AGENT_1 && c != color) as f32;
                    *r += ((same - other) / 10.0).clamp(-1.0, 1.0);
                }
            }
            RewardStrategy::Puffer(mask) => {
                for (i, r) in rewards.iter_mut().enumerate() {
                    let row = view.positions[[i, 0]] as usize;
                    let col = view.positions[[i, 1]] as usize;
                    let bonus = if mask.painted(view.teams[i], row, col) {
                        1.0
                    } else {
                        0.0
                    };
                    *r += bonus - 0.01 * view.center_distance(i);
                }
            }
            RewardStrategy::Center => {
                for (i, r) in rewards.iter_mut().enumerate() {
                    *r += -0.01 * view.center_distance(i);
                }
            }
        }
    }
}
