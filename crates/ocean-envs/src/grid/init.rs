//! Initialization strategies run at the start of every episode.

use super::{PufferMask, World, AGENT_1, AGENT_2, EMPTY, FOOD};
use rand::Rng;
use std::sync::Arc;

/// Populates the grid and agent colors before the engine places agents
#[derive(Clone, Debug)]
pub enum InitStrategy {
    /// Leave the cleared grid untouched
    Empty,
    /// Each EMPTY cell independently becomes FOOD with `food_prob`
    Foraging { food_prob: f32 },
    /// First half of the agents are `AGENT_1`, the rest `AGENT_2`
    PredatorPrey,
    /// Refresh the team table used by the puffer reward
    Puffer(Arc<PufferMask>),
}

impl InitStrategy {
    pub fn apply<R: Rng>(&self, world: &mut World, rng: &mut R) {
        match self {
            InitStrategy::Empty => {}
            InitStrategy::Foraging { food_prob } => {
                let p = f64::from(*food_prob).clamp(0.0, 1.0);
                for cell in world.grid.iter_mut() {
                    if *cell == EMPTY && rng.gen_bool(p) {
                        *cell = FOOD;
                    }
                }
            }
            InitStrategy::PredatorPrey => {
                let n = world.num_agents() / 2;
                for (i, color) in world.colors.iter_mut().enumerate() {
                    *color = if i < n { AGENT_1 } else { AGENT_2 };
                }
                world.assign_teams();
            }
            InitStrategy::Puffer(mask) => {
                let (rows, cols) = mask.red.dim();
                if rows < world.height() || cols < world.width() {
                    tracing::warn!(
                        bitmap = ?(rows, cols),
                        map = ?(world.height(), world.width()),
                        "Puffer bitmap smaller than map; uncovered cells never pay out"
                    );
                }
                world.assign_teams();
            }
        }
    }
}
