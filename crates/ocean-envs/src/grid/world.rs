//! World state shared by the host, engine and strategies.

use super::{AGENT_1, AGENT_2, AGENT_3, AGENT_4, EMPTY, WALL};
use ndarray::{Array2, ArrayView2, ArrayViewMut1};
use rand::Rng;

/// Red/blue grouping of agent colors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Team {
    Red,
    Blue,
    /// Color outside `AGENT_1..=AGENT_4`
    None,
}

impl Team {
    pub fn of(color: u8) -> Self {
        match color {
            AGENT_1 | AGENT_3 => Team::Red,
            AGENT_2 | AGENT_4 => Team::Blue,
            _ => Team::None,
        }
    }
}

/// Grid plus per-agent tables. Dimensions and agent count never change.
#[derive(Clone, Debug)]
pub struct World {
    /// Cell codes, shape `(height, width)`
    pub grid: Array2<u8>,
    /// `(row, col)` per agent, shape `(num_agents, 2)`
    pub positions: Array2<f32>,
    /// Cell code each agent paints into the grid
    pub colors: Vec<u8>,
    /// Team per agent, refreshed by init strategies that need it
    pub teams: Vec<Team>,
    /// Integer cells agents may spawn on
    pub spawn_candidates: Vec<(usize, usize)>,
    pub vision_range: usize,
}

impl World {
    /// Empty world with random colors and a spawn pool of `10 * num_agents`
    /// cells inside the band that keeps full windows on the map.
    pub fn new<R: Rng>(
        width: usize,
        height: usize,
        num_agents: usize,
        vision_range: usize,
        rng: &mut R,
    ) -> Self {
        let band = |dim: usize| {
            if dim > 2 * vision_range {
                vision_range..dim - vision_range
            } else {
                0..dim
            }
        };
        let (rows, cols) = (band(height), band(width));
        let spawn_candidates = (0..10 * num_agents)
            .map(|_| (rng.gen_range(rows.clone()), rng.gen_range(cols.clone())))
            .collect();

        let colors: Vec<u8> = (0..num_agents).map(|_| rng.gen_range(AGENT_1..=AGENT_4)).collect();
        let teams = colors.iter().map(|&c| Team::of(c)).collect();

        Self {
            grid: Array2::from_elem((height, width), EMPTY),
            positions: Array2::zeros((num_agents, 2)),
            colors,
            teams,
            spawn_candidates,
            vision_range,
        }
    }

    pub fn width(&self) -> usize {
        self.grid.ncols()
    }

    pub fn height(&self) -> usize {
        self.grid.nrows()
    }

    pub fn num_agents(&self) -> usize {
        self.colors.len()
    }

    pub fn obs_size(&self) -> usize {
        2 * self.vision_range + 1
    }

    /// Reset every cell to EMPTY
    pub fn clear(&mut self) {
        self.grid.fill(EMPTY);
    }

    /// Recompute the team table from the color table
    pub fn assign_teams(&mut self) {
        self.teams = self.colors.iter().map(|&c| Team::of(c)).collect();
    }

    /// Integer cell containing agent `i`
    pub fn cell_of(&self, agent: usize) -> (usize, usize) {
        (
            (self.positions[[agent, 0]] as usize).min(self.height() - 1),
            (self.positions[[agent, 1]] as usize).min(self.width() - 1),
        )
    }

    /// Cell code at `(row, col)`; anything off the map reads as WALL
    pub fn cell(&self, row: isize, col: isize) -> u8 {
        if row < 0 || col < 0 || row as usize >= self.height() || col as usize >= self.width() {
            WALL
        } else {
            self.grid[[row as usize, col as usize]]
        }
    }

    /// Copy the window centred on `(row, col)` into `out`, row-major
    pub fn write_window(&self, row: usize, col: usize, mut out: ArrayViewMut1<'_, u8>) {
        let size = self.obs_size();
        let v = self.vision_range as isize;
        for dr in 0..size {
            for dc in 0..size {
                let r = row as isize - v + dr as isize;
                let c = col as isize - v + dc as isize;
                out[dr * size + dc] = self.cell(r, c);
            }
        }
    }
}

/// Read-only snapshot handed to reward strategies
#[derive(Clone, Copy, Debug)]
pub struct WorldView<'a> {
    /// Observation windows, shape `(num_agents, obs_size * obs_size)`
    pub windows: ArrayView2<'a, u8>,
    pub positions: ArrayView2<'a, f32>,
    pub colors: &'a [u8],
    pub teams: &'a [Team],
    pub width: usize,
    pub height: usize,
}

impl<'a> WorldView<'a> {
    pub fn new(world: &'a World, windows: ArrayView2<'a, u8>) -> Self {
        Self {
            windows,
            positions: world.positions.view(),
            colors: &world.colors,
            teams: &world.teams,
            width: world.width(),
            height: world.height(),
        }
    }

    pub fn num_agents(&self) -> usize {
        self.colors.len()
    }

    /// Number of cells in agent `i`'s window satisfying `pred`
    pub fn count_in_window(&self, agent: usize, pred: impl Fn(u8) -> bool) -> usize {
        self.windows.row(agent).iter().filter(|&&c| pred(c)).count()
    }

    /// Euclidean distance of agent `i` from the map centre, in map units
    pub fn center_distance(&self, agent: usize) -> f32 {
        let r = self.positions[[agent, 0]] / self.height as f32 - 0.5;
        let c = self.positions[[agent, 1]] / self.width as f32 - 0.5;
        (r * r + c * c).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_world_tables() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let world = World::new(20, 12, 5, 3, &mut rng);
        assert_eq!(world.grid.dim(), (12, 20));
        assert_eq!(world.positions.dim(), (5, 2));
        assert_eq!(world.colors.len(), 5);
        assert_eq!(world.teams.len(), 5);
        assert_eq!(world.spawn_candidates.len(), 50);
        assert!(world.colors.iter().all(|c| (AGENT_1..=AGENT_4).contains(c)));
        assert!(world
            .spawn_candidates
            .iter()
            .all(|&(r, c)| (3..9).contains(&r) && (3..17).contains(&c)));
    }

    #[test]
    fn test_spawn_band_falls_back_to_whole_map() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let world = World::new(10, 10, 2, 5, &mut rng);
        assert!(world.spawn_candidates.iter().all(|&(r, c)| r < 10 && c < 10));
    }

    #[test]
    fn test_window_reads_walls_off_map() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut world = World::new(4, 4, 1, 1, &mut rng);
        world.grid[[0, 0]] = AGENT_1;
        world.grid[[1, 1]] = super::super::FOOD;

        let mut window = Array1::zeros(9);
        world.write_window(0, 0, window.view_mut());
        assert_eq!(
            window.to_vec(),
            vec![WALL, WALL, WALL, WALL, AGENT_1, EMPTY, WALL, EMPTY, super::super::FOOD]
        );
    }

    #[test]
    fn test_teams() {
        assert_eq!(Team::of(AGENT_1), Team::Red);
        assert_eq!(Team::of(AGENT_3), Team::Red);
        assert_eq!(Team::of(AGENT_2), Team::Blue);
        assert_eq!(Team::of(AGENT_4), Team::Blue);
        assert_eq!(Team::of(WALL), Team::None);
    }
}
