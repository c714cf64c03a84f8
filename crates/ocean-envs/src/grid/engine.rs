//! Stepping engine for the grid world.
//!
//! The host owns every buffer. An engine only ever sees them through an
//! `EngineView` built for the duration of one `reset` or `step` call.

use super::{World, EMPTY, FOOD};
use ndarray::{ArrayViewMut1, ArrayViewMut2, Zip};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Mutable borrows of the host's buffers for one engine call
pub struct EngineView<'a> {
    pub world: &'a mut World,
    /// Window part of the observation buffer, `(num_agents, obs_size^2)`
    pub windows: ArrayViewMut2<'a, u8>,
    /// Reward buffer; engines add into it
    pub rewards: ArrayViewMut1<'a, f32>,
}

/// Actions after casting to the configured representation
#[derive(Clone, Debug, PartialEq)]
pub enum AgentActions {
    /// `(row, col)` choices in `{0, 1, 2}`; 1 is no-op
    Discrete(Vec<[u8; 2]>),
    /// `(row, col)` velocities in `[-1, 1]`
    Continuous(Vec<[f32; 2]>),
}

impl AgentActions {
    pub fn len(&self) -> usize {
        match self {
            AgentActions::Discrete(a) => a.len(),
            AgentActions::Continuous(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unit-speed displacement requested by agent `i`
    pub fn delta(&self, agent: usize) -> [f32; 2] {
        match self {
            AgentActions::Discrete(a) => [a[agent][0] as f32 - 1.0, a[agent][1] as f32 - 1.0],
            AgentActions::Continuous(a) => a[agent],
        }
    }

    /// Replace agent `i`'s action with a `(row, col)` override
    pub fn set(&mut self, agent: usize, action: [f32; 2]) {
        match self {
            AgentActions::Discrete(a) => {
                a[agent] = [action[0].clamp(0.0, 2.0) as u8, action[1].clamp(0.0, 2.0) as u8]
            }
            AgentActions::Continuous(a) => {
                a[agent] = [action[0].clamp(-1.0, 1.0), action[1].clamp(-1.0, 1.0)]
            }
        }
    }
}

/// A simulation that advances the world held by a host.
pub trait Engine: Send {
    /// Place agents and reset engine timers. `None` keeps the random stream.
    fn reset(&mut self, view: &mut EngineView<'_>, seed: Option<u64>);

    /// Advance one tick, mutating the world, windows and rewards in place
    fn step(&mut self, view: &mut EngineView<'_>, actions: &AgentActions);

    /// Per-agent "episode still active" flags
    fn active(&self) -> &[bool];
}

/// Engine parameters taken from the grid config
#[derive(Clone, Debug)]
pub struct GridEngine {
    horizon: usize,
    agent_speed: f32,
    food_reward: f32,
    expected_lifespan: f32,
    tick: usize,
    active: Vec<bool>,
    rng: ChaCha8Rng,
}

// Random attempts before falling back to a scan
const PLACEMENT_TRIES: usize = 16;
// Keeps clamped positions strictly inside the last row/column
const EDGE_MARGIN: f32 = 1e-3;

impl GridEngine {
    pub fn new(
        num_agents: usize,
        horizon: usize,
        agent_speed: f32,
        food_reward: f32,
        expected_lifespan: f32,
    ) -> Self {
        Self {
            horizon,
            agent_speed,
            food_reward,
            expected_lifespan,
            tick: 0,
            active: vec![false; num_agents],
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    /// Put agent `i` on a free spawn candidate, or the first free cell.
    /// Food counts as free and is overwritten.
    fn spawn(&mut self, world: &mut World, agent: usize) {
        let free = |code: u8| code == EMPTY || code == FOOD;
        let candidates = world.spawn_candidates.len();
        let mut cell = None;
        for _ in 0..PLACEMENT_TRIES {
            let (r, c) = world.spawn_candidates[self.rng.gen_range(0..candidates)];
            if free(world.grid[[r, c]]) {
                cell = Some((r, c));
                break;
            }
        }
        let cell = cell.or_else(|| {
            world
                .grid
                .indexed_iter()
                .find(|(_, &code)| free(code))
                .map(|(idx, _)| idx)
        });

        // Only agents and walls left: the agent keeps its slot without a cell
        let Some((r, c)) = cell else {
            tracing::warn!(agent, "No empty cell to spawn on");
            return;
        };
        world.grid[[r, c]] = world.colors[agent];
        world.positions[[agent, 0]] = r as f32;
        world.positions[[agent, 1]] = c as f32;
    }

    /// Remove agent `i` from the grid if it still owns its cell
    fn vacate(world: &mut World, agent: usize) {
        let (r, c) = world.cell_of(agent);
        if world.grid[[r, c]] == world.colors[agent] {
            world.grid[[r, c]] = EMPTY;
        }
    }

    /// Drop one food pellet on a random EMPTY cell
    fn regrow_food(&mut self, world: &mut World) {
        for _ in 0..PLACEMENT_TRIES {
            let r = self.rng.gen_range(0..world.height());
            let c = self.rng.gen_range(0..world.width());
            if world.grid[[r, c]] == EMPTY {
                world.grid[[r, c]] = FOOD;
                return;
            }
        }
    }

    fn move_agent(&mut self, world: &mut World, agent: usize, delta: [f32; 2]) -> f32 {
        let max_r = world.height() as f32 - EDGE_MARGIN;
        let max_c = world.width() as f32 - EDGE_MARGIN;
        let r = (world.positions[[agent, 0]] + self.agent_speed * delta[0]).clamp(0.0, max_r);
        let c = (world.positions[[agent, 1]] + self.agent_speed * delta[1]).clamp(0.0, max_c);

        let from = world.cell_of(agent);
        let to = (r as usize, c as usize);
        if to == from {
            world.positions[[agent, 0]] = r;
            world.positions[[agent, 1]] = c;
            return 0.0;
        }

        let reward = match world.grid[to] {
            EMPTY => 0.0,
            FOOD => self.food_reward,
            _ => return 0.0, // blocked
        };

        Self::vacate(world, agent);
        world.grid[to] = world.colors[agent];
        world.positions[[agent, 0]] = r;
        world.positions[[agent, 1]] = c;
        if reward != 0.0 {
            self.regrow_food(world);
        }
        reward
    }

    fn render_windows(view: &mut EngineView<'_>) {
        let world = &*view.world;
        Zip::from(view.windows.rows_mut())
            .and(world.positions.rows())
            .par_for_each(|window, pos| {
                world.write_window(pos[0] as usize, pos[1] as usize, window);
            });
    }
}

impl Engine for GridEngine {
    fn reset(&mut self, view: &mut EngineView<'_>, seed: Option<u64>) {
        if let Some(s) = seed {
            self.rng = ChaCha8Rng::seed_from_u64(s);
        }
        self.tick = 0;
        self.active.fill(true);

        for agent in 0..view.world.num_agents() {
            self.spawn(view.world, agent);
        }
        Self::render_windows(view);
    }

    fn step(&mut self, view: &mut EngineView<'_>, actions: &AgentActions) {
        self.tick += 1;
        let respawn_prob = 1.0 / self.expected_lifespan;

        for agent in 0..view.world.num_agents() {
            if !self.active[agent] {
                continue;
            }
            if self.rng.gen::<f32>() < respawn_prob {
                Self::vacate(view.world, agent);
                self.spawn(view.world, agent);
                continue;
            }
            view.rewards[agent] += self.move_agent(view.world, agent, actions.delta(agent));
        }

        if self.tick >= self.horizon {
            self.active.fill(false);
        }
        Self::render_windows(view);
    }

    fn active(&self) -> &[bool] {
        &self.active
    }
}

#[cfg(test)]
mod tests {
    use super::super::{AGENT_1, AGENT_2, WALL};
    use super::*;
    use ndarray::{Array1, Array2};

    fn world(width: usize, height: usize, agents: usize, vision: usize) -> World {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        World::new(width, height, agents, vision, &mut rng)
    }

    struct Buffers {
        windows: Array2<u8>,
        rewards: Array1<f32>,
    }

    impl Buffers {
        fn new(world: &World) -> Self {
            let size = world.obs_size();
            Self {
                windows: Array2::zeros((world.num_agents(), size * size)),
                rewards: Array1::zeros(world.num_agents()),
            }
        }

        fn view<'a>(&'a mut self, world: &'a mut World) -> EngineView<'a> {
            EngineView {
                world,
                windows: self.windows.view_mut(),
                rewards: self.rewards.view_mut(),
            }
        }
    }

    fn immortal(agents: usize, horizon: usize) -> GridEngine {
        GridEngine::new(agents, horizon, 1.0, 0.5, f32::INFINITY)
    }

    #[test]
    fn test_reset_places_every_agent() {
        let mut w = world(16, 16, 6, 2);
        let mut bufs = Buffers::new(&w);
        let mut engine = immortal(6, 10);
        engine.reset(&mut bufs.view(&mut w), Some(0));

        let occupied = w.grid.iter().filter(|&&c| c >= AGENT_1).count();
        assert_eq!(occupied, 6);
        for agent in 0..6 {
            let (r, c) = w.cell_of(agent);
            assert_eq!(w.grid[[r, c]], w.colors[agent]);
            // Own cell sits at the centre of the window
            assert_eq!(bufs.windows[[agent, 12]], w.colors[agent]);
        }
        assert!(engine.active().iter().all(|&a| a));
    }

    #[test]
    fn test_reset_is_deterministic_for_seed() {
        let mut a = world(16, 16, 4, 2);
        let mut b = a.clone();
        let mut bufs_a = Buffers::new(&a);
        let mut bufs_b = Buffers::new(&b);
        immortal(4, 10).reset(&mut bufs_a.view(&mut a), Some(5));
        immortal(4, 10).reset(&mut bufs_b.view(&mut b), Some(5));
        assert_eq!(a.positions, b.positions);
        assert_eq!(a.grid, b.grid);
    }

    #[test]
    fn test_discrete_move_and_food() {
        let mut w = world(8, 8, 1, 1);
        let mut bufs = Buffers::new(&w);
        let mut engine = immortal(1, 10);
        engine.reset(&mut bufs.view(&mut w), Some(0));

        // Move the agent to a known spot
        GridEngine::vacate(&mut w, 0);
        w.positions[[0, 0]] = 3.0;
        w.positions[[0, 1]] = 3.0;
        w.grid[[3, 3]] = w.colors[0];
        w.grid[[4, 3]] = FOOD;

        let down = AgentActions::Discrete(vec![[2, 1]]);
        engine.step(&mut bufs.view(&mut w), &down);
        assert_eq!(w.cell_of(0), (4, 3));
        assert_eq!(w.grid[[3, 3]], EMPTY);
        assert_eq!(w.grid[[4, 3]], w.colors[0]);
        assert_eq!(bufs.rewards[0], 0.5);
        // Eaten food regrows elsewhere
        assert_eq!(w.grid.iter().filter(|&&c| c == FOOD).count(), 1);
    }

    #[test]
    fn test_blocked_by_wall_and_agents() {
        let mut w = world(8, 8, 2, 1);
        let mut bufs = Buffers::new(&w);
        let mut engine = immortal(2, 10);
        engine.reset(&mut bufs.view(&mut w), Some(0));

        w.clear();
        w.colors = vec![AGENT_1, AGENT_2];
        w.positions.row_mut(0).assign(&ndarray::arr1(&[2.0, 2.0]));
        w.positions.row_mut(1).assign(&ndarray::arr1(&[2.0, 3.0]));
        w.grid[[2, 2]] = AGENT_1;
        w.grid[[2, 3]] = AGENT_2;
        w.grid[[1, 2]] = WALL;

        // Agent 0 tries right into agent 1, then up into the wall
        let actions = AgentActions::Discrete(vec![[1, 2], [1, 1]]);
        engine.step(&mut bufs.view(&mut w), &actions);
        assert_eq!(w.cell_of(0), (2, 2));

        let actions = AgentActions::Discrete(vec![[0, 1], [1, 1]]);
        engine.step(&mut bufs.view(&mut w), &actions);
        assert_eq!(w.cell_of(0), (2, 2));
        assert_eq!(w.grid[[1, 2]], WALL);
    }

    #[test]
    fn test_continuous_move_within_cell() {
        let mut w = world(8, 8, 1, 1);
        let mut bufs = Buffers::new(&w);
        let mut engine = GridEngine::new(1, 10, 0.25, 0.0, f32::INFINITY);
        engine.reset(&mut bufs.view(&mut w), Some(0));

        GridEngine::vacate(&mut w, 0);
        w.positions.row_mut(0).assign(&ndarray::arr1(&[4.0, 4.0]));
        w.grid[[4, 4]] = w.colors[0];

        let actions = AgentActions::Continuous(vec![[0.5, 1.0]]);
        engine.step(&mut bufs.view(&mut w), &actions);
        assert_eq!(w.positions[[0, 0]], 4.125);
        assert_eq!(w.positions[[0, 1]], 4.25);
        assert_eq!(w.grid[[4, 4]], w.colors[0]);
    }

    #[test]
    fn test_positions_clamped_to_map() {
        let mut w = world(4, 4, 1, 1);
        let mut bufs = Buffers::new(&w);
        let mut engine = GridEngine::new(1, 10, 10.0, 0.0, f32::INFINITY);
        engine.reset(&mut bufs.view(&mut w), Some(0));

        let actions = AgentActions::Continuous(vec![[1.0, -1.0]]);
        engine.step(&mut bufs.view(&mut w), &actions);
        assert!(w.positions[[0, 0]] < 4.0);
        assert_eq!(w.positions[[0, 1]], 0.0);
        assert_eq!(w.cell_of(0), (3, 0));
    }

    #[test]
    fn test_horizon_deactivates() {
        let mut w = world(8, 8, 2, 1);
        let mut bufs = Buffers::new(&w);
        let mut engine = immortal(2, 2);
        engine.reset(&mut bufs.view(&mut w), Some(0));

        let noop = AgentActions::Discrete(vec![[1, 1]; 2]);
        engine.step(&mut bufs.view(&mut w), &noop);
        assert!(engine.active().iter().all(|&a| a));
        engine.step(&mut bufs.view(&mut w), &noop);
        assert!(engine.active().iter().all(|&a| !a));
        assert_eq!(engine.tick(), 2);
    }

    #[test]
    fn test_respawn_keeps_agent_count() {
        let mut w = world(12, 12, 5, 1);
        let mut bufs = Buffers::new(&w);
        // Lifespan of 1: every agent respawns every tick
        let mut engine = GridEngine::new(5, 100, 1.0, 0.0, 1.0);
        engine.reset(&mut bufs.view(&mut w), Some(3));

        let noop = AgentActions::Continuous(vec![[0.0, 0.0]; 5]);
        for _ in 0..10 {
            engine.step(&mut bufs.view(&mut w), &noop);
            let occupied = w.grid.iter().filter(|&&c| c >= AGENT_1).count();
            assert_eq!(occupied, 5);
        }
    }

    #[test]
    fn test_spawn_overwrites_food_on_a_full_map() {
        let mut w = world(10, 10, 4, 1);
        let mut bufs = Buffers::new(&w);
        let mut engine = immortal(4, 10);
        for seed in 0..20 {
            w.clear();
            w.grid.fill(FOOD);
            engine.reset(&mut bufs.view(&mut w), Some(seed));

            let occupied = w.grid.iter().filter(|&&c| c >= AGENT_1).count();
            assert_eq!(occupied, 4, "seed {seed}");
            assert_eq!(w.grid.iter().filter(|&&c| c == FOOD).count(), 96);
            for agent in 0..4 {
                let (r, c) = w.cell_of(agent);
                assert_eq!(w.grid[[r, c]], w.colors[agent]);
            }
        }
    }

    #[test]
    fn test_action_override() {
        let mut discrete = AgentActions::Discrete(vec![[1, 1]; 2]);
        discrete.set(0, [2.0, 0.0]);
        assert_eq!(discrete.delta(0), [1.0, -1.0]);
        assert_eq!(discrete.delta(1), [0.0, 0.0]);

        let mut continuous = AgentActions::Continuous(vec![[0.0, 0.0]]);
        continuous.set(0, [-3.0, 1.0]);
        assert_eq!(continuous.delta(0), [-1.0, 1.0]);
    }
}
