//! Interactive render client for the grid world.

use super::{RenderConfig, World, COLORS, EMPTY};
use ocean::render::{Canvas, Frame, GraphicsBackend, Key};

/// Override action for agent 0 from the keys currently held.
///
/// Returns `(row, col)`: discrete 0/1/2 with 1 as no-op, or continuous
/// -1/0/+1. `None` when no movement key is held.
pub fn human_action<B>(backend: &B, discretize: bool) -> Option<[f32; 2]>
where
    B: GraphicsBackend + ?Sized,
{
    let held = |a: Key, b: Key| backend.is_key_down(a) || backend.is_key_down(b);
    let (low, idle, high) = if discretize {
        (0.0, 1.0, 2.0)
    } else {
        (-1.0, 0.0, 1.0)
    };

    let mut row = None;
    if held(Key::Up, Key::W) {
        row = Some(low);
    }
    if held(Key::Down, Key::S) {
        row = Some(high);
    }
    let mut col = None;
    if held(Key::Left, Key::A) {
        col = Some(low);
    }
    if held(Key::Right, Key::D) {
        col = Some(high);
    }

    if row.is_none() && col.is_none() {
        return None;
    }
    Some([row.unwrap_or(idle), col.unwrap_or(idle)])
}

/// Draws a viewport of tiles centred on agent 0
pub struct RenderClient<B: GraphicsBackend> {
    backend: B,
    viewport_width: u32,
    viewport_height: u32,
    tile_size: u32,
}

impl RenderClient<Canvas> {
    /// Client backed by a software framebuffer sized to the viewport
    pub fn headless(config: &RenderConfig) -> Self {
        let canvas = Canvas::new(
            config.viewport_width * config.tile_size,
            config.viewport_height * config.tile_size,
        );
        Self::new(canvas, config)
    }
}

impl<B: GraphicsBackend> RenderClient<B> {
    pub fn new(backend: B, config: &RenderConfig) -> Self {
        tracing::debug!(
            viewport = ?(config.viewport_width, config.viewport_height),
            tile_size = config.tile_size,
            "Created render client"
        );
        Self {
            backend,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            tile_size: config.tile_size,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Draw one frame and poll for an override action
    pub fn render(&mut self, world: &World, discretize: bool) -> (Frame, Option<[f32; 2]>) {
        let action = human_action(&self.backend, discretize);

        self.backend.begin_frame(COLORS[EMPTY as usize]);

        let ts = self.tile_size;
        let (main_r, main_c) = if world.num_agents() > 0 {
            (
                world.positions[[0, 0]] as i64,
                world.positions[[0, 1]] as i64,
            )
        } else {
            (0, 0)
        };
        let r_min = main_r - i64::from(self.viewport_height / 2);
        let r_max = main_r + i64::from(self.viewport_height / 2);
        let c_min = main_c - i64::from(self.viewport_width / 2);
        let c_max = main_c + i64::from(self.viewport_width / 2);
        let (height, width) = (world.height() as i64, world.width() as i64);

        for (i, r) in (r_min..=r_max).enumerate() {
            for (j, c) in (c_min..=c_max).enumerate() {
                if r < 0 || r >= height || c < 0 || c >= width {
                    continue;
                }
                let tile = world.grid[[r as usize, c as usize]];
                if tile == EMPTY {
                    continue;
                }
                let color = COLORS[(tile as usize).min(COLORS.len() - 1)];
                let x = (j as u32 * ts) as i32;
                let y = (i as u32 * ts) as i32;
                self.backend.draw_rect(x, y, ts, ts, color);
            }
        }

        self.backend.end_frame();
        (self.backend.capture(), action)
    }
}
