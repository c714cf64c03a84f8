//! Continuous multi-agent grid world.
//!
//! Agents move with continuous positions over a dense grid of cell codes and
//! see a square window of cells around themselves. The host (`PufferGrid`)
//! owns every buffer; the stepping `Engine` mutates them through views, and a
//! `RewardStrategy` / `InitStrategy` pair selected at construction shapes the
//! task.

mod config;
mod engine;
mod env;
mod init;
mod render;
mod reward;
mod world;

pub use config::{GridConfig, InitKind, RenderConfig, RenderMode, RewardKind};
pub use engine::{AgentActions, Engine, EngineView, GridEngine};
pub use env::PufferGrid;
pub use init::InitStrategy;
pub use render::{human_action, RenderClient};
pub use reward::{PufferMask, RewardStrategy};
pub use world::{Team, World, WorldView};

use ocean::render::Rgba;

pub const EMPTY: u8 = 0;
pub const FOOD: u8 = 1;
pub const WALL: u8 = 2;
pub const AGENT_1: u8 = 3;
pub const AGENT_2: u8 = 4;
pub const AGENT_3: u8 = 5;
pub const AGENT_4: u8 = 6;

/// Tile colors indexed by cell code
pub const COLORS: [Rgba; 8] = [
    [6, 24, 24, 255],     // EMPTY
    [0, 0, 255, 255],     // FOOD
    [0, 128, 255, 255],   // WALL
    [128, 128, 128, 255], // AGENT_1
    [255, 0, 0, 255],     // AGENT_2
    [255, 255, 255, 255], // AGENT_3
    [255, 85, 85, 255],   // AGENT_4
    [170, 170, 170, 255], // unused
];
