//! Environments built on the `ocean` core.
//!
//! - `PufferGrid` - continuous multi-agent grid world with pluggable
//!   init and reward strategies
//! - `Connect4` - batched Connect-4 against a scripted opponent

pub mod connect4;
pub mod grid;

pub use connect4::{Connect4, Connect4Config};
pub use grid::{GridConfig, InitKind, PufferGrid, RenderMode, RewardKind};
