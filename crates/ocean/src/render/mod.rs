//! Rendering capability.
//!
//! Environments draw through a `GraphicsBackend` so headless runs never pay
//! for windowing. `Canvas` is a software framebuffer that satisfies the trait
//! without opening a window; its keyboard state is driven programmatically.

mod canvas;

pub use canvas::Canvas;

use ndarray::Array3;

/// RGB frame, shape `(height, width, 3)`
pub type Frame = Array3<u8>;

/// RGBA color
pub type Rgba = [u8; 4];

/// Keys an interactive client polls
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
}

/// Drawing and input surface used by render clients.
pub trait GraphicsBackend: Send {
    /// Start a frame, filling it with `background`
    fn begin_frame(&mut self, background: Rgba);

    /// Fill an axis-aligned rectangle; parts outside the surface are clipped
    fn draw_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba);

    /// Finish the current frame
    fn end_frame(&mut self) {}

    /// Whether `key` is currently held
    fn is_key_down(&self, key: Key) -> bool;

    /// Read the last finished frame back as RGB
    fn capture(&self) -> Frame;
}
