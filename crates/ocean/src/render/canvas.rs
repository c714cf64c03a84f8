//! Headless software framebuffer.

use super::{Frame, GraphicsBackend, Key, Rgba};
use ndarray::{s, Array3};
use std::collections::HashSet;

/// In-memory RGBA surface with injectable key state.
#[derive(Clone, Debug)]
pub struct Canvas {
    pixels: Array3<u8>,
    keys: HashSet<Key>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: Array3::zeros((height as usize, width as usize, 4)),
            keys: HashSet::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.dim().1 as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.dim().0 as u32
    }

    /// Hold `key` down until released
    pub fn press(&mut self, key: Key) {
        self.keys.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.keys.remove(&key);
    }

    pub fn release_all(&mut self) {
        self.keys.clear();
    }

    /// RGBA value at pixel `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let p = self.pixels.slice(s![y as usize, x as usize, ..]);
        [p[0], p[1], p[2], p[3]]
    }
}

impl GraphicsBackend for Canvas {
    fn begin_frame(&mut self, background: Rgba) {
        for mut px in self.pixels.rows_mut() {
            px.assign(&ndarray::aview1(&background));
        }
    }

    fn draw_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba) {
        let (rows, cols, _) = self.pixels.dim();
        let x0 = x.clamp(0, cols as i32) as usize;
        let y0 = y.clamp(0, rows as i32) as usize;
        let x1 = (x + width as i32).clamp(0, cols as i32) as usize;
        let y1 = (y + height as i32).clamp(0, rows as i32) as usize;
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let mut region = self.pixels.slice_mut(s![y0..y1, x0..x1, ..]);
        for mut px in region.rows_mut() {
            px.assign(&ndarray::aview1(&color));
        }
    }

    fn is_key_down(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    fn capture(&self) -> Frame {
        self.pixels.slice(s![.., .., ..3]).to_owned()
    }
}
