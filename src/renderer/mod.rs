//! Drawing boundary
//!
//! The simulation hands positions and visual state to a `Drawable`; turning
//! them into pixels is the surface's business.

pub mod text;

pub use text::TextSurface;

use serde::{Deserialize, Serialize};

use crate::sim::{ObstacleKind, Pose};

/// What a sprite should look like
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Visual {
    /// `frame` is the sprite-sheet offset multiplier of the current animation frame
    Obstacle { kind: ObstacleKind, frame: u32 },
    Actor { pose: Pose },
}

/// One draw call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub visual: Visual,
}

/// A surface the simulation can draw onto
pub trait Drawable {
    /// Called once before the frame's sprites
    fn begin_frame(&mut self) {}

    fn render_at(&mut self, sprite: &Sprite);

    /// Called once after the frame's sprites
    fn end_frame(&mut self) {}
}

/// Discards every draw call
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl Drawable for NullSurface {
    fn render_at(&mut self, _sprite: &Sprite) {}
}

/// Records every sprite of the most recent frame
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    current: Vec<Sprite>,
    pub last_frame: Vec<Sprite>,
    pub frames: u64,
}

impl Drawable for RecordingSurface {
    fn begin_frame(&mut self) {
        self.current.clear();
    }

    fn render_at(&mut self, sprite: &Sprite) {
        self.current.push(*sprite);
    }

    fn end_frame(&mut self) {
        self.last_frame = std::mem::take(&mut self.current);
        self.frames += 1;
    }
}
