//! Lane obstacles
//!
//! Obstacles are a closed set of kinds; behavior that differs by kind
//! (immovable goals, diving turtles) branches on the tag.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::animation::Animation;
use super::collision::Extent;
use crate::renderer::{Drawable, Sprite, Visual};

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Road traffic; `variant` picks the sprite (car, truck, ...)
    Vehicle { variant: u8 },
    Log,
    Turtle,
    /// A goal slot; never moves
    Goal { claimed: bool },
    /// Marker drawn over a claimed goal slot
    ClaimedGoal,
}

impl ObstacleKind {
    /// Goals are fixed in place once created
    #[inline]
    pub fn is_immovable(&self) -> bool {
        matches!(self, ObstacleKind::Goal { .. } | ObstacleKind::ClaimedGoal)
    }
}

/// A positioned horizontal extent on a lane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Top-left corner in pixels
    pub pos: Vec2,
    /// Lane-assigned start position
    start: Vec2,
    width: f32,
    height: f32,
    pub animation: Option<Animation>,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, left: f32, top: f32, width: f32, height: f32) -> Self {
        let start = Vec2::new(left, top);
        Self {
            kind,
            pos: start,
            start,
            width,
            height,
            animation: None,
        }
    }

    /// Attach an animation and start its clock
    pub fn with_animation(mut self, mut animation: Animation) -> Self {
        animation.play();
        self.animation = Some(animation);
        self
    }

    /// Horizontal footprint used for overlap tests
    #[inline]
    pub fn position(&self) -> Extent {
        Extent::new(self.pos.x, self.width)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Reposition; goals ignore this
    pub fn move_to(&mut self, left: f32, top: Option<f32>) {
        if self.kind.is_immovable() {
            return;
        }
        self.pos.x = left;
        if let Some(top) = top {
            self.pos.y = top;
        }
    }

    /// Restore start position and rewind animation
    pub fn reset(&mut self) {
        self.pos = self.start;
        if let Some(animation) = &mut self.animation {
            animation.reset();
        }
    }

    /// Drive the animation clock
    pub fn animate(&mut self, dt_ms: f32) {
        if let Some(animation) = &mut self.animation {
            animation.advance(dt_ms);
        }
    }

    /// Turtles are submerged while their animation shows its deepest frame
    pub fn is_submerged(&self) -> bool {
        match (self.kind, &self.animation) {
            (ObstacleKind::Turtle, Some(animation)) => animation.at_peak(),
            _ => false,
        }
    }

    pub fn is_claimed(&self) -> bool {
        matches!(
            self.kind,
            ObstacleKind::Goal { claimed: true } | ObstacleKind::ClaimedGoal
        )
    }

    /// Hand position and visual state to the drawable service
    pub fn render(&self, surface: &mut dyn Drawable) {
        surface.render_at(&Sprite {
            left: self.pos.x,
            top: self.pos.y,
            width: self.width,
            height: self.height,
            visual: Visual::Obstacle {
                kind: self.kind,
                frame: self
                    .animation
                    .as_ref()
                    .map_or(0, Animation::sequence_value),
            },
        });
    }
}
