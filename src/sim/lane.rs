//! Obstacle lanes: conveyor movement and safety policies

use serde::{Deserialize, Serialize};

use super::collision::{Extent, Verdict};
use super::obstacle::{Obstacle, ObstacleKind};
use crate::renderer::Drawable;
use crate::wrap_left;

/// Horizontal travel direction of a lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heading {
    Left,
    Right,
}

impl Heading {
    #[inline]
    pub fn sign(&self) -> f32 {
        match self {
            Heading::Left => -1.0,
            Heading::Right => 1.0,
        }
    }
}

/// How overlap with a lane's obstacles maps to a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafetyPolicy {
    /// Road: touching any obstacle is fatal
    Hazard,
    /// Logs: safe only while standing on one
    Float,
    /// Turtles: like `Float`, but a submerged turtle is fatal
    SubmergibleFloat,
    /// Goal slots: first touch claims, anything else is fatal
    Goal,
}

impl SafetyPolicy {
    /// Floating lanes carry the actor along
    #[inline]
    pub fn carries(&self) -> bool {
        matches!(self, SafetyPolicy::Float | SafetyPolicy::SubmergibleFloat)
    }
}

/// One row of obstacles sharing heading, speed and policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lane {
    /// Pixel top shared by every obstacle
    top: f32,
    heading: Heading,
    /// Pixels per logic tick
    speed: f32,
    policy: SafetyPolicy,
    field_width: f32,
    /// Insertion order is draw and query order
    obstacles: Vec<Obstacle>,
}

impl Lane {
    pub fn new(
        top: f32,
        heading: Heading,
        speed: f32,
        policy: SafetyPolicy,
        field_width: f32,
    ) -> Self {
        Self {
            top,
            heading,
            speed: if policy == SafetyPolicy::Goal { 0.0 } else { speed },
            policy,
            field_width,
            obstacles: Vec::new(),
        }
    }

    /// Add an obstacle, snapping it onto the lane's row
    pub fn push(&mut self, mut obstacle: Obstacle) {
        obstacle.pos.y = self.top;
        self.obstacles.push(obstacle);
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.top
    }

    #[inline]
    pub fn policy(&self) -> SafetyPolicy {
        self.policy
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Signed pixels moved per logic tick
    #[inline]
    pub fn displacement(&self) -> f32 {
        self.heading.sign() * self.speed
    }

    /// Displacement applied to an actor standing on this lane
    pub fn carry(&self) -> Option<f32> {
        self.policy.carries().then(|| self.displacement())
    }

    /// Move every obstacle one tick, wrapping at the field edges
    pub fn advance(&mut self) {
        let dx = self.displacement();
        if dx == 0.0 {
            return;
        }
        for obstacle in &mut self.obstacles {
            let left = wrap_left(obstacle.left() + dx, obstacle.width(), self.field_width);
            obstacle.move_to(left, None);
        }
    }

    pub fn animate(&mut self, dt_ms: f32) {
        for obstacle in &mut self.obstacles {
            obstacle.animate(dt_ms);
        }
    }

    pub fn render(&self, surface: &mut dyn Drawable) {
        for obstacle in &self.obstacles {
            obstacle.render(surface);
        }
    }

    /// Return every obstacle to its start; claimed goals stay claimed
    pub fn reset(&mut self) {
        for obstacle in &mut self.obstacles {
            obstacle.reset();
        }
    }

    pub fn overlaps_any(&self, actor: &Extent) -> bool {
        self.obstacles.iter().any(|o| o.position().overlaps(actor))
    }

    /// Classify the actor's footprint against this lane
    pub fn is_collision(&mut self, actor: &Extent) -> Verdict {
        let occupied = self.obstacles.iter().find(|o| o.position().overlaps(actor));

        match self.policy {
            SafetyPolicy::Hazard => {
                if occupied.is_some() {
                    Verdict::Collision
                } else {
                    Verdict::Clear
                }
            }
            SafetyPolicy::Float => {
                if occupied.is_some() {
                    Verdict::Clear
                } else {
                    Verdict::Collision
                }
            }
            SafetyPolicy::SubmergibleFloat => match occupied {
                Some(obstacle) if !obstacle.is_submerged() => Verdict::Clear,
                _ => Verdict::Collision,
            },
            SafetyPolicy::Goal => self.claim_goal(actor),
        }
    }

    /// Claim the first goal slot under the actor
    ///
    /// No slot, or a slot already claimed, is reported as a collision.
    fn claim_goal(&mut self, actor: &Extent) -> Verdict {
        let Some(index) = self
            .obstacles
            .iter()
            .position(|o| o.position().overlaps(actor))
        else {
            return Verdict::Collision;
        };

        let slot = self.obstacles[..index]
            .iter()
            .filter(|o| matches!(o.kind, ObstacleKind::Goal { .. }))
            .count();

        let goal = &mut self.obstacles[index];
        if goal.kind != (ObstacleKind::Goal { claimed: false }) {
            return Verdict::Collision;
        }
        goal.kind = ObstacleKind::Goal { claimed: true };
        let marker = Obstacle::new(
            ObstacleKind::ClaimedGoal,
            goal.left(),
            goal.top(),
            goal.width(),
            goal.height(),
        );

        log::debug!("Goal slot {} claimed", slot);
        self.obstacles.push(marker);
        Verdict::Goal { slot }
    }

    /// Indices of claimed goal slots, in slot order
    pub fn claimed_slots(&self) -> Vec<usize> {
        self.obstacles
            .iter()
            .filter(|o| matches!(o.kind, ObstacleKind::Goal { .. }))
            .enumerate()
            .filter(|(_, o)| o.is_claimed())
            .map(|(slot, _)| slot)
            .collect()
    }
}
