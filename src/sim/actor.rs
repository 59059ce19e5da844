//! The player-controlled actor

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::collision::Extent;
use super::context::Context;
use super::events::{Event, EventBus, Topic};
use crate::renderer::{Drawable, Sprite, Visual};

/// Directional movement intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Cell offset (columns, rows) for one step
    fn step(&self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }
}

/// Which sprite animation the actor shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pose {
    Facing(Direction),
    /// Shown after losing a life until the next reset
    Dead,
}

#[derive(Debug, Clone)]
pub struct Actor {
    /// Top-left corner in pixels
    pub pos: Vec2,
    row: usize,
    frozen: bool,
    pose: Pose,
    board: Rc<Board>,
}

impl Actor {
    pub fn new(ctx: &Context) -> Self {
        let board = &ctx.board;
        Self {
            pos: Vec2::new(board.start_left(), board.row_top(board.start_row())),
            row: board.start_row(),
            frozen: false,
            pose: Pose::Facing(Direction::Up),
            board: Rc::clone(board),
        }
    }

    /// Register freeze/reset handling on the bus
    pub fn subscribe(actor: &Rc<RefCell<Self>>, bus: &EventBus) {
        for topic in [Topic::LifeLost, Topic::GoalReached, Topic::GameOver, Topic::GameWon] {
            let weak = Rc::downgrade(actor);
            bus.subscribe(topic, move |_, event| {
                if let Some(actor) = weak.upgrade() {
                    let mut actor = actor.borrow_mut();
                    actor.freeze();
                    if matches!(event, Event::LifeLost { .. }) {
                        actor.pose = Pose::Dead;
                    }
                }
            });
        }

        let weak = Rc::downgrade(actor);
        bus.subscribe(Topic::Reset, move |_, _| {
            if let Some(actor) = weak.upgrade() {
                actor.borrow_mut().reset();
            }
        });
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
    pub fn row(&self) -> usize {
        self.row
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Horizontal footprint, one cell wide
    #[inline]
    pub fn extent(&self) -> Extent {
        Extent::new(self.pos.x, self.board.cell_width)
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    fn clamp(&self, pos: Vec2) -> Vec2 {
        let bounds = self.board.actor_bounds();
        let max_left = (bounds.right - self.board.cell_width).max(bounds.left);
        Vec2::new(
            pos.x.clamp(bounds.left, max_left),
            pos.y.clamp(bounds.top, bounds.bottom),
        )
    }

    /// Hop one cell
    ///
    /// Returns the `Moved` event to publish, or `None` when frozen. A hop
    /// clamped away at the board edge still counts as a move; only the row
    /// stays put.
    pub fn step(&mut self, direction: Direction) -> Option<Event> {
        if self.frozen {
            return None;
        }

        let (dx, dy) = direction.step();
        let target = self.pos
            + Vec2::new(dx * self.board.cell_width, dy * self.board.cell_height);
        let clamped = self.clamp(target);
        self.pose = Pose::Facing(direction);

        if clamped.y != self.pos.y {
            self.row = self.board.row_of(clamped.y).unwrap_or(self.row);
        }
        self.pos = clamped;

        Some(Event::Moved {
            direction,
            row: self.row,
        })
    }

    /// Hop and publish the resulting `Moved` event
    pub fn move_and_publish(actor: &Rc<RefCell<Self>>, bus: &EventBus, direction: Direction) {
        // Release the borrow before dispatch; handlers may touch the actor
        let moved = actor.borrow_mut().step(direction);
        if let Some(event) = moved {
            bus.publish(event);
        }
    }

    /// Carry the actor horizontally (log riding); row and score untouched
    pub fn set_position(&mut self, left: f32) {
        self.pos = self.clamp(Vec2::new(left, self.pos.y));
    }

    /// Back to the start cell, unfrozen, facing up
    pub fn reset(&mut self) {
        self.pos = Vec2::new(
            self.board.start_left(),
            self.board.row_top(self.board.start_row()),
        );
        self.row = self.board.start_row();
        self.frozen = false;
        self.pose = Pose::Facing(Direction::Up);
    }

    pub fn render(&self, surface: &mut dyn Drawable) {
        surface.render_at(&Sprite {
            left: self.pos.x,
            top: self.pos.y,
            width: self.board.cell_width,
            height: self.board.cell_height,
            visual: Visual::Actor { pose: self.pose },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::EventLog;

    fn actor() -> Actor {
        Actor::new(&Context::default())
    }

    #[test]
    fn test_starts_on_start_row() {
        let actor = actor();
        assert_eq!(actor.row(), 14);
        assert_eq!(actor.top(), 560.0);
        assert_eq!(actor.left(), 240.0);
    }

    #[test]
    fn test_step_up_moves_one_cell() {
        let mut actor = actor();
        let event = actor.step(Direction::Up);
        assert_eq!(actor.top(), 520.0);
        assert_eq!(actor.row(), 13);
        assert_eq!(
            event,
            Some(Event::Moved {
                direction: Direction::Up,
                row: 13
            })
        );
    }

    #[test]
    fn test_step_down_at_bottom_keeps_row_in_sync() {
        let mut actor = actor();
        assert_eq!(
            actor.step(Direction::Down),
            Some(Event::Moved {
                direction: Direction::Down,
                row: 14
            })
        );
        assert_eq!(actor.row(), 14);
        assert_eq!(actor.top(), 560.0);
        assert_eq!(actor.pose(), Pose::Facing(Direction::Down));
    }

    #[test]
    fn test_clamped_at_top_and_sides() {
        let mut actor = actor();
        for _ in 0..20 {
            actor.step(Direction::Up);
            actor.step(Direction::Right);
        }
        assert_eq!(actor.top(), 80.0);
        assert_eq!(actor.row(), 2);
        assert_eq!(actor.left(), 440.0);

        for _ in 0..20 {
            actor.step(Direction::Left);
        }
        assert_eq!(actor.left(), 0.0);
    }

    #[test]
    fn test_frozen_ignores_moves() {
        let mut actor = actor();
        actor.freeze();
        assert_eq!(actor.step(Direction::Up), None);
        assert_eq!(actor.row(), 14);
    }

    #[test]
    fn test_set_position_clamps_without_row_change() {
        let mut actor = actor();
        actor.step(Direction::Up);
        actor.set_position(1000.0);
        assert_eq!(actor.left(), 440.0);
        actor.set_position(-15.0);
        assert_eq!(actor.left(), 0.0);
        assert_eq!(actor.row(), 13);
    }

    #[test]
    fn test_reset_twice_matches_once() {
        let mut actor = actor();
        actor.step(Direction::Up);
        actor.step(Direction::Left);
        actor.freeze();

        actor.reset();
        let once = (actor.pos, actor.row(), actor.is_frozen(), actor.pose());
        actor.reset();
        assert_eq!(once, (actor.pos, actor.row(), actor.is_frozen(), actor.pose()));
        assert!(!actor.is_frozen());
    }

    #[test]
    fn test_events_freeze_and_reset() {
        let ctx = Context::default();
        let bus = ctx.bus.clone();
        let actor = Rc::new(RefCell::new(Actor::new(&ctx)));
        Actor::subscribe(&actor, &bus);

        bus.publish(Event::LifeLost { lives: 4 });
        assert!(actor.borrow().is_frozen());
        assert_eq!(actor.borrow().pose(), Pose::Dead);

        bus.publish(Event::Reset);
        assert!(!actor.borrow().is_frozen());
        assert_eq!(actor.borrow().pose(), Pose::Facing(Direction::Up));
    }

    #[test]
    fn test_move_and_publish_emits_moved() {
        let ctx = Context::default();
        let bus = ctx.bus.clone();
        let log = EventLog::attach(&bus, &[Topic::Moved]);
        let actor = Rc::new(RefCell::new(Actor::new(&ctx)));

        Actor::move_and_publish(&actor, &bus, Direction::Up);
        Actor::move_and_publish(&actor, &bus, Direction::Down);
        // Blocked by the bottom edge, still a move
        Actor::move_and_publish(&actor, &bus, Direction::Down);
        assert_eq!(log.count(Topic::Moved), 3);
        assert_eq!(actor.borrow().row(), 14);

        actor.borrow_mut().freeze();
        Actor::move_and_publish(&actor, &bus, Direction::Up);
        assert_eq!(log.count(Topic::Moved), 3);
    }

    #[test]
    fn test_every_direction_steps_once() {
        for direction in Direction::ALL {
            let mut actor = actor();
            actor.step(Direction::Up);
            let event = actor.step(direction);
            assert!(matches!(event, Some(Event::Moved { direction: d, .. }) if d == direction));
            assert_eq!(actor.pose(), Pose::Facing(direction));
        }
    }
}
