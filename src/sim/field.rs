//! The obstacle field: fixed lane layout, movement and collision queries

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::animation::Animation;
use super::board::Board;
use super::collision::{Extent, Verdict};
use super::events::{EventBus, Topic};
use super::lane::{Heading, Lane, SafetyPolicy};
use super::obstacle::{Obstacle, ObstacleKind};
use crate::renderer::Drawable;

/// Dive cycle for diving turtles; the deepest frame (3) is submerged
pub const DIVE_SEQUENCE: [u32; 10] = [0, 0, 0, 0, 1, 2, 3, 3, 2, 1];
/// Milliseconds per dive frame
pub const DIVE_FRAME_MS: f32 = 250.0;

/// Static description of one lane, in cell units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneSpec {
    pub row: usize,
    pub policy: SafetyPolicy,
    pub heading: Heading,
    /// Pixels per logic tick
    pub speed: f32,
    pub kind: ObstacleKind,
    pub count: usize,
    /// Obstacle width in cells
    pub width: f32,
    /// Gap between consecutive obstacles in cells
    pub gap: f32,
    /// Left of the first obstacle in cells
    pub offset: f32,
    /// Every n-th turtle group dives (n > 0)
    pub dive_every: Option<usize>,
}

#[allow(clippy::too_many_arguments)]
const fn lane(
    row: usize,
    policy: SafetyPolicy,
    heading: Heading,
    speed: f32,
    kind: ObstacleKind,
    count: usize,
    width: f32,
    gap: f32,
) -> LaneSpec {
    LaneSpec {
        row,
        policy,
        heading,
        speed,
        kind,
        count,
        width,
        gap,
        offset: 0.0,
        dive_every: None,
    }
}

/// The fixed 11-lane layout, top to bottom
#[rustfmt::skip]
pub const LAYOUT: [LaneSpec; 11] = [
    // Goal bank: five slots, spaced 2.4 cells apart
    LaneSpec {
        offset: 0.5,
        ..lane(2, SafetyPolicy::Goal, Heading::Right, 0.0, ObstacleKind::Goal { claimed: false }, 5, 1.0, 1.4)
    },
    // River
    lane(3, SafetyPolicy::Float, Heading::Right, 2.0, ObstacleKind::Log, 3, 3.0, 1.5),
    LaneSpec {
        dive_every: Some(3),
        ..lane(4, SafetyPolicy::SubmergibleFloat, Heading::Left, 2.0, ObstacleKind::Turtle, 4, 2.0, 1.0)
    },
    lane(5, SafetyPolicy::Float, Heading::Right, 3.0, ObstacleKind::Log, 2, 6.0, 3.0),
    lane(6, SafetyPolicy::Float, Heading::Right, 1.0, ObstacleKind::Log, 3, 4.0, 1.0),
    LaneSpec {
        dive_every: Some(2),
        ..lane(7, SafetyPolicy::SubmergibleFloat, Heading::Left, 1.5, ObstacleKind::Turtle, 3, 3.0, 1.5)
    },
    // Road
    lane(9, SafetyPolicy::Hazard, Heading::Left, 1.5, ObstacleKind::Vehicle { variant: 4 }, 2, 2.0, 4.0),
    lane(10, SafetyPolicy::Hazard, Heading::Right, 2.5, ObstacleKind::Vehicle { variant: 3 }, 2, 1.0, 5.0),
    lane(11, SafetyPolicy::Hazard, Heading::Left, 1.0, ObstacleKind::Vehicle { variant: 2 }, 3, 1.0, 3.0),
    lane(12, SafetyPolicy::Hazard, Heading::Right, 1.0, ObstacleKind::Vehicle { variant: 1 }, 3, 1.0, 3.0),
    lane(13, SafetyPolicy::Hazard, Heading::Left, 2.0, ObstacleKind::Vehicle { variant: 0 }, 3, 1.0, 3.0),
];

impl LaneSpec {
    /// Materialize the lane on a board
    pub fn build(&self, board: &Board) -> Lane {
        let mut lane = Lane::new(
            board.row_top(self.row),
            self.heading,
            self.speed,
            self.policy,
            board.width(),
        );

        let width = self.width * board.cell_width;
        let pitch = (self.width + self.gap) * board.cell_width;
        for i in 0..self.count {
            let left = self.offset * board.cell_width + i as f32 * pitch;
            let mut obstacle = Obstacle::new(self.kind, left, 0.0, width, board.cell_height);
            if self.dive_every.is_some_and(|n| n > 0 && i % n == n - 1) {
                obstacle = obstacle.with_animation(Animation::new(
                    DIVE_SEQUENCE.to_vec(),
                    DIVE_FRAME_MS,
                    true,
                ));
            }
            lane.push(obstacle);
        }
        lane
    }
}

/// Owns every lane on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleField {
    lanes: Vec<Lane>,
}

impl ObstacleField {
    /// Build the fixed layout
    pub fn new(board: &Board) -> Self {
        Self::from_specs(board, &LAYOUT)
    }

    pub fn from_specs(board: &Board, specs: &[LaneSpec]) -> Self {
        Self::from_lanes(specs.iter().map(|spec| spec.build(board)).collect())
    }

    pub fn from_lanes(lanes: Vec<Lane>) -> Self {
        Self { lanes }
    }

    /// Register reset handling on the bus
    ///
    /// The handler holds a weak reference; dropping the field silences it.
    pub fn subscribe(field: &Rc<RefCell<Self>>, bus: &EventBus) {
        let weak = Rc::downgrade(field);
        bus.subscribe(Topic::Reset, move |_, _| {
            if let Some(field) = weak.upgrade() {
                field.borrow_mut().reset();
            }
        });
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    /// The lane whose row starts at `top`
    pub fn lane_at(&self, top: f32) -> Option<&Lane> {
        self.lanes.iter().find(|lane| lane.top() == top)
    }

    /// Move every lane one logic tick; runs regardless of actor state
    pub fn advance(&mut self) {
        for lane in &mut self.lanes {
            lane.advance();
        }
    }

    /// Drive every obstacle animation clock
    pub fn animate(&mut self, dt_ms: f32) {
        for lane in &mut self.lanes {
            lane.animate(dt_ms);
        }
    }

    pub fn render(&self, surface: &mut dyn Drawable) {
        for lane in &self.lanes {
            lane.render(surface);
        }
    }

    /// Per-tick displacement for an actor standing on row `top`
    pub fn carry_at(&self, top: f32) -> Option<f32> {
        self.lane_at(top).and_then(Lane::carry)
    }

    /// Ask the lane on the actor's row for a verdict
    ///
    /// Rows without a lane (river bank, start row) are always clear.
    pub fn check_collisions(&mut self, actor_top: f32, actor: &Extent) -> Verdict {
        self.lanes
            .iter_mut()
            .find(|lane| lane.top() == actor_top)
            .map_or(Verdict::Clear, |lane| lane.is_collision(actor))
    }

    /// Return every obstacle to its start position
    pub fn reset(&mut self) {
        for lane in &mut self.lanes {
            lane.reset();
        }
    }

    /// Claimed goal slots across goal lanes
    pub fn claimed_goals(&self) -> Vec<usize> {
        self.lanes
            .iter()
            .filter(|lane| lane.policy() == SafetyPolicy::Goal)
            .flat_map(Lane::claimed_slots)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::Event;

    fn field() -> (Board, ObstacleField) {
        let board = Board::default();
        let field = ObstacleField::new(&board);
        (board, field)
    }

    #[test]
    fn test_layout_has_eleven_lanes_on_distinct_rows() {
        let (_, field) = field();
        assert_eq!(field.lanes().len(), 11);
        let mut tops: Vec<_> = field.lanes().iter().map(|l| l.top() as i32).collect();
        tops.dedup();
        assert_eq!(tops.len(), 11);
    }

    #[test]
    fn test_layout_fits_the_field() {
        let (board, field) = field();
        for lane in field.lanes() {
            for obstacle in lane.obstacles() {
                assert!(obstacle.left() >= 0.0 && obstacle.left() < board.width());
                assert_eq!(obstacle.top(), lane.top());
            }
        }
    }

    #[test]
    fn test_every_policy_present() {
        let (_, field) = field();
        for policy in [
            SafetyPolicy::Hazard,
            SafetyPolicy::Float,
            SafetyPolicy::SubmergibleFloat,
            SafetyPolicy::Goal,
        ] {
            assert!(field.lanes().iter().any(|l| l.policy() == policy));
        }
        let goal = field.lane_at(80.0).map(|l| l.obstacles().len());
        assert_eq!(goal, Some(5));
    }

    #[test]
    fn test_unmatched_row_is_clear() {
        let (board, mut field) = field();
        let bank = board.row_top(8);
        let start = board.row_top(board.start_row());
        let actor = Extent::new(0.0, 40.0);
        assert_eq!(field.check_collisions(bank, &actor), Verdict::Clear);
        assert_eq!(field.check_collisions(start, &actor), Verdict::Clear);
        assert_eq!(field.check_collisions(1234.0, &actor), Verdict::Clear);
    }

    #[test]
    fn test_only_actor_row_is_consulted() {
        let (board, mut field) = field();
        // First car on row 13 starts at the left edge
        let actor = Extent::new(0.0, 40.0);
        assert_eq!(field.check_collisions(board.row_top(13), &actor), Verdict::Collision);
        assert_eq!(field.check_collisions(board.row_top(8), &actor), Verdict::Clear);
    }

    #[test]
    fn test_carry_on_logs_not_roads() {
        let (board, field) = field();
        assert_eq!(field.carry_at(board.row_top(3)), Some(2.0));
        assert_eq!(field.carry_at(board.row_top(4)), Some(-2.0));
        assert_eq!(field.carry_at(board.row_top(13)), None);
        assert_eq!(field.carry_at(board.row_top(8)), None);
    }

    #[test]
    fn test_reset_twice_matches_once() {
        let (board, mut field) = field();
        for _ in 0..50 {
            field.advance();
        }
        field.animate(700.0);
        field.check_collisions(board.row_top(2), &Extent::new(20.0, 40.0));

        field.reset();
        let once = serde_json::to_string(&field).ok();
        field.reset();
        let twice = serde_json::to_string(&field).ok();
        assert!(once.is_some());
        assert_eq!(once, twice);
        // Marker survives resets
        assert_eq!(field.claimed_goals(), vec![0]);
    }

    #[test]
    fn test_reset_restores_layout() {
        let (board, mut field) = field();
        let fresh = ObstacleField::new(&board);
        for _ in 0..37 {
            field.advance();
        }
        field.reset();
        for (a, b) in field.lanes().iter().zip(fresh.lanes()) {
            for (x, y) in a.obstacles().iter().zip(b.obstacles()) {
                assert_eq!(x.pos, y.pos);
            }
        }
    }

    #[test]
    fn test_reset_event_resets_subscribed_field() {
        let board = Board::default();
        let field = Rc::new(RefCell::new(ObstacleField::new(&board)));
        let bus = EventBus::new();
        ObstacleField::subscribe(&field, &bus);

        let before = field.borrow().lanes()[1].obstacles()[0].left();
        field.borrow_mut().advance();
        assert_ne!(field.borrow().lanes()[1].obstacles()[0].left(), before);

        bus.publish(Event::Reset);
        assert_eq!(field.borrow().lanes()[1].obstacles()[0].left(), before);
    }

    #[test]
    fn test_diving_turtles_are_animated() {
        let (_, field) = field();
        let turtles = field.lanes()[2].obstacles();
        let diving = turtles.iter().filter(|t| t.animation.is_some()).count();
        assert_eq!(diving, 1);
    }
}
