//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed logic cadence only
//! - Virtual time for deferred work
//! - Stable iteration order (lane and obstacle insertion order)
//! - No platform dependencies; drawing goes through the `Drawable` boundary

pub mod actor;
pub mod animation;
pub mod board;
pub mod collision;
pub mod context;
pub mod events;
pub mod field;
pub mod lane;
pub mod obstacle;
pub mod schedule;
pub mod state;
pub mod tick;

pub use actor::{Actor, Direction, Pose};
pub use animation::Animation;
pub use board::{Board, Bounds};
pub use collision::{Extent, Verdict};
pub use context::Context;
pub use events::{Event, EventBus, EventLog, Topic};
pub use field::{LAYOUT, LaneSpec, ObstacleField};
pub use lane::{Heading, Lane, SafetyPolicy};
pub use obstacle::{Obstacle, ObstacleKind};
pub use schedule::{Scheduler, TaskId};
pub use state::{RunPhase, RunState, RunStateMachine};
pub use tick::{FrameClock, Game};
