//! Run state and the state machine driving it
//!
//! The machine never publishes directly: every transition returns the events
//! it produced, and the bus wiring publishes them once no borrow is held.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::events::{Event, EventBus, Topic};
use super::schedule::{Scheduler, TaskId};
use crate::consts::*;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Actor can move, countdown running
    Playing,
    /// Frozen after a lost life, waiting for recovery
    LosingLife,
    /// Frozen after claiming a goal, waiting for recovery
    AtGoal,
    /// No lives left
    GameOver,
    /// Every goal claimed
    Won,
}

impl RunPhase {
    #[inline]
    pub fn is_frozen(&self) -> bool {
        *self != RunPhase::Playing
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::GameOver | RunPhase::Won)
    }
}

/// Everything the HUD needs to know about a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub score: u32,
    /// Best score this process has seen
    pub high_score: u32,
    pub lives: u8,
    pub time_remaining_ms: u32,
    pub goals_claimed: u8,
    pub phase: RunPhase,
}

impl RunState {
    pub fn new(high_score: u32) -> Self {
        Self {
            score: 0,
            high_score,
            lives: STARTING_LIVES,
            time_remaining_ms: TIME_LIMIT_MS,
            goals_claimed: 0,
            phase: RunPhase::Playing,
        }
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.phase.is_frozen()
    }

    /// Remaining time as a fraction of the limit
    pub fn time_fraction(&self) -> f32 {
        self.time_remaining_ms as f32 / TIME_LIMIT_MS as f32
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Deferred recovery, valid only for the generation it was scheduled in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Recovery {
    generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct RunStateMachine {
    state: RunState,
    recoveries: Scheduler<Recovery>,
    pending: Option<TaskId>,
    /// Bumped on every freeze, reset and restart; stale recoveries are ignored
    generation: u64,
}

impl RunStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_high_score(high_score: u32) -> Self {
        Self {
            state: RunState::new(high_score),
            ..Self::default()
        }
    }

    /// Wire the machine to collision, goal and movement events
    pub fn subscribe(machine: &Rc<RefCell<Self>>, bus: &EventBus) {
        for topic in [Topic::Collision, Topic::GoalReached, Topic::Moved] {
            let weak = Rc::downgrade(machine);
            bus.subscribe(topic, move |bus, event| {
                let Some(machine) = weak.upgrade() else {
                    return;
                };
                // Borrow ends before the follow-up events are dispatched
                let produced = machine.borrow_mut().handle(event);
                bus.publish_all(produced);
            });
        }
    }

    /// React to an incoming event
    pub fn handle(&mut self, event: &Event) -> Vec<Event> {
        match event {
            Event::Collision => self.on_collision(),
            Event::GoalReached { slot } => self.on_goal_reached(*slot),
            Event::Moved { .. } => self.on_moved(),
            _ => Vec::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Owned copy for HUD consumers and logs
    pub fn snapshot(&self) -> RunState {
        self.state.clone()
    }

    #[inline]
    pub fn phase(&self) -> RunPhase {
        self.state.phase
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state.phase == RunPhase::Playing
    }

    /// Whether a recovery is waiting to fire
    pub fn recovery_pending(&self) -> bool {
        !self.recoveries.is_empty()
    }

    /// Advance virtual time, firing any due recovery
    pub fn advance_clock(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        for recovery in self.recoveries.advance_to(now_ms) {
            self.pending = None;
            if recovery.generation != self.generation || self.state.phase.is_terminal() {
                log::debug!("Dropping stale recovery (generation {})", recovery.generation);
                continue;
            }
            events.extend(self.reset());
        }
        events
    }

    /// One logic tick of the countdown; paused while frozen
    pub fn countdown(&mut self, frame_ms: u32) -> Vec<Event> {
        if !self.is_playing() {
            return Vec::new();
        }

        self.state.time_remaining_ms = self.state.time_remaining_ms.saturating_sub(frame_ms);
        let mut events = vec![Event::TimeRemaining(self.state.time_fraction())];

        if self.state.time_remaining_ms == 0 {
            log::debug!("Time expired");
            events.extend(self.lose_life());
        }
        events
    }

    pub fn on_collision(&mut self) -> Vec<Event> {
        if !self.is_playing() {
            return Vec::new();
        }
        self.lose_life()
    }

    pub fn on_goal_reached(&mut self, slot: usize) -> Vec<Event> {
        if !self.is_playing() {
            return Vec::new();
        }

        let mut events = self.add_score(GOAL_POINTS);
        self.state.goals_claimed = (self.state.goals_claimed + 1).min(GOAL_COUNT);
        self.generation += 1;
        log::debug!(
            "Goal {} reached ({}/{})",
            slot,
            self.state.goals_claimed,
            GOAL_COUNT
        );

        if self.state.goals_claimed >= GOAL_COUNT {
            self.state.phase = RunPhase::Won;
            self.cancel_recovery();
            log::info!("Run won with score {}", self.state.score);
            events.push(Event::GameWon);
        } else {
            self.state.phase = RunPhase::AtGoal;
            self.schedule_recovery();
        }
        events
    }

    pub fn on_moved(&mut self) -> Vec<Event> {
        if !self.is_playing() {
            return Vec::new();
        }
        self.add_score(MOVE_POINTS)
    }

    fn lose_life(&mut self) -> Vec<Event> {
        self.state.lives = self.state.lives.saturating_sub(1);
        self.generation += 1;
        let mut events = vec![Event::LifeLost {
            lives: self.state.lives,
        }];

        if self.state.lives == 0 {
            self.state.phase = RunPhase::GameOver;
            self.cancel_recovery();
            log::info!("Game over with score {}", self.state.score);
            events.push(Event::GameOver);
        } else {
            self.state.phase = RunPhase::LosingLife;
            log::debug!("Life lost, {} remaining", self.state.lives);
            self.schedule_recovery();
        }
        events
    }

    fn add_score(&mut self, points: u32) -> Vec<Event> {
        self.state.score = self.state.score.saturating_add(points);
        let mut events = vec![Event::ScoreChanged(self.state.score)];
        if self.state.score > self.state.high_score {
            self.state.high_score = self.state.score;
            events.push(Event::HighScoreChanged(self.state.high_score));
        }
        events
    }

    fn schedule_recovery(&mut self) {
        self.cancel_recovery();
        let task = self.recoveries.schedule(
            RECOVERY_DELAY_MS,
            Recovery {
                generation: self.generation,
            },
        );
        self.pending = Some(task);
    }

    fn cancel_recovery(&mut self) {
        if let Some(task) = self.pending.take() {
            self.recoveries.cancel(task);
        }
    }

    /// Refill the timer and unfreeze; ignored once the run is over
    ///
    /// Returns the `Reset` event so the actor and obstacles follow.
    pub fn reset(&mut self) -> Vec<Event> {
        if self.state.phase.is_terminal() {
            return Vec::new();
        }
        self.cancel_recovery();
        self.generation += 1;
        self.state.time_remaining_ms = TIME_LIMIT_MS;
        self.state.phase = RunPhase::Playing;
        vec![Event::TimeRemaining(1.0), Event::Reset]
    }

    /// Start a fresh run, keeping the high score
    pub fn restart(&mut self) -> Vec<Event> {
        self.cancel_recovery();
        self.recoveries.clear();
        self.generation += 1;
        self.state = RunState::new(self.state.high_score);
        log::info!("New run (high score {})", self.state.high_score);
        vec![
            Event::ScoreChanged(0),
            Event::TimeRemaining(1.0),
            Event::Reset,
        ]
    }
}
