//! Fixed-cadence game loop
//!
//! Display frames may arrive at any rate; logic ticks are throttled to the
//! configured cadence. Frames that arrive early skip the update body but still
//! drive animation clocks and drawing.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use super::actor::{Actor, Direction};
use super::board::Board;
use super::collision::Verdict;
use super::context::Context;
use super::events::{Event, EventBus};
use super::field::ObstacleField;
use super::state::{RunState, RunStateMachine};
use crate::frame_budget_ms;
use crate::renderer::Drawable;

/// Throttles display frames down to the logic cadence
#[derive(Debug, Clone)]
pub struct FrameClock {
    frame_ms: u32,
    last_frame_ms: Option<u64>,
    last_update_ms: Option<u64>,
}

impl FrameClock {
    pub fn new(logic_hz: u32) -> Self {
        Self {
            frame_ms: frame_budget_ms(logic_hz),
            last_frame_ms: None,
            last_update_ms: None,
        }
    }

    /// Logic frame budget in milliseconds
    #[inline]
    pub fn frame_ms(&self) -> u32 {
        self.frame_ms
    }

    /// Record a display frame at `now_ms`
    ///
    /// Returns the time since the previous display frame and whether a logic
    /// tick is due.
    pub fn observe(&mut self, now_ms: u64) -> (f32, bool) {
        let elapsed = self
            .last_frame_ms
            .map_or(0, |last| now_ms.saturating_sub(last));
        self.last_frame_ms = Some(now_ms);

        let due = self
            .last_update_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= u64::from(self.frame_ms));
        if due {
            self.last_update_ms = Some(now_ms);
        }
        (elapsed as f32, due)
    }
}

/// A whole game: components wired through one bus
pub struct Game {
    ctx: Context,
    /// The field as built; restarts start over from a copy
    layout: ObstacleField,
    field: Rc<RefCell<ObstacleField>>,
    actor: Rc<RefCell<Actor>>,
    run: Rc<RefCell<RunStateMachine>>,
    clock: FrameClock,
    /// Virtual simulation time; advances one frame budget per logic tick
    sim_ms: u64,
    ticks: u64,
    loaded: bool,
    paused: bool,
}

impl Game {
    /// A game on the standard board and lane layout
    pub fn new(logic_hz: u32) -> Self {
        let ctx = Context::new(Board::default());
        let field = ObstacleField::new(&ctx.board);
        Self::with_field(ctx, field, logic_hz)
    }

    /// A game with a custom obstacle field
    pub fn with_field(ctx: Context, field: ObstacleField, logic_hz: u32) -> Self {
        let layout = field.clone();
        let field = Rc::new(RefCell::new(field));
        let actor = Rc::new(RefCell::new(Actor::new(&ctx)));
        let run = Rc::new(RefCell::new(RunStateMachine::new()));

        // The run reacts first, then the actor and field follow its events
        RunStateMachine::subscribe(&run, &ctx.bus);
        Actor::subscribe(&actor, &ctx.bus);
        ObstacleField::subscribe(&field, &ctx.bus);

        Self {
            ctx,
            layout,
            field,
            actor,
            run,
            clock: FrameClock::new(logic_hz),
            sim_ms: 0,
            ticks: 0,
            loaded: false,
            paused: false,
        }
    }

    /// Subscribe HUD and other observers here before calling `load`
    pub fn bus(&self) -> &EventBus {
        &self.ctx.bus
    }

    pub fn board(&self) -> &Board {
        &self.ctx.board
    }

    /// Announce the board and initial HUD values, then start accepting frames
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.ctx.board.announce(&self.ctx.bus);

        let state = self.run.borrow().snapshot();
        self.ctx.bus.publish_all([
            Event::ScoreChanged(state.score),
            Event::HighScoreChanged(state.high_score),
            Event::TimeRemaining(state.time_fraction()),
        ]);
        self.loaded = true;
        log::info!("Game loaded ({} ms per logic tick)", self.clock.frame_ms());
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
    }

    /// Apply a movement intent from the input service
    pub fn handle_input(&mut self, direction: Direction) {
        if !self.loaded || self.paused {
            return;
        }
        Actor::move_and_publish(&self.actor, &self.ctx.bus, direction);
    }

    /// Throw away the current run and start over, keeping the high score
    pub fn restart(&mut self) {
        *self.field.borrow_mut() = self.layout.clone();
        let events = self.run.borrow_mut().restart();
        self.ctx.bus.publish_all(events);
        self.paused = false;
    }

    /// Handle one display frame
    ///
    /// Returns true when a logic tick ran.
    pub fn frame(&mut self, now_ms: u64, surface: &mut dyn Drawable) -> bool {
        if !self.loaded {
            return false;
        }

        let (elapsed_ms, due) = self.clock.observe(now_ms);
        let ticked = due && !self.paused;
        if !self.paused {
            self.field.borrow_mut().animate(elapsed_ms);
        }
        if ticked {
            self.update();
        }
        self.render(surface);
        ticked
    }

    /// One logic tick, in fixed order
    fn update(&mut self) {
        self.ticks += 1;
        self.sim_ms += u64::from(self.clock.frame_ms());
        let bus = &self.ctx.bus;

        // Deferred recoveries, then the countdown
        let events = self.run.borrow_mut().advance_clock(self.sim_ms);
        bus.publish_all(events);
        let events = self.run.borrow_mut().countdown(self.clock.frame_ms());
        bus.publish_all(events);

        // Lanes never pause
        self.field.borrow_mut().advance();
        self.carry_actor();

        if self.run.borrow().is_playing() {
            self.check_collisions();
        }
    }

    /// Floating lanes move the actor standing on them
    fn carry_actor(&self) {
        let mut actor = self.actor.borrow_mut();
        if actor.is_frozen() {
            return;
        }
        if let Some(dx) = self.field.borrow().carry_at(actor.top()) {
            let left = actor.left() + dx;
            actor.set_position(left);
        }
    }

    fn check_collisions(&self) {
        let (top, extent) = {
            let actor = self.actor.borrow();
            (actor.top(), actor.extent())
        };
        let verdict = self.field.borrow_mut().check_collisions(top, &extent);

        match verdict {
            Verdict::Clear => {}
            Verdict::Collision => self.ctx.bus.publish(Event::Collision),
            Verdict::Goal { slot } => self.ctx.bus.publish(Event::GoalReached { slot }),
        }
    }

    fn render(&self, surface: &mut dyn Drawable) {
        surface.begin_frame();
        self.field.borrow().render(surface);
        self.actor.borrow().render(surface);
        surface.end_frame();
    }

    pub fn run_state(&self) -> RunState {
        self.run.borrow().snapshot()
    }

    pub fn actor(&self) -> Ref<'_, Actor> {
        self.actor.borrow()
    }

    pub fn field(&self) -> Ref<'_, ObstacleField> {
        self.field.borrow()
    }

    /// Logic ticks run so far
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Virtual simulation time in milliseconds
    #[inline]
    pub fn sim_time_ms(&self) -> u64 {
        self.sim_ms
    }

    #[inline]
    pub fn frame_ms(&self) -> u32 {
        self.clock.frame_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::renderer::{NullSurface, RecordingSurface, Visual};
    use crate::sim::state::RunPhase;

    #[test]
    fn test_frame_clock_coalesces_early_frames() {
        let mut clock = FrameClock::new(30);
        assert_eq!(clock.observe(0), (0.0, true));
        assert_eq!(clock.observe(16), (16.0, false));
        assert_eq!(clock.observe(33), (17.0, true));
        assert_eq!(clock.observe(40), (7.0, false));
        assert_eq!(clock.observe(66), (26.0, true));
    }

    #[test]
    fn test_frames_before_load_do_nothing() {
        let mut game = Game::new(LOGIC_HZ);
        assert!(!game.frame(0, &mut NullSurface));
        assert_eq!(game.ticks(), 0);
    }

    #[test]
    fn test_fast_display_does_not_double_count_time() {
        let mut game = Game::new(LOGIC_HZ);
        game.load();
        // 60 Hz display for one second
        for i in 0..60 {
            game.frame(i * 1000 / 60, &mut NullSurface);
        }
        assert!(game.ticks() <= 31);
        let spent = TIME_LIMIT_MS - game.run_state().time_remaining_ms;
        assert_eq!(spent as u64, game.ticks() * u64::from(game.frame_ms()));
    }

    #[test]
    fn test_pause_stops_ticks() {
        let mut game = Game::new(LOGIC_HZ);
        game.load();
        game.frame(0, &mut NullSurface);
        game.toggle_pause();
        for i in 1..10 {
            assert!(!game.frame(i * 100, &mut NullSurface));
        }
        game.handle_input(Direction::Up);
        assert_eq!(game.run_state().score, 0);
        assert_eq!(game.ticks(), 1);
    }

    #[test]
    fn test_restart_clears_claimed_goals() {
        let mut game = Game::new(LOGIC_HZ);
        game.load();
        game.field.borrow_mut().check_collisions(80.0, &crate::sim::Extent::new(20.0, 40.0));
        assert_eq!(game.field().claimed_goals(), vec![0]);

        game.restart();
        assert!(game.field().claimed_goals().is_empty());
        assert_eq!(game.run_state().phase, RunPhase::Playing);
    }

    #[test]
    fn test_every_frame_draws_field_then_actor() {
        let mut game = Game::new(LOGIC_HZ);
        game.load();
        let mut surface = RecordingSurface::default();
        game.frame(0, &mut surface);
        game.frame(10, &mut surface);

        // Early frame still draws
        assert_eq!(game.ticks(), 1);
        assert_eq!(surface.frames, 2);
        let obstacles: usize = game.field().lanes().iter().map(|l| l.obstacles().len()).sum();
        assert_eq!(surface.last_frame.len(), obstacles + 1);
        assert!(matches!(
            surface.last_frame.last().map(|s| s.visual),
            Some(Visual::Actor { .. })
        ));
    }

    #[test]
    fn test_fast_logic_rate_still_spends_time() {
        let mut game = Game::new(2000);
        assert!(!game.is_loaded());
        game.load();
        assert!(game.is_loaded());
        assert_eq!(game.frame_ms(), 1);

        for now in 0..1000 {
            game.frame(now, &mut NullSurface);
        }
        assert_eq!(game.ticks(), 1000);
        assert_eq!(game.run_state().time_remaining_ms, TIME_LIMIT_MS - 1000);
    }
}
