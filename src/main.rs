//! Lanehop entry point
//!
//! Runs a headless game at a simulated display rate, driven by a seeded
//! autopilot or a script of key names, and prints a JSON run summary.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use lanehop::platform::parse_script;
use lanehop::renderer::{Drawable, NullSurface, TextSurface};
use lanehop::sim::{Direction, Event, EventLog, Game, RunPhase, Topic};
use lanehop::{Settings, logging};

/// Headless lane-crossing arcade simulation
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Autopilot seed (overrides the settings file)
    #[arg(long)]
    seed: Option<u64>,

    /// Display frames to simulate before giving up
    #[arg(long, default_value_t = 7200)]
    frames: u64,

    /// Whitespace-separated key names to play instead of the autopilot
    #[arg(long)]
    script: Option<String>,

    /// Logic ticks between scripted or autopilot hops
    #[arg(long, default_value_t = 6)]
    hop_every: u64,

    /// Log an ASCII frame every N logic ticks (0 disables)
    #[arg(long)]
    render_every: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Picks hops at random, biased toward the goal row
struct Autopilot {
    rng: Pcg32,
}

impl Autopilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    fn next(&mut self) -> Option<Direction> {
        match self.rng.random_range(0..100) {
            0..45 => Some(Direction::Up),
            45..60 => Some(Direction::Left),
            60..75 => Some(Direction::Right),
            75..82 => Some(Direction::Down),
            _ => None,
        }
    }
}

enum Pilot {
    Auto(Autopilot),
    Script(std::vec::IntoIter<Direction>),
}

impl Pilot {
    fn next(&mut self) -> Option<Direction> {
        match self {
            Pilot::Auto(autopilot) => autopilot.next(),
            Pilot::Script(intents) => intents.next(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    frames: u64,
    ticks: u64,
    sim_time_ms: u64,
    phase: RunPhase,
    score: u32,
    high_score: u32,
    lives: u8,
    goals_claimed: u8,
    claimed_slots: Vec<usize>,
    hops: usize,
    lives_lost: usize,
    goals_reached: usize,
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    if let Some(render_every) = args.render_every {
        settings.render_every = render_every;
    }
    settings.validate()?;
    Ok(settings)
}

/// Log HUD updates as they arrive
fn attach_hud(game: &Game) {
    for topic in [
        Topic::ScoreChanged,
        Topic::HighScoreChanged,
        Topic::LifeLost,
        Topic::GameOver,
        Topic::GameWon,
    ] {
        game.bus().subscribe(topic, |_, event| match event {
            Event::ScoreChanged(score) => log::debug!("Score {score}"),
            Event::HighScoreChanged(score) => log::debug!("High score {score}"),
            Event::LifeLost { lives } => log::info!("Life lost, {lives} left"),
            Event::GameOver => log::info!("Game over"),
            Event::GameWon => log::info!("All goals claimed"),
            _ => {}
        });
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(&args)?;
    logging::init(args.verbose, settings.log_filter.as_deref());
    log::debug!("{settings:?}");

    let mut pilot = match &args.script {
        Some(script) => {
            let intents = parse_script(script);
            if intents.is_empty() {
                log::warn!("Script has no usable intents");
            }
            Pilot::Script(intents.into_iter())
        }
        None => Pilot::Auto(Autopilot::new(settings.seed)),
    };

    let mut game = Game::new(settings.logic_hz);
    let history = EventLog::attach(
        game.bus(),
        &[Topic::Moved, Topic::LifeLost, Topic::GoalReached],
    );
    attach_hud(&game);
    game.load();

    let mut text = TextSurface::new(game.board());
    let mut null = NullSurface;
    let hop_every = args.hop_every.max(1);
    let mut frames = 0;

    for frame in 0..args.frames {
        frames = frame + 1;
        let now_ms = frame * 1000 / u64::from(settings.display_hz);

        let show = settings.render_every > 0 && game.ticks() % settings.render_every == 0;
        let surface: &mut dyn Drawable = if show { &mut text } else { &mut null };
        if !game.frame(now_ms, surface) {
            continue;
        }
        if show {
            log::info!("tick {}\n{text}", game.ticks());
        }

        if game.run_state().phase.is_terminal() {
            break;
        }
        if game.ticks() % hop_every == 0 {
            if let Some(direction) = pilot.next() {
                game.handle_input(direction);
            }
        }
    }

    let state = game.run_state();
    let summary = Summary {
        seed: settings.seed,
        frames,
        ticks: game.ticks(),
        sim_time_ms: game.sim_time_ms(),
        phase: state.phase,
        score: state.score,
        high_score: state.high_score,
        lives: state.lives,
        goals_claimed: state.goals_claimed,
        claimed_slots: game.field().claimed_goals(),
        hops: history.count(Topic::Moved),
        lives_lost: history.count(Topic::LifeLost),
        goals_reached: history.count(Topic::GoalReached),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
