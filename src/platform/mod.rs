//! Platform input decoding
//!
//! Turns raw key names and touch points into movement intents. The
//! simulation only ever sees `Direction`s.

use glam::Vec2;

use crate::sim::{Actor, Direction};

/// Map a key name to a movement intent
///
/// Accepts `w/a/s/d`, vi-style `h/j/k/l` and arrow key names as browsers and
/// terminals report them (`ArrowUp`, `Up`, `up`).
pub fn key_to_direction(key: &str) -> Option<Direction> {
    match key.to_ascii_lowercase().as_str() {
        "w" | "k" | "up" | "arrowup" => Some(Direction::Up),
        "s" | "j" | "down" | "arrowdown" => Some(Direction::Down),
        "a" | "h" | "left" | "arrowleft" => Some(Direction::Left),
        "d" | "l" | "right" | "arrowright" => Some(Direction::Right),
        _ => None,
    }
}

/// Map a touch point to a movement intent
///
/// The screen is split into four quadrants along the diagonals through the
/// actor's center; touching inside a quadrant moves toward it. A touch
/// exactly on the center is ignored.
pub fn touch_to_direction(touch: Vec2, actor_center: Vec2) -> Option<Direction> {
    let delta = touch - actor_center;
    if delta == Vec2::ZERO {
        return None;
    }

    if delta.x.abs() > delta.y.abs() {
        Some(if delta.x < 0.0 {
            Direction::Left
        } else {
            Direction::Right
        })
    } else if delta.y < 0.0 {
        // Screen coordinates grow downward
        Some(Direction::Up)
    } else {
        Some(Direction::Down)
    }
}

/// Center of the actor's cell in pixels
pub fn actor_center(actor: &Actor, cell_size: Vec2) -> Vec2 {
    actor.pos + cell_size * 0.5
}

/// Parse a script of intents, one key name per whitespace-separated token
///
/// Unknown tokens are skipped with a warning.
pub fn parse_script(script: &str) -> Vec<Direction> {
    script
        .split_whitespace()
        .filter_map(|token| {
            let direction = key_to_direction(token);
            if direction.is_none() {
                log::warn!("Ignoring unknown intent {token:?}");
            }
            direction
        })
        .collect()
}
