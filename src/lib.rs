//! Lanehop - a lane-crossing arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (lanes, collisions, run state, game loop)
//! - `renderer`: Drawable service boundary and a text surface
//! - `platform`: Input intent mapping
//! - `settings`: Runtime configuration
//! - `logging`: Logger setup for binaries

pub mod logging;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Default logic rate (updates per second)
    pub const LOGIC_HZ: u32 = 30;

    /// Board grid
    pub const NUM_ROWS: usize = 16;
    pub const NUM_COLUMNS: usize = 12;
    pub const CELL_WIDTH: f32 = 40.0;
    pub const CELL_HEIGHT: f32 = 40.0;

    /// Actor starts on the bottom-most playable row, mid-board
    pub const START_COLUMN: usize = NUM_COLUMNS / 2;

    /// Run rules
    pub const STARTING_LIVES: u8 = 5;
    pub const TIME_LIMIT_MS: u32 = 60_000;
    pub const GOAL_COUNT: u8 = 5;
    pub const RECOVERY_DELAY_MS: u64 = 2_000;

    /// Scoring
    pub const MOVE_POINTS: u32 = 20;
    pub const GOAL_POINTS: u32 = 1_000;
}

/// Frame budget in milliseconds for a given logic rate
///
/// Never below 1 ms, so game time always advances.
#[inline]
pub fn frame_budget_ms(logic_hz: u32) -> u32 {
    (1000 / logic_hz.max(1)).max(1)
}

/// Wrap a horizontal position so an obstacle leaving one side of the field
/// re-enters from the other.
///
/// Left of `-width` reappears at `field_width`; at or past `field_width`
/// reappears at `-width`.
#[inline]
pub fn wrap_left(left: f32, width: f32, field_width: f32) -> f32 {
    if left < -width {
        field_width
    } else if left >= field_width {
        -width
    } else {
        left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_budget() {
        assert_eq!(frame_budget_ms(30), 33);
        assert_eq!(frame_budget_ms(0), 1000);
        assert_eq!(frame_budget_ms(1000), 1);
        assert_eq!(frame_budget_ms(2000), 1);
    }

    #[test]
    fn test_wrap_left_edges() {
        assert_eq!(wrap_left(-81.0, 80.0, 480.0), 480.0);
        assert_eq!(wrap_left(-80.0, 80.0, 480.0), -80.0);
        assert_eq!(wrap_left(480.0, 80.0, 480.0), -80.0);
        assert_eq!(wrap_left(479.0, 80.0, 480.0), 479.0);
    }
}
