//! Board geometry
//!
//! Every spatial constant in the simulation is derived from here.

use serde::{Deserialize, Serialize};

use super::events::{Event, EventBus};
use crate::consts::*;

/// Pixel rectangle the actor may occupy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Immutable grid geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub num_rows: usize,
    pub num_columns: usize,
    pub cell_width: f32,
    pub cell_height: f32,
    /// Pixel top of each row
    rows: Vec<f32>,
    /// Pixel left of each column
    columns: Vec<f32>,
    actor_bounds: Bounds,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(NUM_ROWS, NUM_COLUMNS, CELL_WIDTH, CELL_HEIGHT)
    }
}

impl Board {
    pub fn new(num_rows: usize, num_columns: usize, cell_width: f32, cell_height: f32) -> Self {
        let rows = (0..num_rows).map(|i| i as f32 * cell_height).collect();
        let columns = (0..num_columns).map(|i| i as f32 * cell_width).collect();

        // Top two rows are HUD/goal banner, bottom two are start area + HUD
        let actor_bounds = Bounds {
            left: 0.0,
            right: num_columns as f32 * cell_width,
            top: 2.0 * cell_height,
            bottom: num_rows.saturating_sub(2) as f32 * cell_height,
        };

        Self {
            num_rows,
            num_columns,
            cell_width,
            cell_height,
            rows,
            columns,
            actor_bounds,
        }
    }

    /// Build the board and announce its geometry on the bus
    pub fn initialize(
        bus: &EventBus,
        num_rows: usize,
        num_columns: usize,
        cell_width: f32,
        cell_height: f32,
    ) -> Self {
        let board = Self::new(num_rows, num_columns, cell_width, cell_height);
        board.announce(bus);
        board
    }

    /// Publish the geometry to subscribers
    pub fn announce(&self, bus: &EventBus) {
        bus.publish(Event::BoardInitialized {
            rows: self.num_rows,
            columns: self.num_columns,
            cell_width: self.cell_width,
            cell_height: self.cell_height,
        });
    }

    /// Pixel top of a row (clamped to the last row)
    pub fn row_top(&self, row: usize) -> f32 {
        self.rows
            .get(row.min(self.num_rows.saturating_sub(1)))
            .copied()
            .unwrap_or(0.0)
    }

    /// Pixel left of a column (clamped to the last column)
    pub fn column_left(&self, column: usize) -> f32 {
        self.columns
            .get(column.min(self.num_columns.saturating_sub(1)))
            .copied()
            .unwrap_or(0.0)
    }

    /// Row index whose top is exactly `top`
    pub fn row_of(&self, top: f32) -> Option<usize> {
        self.rows.iter().position(|&r| r == top)
    }

    pub fn rows(&self) -> &[f32] {
        &self.rows
    }

    pub fn columns(&self) -> &[f32] {
        &self.columns
    }

    #[inline]
    pub fn actor_bounds(&self) -> Bounds {
        self.actor_bounds
    }

    /// Playfield width in pixels
    #[inline]
    pub fn width(&self) -> f32 {
        self.num_columns as f32 * self.cell_width
    }

    /// Playfield height in pixels
    #[inline]
    pub fn height(&self) -> f32 {
        self.num_rows as f32 * self.cell_height
    }

    /// Row the actor starts (and restarts) on
    pub fn start_row(&self) -> usize {
        self.num_rows.saturating_sub(2)
    }

    /// Left pixel of the actor's start cell
    pub fn start_left(&self) -> f32 {
        self.column_left(START_COLUMN.min(self.num_columns.saturating_sub(1)))
    }
}
