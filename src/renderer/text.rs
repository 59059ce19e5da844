//! ASCII surface for terminals and logs

use std::fmt;

use super::{Drawable, Sprite, Visual};
use crate::sim::{Board, ObstacleKind, Pose};

/// Draws each frame as a grid of characters, one per board cell
#[derive(Debug, Clone)]
pub struct TextSurface {
    rows: usize,
    columns: usize,
    cell_width: f32,
    cell_height: f32,
    grid: Vec<Vec<char>>,
    /// The last completed frame
    lines: Vec<String>,
}

impl TextSurface {
    pub fn new(board: &Board) -> Self {
        Self {
            rows: board.num_rows,
            columns: board.num_columns,
            cell_width: board.cell_width,
            cell_height: board.cell_height,
            grid: vec![vec!['.'; board.num_columns]; board.num_rows],
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn glyph(visual: &Visual) -> char {
        match visual {
            Visual::Obstacle { kind, frame } => match kind {
                ObstacleKind::Vehicle { variant: 4 } => 'T',
                ObstacleKind::Vehicle { .. } => 'C',
                ObstacleKind::Log => '=',
                ObstacleKind::Turtle => match frame {
                    0 => 'O',
                    1 | 2 => 'o',
                    _ => '~',
                },
                ObstacleKind::Goal { .. } => '_',
                ObstacleKind::ClaimedGoal => '#',
            },
            Visual::Actor { pose: Pose::Dead } => 'X',
            Visual::Actor { .. } => '@',
        }
    }
}

impl Drawable for TextSurface {
    fn begin_frame(&mut self) {
        for row in &mut self.grid {
            row.fill('.');
        }
    }

    fn render_at(&mut self, sprite: &Sprite) {
        let row = (sprite.top / self.cell_height).floor();
        if row < 0.0 || row as usize >= self.rows {
            return;
        }

        // Every column whose cell center lies inside the sprite
        let glyph = Self::glyph(&sprite.visual);
        let cells = &mut self.grid[row as usize];
        for (column, cell) in cells.iter_mut().enumerate().take(self.columns) {
            let center = (column as f32 + 0.5) * self.cell_width;
            if center >= sprite.left && center < sprite.left + sprite.width {
                *cell = glyph;
            }
        }
    }

    fn end_frame(&mut self) {
        self.lines = self.grid.iter().map(|row| row.iter().collect()).collect();
    }
}

impl fmt::Display for TextSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
