//! Shared handles passed to every component at construction

use std::rc::Rc;

use super::board::Board;
use super::events::EventBus;

/// Event bus plus board geometry
///
/// Cheap to clone; clones share the same bus and board.
#[derive(Debug, Clone)]
pub struct Context {
    pub bus: EventBus,
    pub board: Rc<Board>,
}

impl Context {
    pub fn new(board: Board) -> Self {
        Self {
            bus: EventBus::new(),
            board: Rc::new(board),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Board::default())
    }
}
