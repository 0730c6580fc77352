//! Core data structures: board, pieces, collision and lock-and-clear.

pub use self::{board::*, lock::*, piece::*};

pub(crate) mod board;
pub(crate) mod lock;
pub(crate) mod piece;

/// Number of columns on the board.
pub const BOARD_WIDTH: usize = 10;
/// Number of rows on the board.
pub const BOARD_HEIGHT: usize = 20;

pub(crate) const SPAWN_Y: i32 = 0;
