//! Board metrics used by the heuristic score.

use std::iter;

use serde::{Deserialize, Serialize};
use smartris_engine::Board;

/// Metrics of a board after a piece was stamped on it, before any line clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoardMetrics {
    /// Number of completely filled rows.
    pub lines: usize,
    /// Empty cells lying below the topmost occupied cell of their column.
    pub holes: usize,
    /// Sum of column heights, counting only non-empty columns.
    pub heights: usize,
}

impl BoardMetrics {
    /// Computes all metrics of `board`.
    ///
    /// # Example
    ///
    /// ```
    /// use smartris_advisor::BoardMetrics;
    /// use smartris_engine::Board;
    ///
    /// let board = Board::from_ascii(
    ///     r"
    ///     .#........
    ///     ..........
    ///     ###########
    ///     ",
    /// );
    /// let metrics = BoardMetrics::from_board(&board);
    /// assert_eq!(metrics.lines, 1);
    /// assert_eq!(metrics.holes, 1);
    /// assert_eq!(metrics.heights, 9 + 3);
    /// ```
    #[must_use]
    pub fn from_board(board: &Board) -> Self {
        let heights = column_heights(board);
        let occupied = column_occupied_cells(board);
        Self {
            lines: board.count_filled_lines(),
            holes: iter::zip(&heights, &occupied).map(|(h, o)| h - o).sum(),
            heights: heights.iter().sum(),
        }
    }
}

/// Height of each column: distance from the floor to the top of the topmost
/// occupied cell, or zero for an empty column.
#[must_use]
pub fn column_heights(board: &Board) -> [usize; Board::WIDTH] {
    let mut column_heights = [0; Board::WIDTH];
    for (x, h) in column_heights.iter_mut().enumerate() {
        let top = board
            .rows()
            .enumerate()
            .find(|(_y, row)| row.is_cell_occupied(x));
        let Some((top, _)) = top else {
            continue;
        };
        *h = Board::HEIGHT - top;
    }
    column_heights
}

fn column_occupied_cells(board: &Board) -> [usize; Board::WIDTH] {
    let mut column_occupied_cells = [0; Board::WIDTH];
    for row in board.rows() {
        for (x, o) in column_occupied_cells.iter_mut().enumerate() {
            if row.is_cell_occupied(x) {
                *o += 1;
            }
        }
    }
    column_occupied_cells
}
