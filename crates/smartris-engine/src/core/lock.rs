use super::{
    board::Board,
    piece::{Piece, Position},
};

/// Result of merging a piece into the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockOutcome {
    /// Board after stamping the piece and removing complete rows.
    pub board: Board,
    /// Number of rows removed by this lock (0 when none completed).
    pub cleared_lines: usize,
    /// Anchor the next piece spawns at.
    pub spawn_position: Position,
}

/// Locks `piece` into a copy of `board` and clears completed rows.
///
/// The input board is left untouched. Whether the next piece fits at
/// `spawn_position` is for the caller to decide.
///
/// # Example
///
/// ```
/// use smartris_engine::{Board, Piece, PieceKind, Position, lock_piece};
///
/// let board = Board::from_ascii("###.######");
/// let i = Piece::spawn(PieceKind::I)
///     .rotated_right()
///     .with_position(Position::new(3, 16));
///
/// let outcome = lock_piece(&board, &i);
/// assert_eq!(outcome.cleared_lines, 1);
/// assert_eq!(outcome.spawn_position, Position::SPAWN);
/// ```
#[must_use]
pub fn lock_piece(board: &Board, piece: &Piece) -> LockOutcome {
    let mut board = board.clone();
    board.fill_piece(piece);
    let cleared_lines = board.clear_lines();
    LockOutcome {
        board,
        cleared_lines,
        spawn_position: Position::SPAWN,
    }
}
