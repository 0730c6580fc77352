use crate::{
    PieceCollisionError, SpawnCollisionError,
    core::{Board, Piece, lock_piece},
};

use super::piece_source::PieceSource;

/// Board, falling piece and the source of upcoming pieces.
///
/// Every move is validated against the board; a rejected move leaves the
/// field unchanged and reports [`PieceCollisionError`].
#[derive(Debug)]
pub struct GameField {
    board: Board,
    falling_piece: Piece,
    piece_source: Box<dyn PieceSource>,
}

impl GameField {
    /// Creates a field with an empty board and the first piece spawned.
    #[must_use]
    pub fn new(mut piece_source: Box<dyn PieceSource>) -> Self {
        let falling_piece = Piece::spawn(piece_source.next_kind());
        Self {
            board: Board::EMPTY,
            falling_piece,
            piece_source,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn falling_piece(&self) -> &Piece {
        &self.falling_piece
    }

    pub fn set_falling_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if self.board.is_colliding(&piece) {
            return Err(PieceCollisionError);
        }
        self.falling_piece = piece;
        Ok(())
    }

    pub fn try_move_left(&mut self) -> Result<(), PieceCollisionError> {
        self.set_falling_piece(self.falling_piece.left())
    }

    pub fn try_move_right(&mut self) -> Result<(), PieceCollisionError> {
        self.set_falling_piece(self.falling_piece.right())
    }

    pub fn try_move_down(&mut self) -> Result<(), PieceCollisionError> {
        self.set_falling_piece(self.falling_piece.down())
    }

    /// Rotates clockwise in place; there are no wall kicks.
    pub fn try_rotate(&mut self) -> Result<(), PieceCollisionError> {
        self.set_falling_piece(self.falling_piece.rotated_right())
    }

    /// Returns where the falling piece would come to rest if dropped straight down.
    #[must_use]
    pub fn simulate_drop_position(&self) -> Piece {
        let mut dropped = self.falling_piece;
        loop {
            let next = dropped.down();
            if self.board.is_colliding(&next) {
                return dropped;
            }
            dropped = next;
        }
    }

    /// Locks the falling piece, clears lines and spawns the next piece.
    ///
    /// Returns the number of cleared lines, and an error when the new piece
    /// collides at its spawn position. The colliding piece is still installed
    /// as the falling piece so it can be shown.
    pub fn lock_falling_piece(&mut self) -> (usize, Result<(), SpawnCollisionError>) {
        let outcome = lock_piece(&self.board, &self.falling_piece);
        self.board = outcome.board;

        let kind = self.piece_source.next_kind();
        self.falling_piece = Piece::spawn(kind).with_position(outcome.spawn_position);
        if self.board.is_colliding(&self.falling_piece) {
            return (outcome.cleared_lines, Err(SpawnCollisionError));
        }
        (outcome.cleared_lines, Ok(()))
    }

    /// Clears the board and spawns a fresh piece from the same source.
    pub fn reset(&mut self) {
        self.board = Board::EMPTY;
        self.falling_piece = Piece::spawn(self.piece_source.next_kind());
    }

    /// Replaces the board, keeping the falling piece.
    ///
    /// Useful for setting up positions; the falling piece may now collide.
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
    }
}
