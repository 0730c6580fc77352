use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{Board, Piece, Position};

/// Suggests a final resting placement for a piece.
///
/// Implementations must not depend on anything but their arguments: the
/// session calls them with its live board and expects no side effects.
pub trait PlacementAdvisor: fmt::Debug {
    /// Returns the best placement for `piece` on `board`, or `None` if the
    /// piece has no feasible resting position.
    fn suggest(&self, piece: &Piece, board: &Board) -> Option<Placement>;
}

impl<A> PlacementAdvisor for Box<A>
where
    A: PlacementAdvisor + ?Sized,
{
    fn suggest(&self, piece: &Piece, board: &Board) -> Option<Placement> {
        (**self).suggest(piece, board)
    }
}

/// A suggested resting placement: the piece in its target orientation at
/// its landing anchor, together with the score it was chosen by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    piece: Piece,
    score: f32,
}

impl Placement {
    #[must_use]
    pub const fn new(piece: Piece, score: f32) -> Self {
        Self { piece, score }
    }

    /// The piece at its target orientation and landing anchor.
    #[must_use]
    pub const fn piece(&self) -> &Piece {
        &self.piece
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.piece.position()
    }

    #[must_use]
    pub const fn score(&self) -> f32 {
        self.score
    }

    /// Single cell highlighting the placement: the rounded centroid of the
    /// shape's filled cells, offset by the anchor.
    ///
    /// Returns `None` when that cell falls outside the board.
    ///
    /// # Example
    ///
    /// ```
    /// use smartris_engine::{Piece, PieceKind, Placement, Position};
    ///
    /// let piece = Piece::spawn(PieceKind::O).with_position(Position::new(0, 18));
    /// let placement = Placement::new(piece, 0.0);
    /// assert_eq!(placement.focus_cell(), Some((1, 19)));
    /// ```
    #[must_use]
    pub fn focus_cell(&self) -> Option<(usize, usize)> {
        let (cx, cy) = self.piece.shape().centroid();
        let anchor = self.piece.position();
        Board::index(anchor.x() + cx, anchor.y() + cy)
    }
}
