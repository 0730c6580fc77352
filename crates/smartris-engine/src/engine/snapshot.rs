use std::fmt::{self, Write as _};

use serde::Serialize;

use crate::core::{BOARD_HEIGHT, BOARD_WIDTH, Board, Cell, Piece, PieceKind};

use super::{Placement, SessionState, game_session::GameSession};

/// What a presentation layer draws in a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "kebab-case", tag = "type", content = "kind")]
pub enum DisplayCell {
    Empty,
    Locked(PieceKind),
    Active(PieceKind),
    Focus,
}

impl DisplayCell {
    /// `.` empty, `*` focus, upper-case letter for locked and lower-case
    /// letter for active cells.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            DisplayCell::Empty => '.',
            DisplayCell::Locked(kind) => kind.as_char(),
            DisplayCell::Active(kind) => kind.as_char().to_ascii_lowercase(),
            DisplayCell::Focus => '*',
        }
    }
}

pub type DisplayRows = [[DisplayCell; BOARD_WIDTH]; BOARD_HEIGHT];

/// Read-only copy of everything a presentation layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub board: Board,
    pub falling_piece: Piece,
    /// Where the falling piece would land if hard-dropped now.
    pub ghost_piece: Piece,
    pub score: usize,
    pub completed_pieces: usize,
    pub cleared_lines: usize,
    pub state: SessionState,
    pub paused: bool,
    pub game_over: bool,
    pub advisor_enabled: bool,
    pub suggestion: Option<Placement>,
    pub focus_cell: Option<(usize, usize)>,
}

impl GameSnapshot {
    pub(crate) fn new(session: &GameSession) -> Self {
        Self {
            board: session.board().clone(),
            falling_piece: *session.falling_piece(),
            ghost_piece: session.simulate_drop_position(),
            score: session.score(),
            completed_pieces: session.stats().completed_pieces(),
            cleared_lines: session.stats().total_cleared_lines(),
            state: session.session_state(),
            paused: session.is_paused(),
            game_over: session.is_game_over(),
            advisor_enabled: session.advisor_enabled(),
            suggestion: session.suggestion().copied(),
            focus_cell: session.focus_cell(),
        }
    }

    /// Locked cells with the focus cell and the active piece drawn on top.
    ///
    /// The focus cell is hidden while paused; the active piece covers it
    /// when they overlap. Active cells above the top edge are dropped.
    #[must_use]
    pub fn display_rows(&self) -> DisplayRows {
        let mut rows = [[DisplayCell::Empty; BOARD_WIDTH]; BOARD_HEIGHT];
        for (y, row) in self.board.rows().enumerate() {
            for (x, cell) in row.cells().iter().enumerate() {
                if let Cell::Piece(kind) = cell {
                    rows[y][x] = DisplayCell::Locked(*kind);
                }
            }
        }

        if self.advisor_enabled
            && !self.paused
            && let Some((x, y)) = self.focus_cell
        {
            rows[y][x] = DisplayCell::Focus;
        }

        let active = DisplayCell::Active(self.falling_piece.kind());
        for (x, y) in self.falling_piece.occupied_positions() {
            if let Some((x, y)) = Board::index(x, y) {
                rows[y][x] = active;
            }
        }
        rows
    }
}

impl fmt::Display for GameSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.display_rows() {
            for cell in row {
                f.write_char(cell.as_char())?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}
