use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    PieceCollisionError,
    core::{Board, Piece},
};

use super::{
    GameStats, GravityTimer, Intent, PieceSeed, PieceSource, RandomPieceSource,
    advisor::{Placement, PlacementAdvisor},
    game_field::GameField,
    snapshot::GameSnapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
}

/// A single-player game: field, statistics, gravity and advisor.
///
/// All input arrives as [`Intent`]s or as elapsed time through
/// [`Self::advance`]; every call runs to completion, including the
/// lock-clear-spawn sequence after a hard drop.
///
/// While paused, piece intents are ignored and gravity does not fire. After
/// game over, only [`Intent::NewGame`] and [`Intent::ToggleAdvisor`] have an
/// effect, and only new-game leaves the game-over state.
///
/// # Example
///
/// ```
/// use smartris_engine::{GameSession, Intent, Piece, Board, Placement, PlacementAdvisor};
///
/// #[derive(Debug)]
/// struct NoAdvice;
///
/// impl PlacementAdvisor for NoAdvice {
///     fn suggest(&self, _piece: &Piece, _board: &Board) -> Option<Placement> {
///         None
///     }
/// }
///
/// let mut session = GameSession::new(Box::new(NoAdvice));
/// session.apply(Intent::HardDrop);
/// assert_eq!(session.stats().completed_pieces(), 1);
///
/// session.apply(Intent::TogglePause);
/// assert!(session.is_paused());
/// session.apply(Intent::HardDrop);
/// assert_eq!(session.stats().completed_pieces(), 1);
/// ```
#[derive(Debug)]
pub struct GameSession {
    field: GameField,
    stats: GameStats,
    session_state: SessionState,
    gravity: GravityTimer,
    advisor: Box<dyn PlacementAdvisor>,
    advisor_enabled: bool,
    suggestion: Option<Placement>,
}

impl GameSession {
    /// Creates a session with uniformly random pieces and the default
    /// gravity interval. The advisor starts enabled.
    #[must_use]
    pub fn new(advisor: Box<dyn PlacementAdvisor>) -> Self {
        Self::with_source(
            advisor,
            Box::new(RandomPieceSource::new()),
            GravityTimer::default(),
        )
    }

    /// Creates a session whose piece sequence is reproducible from `seed`.
    #[must_use]
    pub fn with_seed(advisor: Box<dyn PlacementAdvisor>, seed: PieceSeed) -> Self {
        Self::with_source(
            advisor,
            Box::new(RandomPieceSource::with_seed(seed)),
            GravityTimer::default(),
        )
    }

    #[must_use]
    pub fn with_source(
        advisor: Box<dyn PlacementAdvisor>,
        piece_source: Box<dyn PieceSource>,
        gravity: GravityTimer,
    ) -> Self {
        let mut session = Self {
            field: GameField::new(piece_source),
            stats: GameStats::new(),
            session_state: SessionState::Playing,
            gravity,
            advisor,
            advisor_enabled: true,
            suggestion: None,
        };
        session.gravity.reschedule();
        session.refresh_suggestion();
        session
    }

    #[must_use]
    pub fn field(&self) -> &GameField {
        &self.field
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        self.field.board()
    }

    #[must_use]
    pub fn falling_piece(&self) -> &Piece {
        self.field.falling_piece()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.stats.score()
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.session_state.is_paused()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.session_state.is_game_over()
    }

    #[must_use]
    pub fn advisor_enabled(&self) -> bool {
        self.advisor_enabled
    }

    /// The advisor's placement for the falling piece, if enabled and feasible.
    #[must_use]
    pub fn suggestion(&self) -> Option<&Placement> {
        self.suggestion.as_ref()
    }

    #[must_use]
    pub fn focus_cell(&self) -> Option<(usize, usize)> {
        self.suggestion.as_ref().and_then(Placement::focus_cell)
    }

    #[must_use]
    pub fn gravity(&self) -> &GravityTimer {
        &self.gravity
    }

    #[must_use]
    pub fn simulate_drop_position(&self) -> Piece {
        self.field.simulate_drop_position()
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::new(self)
    }

    pub fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::MoveLeft => self.move_left(),
            Intent::MoveRight => self.move_right(),
            Intent::SoftDrop => self.soft_drop(),
            Intent::Rotate => self.rotate(),
            Intent::HardDrop => self.hard_drop(),
            Intent::TogglePause => self.toggle_pause(),
            Intent::ToggleAdvisor => self.toggle_advisor(),
            Intent::NewGame => self.new_game(),
        }
    }

    /// Feeds elapsed wall-clock time and runs every gravity tick that became due.
    ///
    /// Returns the number of ticks that were applied.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let due = self.gravity.advance(elapsed);
        let mut applied = 0;
        for _ in 0..due {
            if !self.session_state.is_playing() {
                break;
            }
            self.tick();
            applied += 1;
        }
        applied
    }

    /// One gravity step: move down, or lock and spawn when blocked.
    pub fn tick(&mut self) {
        if !self.session_state.is_playing() {
            return;
        }
        self.auto_drop_and_complete();
    }

    pub fn move_left(&mut self) {
        if self.session_state.is_playing() {
            let _ = self.field.try_move_left();
        }
    }

    pub fn move_right(&mut self) {
        if self.session_state.is_playing() {
            let _ = self.field.try_move_right();
        }
    }

    pub fn rotate(&mut self) {
        if self.session_state.is_playing() {
            let _ = self.field.try_rotate();
        }
    }

    /// Same as a gravity tick, triggered by input.
    pub fn soft_drop(&mut self) {
        if self.session_state.is_playing() {
            self.auto_drop_and_complete();
        }
    }

    /// Drops the piece to its resting row and locks it immediately.
    pub fn hard_drop(&mut self) {
        if self.session_state.is_playing() {
            while self.try_soft_drop().is_ok() {}
            self.complete_piece_drop();
        }
    }

    pub fn toggle_pause(&mut self) {
        self.session_state = match self.session_state {
            SessionState::Playing => {
                self.gravity.cancel();
                SessionState::Paused
            }
            SessionState::Paused => {
                self.gravity.reschedule();
                SessionState::Playing
            }
            SessionState::GameOver => SessionState::GameOver,
        };
    }

    pub fn toggle_advisor(&mut self) {
        self.advisor_enabled = !self.advisor_enabled;
        self.refresh_suggestion();
    }

    /// Starts over: empty board, zeroed statistics, fresh piece.
    ///
    /// The piece source and the advisor-enabled flag carry over.
    pub fn new_game(&mut self) {
        self.field.reset();
        self.stats = GameStats::new();
        self.session_state = SessionState::Playing;
        self.gravity.reschedule();
        self.refresh_suggestion();
    }

    /// Replaces the locked cells and recomputes the suggestion.
    ///
    /// Intended for setting up positions; the falling piece is kept as is.
    pub fn set_board(&mut self, board: Board) {
        self.field.set_board(board);
        self.refresh_suggestion();
    }

    fn try_soft_drop(&mut self) -> Result<(), PieceCollisionError> {
        self.field.try_move_down()
    }

    fn auto_drop_and_complete(&mut self) {
        if self.try_soft_drop().is_ok() {
            return;
        }
        self.complete_piece_drop();
    }

    fn complete_piece_drop(&mut self) {
        let (cleared_lines, result) = self.field.lock_falling_piece();
        self.stats.complete_piece_drop(cleared_lines);
        if result.is_err() {
            self.session_state = SessionState::GameOver;
            self.gravity.cancel();
        }
        self.refresh_suggestion();
    }

    fn refresh_suggestion(&mut self) {
        self.suggestion = if self.advisor_enabled && !self.session_state.is_game_over() {
            self.advisor
                .suggest(self.field.falling_piece(), self.field.board())
        } else {
            None
        };
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell as Counter;

    use super::*;
    use crate::{
        core::{Cell, PieceKind, Position},
        engine::piece_source::SequencePieceSource,
    };

    /// Suggests the straight drop of the piece and counts its calls.
    #[derive(Debug, Default)]
    struct StraightDropAdvisor {
        calls: Counter<usize>,
    }

    impl PlacementAdvisor for StraightDropAdvisor {
        fn suggest(&self, piece: &Piece, board: &Board) -> Option<Placement> {
            self.calls.set(self.calls.get() + 1);
            let mut dropped = *piece;
            while !board.is_colliding(&dropped.down()) {
                dropped = dropped.down();
            }
            Some(Placement::new(dropped, 0.0))
        }
    }

    fn session(kinds: &[PieceKind]) -> GameSession {
        GameSession::with_source(
            Box::new(StraightDropAdvisor::default()),
            Box::new(SequencePieceSource::new(kinds.iter().copied())),
            GravityTimer::default(),
        )
    }

    fn blocked_spawn_board() -> Board {
        let mut board = Board::EMPTY;
        for y in 2..Board::HEIGHT {
            board.set_cell(4, y, Cell::Piece(PieceKind::J));
        }
        board
    }

    #[test]
    fn test_o_piece_descends_then_locks() {
        let mut session = session(&[PieceKind::O, PieceKind::T]);
        for _ in 0..18 {
            session.tick();
        }
        assert_eq!(session.falling_piece().kind(), PieceKind::O);
        assert_eq!(session.falling_piece().position(), Position::new(4, 18));
        assert_eq!(session.stats().completed_pieces(), 0);

        session.tick();
        assert_eq!(session.stats().completed_pieces(), 1);
        assert_eq!(session.falling_piece().kind(), PieceKind::T);
        for (x, y) in [(4, 18), (5, 18), (4, 19), (5, 19)] {
            assert!(session.board().is_occupied(x, y));
        }
    }

    #[test]
    fn test_vertical_i_fills_gap_and_scores() {
        let mut session = session(&[PieceKind::I, PieceKind::O]);
        session.set_board(Board::from_ascii("###.######"));

        session.apply(Intent::Rotate);
        session.apply(Intent::MoveLeft);
        assert_eq!(session.falling_piece().position(), Position::new(3, 0));
        session.apply(Intent::HardDrop);

        assert_eq!(session.score(), 100);
        assert_eq!(session.stats().total_cleared_lines(), 1);
        // the rest of the I remains in column 3, shifted down one row
        for y in 0..Board::HEIGHT {
            let expected = (17..=19).contains(&y);
            assert_eq!(session.board().is_occupied(3, y), expected, "row {y}");
        }
        assert_eq!(session.board().count_filled_lines(), 0);
    }

    #[test]
    fn test_gravity_follows_elapsed_time() {
        let mut session = session(&[PieceKind::O]);
        assert_eq!(session.advance(Duration::from_millis(699)), 0);
        assert_eq!(session.falling_piece().position().y(), 0);
        assert_eq!(session.advance(Duration::from_millis(1)), 1);
        assert_eq!(session.advance(Duration::from_millis(1400)), 2);
        assert_eq!(session.falling_piece().position().y(), 3);
    }

    #[test]
    fn test_huge_elapsed_time_plays_out_to_game_over() {
        let mut session = session(&[PieceKind::O]);
        assert!(session.advance(Duration::MAX) > 0);
        assert!(session.is_game_over());
        assert_eq!(session.stats().completed_pieces(), 10);
        assert_eq!(session.advance(Duration::MAX), 0);
    }

    #[test]
    fn test_simulate_drop_position_leaves_piece_in_place() {
        let mut session = session(&[PieceKind::T]);
        session.set_board(Board::from_ascii("##########"));
        let landed = session.simulate_drop_position();
        assert_eq!(landed.position(), Position::new(4, 17));
        assert_eq!(session.falling_piece().position(), Position::new(4, 0));
    }

    #[test]
    fn test_pause_blocks_gravity_and_piece_intents() {
        let mut session = session(&[PieceKind::T]);
        session.apply(Intent::TogglePause);
        assert!(session.is_paused());
        assert!(!session.gravity().is_scheduled());

        let before = *session.falling_piece();
        assert_eq!(session.advance(Duration::from_secs(10)), 0);
        for intent in Intent::ALL.into_iter().filter(|i| i.is_piece_control()) {
            session.apply(intent);
        }
        session.tick();
        assert_eq!(session.falling_piece(), &before);
        assert_eq!(session.stats().completed_pieces(), 0);

        session.apply(Intent::TogglePause);
        assert!(session.session_state().is_playing());
        assert!(session.gravity().is_scheduled());
        assert_eq!(session.advance(Duration::from_millis(700)), 1);
        assert_eq!(session.falling_piece().position().y(), 1);
    }

    #[test]
    fn test_resume_discards_partial_interval() {
        let mut session = session(&[PieceKind::T]);
        session.advance(Duration::from_millis(600));
        session.apply(Intent::TogglePause);
        session.apply(Intent::TogglePause);
        assert_eq!(session.advance(Duration::from_millis(600)), 0);
        assert_eq!(session.advance(Duration::from_millis(100)), 1);
    }

    #[test]
    fn test_game_over_is_cleared_only_by_new_game() {
        let mut session = session(&[PieceKind::O]);
        session.set_board(blocked_spawn_board());
        session.apply(Intent::HardDrop);

        assert!(session.is_game_over());
        assert!(session.suggestion().is_none());
        assert!(!session.gravity().is_scheduled());

        let board = session.board().clone();
        let piece = *session.falling_piece();
        for intent in Intent::ALL
            .into_iter()
            .filter(|i| *i != Intent::NewGame)
        {
            session.apply(intent);
            assert!(session.is_game_over(), "{intent} left game over");
        }
        session.tick();
        session.advance(Duration::from_secs(5));
        assert!(session.is_game_over());
        assert_eq!(session.board(), &board);
        assert_eq!(session.falling_piece(), &piece);
        assert!(session.suggestion().is_none());

        session.apply(Intent::NewGame);
        assert!(session.session_state().is_playing());
        assert_eq!(session.board(), &Board::EMPTY);
        assert_eq!(session.score(), 0);
        assert_eq!(session.stats().completed_pieces(), 0);
        assert!(session.gravity().is_scheduled());
    }

    #[test]
    fn test_toggle_advisor() {
        let mut session = session(&[PieceKind::T, PieceKind::S]);
        assert!(session.advisor_enabled());
        let suggestion = session.suggestion().copied().unwrap();
        assert_eq!(suggestion.position(), Position::new(4, 18));
        assert_eq!(session.focus_cell(), Some((5, 19)));

        session.apply(Intent::ToggleAdvisor);
        assert!(!session.advisor_enabled());
        assert!(session.suggestion().is_none());
        assert!(session.focus_cell().is_none());

        // no suggestion is computed for the next piece while disabled
        session.apply(Intent::HardDrop);
        assert!(session.suggestion().is_none());

        session.apply(Intent::ToggleAdvisor);
        let suggestion = session.suggestion().unwrap();
        assert_eq!(suggestion.piece().kind(), PieceKind::S);
    }

    #[test]
    fn test_suggestion_follows_each_spawn() {
        let mut session = session(&[PieceKind::I, PieceKind::O]);
        assert_eq!(session.suggestion().unwrap().piece().kind(), PieceKind::I);
        session.apply(Intent::HardDrop);
        let suggestion = session.suggestion().unwrap();
        assert_eq!(suggestion.piece().kind(), PieceKind::O);
        assert_eq!(suggestion.position(), Position::new(4, 17));
    }

    #[test]
    fn test_toggle_pause_ignored_after_game_over() {
        let mut session = session(&[PieceKind::O]);
        session.set_board(blocked_spawn_board());
        session.apply(Intent::SoftDrop);
        assert!(session.is_game_over());
        session.toggle_pause();
        assert!(session.is_game_over());
    }
}
