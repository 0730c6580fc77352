//! Brute-force placement search.
//!
//! For every rotation of the piece and every anchor column from two cells
//! left of the board to two cells right of it, the piece is lowered from
//! [`SEARCH_START_Y`] until it would collide. The last free row is the
//! landing row. Placements that land too high to fit on the board are
//! discarded, the rest are stamped on a copy of the board and scored with
//! [`HeuristicWeights`].
//!
//! Selection keeps the highest score; among equal scores the candidate
//! enumerated last wins (rotations in the outer loop, columns ascending).

use std::ops::RangeInclusive;

use arrayvec::ArrayVec;
use serde::Serialize;
use smartris_engine::{Board, Piece, Placement, PlacementAdvisor, Position};

use crate::{board_metrics::BoardMetrics, weights::HeuristicWeights};

/// Row every search column starts from.
pub const SEARCH_START_Y: i32 = -5;

/// Anchor columns tried for every rotation.
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub const SEARCH_X_RANGE: RangeInclusive<i32> = -2..=(Board::WIDTH as i32 + 1);

/// Highest landing row that is still rejected.
const MAX_REJECTED_LANDING_Y: i32 = -3;

/// Upper bound on the number of candidates for one piece.
pub const MAX_CANDIDATES: usize = 4 * (Board::WIDTH + 4);

/// A feasible placement together with the metrics it was scored on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoveCandidate {
    placement: Placement,
    metrics: BoardMetrics,
}

impl MoveCandidate {
    #[must_use]
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    #[must_use]
    pub fn metrics(&self) -> &BoardMetrics {
        &self.metrics
    }

    #[must_use]
    pub fn score(&self) -> f32 {
        self.placement.score()
    }
}

/// Advisor scoring placements with a weighted sum of [`BoardMetrics`].
#[derive(Debug, Clone, Default)]
pub struct HeuristicAdvisor {
    weights: HeuristicWeights,
}

impl HeuristicAdvisor {
    #[must_use]
    pub fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &HeuristicWeights {
        &self.weights
    }

    /// Returns every feasible candidate in enumeration order.
    ///
    /// The piece's current orientation is the first rotation tried; its
    /// position is ignored.
    #[must_use]
    pub fn candidates(
        &self,
        piece: &Piece,
        board: &Board,
    ) -> ArrayVec<MoveCandidate, MAX_CANDIDATES> {
        let mut candidates = ArrayVec::new();
        for rotated in piece.rotations() {
            for x in SEARCH_X_RANGE {
                let column = rotated.with_position(Position::new(x, SEARCH_START_Y));
                let Some(landed) = landing_piece(column, board) else {
                    continue;
                };
                let mut stamped = board.clone();
                stamped.fill_piece(&landed);
                let metrics = BoardMetrics::from_board(&stamped);
                let score = self.weights.score(&metrics);
                candidates.push(MoveCandidate {
                    placement: Placement::new(landed, score),
                    metrics,
                });
            }
        }
        candidates
    }

    /// Returns the best candidate, preferring the last one on ties.
    #[must_use]
    pub fn best_candidate(&self, piece: &Piece, board: &Board) -> Option<MoveCandidate> {
        let mut best: Option<MoveCandidate> = None;
        for candidate in self.candidates(piece, board) {
            if best.is_none_or(|best| candidate.score() >= best.score()) {
                best = Some(candidate);
            }
        }
        best
    }
}

impl PlacementAdvisor for HeuristicAdvisor {
    fn suggest(&self, piece: &Piece, board: &Board) -> Option<Placement> {
        self.best_candidate(piece, board)
            .map(|candidate| candidate.placement)
    }
}

/// Lowers `piece` while it stays free and returns it at the last free row.
///
/// Returns `None` when the piece collides at its starting row or lands at or
/// above [`MAX_REJECTED_LANDING_Y`].
fn landing_piece(piece: Piece, board: &Board) -> Option<Piece> {
    if board.is_colliding(&piece) {
        return None;
    }
    let mut landed = piece;
    loop {
        let next = landed.down();
        if board.is_colliding(&next) {
            break;
        }
        landed = next;
    }
    (landed.position().y() > MAX_REJECTED_LANDING_Y).then_some(landed)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use smartris_engine::{
        GameSession, GravityTimer, Intent, PieceKind, SequencePieceSource,
    };

    use super::*;

    fn advisor() -> HeuristicAdvisor {
        HeuristicAdvisor::default()
    }

    #[test]
    fn test_t_on_empty_board() {
        let piece = Piece::spawn(PieceKind::T);
        let best = advisor().best_candidate(&piece, &Board::EMPTY).unwrap();
        assert_eq!(best.metrics().lines, 0);
        assert_eq!(best.metrics().holes, 0);
        // flat side down: column heights 1 + 2 + 1
        assert_eq!(best.metrics().heights, 4);
        assert_eq!(*best.placement().piece().shape(), PieceKind::T.base_shape());
        assert_eq!(best.placement().piece().kind(), PieceKind::T);
    }

    #[test]
    fn test_candidates_are_feasible() {
        let board = Board::from_ascii(
            r"
            .....#....
            ....###...
            ..#######.
            .########.
            ",
        );
        for kind in PieceKind::ALL {
            let piece = Piece::spawn(kind);
            let candidates = advisor().candidates(&piece, &board);
            assert!(!candidates.is_empty(), "{kind}");
            for candidate in &candidates {
                let landed = candidate.placement().piece();
                assert!(landed.position().y() > -3, "{kind}: {}", landed.position());
                assert!(!board.is_colliding(landed), "{kind}: {}", landed.position());
                assert!(board.is_colliding(&landed.down()), "{kind} floats");
                assert!(SEARCH_X_RANGE.contains(&landed.position().x()));
            }
        }
    }

    #[test]
    fn test_candidates_cover_every_rotation_without_dedup() {
        let piece = Piece::spawn(PieceKind::O);
        let candidates = advisor().candidates(&piece, &Board::EMPTY);
        // O is 2 wide: anchors 0..=8 fit, for each of the 4 identical rotations
        assert_eq!(candidates.len(), 4 * 9);
    }

    #[test]
    fn test_ties_go_to_last_candidate() {
        let piece = Piece::spawn(PieceKind::O);
        let advisor = advisor();
        let candidates = advisor.candidates(&piece, &Board::EMPTY);
        // `max_by` returns the last of several equal maxima
        let last_max = candidates
            .iter()
            .max_by(|a, b| a.score().total_cmp(&b.score()))
            .unwrap();

        let best = advisor.suggest(&piece, &Board::EMPTY).unwrap();
        assert_eq!(&best, last_max.placement());
        // every O placement on an empty board scores the same
        assert_eq!(best.position(), Position::new(8, 18));
    }

    #[test]
    fn test_full_board_offers_only_placements_above_it() {
        let board = Board::from_ascii(&"##########\n".repeat(Board::HEIGHT));
        for kind in PieceKind::ALL {
            let candidates = advisor().candidates(&Piece::spawn(kind), &board);
            assert!(!candidates.is_empty(), "{kind}");
            for candidate in &candidates {
                let piece = candidate.placement().piece();
                assert!(piece.occupied_positions().all(|(_x, y)| y < 0));
                assert!(piece.shape().rows() <= 2, "{kind}");
            }
        }
    }

    #[test]
    fn test_landing_at_minus_three_is_rejected() {
        let vertical = Piece::spawn(PieceKind::I).rotated_right();
        let start = vertical.with_position(Position::new(0, SEARCH_START_Y));

        // rows 0 and 1 free
        let board = Board::from_ascii(&"##########\n".repeat(Board::HEIGHT - 2));
        let landed = landing_piece(start, &board).unwrap();
        assert_eq!(landed.position().y(), -2);

        // only row 0 free
        let board = Board::from_ascii(&"##########\n".repeat(Board::HEIGHT - 1));
        assert_eq!(landing_piece(start, &board), None);
        let candidates = advisor().candidates(&vertical, &board);
        assert!(!candidates.is_empty());
        assert!(
            candidates
                .iter()
                .all(|candidate| candidate.placement().piece().shape().rows() == 1)
        );
    }

    #[test]
    fn test_start_outside_walls_is_infeasible() {
        let piece = Piece::spawn(PieceKind::I).with_position(Position::new(-2, SEARCH_START_Y));
        assert_eq!(landing_piece(piece, &Board::EMPTY), None);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let board = Board::from_ascii(
            r"
            ....##....
            ###.######
            ",
        );
        let piece = Piece::spawn(PieceKind::L).with_position(Position::new(2, 5));
        let board_before = board.clone();
        let piece_before = piece;
        let _ = advisor().suggest(&piece, &board);
        assert_eq!(board, board_before);
        assert_eq!(piece, piece_before);
    }

    #[test]
    fn test_prefers_clearing_lines() {
        let board = Board::from_ascii("###.######");
        let piece = Piece::spawn(PieceKind::I);
        let best = advisor().best_candidate(&piece, &board).unwrap();
        assert_eq!(best.metrics().lines, 1);
        assert_eq!(best.placement().position(), Position::new(3, 16));
    }

    #[test]
    fn test_custom_weights_change_choice() {
        let board = Board::from_ascii("###.######");
        let piece = Piece::spawn(PieceKind::I);
        let weights = HeuristicWeights {
            lines: -1000.0,
            ..HeuristicWeights::default()
        };
        let best = HeuristicAdvisor::new(weights)
            .best_candidate(&piece, &board)
            .unwrap();
        assert_eq!(best.metrics().lines, 0);
    }

    #[test]
    fn test_session_tracks_advisor_suggestion() {
        let mut session = GameSession::with_source(
            Box::new(HeuristicAdvisor::default()),
            Box::new(SequencePieceSource::new([PieceKind::I, PieceKind::O])),
            GravityTimer::new(Duration::from_millis(100)),
        );
        session.set_board(Board::from_ascii("###.######"));
        let suggestion = *session.suggestion().unwrap();
        assert_eq!(suggestion.position(), Position::new(3, 16));
        assert_eq!(session.focus_cell(), Some((3, 18)));

        session.apply(Intent::Rotate);
        session.apply(Intent::MoveLeft);
        session.apply(Intent::HardDrop);
        assert_eq!(session.score(), 100);
        assert_eq!(
            session.suggestion().unwrap().piece().kind(),
            PieceKind::O
        );

        session.apply(Intent::ToggleAdvisor);
        assert!(session.suggestion().is_none());
        session.apply(Intent::ToggleAdvisor);
        assert!(session.suggestion().is_some());
    }
}
