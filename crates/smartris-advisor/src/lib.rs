//! Placement advisor: heuristic search for the best resting spot of a piece.
//!
//! The advisor enumerates every rotation and column of the current piece,
//! drops it straight down on a copy of the board and scores the result:
//!
//! ```text
//! score = lines × w_lines − holes × w_holes − heights × w_heights
//! ```
//!
//! # Modules
//!
//! - [`board_metrics`] - The three board metrics the score is built from
//! - [`weights`] - Score weights, loadable from JSON
//! - [`heuristic_advisor`] - Candidate enumeration and selection
//!
//! There is no lookahead: only the falling piece is considered, never the
//! pieces that follow it.
//!
//! # Example
//!
//! ```
//! use smartris_advisor::HeuristicAdvisor;
//! use smartris_engine::{Board, Piece, PieceKind, PlacementAdvisor as _};
//!
//! let advisor = HeuristicAdvisor::default();
//! let piece = Piece::spawn(PieceKind::O);
//!
//! let placement = advisor.suggest(&piece, &Board::EMPTY).unwrap();
//! assert_eq!(placement.position().y(), 18);
//! ```

pub use self::{board_metrics::BoardMetrics, heuristic_advisor::*, weights::HeuristicWeights};

pub mod board_metrics;
pub mod heuristic_advisor;
pub mod weights;
