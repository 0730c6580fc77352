//! Game engine logic and state management.
//!
//! This module drives the core data structures through a game:
//!
//! - [`GameField`] - Board, falling piece and piece source
//! - [`GameSession`] - Session state machine with gravity, statistics and advisor
//! - [`GameStats`] - Score, locked pieces and cleared lines
//! - [`GravityTimer`] - Repeating gravity schedule fed with elapsed time
//! - [`Intent`] - Player inputs accepted by the session
//! - [`PieceSource`] - Supplier of spawned piece kinds
//! - [`PlacementAdvisor`] - Seam for the placement suggestion search
//! - [`GameSnapshot`] - Read-only view for presentation layers
//!
//! # Game Flow
//!
//! 1. A piece spawns at the top center of the board
//! 2. Gravity and player intents move it until it can no longer descend
//! 3. The piece locks, full rows are cleared and the score increases
//! 4. The next piece spawns; if it collides immediately the game is over
//!
//! After every spawn the session asks its advisor for the best placement of
//! the new piece, unless the advisor is switched off.
//!
//! # Example
//!
//! ```
//! use smartris_engine::{GameField, PieceKind, SequencePieceSource};
//!
//! let mut field = GameField::new(Box::new(SequencePieceSource::new([PieceKind::I])));
//!
//! field.try_move_left().ok();
//! field.try_rotate().ok();
//! while field.try_move_down().is_ok() {}
//!
//! let (cleared_lines, result) = field.lock_falling_piece();
//! assert_eq!(cleared_lines, 0);
//! assert!(result.is_ok());
//! ```

pub use self::{
    advisor::*, game_field::*, game_session::*, game_stats::*, gravity::*, intent::*,
    piece_source::*, snapshot::*,
};

mod advisor;
mod game_field;
mod game_session;
mod game_stats;
mod gravity;
mod intent;
mod piece_source;
mod snapshot;
