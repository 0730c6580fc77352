//! Simulation core of a falling-block puzzle game.
//!
//! - [`core`] - Board, pieces, collision and lock-and-clear
//! - [`engine`] - Game field, session state machine, gravity and intents
//!
//! The library never reads input or draws anything: callers feed
//! [`Intent`]s and elapsed time into a [`GameSession`] and read back a
//! [`GameSnapshot`].

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece colliding when setting falling piece")]
pub struct PieceCollisionError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("spawned piece collides with the board")]
pub struct SpawnCollisionError;
