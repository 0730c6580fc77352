use std::{cmp::Ordering, ops::ControlFlow, path::PathBuf};

use serde::Serialize;
use smartris_advisor::{HeuristicAdvisor, HeuristicWeights};
use smartris_engine::{Board, GameSession, GameStats, Intent, Piece, PieceSeed, Placement};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Number of games to play
    #[arg(long, default_value_t = 1)]
    games: usize,
    /// Stop a game after this many locked pieces
    #[arg(long, default_value_t = 1000)]
    max_pieces: usize,
    /// Piece seed (32 hex digits); game `i` uses `seed + i`
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
enum GameEnd {
    #[display("game over")]
    GameOver,
    #[display("piece limit reached")]
    PieceLimit,
}

#[derive(Debug, Clone, Serialize)]
struct GameRecord {
    seed: PieceSeed,
    end: GameEnd,
    stats: GameStats,
    final_board: Board,
}

#[derive(Debug, Clone, Serialize)]
struct AutoPlaySummary {
    weights: HeuristicWeights,
    games: usize,
    max_pieces: usize,
    average_score: f64,
    best_score: usize,
    records: Vec<GameRecord>,
}

pub(crate) fn run(arg: &AutoPlayArg, advisor: &HeuristicAdvisor) -> anyhow::Result<()> {
    let AutoPlayArg {
        games,
        max_pieces,
        seed,
        output,
    } = arg;

    let base_seed = util::seed_or_random(*seed);
    eprintln!("Playing {games} games with up to {max_pieces} pieces each...");

    let mut records = Vec::with_capacity(*games);
    for i in 0..*games {
        let seed = PieceSeed::from_u128(base_seed.as_u128().wrapping_add(i as u128));
        let mut session = GameSession::with_seed(Box::new(advisor.clone()), seed);
        let end = play_game(&mut session, *max_pieces);
        let stats = session.stats().clone();
        eprintln!(
            "Game {}/{games} ({end}): score {}, {} pieces, {} lines",
            i + 1,
            stats.score(),
            stats.completed_pieces(),
            stats.total_cleared_lines(),
        );
        records.push(GameRecord {
            seed,
            end,
            stats,
            final_board: session.board().clone(),
        });
    }

    let summary = summarize(advisor.weights(), *max_pieces, records);
    eprintln!(
        "Average score {:.1}, best score {}",
        summary.average_score, summary.best_score
    );
    Output::save_json(&summary, output.clone())?;

    Ok(())
}

#[expect(clippy::cast_precision_loss)]
fn summarize(
    weights: &HeuristicWeights,
    max_pieces: usize,
    records: Vec<GameRecord>,
) -> AutoPlaySummary {
    let total: usize = records.iter().map(|record| record.stats.score()).sum();
    let average_score = if records.is_empty() {
        0.0
    } else {
        total as f64 / records.len() as f64
    };
    AutoPlaySummary {
        weights: *weights,
        games: records.len(),
        max_pieces,
        average_score,
        best_score: records
            .iter()
            .map(|record| record.stats.score())
            .max()
            .unwrap_or(0),
        records,
    }
}

fn play_game(session: &mut GameSession, max_pieces: usize) -> GameEnd {
    loop {
        if session.is_game_over() {
            return GameEnd::GameOver;
        }
        if session.stats().completed_pieces() >= max_pieces {
            return GameEnd::PieceLimit;
        }
        let target = session.suggestion().copied();
        while operate_game(session, target.as_ref()).is_continue() {}
    }
}

/// Issues the next intent that brings the falling piece towards `target`.
///
/// Intents are issued in order: rotation → horizontal movement → drop. When
/// a step is blocked, or there is no target, the piece is hard-dropped where
/// it is.
///
/// # Returns
///
/// - `ControlFlow::Continue(())` - The piece moved, call again
/// - `ControlFlow::Break(())` - The piece was locked
fn operate_game(session: &mut GameSession, target: Option<&Placement>) -> ControlFlow<()> {
    let Some(target) = target else {
        session.apply(Intent::HardDrop);
        return ControlFlow::Break(());
    };

    let before = *session.falling_piece();
    let intent = next_intent(&before, target.piece());
    session.apply(intent);
    if intent == Intent::HardDrop {
        return ControlFlow::Break(());
    }
    if *session.falling_piece() == before {
        session.apply(Intent::HardDrop);
        return ControlFlow::Break(());
    }
    ControlFlow::Continue(())
}

fn next_intent(current: &Piece, target: &Piece) -> Intent {
    if current.shape() != target.shape() {
        return Intent::Rotate;
    }
    match current.position().x().cmp(&target.position().x()) {
        Ordering::Less => Intent::MoveRight,
        Ordering::Greater => Intent::MoveLeft,
        Ordering::Equal => Intent::HardDrop,
    }
}
