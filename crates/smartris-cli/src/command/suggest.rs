use std::{fmt::Write as _, path::PathBuf};

use serde::Serialize;
use smartris_advisor::{BoardMetrics, HeuristicAdvisor, MoveCandidate};
use smartris_engine::{Board, Piece, PieceKind, Placement};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SuggestArg {
    /// Board file in ASCII art (`.` empty, `#` or a piece letter occupied); stdin if omitted
    board: Option<PathBuf>,
    /// Kind of the piece to place (I, O, T, S, Z, J or L)
    #[arg(long)]
    piece: PieceKind,
    /// List every feasible candidate, not only the best one
    #[arg(long)]
    all: bool,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Serialize)]
struct SuggestReport {
    piece: PieceKind,
    best: Option<MoveCandidate>,
    focus_cell: Option<(usize, usize)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidates: Option<Vec<MoveCandidate>>,
}

pub(crate) fn run(arg: &SuggestArg, advisor: &HeuristicAdvisor) -> anyhow::Result<()> {
    let SuggestArg {
        board,
        piece,
        all,
        json,
    } = arg;

    let board = util::read_board(board.as_deref())?;
    let falling = Piece::spawn(*piece);
    let best = advisor.best_candidate(&falling, &board);
    let candidates = all.then(|| advisor.candidates(&falling, &board).to_vec());

    if best.is_none() {
        eprintln!("No feasible placement for {piece}");
    }

    let report = SuggestReport {
        piece: *piece,
        best,
        focus_cell: best.and_then(|best| best.placement().focus_cell()),
        candidates,
    };
    if *json {
        Output::save_json(&report, None)?;
    } else {
        Output::stdout().write_text(&render_report(&report, &board))?;
    }

    Ok(())
}

fn render_report(report: &SuggestReport, board: &Board) -> String {
    let mut text = String::new();
    if let Some(candidates) = &report.candidates {
        writeln!(text, "{} candidates:", candidates.len()).ok();
        for candidate in candidates {
            writeln!(text, "  {}", describe(candidate.placement(), candidate.metrics())).ok();
        }
        writeln!(text).ok();
    }

    let Some(best) = &report.best else {
        writeln!(text, "no feasible placement for {}", report.piece).ok();
        return text;
    };
    writeln!(text, "best: {}", describe(best.placement(), best.metrics())).ok();
    if let Some((x, y)) = report.focus_cell {
        writeln!(text, "focus cell: ({x}, {y})").ok();
    }
    writeln!(text).ok();
    text.push_str(&stamped_board(board, best.placement()));
    text
}

fn describe(placement: &Placement, metrics: &BoardMetrics) -> String {
    let piece = placement.piece();
    format!(
        "{} {} at {}: score {:.1} (lines {}, holes {}, heights {})",
        piece.kind(),
        piece.shape(),
        piece.position(),
        placement.score(),
        metrics.lines,
        metrics.holes,
        metrics.heights,
    )
}

/// The board with the placement drawn in lower-case letters.
fn stamped_board(board: &Board, placement: &Placement) -> String {
    let piece = placement.piece();
    let cells: Vec<_> = piece
        .occupied_positions()
        .filter_map(|(x, y)| Board::index(x, y))
        .collect();
    let mut text = String::new();
    for (y, row) in board.rows().enumerate() {
        for (x, cell) in row.cells().iter().enumerate() {
            let ch = if cells.contains(&(x, y)) {
                piece.kind().as_char().to_ascii_lowercase()
            } else {
                cell.as_char()
            };
            text.push(ch);
        }
        text.push('\n');
    }
    text
}
