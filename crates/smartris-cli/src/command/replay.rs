use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use serde::Serialize;
use smartris_advisor::HeuristicAdvisor;
use smartris_engine::{GameSession, GameSnapshot, Intent, PieceSeed};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReplayArg {
    /// Comma-separated intents, e.g. `rotate,move-left,hard-drop`
    #[arg(long, conflicts_with = "script")]
    intents: Option<String>,
    /// Script file with intents separated by commas or newlines (`#` starts a comment)
    #[arg(long)]
    script: Option<PathBuf>,
    /// Piece seed (32 hex digits)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Gravity time in milliseconds fed to the session after each intent
    #[arg(long, default_value_t = 0)]
    tick_ms: u64,
    /// Print the final board as text instead of JSON
    #[arg(long)]
    text: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct ReplayReport {
    seed: PieceSeed,
    applied_intents: usize,
    gravity_ticks: u32,
    snapshot: GameSnapshot,
}

pub(crate) fn run(arg: &ReplayArg, advisor: &HeuristicAdvisor) -> anyhow::Result<()> {
    let ReplayArg {
        intents,
        script,
        seed,
        tick_ms,
        text,
        output,
    } = arg;

    let script = match intents {
        Some(intents) => intents.clone(),
        None => util::read_text_input("script", script.as_deref())?,
    };
    let intents = parse_script(&script)?;
    let seed = util::seed_or_random(*seed);

    let mut session = GameSession::with_seed(Box::new(advisor.clone()), seed);
    let gravity_ticks = replay(&mut session, &intents, Duration::from_millis(*tick_ms));
    eprintln!(
        "Applied {} intents ({gravity_ticks} gravity ticks): score {}, state {:?}",
        intents.len(),
        session.score(),
        session.session_state(),
    );

    let report = ReplayReport {
        seed,
        applied_intents: intents.len(),
        gravity_ticks,
        snapshot: session.snapshot(),
    };
    if *text {
        Output::from_output_path(output.clone())?.write_text(&report.snapshot.to_string())?;
    } else {
        Output::save_json(&report, output.clone())?;
    }

    Ok(())
}

/// Applies every intent in order, feeding `tick` of gravity time after each.
///
/// Returns the number of gravity ticks that fired.
fn replay(session: &mut GameSession, intents: &[Intent], tick: Duration) -> u32 {
    let mut ticks = 0;
    for intent in intents {
        session.apply(*intent);
        if !tick.is_zero() {
            ticks += session.advance(tick);
        }
    }
    ticks
}

fn parse_script(script: &str) -> anyhow::Result<Vec<Intent>> {
    script
        .lines()
        .enumerate()
        .flat_map(|(line, text)| {
            let text = text.split_once('#').map_or(text, |(code, _comment)| code);
            text.split(',').map(move |name| (line, name.trim()))
        })
        .filter(|(_line, name)| !name.is_empty())
        .map(|(line, name)| {
            name.parse::<Intent>()
                .with_context(|| format!("Invalid intent on line {}", line + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use smartris_engine::{GravityTimer, PieceKind, Position, SequencePieceSource};

    use super::*;

    #[test]
    fn test_parse_script() {
        let script = "rotate, move-left\n# comment line\nhard-drop # trailing\n\nSOFT-DROP,";
        let intents = parse_script(script).unwrap();
        assert_eq!(
            intents,
            [
                Intent::Rotate,
                Intent::MoveLeft,
                Intent::HardDrop,
                Intent::SoftDrop,
            ]
        );
    }

    #[test]
    fn test_parse_script_reports_line() {
        let err = parse_script("rotate\nmove-up").unwrap_err();
        assert_eq!(err.to_string(), "Invalid intent on line 2");
    }

    #[test]
    fn test_replay_with_gravity() {
        let mut session = GameSession::with_source(
            Box::new(HeuristicAdvisor::default()),
            Box::new(SequencePieceSource::new([PieceKind::O])),
            GravityTimer::default(),
        );
        let intents = [Intent::MoveLeft, Intent::MoveLeft, Intent::TogglePause, Intent::MoveLeft];
        let ticks = replay(&mut session, &intents, Duration::from_millis(350));

        // 700 ms of play before the pause, then nothing
        assert_eq!(ticks, 1);
        assert_eq!(session.falling_piece().position(), Position::new(2, 1));
        assert!(session.is_paused());
    }
}
