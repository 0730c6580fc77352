use std::path::PathBuf;

use clap::{Parser, Subcommand};
use smartris_advisor::{HeuristicAdvisor, HeuristicWeights};

use crate::util;

use self::{auto_play::AutoPlayArg, replay::ReplayArg, suggest::SuggestArg};

mod auto_play;
mod replay;
mod suggest;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Advisor weights file (JSON with `lines`, `holes` and `heights`)
    #[arg(long, global = true)]
    weights: Option<PathBuf>,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play headless games following the advisor's suggestions
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// Print the advisor's placement for a piece on a given board
    Suggest(#[clap(flatten)] SuggestArg),
    /// Apply a scripted sequence of intents to a seeded game
    Replay(#[clap(flatten)] ReplayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let weights = match &args.weights {
        Some(path) => util::read_weights_file(path)?,
        None => HeuristicWeights::default(),
    };
    let advisor = HeuristicAdvisor::new(weights);
    match args.mode {
        Mode::AutoPlay(arg) => auto_play::run(&arg, &advisor)?,
        Mode::Suggest(arg) => suggest::run(&arg, &advisor)?,
        Mode::Replay(arg) => replay::run(&arg, &advisor)?,
    }
    Ok(())
}
