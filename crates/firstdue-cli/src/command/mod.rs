use clap::{Parser, Subcommand};

use self::{check_data::CheckDataArg, play::PlayArg};

mod check_data;
mod play;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What to run; plays the quiz when omitted
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run the interactive quiz
    Play(#[clap(flatten)] PlayArg),
    /// Load the data files and report what they contain
    CheckData(#[clap(flatten)] CheckDataArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::CheckData(arg) => check_data::run(&arg)?,
    }
    Ok(())
}
