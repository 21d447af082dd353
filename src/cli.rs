mod burrow;
mod heartbeat;
mod poll;
mod tigo;

use clap::{Parser, Subcommand};

use crate::cli::{burrow::BurrowArgs, poll::PollArgs};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: poll the cloud every interval and integrate the power readings.
    #[clap(name = "poll")]
    Poll(Box<PollArgs>),

    /// Development tools.
    #[clap(name = "burrow")]
    Burrow(Box<BurrowArgs>),
}
