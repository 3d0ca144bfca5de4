mod auth;
mod db;
mod limiter;
mod overlaps;
mod serve;

use clap::{Parser, Subcommand};

use crate::cli::{overlaps::OverlapsArgs, serve::ServeArgs};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the JSON API.
    #[clap(name = "serve")]
    Serve(Box<ServeArgs>),

    /// Print the overlapping rates.
    #[clap(name = "overlaps")]
    Overlaps(Box<OverlapsArgs>),
}
