#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod api;
mod auth;
mod cli;
mod core;
mod db;
mod limiter;
mod prelude;
mod tables;
mod validation;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command},
    prelude::*,
};

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();

    match args.command {
        Command::Serve(args) => (*args).run().await?,
        Command::Overlaps(args) => (*args).run().await?,
    }

    info!("done!");
    Ok(())
}
