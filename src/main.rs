use clap::Parser;

use crate::cli::Cli;

mod cli;
mod config;
mod normalize;
mod pipeline;
mod scholar;
mod update;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    pipeline::run(&args.into())
}
