use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod cli;
mod commands;
mod fs;
mod output;

use std::io;

use clap::Parser;

use self::{
    cli::{Cli, Command},
    commands::{count, map},
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Count(args) => count(args)?,
        Command::Map(args) => map(args)?,
    }

    Ok(())
}
