use anyhow::Result;
use clap::{Parser, Subcommand};

mod cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Encode(args) => args.run(),
        Command::Inspect(args) => args.run(),
        Command::Run(args) => args.run(),
    }
}

#[derive(Parser)]
#[command(name = "orbit", about = "Motion tooling for the Orbit360 gimbal head")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a single move or stop frame and print it as hex.
    Encode(cli::encode::EncodeArgs),
    /// Decode and verify a frame given as hex.
    Inspect(cli::inspect::InspectArgs),
    /// Execute a motion script against a dry-run link.
    Run(cli::run::RunArgs),
}
