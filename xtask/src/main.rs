use anyhow::Result;
use clap::{Parser, Subcommand};
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every CI check, or a single one when a step is given
    Ci {
        #[arg(value_enum)]
        step: Option<Step>,
    },
    /// Apply rustfmt to the workspace
    Fmt,
    /// Run the workspace tests, forwarding extra arguments to cargo
    Test {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Step {
    Fmt,
    Clippy,
    Test,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    match cli.command {
        Command::Ci { step: Some(step) } => run_step(&sh, step),
        Command::Ci { step: None } => {
            for step in [Step::Fmt, Step::Clippy, Step::Test] {
                run_step(&sh, step)?;
            }
            eprintln!("CI checks passed!");
            Ok(())
        }
        Command::Fmt => {
            cmd!(sh, "cargo fmt --all").run()?;
            Ok(())
        }
        Command::Test { args } => {
            cmd!(sh, "cargo test --workspace {args...}").run()?;
            Ok(())
        }
    }
}

fn run_step(sh: &Shell, step: Step) -> Result<()> {
    match step {
        Step::Fmt => {
            eprintln!("Running cargo fmt check...");
            cmd!(sh, "cargo fmt --all -- --check").run()?;
        }
        Step::Clippy => {
            eprintln!("Running cargo clippy...");
            cmd!(sh, "cargo clippy --workspace --all-targets -- -D warnings").run()?;
        }
        Step::Test => {
            eprintln!("Running cargo test...");
            cmd!(sh, "cargo test --workspace").run()?;
        }
    }
    Ok(())
}
