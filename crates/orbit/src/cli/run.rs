use super::load_config;
use anyhow::{Result, anyhow};
use clap::Args;
use orbit::{
    config::Config,
    runner::{JobOutcome, ScriptRunner},
    script::Script,
    transport::LogTransport,
};
use orbit_core::MotionFrame;
use std::path::PathBuf;
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

#[derive(Args)]
pub struct RunArgs {
    /// Path to the motion script (TOML or JSON).
    pub script: PathBuf,

    /// Configuration file (TOML or JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    pub fn run(&self) -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();

        let config = load_config(self.config.as_deref())?;
        let script = Script::from_file(&self.script)?;
        let frames = script.compile(&config.calibration(), config.runner.strict_encoding)?;

        tracing::info!(
            "Running {} frames from {}",
            frames.len(),
            self.script.display()
        );

        execute(config, frames)
    }
}

#[tokio::main]
async fn execute(config: Config, frames: Vec<MotionFrame>) -> Result<()> {
    let transport = LogTransport::new(config.device.write_mode);
    let runner = ScriptRunner::with_runtime(transport, config.calibration(), Handle::current());

    let join = runner.run(frames, None)?.join();
    tokio::pin!(join);
    let mut report = tokio::time::interval(config.report_interval());
    let mut halted = false;

    let outcome = loop {
        tokio::select! {
            outcome = &mut join => break outcome,
            _ = report.tick() => {
                let position = runner.position_degrees();
                tracing::info!(x = position.x(), y = position.y(), "position (degrees)");
            }
            _ = tokio::signal::ctrl_c(), if !halted => {
                tracing::warn!("interrupted, halting head");
                runner.halt()?;
                halted = true;
            }
        }
    };

    let steps = runner.position_steps();
    let degrees = runner.position_degrees();
    println!(
        "final position: x={:.1} y={:.1} steps ({:.2}°, {:.2}°)",
        steps.x(),
        steps.y(),
        degrees.x(),
        degrees.y()
    );

    match outcome {
        JobOutcome::Completed => Ok(()),
        JobOutcome::Cancelled => {
            println!("script cancelled");
            Ok(())
        }
        JobOutcome::Failed(err) => Err(anyhow!("script failed: {err}")),
    }
}
