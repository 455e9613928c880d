use super::{load_config, parse_vector};
use anyhow::{Result, bail};
use clap::Args;
use orbit_core::{MotionFrame, Vector2};
use std::path::PathBuf;

#[derive(Args)]
pub struct EncodeArgs {
    /// Displacement as `X,Y` (steps, or degrees with `--degrees`).
    #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
    pub steps: Option<Vector2>,

    /// Speed as `X,Y` per second.
    #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
    pub speed: Option<Vector2>,

    /// Interpret `--steps` and `--speed` as degrees.
    #[arg(long)]
    pub degrees: bool,

    /// Encode a stop frame instead of a move.
    #[arg(long, conflicts_with_all = ["steps", "speed", "degrees"])]
    pub stop: bool,

    /// Configuration file (TOML or JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl EncodeArgs {
    pub fn run(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let frame = if self.stop {
            MotionFrame::stop()
        } else {
            let (Some(steps), Some(speed)) = (self.steps, self.speed) else {
                bail!("--steps and --speed are required unless --stop is given");
            };
            let (steps, speed) = if self.degrees {
                let calibration = config.calibration();
                (calibration.to_steps(steps), calibration.to_steps(speed))
            } else {
                (steps, speed)
            };
            if config.runner.strict_encoding {
                MotionFrame::try_move_by_steps(steps, speed)?
            } else {
                MotionFrame::move_by_steps(steps, speed)
            }
        };

        println!("{frame}");
        match frame.pacing() {
            Some(pacing) => eprintln!("pacing: {} ms", pacing.as_millis()),
            None => eprintln!("pacing: unbounded (zero speed on a moving axis)"),
        }

        Ok(())
    }
}
