//! Motion scripts stored as TOML or JSON.
//!
//! ```toml
//! [[steps]]
//! kind = "degrees"
//! degrees = { x = 90, y = 0 }
//! speed = { x = 30, y = 30 }
//!
//! [[steps]]
//! kind = "stop"
//! ```

use anyhow::{Context, Result};
use orbit_core::{Calibration, MotionFrame, Vector2};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Relative move in motor steps, speed in steps per second.
    Steps { steps: Vector2, speed: Vector2 },
    /// Relative move in degrees, speed in degrees per second.
    Degrees { degrees: Vector2, speed: Vector2 },
    Stop,
}

impl Script {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse script as TOML")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("failed to parse script as JSON")
    }

    /// Encodes every step into a frame.
    ///
    /// With `strict` set, moves the wire format cannot carry are rejected
    /// instead of being truncated.
    pub fn compile(&self, calibration: &Calibration, strict: bool) -> Result<Vec<MotionFrame>> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                step.to_frame(calibration, strict)
                    .with_context(|| format!("script step {index} cannot be encoded"))
            })
            .collect()
    }
}

impl ScriptStep {
    fn to_frame(&self, calibration: &Calibration, strict: bool) -> Result<MotionFrame> {
        let (steps, speed) = match self {
            Self::Steps { steps, speed } => (*steps, *speed),
            Self::Degrees { degrees, speed } => {
                (calibration.to_steps(*degrees), calibration.to_steps(*speed))
            }
            Self::Stop => return Ok(MotionFrame::stop()),
        };

        if strict {
            Ok(MotionFrame::try_move_by_steps(steps, speed)?)
        } else {
            Ok(MotionFrame::move_by_steps(steps, speed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit_core::DecodedFrame;

    const SCRIPT: &str = r#"
[[steps]]
kind = "steps"
steps = { x = 500, y = 0 }
speed = { x = 250, y = 0 }

[[steps]]
kind = "degrees"
degrees = { x = 0, y = 90 }
speed = { x = 0, y = 45 }

[[steps]]
kind = "stop"
"#;

    #[test]
    fn parses_all_step_kinds() {
        let script = Script::from_toml(SCRIPT).unwrap();
        assert_eq!(script.steps.len(), 3);
        assert_eq!(
            script.steps[0],
            ScriptStep::Steps {
                steps: Vector2::new(500.0, 0.0),
                speed: Vector2::new(250.0, 0.0),
            }
        );
        assert_eq!(script.steps[2], ScriptStep::Stop);
    }

    #[test]
    fn compiles_with_calibration() {
        let script = Script::from_toml(SCRIPT).unwrap();
        let frames = script
            .compile(&Calibration::new(360.0, 720.0), true)
            .unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].steps(), Vector2::new(500.0, 0.0));
        let decoded = DecodedFrame::parse(frames[1].as_bytes()).unwrap();
        assert_eq!(decoded.y.steps, -180);
        assert_eq!(decoded.y.speed, 90);
        assert!(frames[2].is_stop());
    }

    #[test]
    fn strict_compile_rejects_oversized_speed() {
        let script = Script::from_json(
            r#"{ "steps": [
                { "kind": "steps", "steps": { "x": 10, "y": 0 }, "speed": { "x": 1, "y": 0 } },
                { "kind": "steps", "steps": { "x": 10, "y": 0 }, "speed": { "x": 90000, "y": 0 } }
            ] }"#,
        )
        .unwrap();

        let err = script.compile(&Calibration::default(), true).unwrap_err();
        assert!(err.to_string().contains("script step 1"));

        let frames = script.compile(&Calibration::default(), false).unwrap();
        assert_eq!(frames.len(), 2);
    }
}
