//! Degree/step conversion for the two gimbal axes.

use crate::vector::Vector2;
use serde::{Deserialize, Serialize};

/// Steps in one full horizontal turn (X axis).
pub const STEPS_PER_REVOLUTION_X: f64 = 5111.0;
/// Steps in one full vertical turn (Y axis).
pub const STEPS_PER_REVOLUTION_Y: f64 = 15000.0;

/// Per-axis step resolution of a gimbal head.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub steps_per_revolution: Vector2,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            steps_per_revolution: Vector2::new(STEPS_PER_REVOLUTION_X, STEPS_PER_REVOLUTION_Y),
        }
    }
}

impl Calibration {
    pub fn new(steps_x: f64, steps_y: f64) -> Self {
        Self {
            steps_per_revolution: Vector2::new(steps_x, steps_y),
        }
    }

    /// Steps per degree on each axis.
    pub fn degrees_to_steps(&self) -> Vector2 {
        self.steps_per_revolution / 360.0
    }

    pub fn to_steps(&self, degrees: Vector2) -> Vector2 {
        degrees * self.degrees_to_steps()
    }

    pub fn to_degrees(&self, steps: Vector2) -> Vector2 {
        let factor = self.degrees_to_steps();
        steps.div_axes(factor.x(), factor.y())
    }
}
