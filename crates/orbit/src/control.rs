//! One-shot commands written straight to the head.
//!
//! A new frame replaces whatever move the head is busy with. Nothing here
//! tracks position, so don't mix it with a
//! [`ScriptRunner`](crate::runner::ScriptRunner) on the same link.

use crate::transport::{Transport, TransportError};
use orbit_core::{Calibration, MotionFrame, Vector2};

pub struct MotorControl<T> {
    transport: T,
    calibration: Calibration,
}

impl<T: Transport> MotorControl<T> {
    pub fn new(transport: T) -> Self {
        Self::with_calibration(transport, Calibration::default())
    }

    pub fn with_calibration(transport: T, calibration: Calibration) -> Self {
        Self {
            transport,
            calibration,
        }
    }

    pub fn send(&self, frame: &MotionFrame) -> Result<(), TransportError> {
        tracing::debug!("sending {}", frame);
        self.transport.send(frame)
    }

    pub fn move_steps(&self, steps: Vector2, speed: Vector2) -> Result<(), TransportError> {
        self.send(&MotionFrame::move_by_steps(steps, speed))
    }

    pub fn move_degrees(&self, degrees: Vector2, speed: Vector2) -> Result<(), TransportError> {
        self.send(&MotionFrame::move_by_degrees_with(
            &self.calibration,
            degrees,
            speed,
        ))
    }

    pub fn stop(&self) -> Result<(), TransportError> {
        self.send(&MotionFrame::stop())
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}
