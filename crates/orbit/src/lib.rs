//! Script runner, direct control and configuration for the Orbit360 gimbal.

pub mod config;
pub mod control;
pub mod runner;
pub mod script;
pub mod transport;

pub use control::MotorControl;
pub use runner::{JobOutcome, RunError, ScriptHandle, ScriptRunner};
pub use transport::{Transport, TransportError};
