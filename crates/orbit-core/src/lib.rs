//! Core motion utilities for the Orbit360 gimbal head.
//!
//! This crate intentionally avoids any transport- or runtime-specific
//! dependencies: it only encodes frames and does the position arithmetic.

pub mod calibration;
pub mod frame;
pub mod kinematics;
pub mod notification;
pub mod vector;

pub use calibration::Calibration;
pub use frame::{DecodedFrame, FrameError, MotionFrame};
pub use kinematics::Kinematics;
pub use notification::ButtonEvent;
pub use vector::Vector2;
