//! Link between the host and the gimbal head.
//!
//! Discovery and connection happen elsewhere; by the time a `Transport` is
//! handed to a [`ScriptRunner`](crate::runner::ScriptRunner) or
//! [`MotorControl`](crate::control::MotorControl) it is ready to write.

use orbit_core::MotionFrame;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::{Uuid, uuid};

/// GATT service advertised by the head.
pub const SERVICE_UUID: Uuid = uuid!("69400001-B5A3-F393-E0A9-E50E24DCCA99");
/// Characteristic motion frames are written to.
pub const MOTION_CHARACTERISTIC_UUID: Uuid = uuid!("69400002-B5A3-F393-E0A9-E50E24DCCA99");
/// Characteristic the head notifies button presses on.
pub const NOTIFICATION_CHARACTERISTIC_UUID: Uuid =
    uuid!("69400003-B5A3-F393-E0A9-E50E24DCCA99");

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("link to the head is down")]
    Disconnected,
    #[error("write rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// How a transport hands frames to the link. The head sends no reply to
/// motion frames either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    WithResponse,
    #[default]
    WithoutResponse,
}

pub trait Transport: Send + Sync + 'static {
    /// Hands one encoded frame to the link.
    fn send(&self, frame: &MotionFrame) -> Result<(), TransportError>;

    fn write_mode(&self) -> WriteMode {
        WriteMode::WithoutResponse
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, frame: &MotionFrame) -> Result<(), TransportError> {
        (**self).send(frame)
    }

    fn write_mode(&self) -> WriteMode {
        (**self).write_mode()
    }
}

/// Keeps every frame it is given. Handy for tests and dry runs.
#[derive(Default, Debug)]
pub struct RecordingTransport {
    frames: Mutex<Vec<MotionFrame>>,
    fail_after: Mutex<Option<usize>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `count` more frames, then reports the link as down.
    pub fn fail_after(&self, count: usize) {
        let sent = self.frames.lock().len();
        *self.fail_after.lock() = Some(sent + count);
    }

    pub fn frames(&self) -> Vec<MotionFrame> {
        self.frames.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, frame: &MotionFrame) -> Result<(), TransportError> {
        let mut frames = self.frames.lock();
        let limit = *self.fail_after.lock();
        if limit.is_some_and(|limit| frames.len() >= limit) {
            return Err(TransportError::Disconnected);
        }
        frames.push(frame.clone());
        Ok(())
    }
}

/// Dry-run transport that only logs what would be written.
#[derive(Debug, Default)]
pub struct LogTransport {
    mode: WriteMode,
}

impl LogTransport {
    pub fn new(mode: WriteMode) -> Self {
        Self { mode }
    }
}

impl Transport for LogTransport {
    fn send(&self, frame: &MotionFrame) -> Result<(), TransportError> {
        tracing::info!(
            characteristic = %MOTION_CHARACTERISTIC_UUID,
            mode = ?self.mode,
            "write {}",
            frame
        );
        Ok(())
    }

    fn write_mode(&self) -> WriteMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_transport_keeps_order() {
        let transport = RecordingTransport::new();
        transport.send(&MotionFrame::stop()).unwrap();
        let frames = transport.frames();
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_stop());
    }

    #[test]
    fn recording_transport_can_drop_the_link() {
        let transport = RecordingTransport::new();
        transport.send(&MotionFrame::stop()).unwrap();
        transport.fail_after(1);
        transport.send(&MotionFrame::stop()).unwrap();
        assert!(matches!(
            transport.send(&MotionFrame::stop()),
            Err(TransportError::Disconnected)
        ));
        assert_eq!(transport.len(), 2);
    }

    #[test]
    fn identifiers_share_a_base() {
        assert_eq!(
            SERVICE_UUID.to_string(),
            "69400001-b5a3-f393-e0a9-e50e24dcca99"
        );
        assert_ne!(MOTION_CHARACTERISTIC_UUID, NOTIFICATION_CHARACTERISTIC_UUID);
    }
}
