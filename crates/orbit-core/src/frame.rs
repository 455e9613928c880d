//! Fixed-size command frames understood by the gimbal firmware.
//!
//! Every frame is a 32-byte buffer laid out as
//!
//! ```text
//! FE <len> <function> <payload: len bytes> <checksum> 00..
//! ```
//!
//! where the checksum is the low byte of the sum of every byte before it.
//! The combined X+Y move payload carries, per axis, a big-endian `i32` step
//! count followed by the low 16 bits of the speed. The Y step count is sent
//! negated and followed by a reserved zero byte.

use crate::{calibration::Calibration, vector::Vector2};
use std::{fmt, time::Duration};
use thiserror::Error;

pub const FRAME_LEN: usize = 32;
pub const START_MARKER: u8 = 0xFE;
pub const MOVE_PAYLOAD_LEN: usize = 13;

const HEADER_LEN: usize = 3;
const X_SEGMENT_LEN: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Function {
    /// Simultaneous move on both axes.
    MoveXy = 0x03,
    Stop = 0x04,
}

impl Function {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x03 => Some(Self::MoveXy),
            0x04 => Some(Self::Stop),
            _ => None,
        }
    }

    fn payload_len(self) -> usize {
        match self {
            Self::MoveXy => MOVE_PAYLOAD_LEN,
            Self::Stop => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("{axis} axis {field} is not a finite number: {value}")]
    NonFinite {
        axis: Axis,
        field: &'static str,
        value: f64,
    },
    #[error("{axis} axis step count {value} does not fit in a signed 32-bit field")]
    StepsOutOfRange { axis: Axis, value: f64 },
    #[error("{axis} axis speed {value} outside 1..=65535 steps/s")]
    SpeedOutOfRange { axis: Axis, value: f64 },
    #[error("frame too short: {len} bytes")]
    TooShort { len: usize },
    #[error("bad start marker 0x{0:02X}")]
    BadStartMarker(u8),
    #[error("unknown function code 0x{0:02X}")]
    UnknownFunction(u8),
    #[error("function {function:?} expects {expected} payload bytes, frame declares {declared}")]
    PayloadLength {
        function: Function,
        expected: usize,
        declared: usize,
    },
    #[error("checksum mismatch: computed 0x{computed:02X}, frame carries 0x{found:02X}")]
    Checksum { computed: u8, found: u8 },
}

pub type Result<T> = std::result::Result<T, FrameError>;

/// Low byte of the arithmetic sum of `bytes`.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// An encoded frame together with the motion it was built from.
///
/// `steps` and `speed` are kept as supplied (before the Y polarity flip and
/// before integer truncation) for pacing and position estimation.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionFrame {
    bytes: [u8; FRAME_LEN],
    steps: Vector2,
    speed: Vector2,
}

impl MotionFrame {
    fn encode(function: Function, payload: &[u8], steps: Vector2, speed: Vector2) -> Self {
        debug_assert_eq!(payload.len(), function.payload_len());

        let mut bytes = [0u8; FRAME_LEN];
        bytes[0] = START_MARKER;
        bytes[1] = payload.len() as u8;
        bytes[2] = function.code();
        let end = HEADER_LEN + payload.len();
        bytes[HEADER_LEN..end].copy_from_slice(payload);
        bytes[end] = checksum(&bytes[..end]);

        Self {
            bytes,
            steps,
            speed,
        }
    }

    /// Builds a combined X+Y move of `steps` at `speed` steps per second.
    ///
    /// Values are truncated toward zero and saturate at the `i32` range;
    /// speeds wrap to their low 16 bits. Use [`MotionFrame::try_move_by_steps`]
    /// to reject such inputs instead.
    pub fn move_by_steps(steps: Vector2, speed: Vector2) -> Self {
        let mut payload = [0u8; MOVE_PAYLOAD_LEN];
        let (x, y) = payload.split_at_mut(X_SEGMENT_LEN);
        write_axis(x, steps.x() as i32, speed.x() as i32);
        write_axis(y, (-steps.y()) as i32, speed.y() as i32);
        // y[6] is the reserved full-step byte, always zero

        Self::encode(Function::MoveXy, &payload, steps, speed)
    }

    /// Like [`MotionFrame::move_by_steps`] but refuses values the wire
    /// fields cannot carry.
    pub fn try_move_by_steps(steps: Vector2, speed: Vector2) -> Result<Self> {
        validate_axis(Axis::X, steps.x(), speed.x())?;
        validate_axis(Axis::Y, steps.y(), speed.y())?;
        Ok(Self::move_by_steps(steps, speed))
    }

    /// Builds a move from degrees using the default head calibration.
    pub fn move_by_degrees(degrees: Vector2, speed_degrees: Vector2) -> Self {
        Self::move_by_degrees_with(&Calibration::default(), degrees, speed_degrees)
    }

    pub fn move_by_degrees_with(
        calibration: &Calibration,
        degrees: Vector2,
        speed_degrees: Vector2,
    ) -> Self {
        Self::move_by_steps(
            calibration.to_steps(degrees),
            calibration.to_steps(speed_degrees),
        )
    }

    /// Halts both motors.
    pub fn stop() -> Self {
        Self::encode(Function::Stop, &[], Vector2::ZERO, Vector2::ZERO)
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    pub fn function(&self) -> Function {
        match Function::from_code(self.bytes[2]) {
            Some(function) => function,
            None => unreachable!("frames are only built from known functions"),
        }
    }

    pub fn is_stop(&self) -> bool {
        self.function() == Function::Stop
    }

    pub fn payload_len(&self) -> usize {
        self.bytes[1] as usize
    }

    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..HEADER_LEN + self.payload_len()]
    }

    pub fn checksum(&self) -> u8 {
        self.bytes[HEADER_LEN + self.payload_len()]
    }

    /// Encoded length up to and including the checksum.
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.payload_len() + 1
    }

    pub fn steps(&self) -> Vector2 {
        self.steps
    }

    pub fn speed(&self) -> Vector2 {
        self.speed
    }

    /// Time the motors need to finish this frame.
    ///
    /// Axes move concurrently, so this is the slower axis' travel time,
    /// truncated to whole milliseconds. Returns `None` when an axis with a
    /// non-zero displacement has no usable speed.
    pub fn pacing(&self) -> Option<Duration> {
        let x = axis_millis(self.steps.x(), self.speed.x())?;
        let y = axis_millis(self.steps.y(), self.speed.y())?;
        Some(Duration::from_millis(x.max(y) as u64))
    }
}

impl fmt::Display for MotionFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.bytes[..self.encoded_len()])
    }
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{b:02X}")?;
    }
    Ok(())
}

fn write_axis(out: &mut [u8], steps: i32, speed: i32) {
    out[..4].copy_from_slice(&steps.to_be_bytes());
    out[4..6].copy_from_slice(&speed.to_be_bytes()[2..]);
}

fn axis_millis(steps: f64, speed: f64) -> Option<f64> {
    if steps == 0.0 {
        return Some(0.0);
    }
    let ms = steps.abs() * 1000.0 / speed;
    (ms.is_finite() && ms >= 0.0).then_some(ms)
}

fn validate_axis(axis: Axis, steps: f64, speed: f64) -> Result<()> {
    if !steps.is_finite() {
        return Err(FrameError::NonFinite {
            axis,
            field: "steps",
            value: steps,
        });
    }
    if !speed.is_finite() {
        return Err(FrameError::NonFinite {
            axis,
            field: "speed",
            value: speed,
        });
    }
    if steps.trunc().abs() > i32::MAX as f64 {
        return Err(FrameError::StepsOutOfRange { axis, value: steps });
    }
    let speed_int = speed.trunc();
    let too_slow = steps != 0.0 && speed_int < 1.0;
    if speed < 0.0 || speed_int > u16::MAX as f64 || too_slow {
        return Err(FrameError::SpeedOutOfRange { axis, value: speed });
    }
    Ok(())
}

/// Wire-level contents of one axis segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AxisField {
    pub steps: i32,
    pub speed: u16,
}

/// A frame parsed back from raw bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedFrame {
    pub function: Function,
    pub x: AxisField,
    /// Y segment as carried on the wire, i.e. with inverted polarity.
    pub y: AxisField,
    pub checksum: u8,
}

impl DecodedFrame {
    /// Parses and verifies a frame. Bytes after the checksum are ignored.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN + 1 {
            return Err(FrameError::TooShort { len: bytes.len() });
        }
        if bytes[0] != START_MARKER {
            return Err(FrameError::BadStartMarker(bytes[0]));
        }
        let declared = bytes[1] as usize;
        let function =
            Function::from_code(bytes[2]).ok_or(FrameError::UnknownFunction(bytes[2]))?;
        let expected = function.payload_len();
        if declared != expected {
            return Err(FrameError::PayloadLength {
                function,
                expected,
                declared,
            });
        }
        let end = HEADER_LEN + declared;
        if bytes.len() <= end {
            return Err(FrameError::TooShort { len: bytes.len() });
        }
        let computed = checksum(&bytes[..end]);
        if computed != bytes[end] {
            return Err(FrameError::Checksum {
                computed,
                found: bytes[end],
            });
        }

        let payload = &bytes[HEADER_LEN..end];
        let (x, y) = match function {
            Function::MoveXy => (
                read_axis(&payload[..X_SEGMENT_LEN]),
                read_axis(&payload[X_SEGMENT_LEN..]),
            ),
            Function::Stop => (AxisField::default(), AxisField::default()),
        };

        Ok(Self {
            function,
            x,
            y,
            checksum: computed,
        })
    }

    /// Displacement in the caller's sign convention.
    pub fn steps(&self) -> Vector2 {
        Vector2::new(self.x.steps as f64, -(self.y.steps as f64))
    }

    pub fn speed(&self) -> Vector2 {
        Vector2::new(self.x.speed as f64, self.y.speed as f64)
    }
}

fn read_axis(segment: &[u8]) -> AxisField {
    let mut steps = [0u8; 4];
    steps.copy_from_slice(&segment[..4]);
    AxisField {
        steps: i32::from_be_bytes(steps),
        speed: u16::from_be_bytes([segment[4], segment[5]]),
    }
}
