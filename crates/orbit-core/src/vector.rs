//! Two-axis value type used for step counts, speeds and positions.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Immutable pair of `x`/`y` components.
///
/// Components are stored unscaled alongside a uniform scale factor that is
/// applied when read through [`Vector2::x`] and [`Vector2::y`]. Arithmetic
/// works on the raw components and keeps the left-hand operand's scale, so a
/// chain of operations only pays the scaling once on read.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(from = "Components", into = "Components")]
pub struct Vector2 {
    x: f64,
    y: f64,
    p: f64,
}

#[derive(Serialize, Deserialize)]
struct Components {
    x: f64,
    y: f64,
}

impl From<Components> for Vector2 {
    fn from(c: Components) -> Self {
        Self::new(c.x, c.y)
    }
}

impl From<Vector2> for Components {
    fn from(v: Vector2) -> Self {
        Self { x: v.x(), y: v.y() }
    }
}

impl Default for Vector2 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Vector2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, p: 1.0 }
    }

    pub(crate) const fn scaled(p: f64, x: f64, y: f64) -> Self {
        Self { x, y, p }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x * self.p
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y * self.p
    }

    pub fn is_zero(&self) -> bool {
        self.x() == 0.0 && self.y() == 0.0
    }

    fn with(&self, x: f64, y: f64) -> Self {
        Self::scaled(self.p, x, y)
    }

    /// Divides each axis by its own scalar.
    pub fn div_axes(self, a: f64, b: f64) -> Self {
        self.with(self.x / a, self.y / b)
    }

    pub fn abs(self) -> Self {
        self.with(self.x.abs(), self.y.abs())
    }

    pub fn min(self, other: Self) -> Self {
        self.with(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn max(self, other: Self) -> Self {
        self.with(self.x.max(other.x), self.y.max(other.y))
    }
}

impl PartialEq for Vector2 {
    fn eq(&self, other: &Self) -> bool {
        self.x() == other.x() && self.y() == other.y()
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.with(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.with(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vector2 {
    type Output = Self;

    fn neg(self) -> Self {
        self.with(-self.x, -self.y)
    }
}

impl Mul for Vector2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.with(self.x * rhs.x, self.y * rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.with(self.x * rhs, self.y * rhs)
    }
}

impl Div for Vector2 {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        self.with(self.x / rhs.x, self.y / rhs.y)
    }
}

impl Div<f64> for Vector2 {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        self.with(self.x / rhs, self.y / rhs)
    }
}
