use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use crate::foundation::error::{GlintError, GlintResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Four-component vector used for colors (premultiplied RGBA unless noted) and for the
/// position/normal/direction operands of lighting programs.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Vec4 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub const fn splat(v: f64) -> Self {
        Self::new(v, v, v, v)
    }

    pub fn from_array(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }

    pub fn from_f32(v: [f32; 4]) -> Self {
        Self::new(
            f64::from(v[0]),
            f64::from(v[1]),
            f64::from(v[2]),
            f64::from(v[3]),
        )
    }

    pub fn to_f32(self) -> [f32; 4] {
        [self.x as f32, self.y as f32, self.z as f32, self.w as f32]
    }

    pub fn with_w(self, w: f64) -> Self {
        Self { w, ..self }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Dot product of the first three components.
    pub fn dot3(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy; the zero vector normalizes to itself.
    pub fn normalized(self) -> Self {
        let m = self.magnitude();
        if m > 0.0 { self * (1.0 / m) } else { Self::ZERO }
    }

    pub fn component_mul(self, other: Self) -> Self {
        Self::new(
            self.x * other.x,
            self.y * other.y,
            self.z * other.z,
            self.w * other.w,
        )
    }

    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self::new(f(self.x), f(self.y), f(self.z), f(self.w))
    }

    pub fn clamped(self, lo: f64, hi: f64) -> Self {
        self.map(|v| v.clamp(lo, hi))
    }

    pub fn min_each(self, v: f64) -> Self {
        self.map(|c| c.min(v))
    }

    pub fn lerp(self, other: Self, t: f64) -> Self {
        self * (1.0 - t) + other * t
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    pub fn approx_eq(self, other: Self, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
            && (self.w - other.w).abs() <= epsilon
    }
}

impl Add for Vec4 {
    type Output = Self;

    fn add(self, o: Self) -> Self {
        Self::new(self.x + o.x, self.y + o.y, self.z + o.z, self.w + o.w)
    }
}

impl AddAssign for Vec4 {
    fn add_assign(&mut self, o: Self) {
        *self = *self + o;
    }
}

impl Sub for Vec4 {
    type Output = Self;

    fn sub(self, o: Self) -> Self {
        Self::new(self.x - o.x, self.y - o.y, self.z - o.z, self.w - o.w)
    }
}

impl Mul<f64> for Vec4 {
    type Output = Self;

    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }
}

impl Neg for Vec4 {
    type Output = Self;

    fn neg(self) -> Self {
        self * -1.0
    }
}

pub(crate) fn ensure_finite(value: f64, what: &str) -> GlintResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GlintError::validation(format!("{what} must be finite")))
    }
}

pub(crate) fn ensure_finite_point(p: Point, what: &str) -> GlintResult<()> {
    ensure_finite(p.x, what)?;
    ensure_finite(p.y, what)
}

pub(crate) fn ensure_invertible(transform: Affine, what: &str) -> GlintResult<()> {
    if !transform.as_coeffs().iter().all(|c| c.is_finite()) {
        return Err(GlintError::validation(format!("{what} must be finite")));
    }
    if transform.determinant().abs() <= f64::EPSILON {
        return Err(GlintError::validation(format!("{what} must be invertible")));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
