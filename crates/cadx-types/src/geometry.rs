use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// Absolute tolerance for point and vector component comparison.
pub const POINT_TOLERANCE: f64 = 1e-6;

/// Tolerance on `| |dot| - 1 |` when comparing unit directions.
pub const PARALLEL_TOLERANCE: f64 = 1e-5;

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

pub fn radians_to_degrees(radians: f64) -> f64 {
    radians.to_degrees()
}

fn near(a: f64, b: f64) -> bool {
    (a - b).abs() < POINT_TOLERANCE
}

/// A point in 3D space. Coordinates are opaque fingerprints supplied by the
/// originating system; nothing here recomputes them.
///
/// Equality is tolerance based (see [`POINT_TOLERANCE`]).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Point3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3d {
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        (*self - *other).length()
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new(
            (self.x + other.x) * 0.5,
            (self.y + other.y) * 0.5,
            (self.z + other.z) * 0.5,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

impl PartialEq for Point3d {
    fn eq(&self, other: &Self) -> bool {
        near(self.x, other.x) && near(self.y, other.y) && near(self.z, other.z)
    }
}

impl Sub for Point3d {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Self::Output {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Add<Vec3> for Point3d {
    type Output = Point3d;
    fn add(self, rhs: Vec3) -> Self::Output {
        Point3d::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// A direction or displacement in 3D space.
///
/// Equality is component-wise within [`POINT_TOLERANCE`]; use
/// [`Vec3::is_parallel_to`] to compare directions irrespective of sense.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// True when the vector is too short to carry a direction.
    pub fn is_degenerate(&self) -> bool {
        !(self.length() >= POINT_TOLERANCE)
    }

    /// Unit vector in the same direction, or `None` if degenerate or non-finite.
    pub fn try_normalized(&self) -> Option<Self> {
        if self.is_degenerate() || !self.is_finite() {
            return None;
        }
        let len = self.length();
        Some(Self::new(self.x / len, self.y / len, self.z / len))
    }

    /// Unit vector in the same direction. Vectors shorter than the tolerance
    /// are returned unchanged.
    pub fn normalized(&self) -> Self {
        self.try_normalized().unwrap_or(*self)
    }

    /// Parallel or anti-parallel within [`PARALLEL_TOLERANCE`]. Degenerate
    /// vectors are never parallel to anything.
    pub fn is_parallel_to(&self, other: &Self) -> bool {
        match (self.try_normalized(), other.try_normalized()) {
            (Some(a), Some(b)) => (a.dot(&b).abs() - 1.0).abs() < PARALLEL_TOLERANCE,
            _ => false,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(arr: [f64; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

impl PartialEq for Vec3 {
    fn eq(&self, other: &Self) -> bool {
        near(self.x, other.x) && near(self.y, other.y) && near(self.z, other.z)
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

// ── Triple text form ─────────────────────────────────────────────────────

/// Failure to read a `(x,y,z)` triple.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate triple {0:?}")]
pub struct ParseTripleError(pub String);

fn parse_triple(text: &str) -> Result<[f64; 3], ParseTripleError> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(trimmed);

    let mut out = [0.0; 3];
    let mut parts = inner.split(',');
    for slot in out.iter_mut() {
        let part = parts
            .next()
            .ok_or_else(|| ParseTripleError(text.to_string()))?;
        *slot = part
            .trim()
            .parse::<f64>()
            .map_err(|_| ParseTripleError(text.to_string()))?;
    }
    if parts.next().is_some() {
        return Err(ParseTripleError(text.to_string()));
    }
    Ok(out)
}

impl fmt::Display for Point3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

impl FromStr for Point3d {
    type Err = ParseTripleError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_triple(s).map(Self::from_array)
    }
}

impl FromStr for Vec3 {
    type Err = ParseTripleError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_triple(s).map(Self::from_array)
    }
}
