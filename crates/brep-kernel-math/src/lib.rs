#![warn(missing_docs)]

//! Math types for the B-rep kernel.
//!
//! Thin wrappers around nalgebra providing the domain types used when
//! rebuilding boundary-representation models: points, vectors, directions,
//! right-handed placement frames, and tolerance constants.

use nalgebra::{Unit, Vector2, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D parameter space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D space.
pub type Vec2 = Vector2<f64>;

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in model units.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default CAD tolerances (1e-9 linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-9,
        angular: 1e-9,
    };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Normalize `v`, or `None` when it is too short to carry a direction.
    pub fn direction(&self, v: &Vec3) -> Option<Dir3> {
        Dir3::try_new(*v, self.linear)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A right-handed placement frame: an origin and three orthonormal axes.
///
/// Built with the z-then-x rule: `z` is kept as given (normalized), the
/// reference x direction is projected onto the plane perpendicular to `z`,
/// and `y = z × x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    /// Frame origin.
    pub origin: Point3,
    /// Local X direction.
    pub x: Dir3,
    /// Local Y direction (`z × x`).
    pub y: Dir3,
    /// Local Z direction.
    pub z: Dir3,
}

impl Axis {
    /// Build a frame from a z direction, a reference x direction and an origin.
    ///
    /// Returns `None` when `z` has zero length or `x_ref` is parallel to `z`.
    pub fn from_zx(z: Vec3, x_ref: Vec3, origin: Point3) -> Option<Self> {
        let tol = Tolerance::DEFAULT;
        let z = tol.direction(&z)?;
        let x = tol.direction(&(x_ref - x_ref.dot(z.as_ref()) * z.as_ref()))?;
        let y = Dir3::new_normalize(z.as_ref().cross(x.as_ref()));
        Some(Self { origin, x, y, z })
    }

    /// Build a frame from a z direction alone, picking a perpendicular x.
    pub fn from_z(z: Vec3, origin: Point3) -> Option<Self> {
        let dir = Tolerance::DEFAULT.direction(&z)?;
        let arbitrary = if dir.as_ref().x.abs() < 0.9 {
            Vec3::x()
        } else {
            Vec3::y()
        };
        Self::from_zx(z, arbitrary, origin)
    }

    /// The global XYZ frame at the origin.
    pub fn global() -> Self {
        Self {
            origin: Point3::origin(),
            x: Vec3::x_axis(),
            y: Vec3::y_axis(),
            z: Vec3::z_axis(),
        }
    }

    /// Map local coordinates to a global point.
    pub fn to_global(&self, local: &Vec3) -> Point3 {
        self.origin + self.vector(local)
    }

    /// Map local components to a global vector (no translation).
    pub fn vector(&self, local: &Vec3) -> Vec3 {
        local.x * self.x.as_ref() + local.y * self.y.as_ref() + local.z * self.z.as_ref()
    }

    /// Express a global point in local coordinates.
    pub fn to_local(&self, p: &Point3) -> Vec3 {
        let d = p - self.origin;
        Vec3::new(
            d.dot(self.x.as_ref()),
            d.dot(self.y.as_ref()),
            d.dot(self.z.as_ref()),
        )
    }

    /// Unit radial direction at angle `t` in the local XY plane.
    pub fn radial(&self, t: f64) -> Vec3 {
        let (s, c) = t.sin_cos();
        c * self.x.as_ref() + s * self.y.as_ref()
    }
}

impl Default for Axis {
    fn default() -> Self {
        Self::global()
    }
}
