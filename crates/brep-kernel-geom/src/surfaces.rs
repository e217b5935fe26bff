//! Parametric surfaces: elementary analytic surfaces and B-spline patches.

use std::f64::consts::{FRAC_PI_2, TAU};

use brep_kernel_math::{Axis, Dir3, Point2, Point3, Tolerance, Vec3};

use crate::nurbs::{basis_functions, expand_knots, find_span, validate_knots, validate_weights};
use crate::GeomError;

/// The kind of a surface (for match-based dispatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Infinite plane.
    Plane,
    /// Cylindrical surface.
    Cylindrical,
    /// Conical surface.
    Conical,
    /// Spherical surface.
    Spherical,
    /// Toroidal surface.
    Toroidal,
    /// Non-rational B-spline surface.
    BSpline,
    /// Rational B-spline (NURBS) surface.
    RationalBSpline,
}

fn positive(name: &'static str, value: f64) -> Result<f64, GeomError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(GeomError::InvalidParameter { name, value })
    }
}

// =============================================================================
// Elementary surfaces
// =============================================================================

/// An infinite plane through the placement origin.
///
/// Parameterization: `P(u, v) = origin + u * x + v * y`
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    /// Placement frame; the normal is its z direction.
    pub axis: Axis,
}

impl Plane {
    /// Create a plane from a placement.
    pub fn new(axis: Axis) -> Self {
        Self { axis }
    }
}

/// A cylindrical surface around the placement z axis.
///
/// Parameterization: `P(u, v) = origin + radius * (cos(u) * x + sin(u) * y) + v * z`
///
/// Where `u ∈ [0, 2π)` is the angular parameter and `v` is the height along the axis.
#[derive(Debug, Clone, PartialEq)]
pub struct CylindricalSurface {
    /// Placement frame.
    pub axis: Axis,
    /// Radius.
    pub radius: f64,
}

impl CylindricalSurface {
    /// Create a cylinder. The radius must be positive.
    pub fn new(radius: f64, axis: Axis) -> Result<Self, GeomError> {
        Ok(Self {
            axis,
            radius: positive("cylinder radius", radius)?,
        })
    }
}

/// A conical surface.
///
/// Parameterization:
/// ```text
/// P(u, v) = origin + (R + v·tan(α))·(cos(u)·x + sin(u)·y) + v·z
/// ```
///
/// `R` is the radius at `v = 0` and `α` the semi-angle.
#[derive(Debug, Clone, PartialEq)]
pub struct ConicalSurface {
    /// Placement frame.
    pub axis: Axis,
    /// Radius in the placement's XY plane.
    pub radius: f64,
    /// Half-angle in radians, in `(0, π/2)`.
    pub semi_angle: f64,
}

impl ConicalSurface {
    /// Create a cone. The radius may be zero (apex at origin).
    pub fn new(radius: f64, semi_angle: f64, axis: Axis) -> Result<Self, GeomError> {
        if radius < 0.0 || !radius.is_finite() {
            return Err(GeomError::InvalidParameter {
                name: "cone radius",
                value: radius,
            });
        }
        if semi_angle.is_nan() || semi_angle <= 0.0 || semi_angle >= FRAC_PI_2 {
            return Err(GeomError::InvalidParameter {
                name: "cone semi-angle",
                value: semi_angle,
            });
        }
        Ok(Self {
            axis,
            radius,
            semi_angle,
        })
    }
}

/// A sphere centered at the placement origin.
///
/// Parameterization: `P(u, v) = origin + r * (cos(v) * (cos(u) * x + sin(u) * y) + sin(v) * z)`
///
/// Where `u ∈ [0, 2π)` is longitude and `v ∈ [-π/2, π/2]` is latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalSurface {
    /// Placement frame.
    pub axis: Axis,
    /// Radius.
    pub radius: f64,
}

impl SphericalSurface {
    /// Create a sphere. The radius must be positive.
    pub fn new(radius: f64, axis: Axis) -> Result<Self, GeomError> {
        Ok(Self {
            axis,
            radius: positive("sphere radius", radius)?,
        })
    }
}

/// A torus around the placement z axis.
///
/// Parameterization:
/// ```text
/// P(u, v) = origin + (R + r·cos(v))·(cos(u)·x + sin(u)·y) + r·sin(v)·z
/// ```
///
/// Where:
/// - `R` = major radius (center to tube center)
/// - `r` = minor radius (tube radius)
#[derive(Debug, Clone, PartialEq)]
pub struct ToroidalSurface {
    /// Placement frame.
    pub axis: Axis,
    /// Major radius.
    pub major_radius: f64,
    /// Minor radius.
    pub minor_radius: f64,
}

impl ToroidalSurface {
    /// Create a torus. Both radii must be positive.
    pub fn new(major_radius: f64, minor_radius: f64, axis: Axis) -> Result<Self, GeomError> {
        Ok(Self {
            axis,
            major_radius: positive("torus major radius", major_radius)?,
            minor_radius: positive("torus minor radius", minor_radius)?,
        })
    }
}

// =============================================================================
// B-spline surface
// =============================================================================

/// A tensor-product B-spline surface, rational when `weights` is present.
///
/// `control_points[i][j]` is the point at u-index `i` and v-index `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineSurface {
    /// Degree in u.
    pub u_degree: usize,
    /// Degree in v.
    pub v_degree: usize,
    /// Control point grid, u-major.
    pub control_points: Vec<Vec<Point3>>,
    /// Expanded u knot vector.
    pub u_knots: Vec<f64>,
    /// Expanded v knot vector.
    pub v_knots: Vec<f64>,
    /// Weight grid with the same shape as `control_points`.
    pub weights: Option<Vec<Vec<f64>>>,
}

/// Knot data for one parametric direction of a B-spline surface.
#[derive(Debug, Clone, Copy)]
pub struct KnotSpec<'a> {
    /// Polynomial degree.
    pub degree: usize,
    /// Knot multiplicities.
    pub multiplicities: &'a [usize],
    /// Distinct knot values.
    pub values: &'a [f64],
}

impl BSplineSurface {
    /// Create a B-spline surface, rational when `weights` is given.
    pub fn new(
        control_points: Vec<Vec<Point3>>,
        u: KnotSpec<'_>,
        v: KnotSpec<'_>,
        weights: Option<Vec<Vec<f64>>>,
    ) -> Result<Self, GeomError> {
        let rows = control_points.len();
        let cols = control_points.first().map_or(0, Vec::len);
        if control_points.iter().any(|row| row.len() != cols) {
            return Err(GeomError::RaggedGrid);
        }
        let u_knots = expand_knots(u.multiplicities, u.values, rows + u.degree + 1)?;
        let v_knots = expand_knots(v.multiplicities, v.values, cols + v.degree + 1)?;
        validate_knots(&u_knots, rows, u.degree)?;
        validate_knots(&v_knots, cols, v.degree)?;

        if let Some(w) = &weights {
            let count: usize = w.iter().map(Vec::len).sum();
            if w.len() != rows || w.iter().any(|row| row.len() != cols) {
                return Err(GeomError::WeightMismatch {
                    expected: rows * cols,
                    actual: count,
                });
            }
            validate_weights(w.iter().flatten())?;
        }

        Ok(Self {
            u_degree: u.degree,
            v_degree: v.degree,
            control_points,
            u_knots,
            v_knots,
            weights,
        })
    }

    /// Whether this surface carries weights.
    pub fn is_rational(&self) -> bool {
        self.weights.is_some()
    }

    /// Parameter domain `((u_min, u_max), (v_min, v_max))`.
    pub fn domain(&self) -> ((f64, f64), (f64, f64)) {
        let rows = self.control_points.len();
        let cols = self.control_points[0].len();
        (
            (self.u_knots[self.u_degree], self.u_knots[rows]),
            (self.v_knots[self.v_degree], self.v_knots[cols]),
        )
    }

    /// Evaluate at `(u, v)`, clamped to the domain.
    pub fn evaluate(&self, uv: Point2) -> Point3 {
        let ((u0, u1), (v0, v1)) = self.domain();
        let u = uv.x.clamp(u0, u1);
        let v = uv.y.clamp(v0, v1);
        let n = self.control_points.len() - 1;
        let m = self.control_points[0].len() - 1;
        let span_u = find_span(&self.u_knots, n, self.u_degree, u);
        let span_v = find_span(&self.v_knots, m, self.v_degree, v);
        let nu = basis_functions(&self.u_knots, span_u, self.u_degree, u);
        let nv = basis_functions(&self.v_knots, span_v, self.v_degree, v);

        let mut sum = Vec3::zeros();
        let mut weight = 0.0;
        for (i, bu) in nu.iter().enumerate() {
            let iu = span_u - self.u_degree + i;
            for (j, bv) in nv.iter().enumerate() {
                let iv = span_v - self.v_degree + j;
                let w = self.weights.as_ref().map_or(1.0, |w| w[iu][iv]);
                let b = bu * bv * w;
                sum += b * self.control_points[iu][iv].coords;
                weight += b;
            }
        }
        Point3::from(sum / weight)
    }

    fn partials(&self, uv: Point2) -> (Vec3, Vec3) {
        let ((u0, u1), (v0, v1)) = self.domain();
        let du = (u1 - u0) * 1e-7;
        let dv = (v1 - v0) * 1e-7;
        let (ua, ub) = ((uv.x - du).max(u0), (uv.x + du).min(u1));
        let (va, vb) = ((uv.y - dv).max(v0), (uv.y + dv).min(v1));
        let d_du = (self.evaluate(Point2::new(ub, uv.y)) - self.evaluate(Point2::new(ua, uv.y)))
            / (ub - ua);
        let d_dv = (self.evaluate(Point2::new(uv.x, vb)) - self.evaluate(Point2::new(uv.x, va)))
            / (vb - va);
        (d_du, d_dv)
    }
}

// =============================================================================
// Surface
// =============================================================================

/// A parametric surface in 3D space.
#[derive(Debug, Clone, PartialEq)]
pub enum Surface {
    /// Plane.
    Plane(Plane),
    /// Cylinder.
    Cylindrical(CylindricalSurface),
    /// Cone.
    Conical(ConicalSurface),
    /// Sphere.
    Spherical(SphericalSurface),
    /// Torus.
    Toroidal(ToroidalSurface),
    /// Rational or non-rational B-spline patch.
    BSpline(BSplineSurface),
}

impl Surface {
    /// The kind of this surface.
    pub fn kind(&self) -> SurfaceKind {
        match self {
            Surface::Plane(_) => SurfaceKind::Plane,
            Surface::Cylindrical(_) => SurfaceKind::Cylindrical,
            Surface::Conical(_) => SurfaceKind::Conical,
            Surface::Spherical(_) => SurfaceKind::Spherical,
            Surface::Toroidal(_) => SurfaceKind::Toroidal,
            Surface::BSpline(s) if s.is_rational() => SurfaceKind::RationalBSpline,
            Surface::BSpline(_) => SurfaceKind::BSpline,
        }
    }

    /// The placement frame of an elementary surface.
    pub fn axis(&self) -> Option<&Axis> {
        match self {
            Surface::Plane(s) => Some(&s.axis),
            Surface::Cylindrical(s) => Some(&s.axis),
            Surface::Conical(s) => Some(&s.axis),
            Surface::Spherical(s) => Some(&s.axis),
            Surface::Toroidal(s) => Some(&s.axis),
            Surface::BSpline(_) => None,
        }
    }

    /// Evaluate the surface at parameter `(u, v)`.
    pub fn evaluate(&self, uv: Point2) -> Point3 {
        let (u, v) = (uv.x, uv.y);
        match self {
            Surface::Plane(s) => s.axis.to_global(&Vec3::new(u, v, 0.0)),
            Surface::Cylindrical(s) => {
                s.axis.origin + s.radius * s.axis.radial(u) + v * s.axis.z.as_ref()
            }
            Surface::Conical(s) => {
                let r = s.radius + v * s.semi_angle.tan();
                s.axis.origin + r * s.axis.radial(u) + v * s.axis.z.as_ref()
            }
            Surface::Spherical(s) => {
                let (sin_v, cos_v) = v.sin_cos();
                s.axis.origin
                    + s.radius * (cos_v * s.axis.radial(u) + sin_v * s.axis.z.as_ref())
            }
            Surface::Toroidal(s) => {
                let (sin_v, cos_v) = v.sin_cos();
                s.axis.origin
                    + (s.major_radius + s.minor_radius * cos_v) * s.axis.radial(u)
                    + s.minor_radius * sin_v * s.axis.z.as_ref()
            }
            Surface::BSpline(s) => s.evaluate(uv),
        }
    }

    /// Unit normal at `(u, v)`, or `None` at a singular point.
    pub fn normal(&self, uv: Point2) -> Option<Dir3> {
        let (u, v) = (uv.x, uv.y);
        let n = match self {
            Surface::Plane(s) => *s.axis.z.as_ref(),
            Surface::Cylindrical(s) => s.axis.radial(u),
            Surface::Conical(s) => {
                if s.radius + v * s.semi_angle.tan() <= 0.0 {
                    return None;
                }
                let (sin_a, cos_a) = s.semi_angle.sin_cos();
                cos_a * s.axis.radial(u) - sin_a * s.axis.z.as_ref()
            }
            Surface::Spherical(s) => {
                let (sin_v, cos_v) = v.sin_cos();
                cos_v * s.axis.radial(u) + sin_v * s.axis.z.as_ref()
            }
            Surface::Toroidal(s) => {
                let (sin_v, cos_v) = v.sin_cos();
                cos_v * s.axis.radial(u) + sin_v * s.axis.z.as_ref()
            }
            Surface::BSpline(s) => {
                let (d_du, d_dv) = s.partials(uv);
                d_du.cross(&d_dv)
            }
        };
        Tolerance::DEFAULT.direction(&n)
    }

    /// Parameter domain as `((u_min, u_max), (v_min, v_max))`.
    pub fn domain(&self) -> ((f64, f64), (f64, f64)) {
        let open = (f64::NEG_INFINITY, f64::INFINITY);
        match self {
            Surface::Plane(_) => (open, open),
            Surface::Cylindrical(_) | Surface::Conical(_) => ((0.0, TAU), open),
            Surface::Spherical(_) => ((0.0, TAU), (-FRAC_PI_2, FRAC_PI_2)),
            Surface::Toroidal(_) => ((0.0, TAU), (0.0, TAU)),
            Surface::BSpline(s) => s.domain(),
        }
    }
}
