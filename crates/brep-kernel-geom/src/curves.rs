//! Parametric 3D curves: lines, conics and B-splines.

use std::f64::consts::TAU;

use brep_kernel_math::{Axis, Point3, Tolerance, Vec3};

use crate::nurbs::{basis_functions, expand_knots, find_span, validate_knots, validate_weights};
use crate::GeomError;

/// The kind of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    /// Infinite line.
    Line,
    /// Circle.
    Circle,
    /// Ellipse.
    Ellipse,
    /// Hyperbola (one branch).
    Hyperbola,
    /// Parabola.
    Parabola,
    /// Non-rational B-spline curve.
    BSpline,
    /// Rational B-spline (NURBS) curve.
    RationalBSpline,
}

// =============================================================================
// Line
// =============================================================================

/// An unbounded line.
///
/// Parameterization: `P(t) = origin + t * direction`. The direction keeps its
/// magnitude, so `t` is measured in multiples of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Point at `t = 0`.
    pub origin: Point3,
    /// Direction vector (not normalized).
    pub direction: Vec3,
}

impl Line {
    /// Create a line through `origin` along `direction`.
    pub fn new(origin: Point3, direction: Vec3) -> Result<Self, GeomError> {
        if Tolerance::DEFAULT.is_zero(direction.norm()) {
            return Err(GeomError::Degenerate {
                what: "line direction",
            });
        }
        Ok(Self { origin, direction })
    }

    fn evaluate(&self, t: f64) -> Point3 {
        self.origin + t * self.direction
    }

    fn parameter_of(&self, p: &Point3) -> f64 {
        (p - self.origin).dot(&self.direction) / self.direction.norm_squared()
    }
}

// =============================================================================
// Conics
// =============================================================================

fn positive(name: &'static str, value: f64) -> Result<f64, GeomError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(GeomError::InvalidParameter { name, value })
    }
}

fn wrap_angle(t: f64) -> f64 {
    t.rem_euclid(TAU)
}

/// A circle in the XY plane of its placement.
///
/// Parameterization: `P(t) = origin + radius * (cos(t) * x + sin(t) * y)`, `t ∈ [0, 2π)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    /// Placement frame; the circle is centered at its origin.
    pub axis: Axis,
    /// Radius.
    pub radius: f64,
}

impl Circle {
    /// Create a circle. The radius must be positive.
    pub fn new(radius: f64, axis: Axis) -> Result<Self, GeomError> {
        Ok(Self {
            axis,
            radius: positive("circle radius", radius)?,
        })
    }
}

/// An ellipse in the XY plane of its placement.
///
/// Parameterization: `P(t) = origin + a * cos(t) * x + b * sin(t) * y`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
    /// Placement frame.
    pub axis: Axis,
    /// Semi-axis along local X.
    pub semi_axis_1: f64,
    /// Semi-axis along local Y.
    pub semi_axis_2: f64,
}

impl Ellipse {
    /// Create an ellipse. Both semi-axes must be positive.
    pub fn new(semi_axis_1: f64, semi_axis_2: f64, axis: Axis) -> Result<Self, GeomError> {
        Ok(Self {
            axis,
            semi_axis_1: positive("ellipse semi-axis", semi_axis_1)?,
            semi_axis_2: positive("ellipse semi-axis", semi_axis_2)?,
        })
    }
}

/// One branch of a hyperbola.
///
/// Parameterization: `P(t) = origin + a * cosh(t) * x + b * sinh(t) * y`.
#[derive(Debug, Clone, PartialEq)]
pub struct Hyperbola {
    /// Placement frame.
    pub axis: Axis,
    /// Real semi-axis (along local X).
    pub semi_axis: f64,
    /// Imaginary semi-axis (along local Y).
    pub semi_imag_axis: f64,
}

impl Hyperbola {
    /// Create a hyperbola. Both semi-axes must be positive.
    pub fn new(semi_axis: f64, semi_imag_axis: f64, axis: Axis) -> Result<Self, GeomError> {
        Ok(Self {
            axis,
            semi_axis: positive("hyperbola semi-axis", semi_axis)?,
            semi_imag_axis: positive("hyperbola imaginary semi-axis", semi_imag_axis)?,
        })
    }
}

/// A parabola opening along local X.
///
/// Parameterization: `P(t) = origin + f * (t² * x + 2t * y)` where `f` is the
/// focal distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Parabola {
    /// Placement frame; the origin is the apex.
    pub axis: Axis,
    /// Distance from apex to focus. Must be non-zero.
    pub focal_distance: f64,
}

impl Parabola {
    /// Create a parabola.
    pub fn new(focal_distance: f64, axis: Axis) -> Result<Self, GeomError> {
        if focal_distance == 0.0 || !focal_distance.is_finite() {
            return Err(GeomError::InvalidParameter {
                name: "parabola focal distance",
                value: focal_distance,
            });
        }
        Ok(Self {
            axis,
            focal_distance,
        })
    }
}

// =============================================================================
// B-spline curve
// =============================================================================

/// A B-spline curve, rational when `weights` is present.
///
/// Knots are stored expanded: `knots.len() == control_points.len() + degree + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct BSplineCurve {
    /// Polynomial degree.
    pub degree: usize,
    /// Control points.
    pub control_points: Vec<Point3>,
    /// Expanded knot vector.
    pub knots: Vec<f64>,
    /// One positive weight per control point for the rational form.
    pub weights: Option<Vec<f64>>,
}

impl BSplineCurve {
    /// Create a non-rational B-spline from knot multiplicities and values.
    pub fn new(
        degree: usize,
        control_points: Vec<Point3>,
        multiplicities: &[usize],
        knot_values: &[f64],
    ) -> Result<Self, GeomError> {
        let knots = expand_knots(multiplicities, knot_values, control_points.len() + degree + 1)?;
        Self::from_knots(degree, control_points, knots, None)
    }

    /// Create a rational B-spline from knot multiplicities, values and weights.
    pub fn rational(
        degree: usize,
        control_points: Vec<Point3>,
        multiplicities: &[usize],
        knot_values: &[f64],
        weights: Vec<f64>,
    ) -> Result<Self, GeomError> {
        let knots = expand_knots(multiplicities, knot_values, control_points.len() + degree + 1)?;
        Self::from_knots(degree, control_points, knots, Some(weights))
    }

    /// Create a B-spline from an already expanded knot vector.
    pub fn from_knots(
        degree: usize,
        control_points: Vec<Point3>,
        knots: Vec<f64>,
        weights: Option<Vec<f64>>,
    ) -> Result<Self, GeomError> {
        validate_knots(&knots, control_points.len(), degree)?;
        if let Some(w) = &weights {
            if w.len() != control_points.len() {
                return Err(GeomError::WeightMismatch {
                    expected: control_points.len(),
                    actual: w.len(),
                });
            }
            validate_weights(w)?;
        }
        Ok(Self {
            degree,
            control_points,
            knots,
            weights,
        })
    }

    /// Whether this curve carries weights.
    pub fn is_rational(&self) -> bool {
        self.weights.is_some()
    }

    /// Parameter domain `(knots[degree], knots[n])`.
    pub fn domain(&self) -> (f64, f64) {
        (self.knots[self.degree], self.knots[self.control_points.len()])
    }

    /// Evaluate at `t`, clamped to the domain.
    pub fn evaluate(&self, t: f64) -> Point3 {
        let n = self.control_points.len() - 1;
        let (t0, t1) = self.domain();
        let t = t.clamp(t0, t1);
        let span = find_span(&self.knots, n, self.degree, t);
        let basis = basis_functions(&self.knots, span, self.degree, t);

        let mut sum = Vec3::zeros();
        let mut weight = 0.0;
        for (i, b) in basis.iter().enumerate() {
            let idx = span - self.degree + i;
            let w = self.weights.as_ref().map_or(1.0, |w| w[idx]);
            sum += b * w * self.control_points[idx].coords;
            weight += b * w;
        }
        Point3::from(sum / weight)
    }

    fn tangent(&self, t: f64) -> Vec3 {
        let (t0, t1) = self.domain();
        let dt = (t1 - t0) * 1e-7;
        let a = (t - dt).max(t0);
        let b = (t + dt).min(t1);
        (self.evaluate(b) - self.evaluate(a)) / (b - a)
    }

    fn parameter_of(&self, p: &Point3) -> f64 {
        let (t0, t1) = self.domain();
        let samples = 16 * self.control_points.len();
        let mut best = t0;
        let mut best_dist = f64::INFINITY;
        for i in 0..=samples {
            let t = t0 + (t1 - t0) * i as f64 / samples as f64;
            let d = (self.evaluate(t) - p).norm_squared();
            if d < best_dist {
                best = t;
                best_dist = d;
            }
        }
        // Gauss-Newton refinement on |C(t) - p|²
        for _ in 0..8 {
            let d = self.tangent(best);
            let len2 = d.norm_squared();
            if len2 < 1e-30 {
                break;
            }
            let step = d.dot(&(self.evaluate(best) - p)) / len2;
            best = (best - step).clamp(t0, t1);
            if step.abs() < 1e-14 {
                break;
            }
        }
        best
    }
}

// =============================================================================
// Curve
// =============================================================================

/// A 3D parametric curve.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    /// Line.
    Line(Line),
    /// Circle.
    Circle(Circle),
    /// Ellipse.
    Ellipse(Ellipse),
    /// Hyperbola.
    Hyperbola(Hyperbola),
    /// Parabola.
    Parabola(Parabola),
    /// Rational or non-rational B-spline.
    BSpline(BSplineCurve),
}

impl Curve {
    /// The kind of this curve.
    pub fn kind(&self) -> CurveKind {
        match self {
            Curve::Line(_) => CurveKind::Line,
            Curve::Circle(_) => CurveKind::Circle,
            Curve::Ellipse(_) => CurveKind::Ellipse,
            Curve::Hyperbola(_) => CurveKind::Hyperbola,
            Curve::Parabola(_) => CurveKind::Parabola,
            Curve::BSpline(c) if c.is_rational() => CurveKind::RationalBSpline,
            Curve::BSpline(_) => CurveKind::BSpline,
        }
    }

    /// The B-spline payload, if this is a B-spline curve.
    pub fn as_bspline(&self) -> Option<&BSplineCurve> {
        match self {
            Curve::BSpline(c) => Some(c),
            _ => None,
        }
    }

    /// Evaluate the curve at parameter `t`.
    pub fn evaluate(&self, t: f64) -> Point3 {
        match self {
            Curve::Line(l) => l.evaluate(t),
            Curve::Circle(c) => c.axis.origin + c.radius * c.axis.radial(t),
            Curve::Ellipse(e) => e.axis.to_global(&Vec3::new(
                e.semi_axis_1 * t.cos(),
                e.semi_axis_2 * t.sin(),
                0.0,
            )),
            Curve::Hyperbola(h) => h.axis.to_global(&Vec3::new(
                h.semi_axis * t.cosh(),
                h.semi_imag_axis * t.sinh(),
                0.0,
            )),
            Curve::Parabola(p) => p.axis.to_global(&Vec3::new(
                p.focal_distance * t * t,
                2.0 * p.focal_distance * t,
                0.0,
            )),
            Curve::BSpline(c) => c.evaluate(t),
        }
    }

    /// First derivative with respect to `t`.
    pub fn tangent(&self, t: f64) -> Vec3 {
        match self {
            Curve::Line(l) => l.direction,
            Curve::Circle(c) => c.radius * c.axis.radial(t + std::f64::consts::FRAC_PI_2),
            Curve::Ellipse(e) => e.axis.vector(&Vec3::new(
                -e.semi_axis_1 * t.sin(),
                e.semi_axis_2 * t.cos(),
                0.0,
            )),
            Curve::Hyperbola(h) => h.axis.vector(&Vec3::new(
                h.semi_axis * t.sinh(),
                h.semi_imag_axis * t.cosh(),
                0.0,
            )),
            Curve::Parabola(p) => p.axis.vector(&Vec3::new(
                2.0 * p.focal_distance * t,
                2.0 * p.focal_distance,
                0.0,
            )),
            Curve::BSpline(c) => c.tangent(t),
        }
    }

    /// Parameter domain `(t_min, t_max)`; unbounded curves report infinities.
    pub fn domain(&self) -> (f64, f64) {
        match self {
            Curve::Circle(_) | Curve::Ellipse(_) => (0.0, TAU),
            Curve::Line(_) | Curve::Hyperbola(_) | Curve::Parabola(_) => {
                (f64::NEG_INFINITY, f64::INFINITY)
            }
            Curve::BSpline(c) => c.domain(),
        }
    }

    /// Parameter period for closed analytic curves.
    pub fn period(&self) -> Option<f64> {
        match self {
            Curve::Circle(_) | Curve::Ellipse(_) => Some(TAU),
            _ => None,
        }
    }

    /// Parameter of the curve point closest to `p`.
    ///
    /// Exact for lines and conics when `p` lies on the curve; B-splines use a
    /// sampled search refined by Newton steps.
    pub fn parameter_of(&self, p: &Point3) -> f64 {
        match self {
            Curve::Line(l) => l.parameter_of(p),
            Curve::Circle(c) => {
                let local = c.axis.to_local(p);
                wrap_angle(local.y.atan2(local.x))
            }
            Curve::Ellipse(e) => {
                let local = e.axis.to_local(p);
                wrap_angle((local.y / e.semi_axis_2).atan2(local.x / e.semi_axis_1))
            }
            Curve::Hyperbola(h) => (h.axis.to_local(p).y / h.semi_imag_axis).asinh(),
            Curve::Parabola(pb) => pb.axis.to_local(p).y / (2.0 * pb.focal_distance),
            Curve::BSpline(c) => c.parameter_of(p),
        }
    }
}
