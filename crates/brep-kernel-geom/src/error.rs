//! Error types for geometry construction.

use thiserror::Error;

/// Reasons a curve or surface cannot be built from its parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomError {
    /// A direction, vector or frame collapsed to zero length.
    #[error("degenerate {what}")]
    Degenerate {
        /// What collapsed.
        what: &'static str,
    },

    /// A scalar parameter is out of its valid range.
    #[error("invalid {name}: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// B-spline degree of zero.
    #[error("B-spline degree must be at least 1")]
    InvalidDegree,

    /// Fewer control points than `degree + 1`.
    #[error("degree {degree} needs at least {} control points, got {count}", .degree + 1)]
    TooFewControlPoints {
        /// Polynomial degree.
        degree: usize,
        /// Control points supplied.
        count: usize,
    },

    /// Multiplicity and knot value lists differ in length.
    #[error("{multiplicities} knot multiplicities for {values} knot values")]
    MultiplicityMismatch {
        /// Number of multiplicities.
        multiplicities: usize,
        /// Number of distinct knot values.
        values: usize,
    },

    /// Expanded knot vector has the wrong length.
    #[error("knot vector has {actual} entries, expected {expected}")]
    KnotMismatch {
        /// `control points + degree + 1`.
        expected: usize,
        /// Actual expanded length.
        actual: usize,
    },

    /// Knot values decrease, are not finite, or a multiplicity is zero.
    #[error("knot values must be finite and non-decreasing with positive multiplicities")]
    InvalidKnots,

    /// Weight count or shape disagrees with the control points.
    #[error("{actual} weights for {expected} control points")]
    WeightMismatch {
        /// Control points that need a weight.
        expected: usize,
        /// Weights supplied.
        actual: usize,
    },

    /// Rows of a control-point grid differ in length.
    #[error("control point grid is not rectangular")]
    RaggedGrid,
}
