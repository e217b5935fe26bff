#![warn(missing_docs)]

//! Curve, surface and topology types for the B-rep kernel.
//!
//! Geometry is modeled as closed enums: [`Curve`] covers lines, the four
//! conics and B-splines; [`Surface`] covers the five elementary surfaces and
//! B-spline patches. Rational forms are B-splines that carry weights, and
//! report themselves through [`CurveKind::RationalBSpline`] and
//! [`SurfaceKind::RationalBSpline`].
//!
//! Constructors validate their parameters and return [`GeomError`] instead
//! of producing degenerate geometry.
//!
//! # Key types
//!
//! - [`Curve`], [`Surface`]: parametric geometry with evaluation
//! - [`Edge`], [`OrientedEdge`], [`FaceBound`], [`Face`], [`Shell`]: B-rep aggregates

mod curves;
mod error;
pub mod nurbs;
mod surfaces;
mod topology;

pub use curves::{BSplineCurve, Circle, Curve, CurveKind, Ellipse, Hyperbola, Line, Parabola};
pub use error::GeomError;
pub use surfaces::{
    BSplineSurface, ConicalSurface, CylindricalSurface, KnotSpec, Plane, SphericalSurface, Surface,
    SurfaceKind, ToroidalSurface,
};
pub use topology::{Edge, EdgeBounds, Face, FaceBound, OrientedEdge, Shell};
