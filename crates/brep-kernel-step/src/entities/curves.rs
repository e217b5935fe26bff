//! Curve entities.

use std::sync::Arc;

use brep_kernel_geom::{BSplineCurve, Circle, Curve, Ellipse, Hyperbola, Line, Parabola};
use brep_kernel_math::Point3;
use tracing::trace;

use super::{curve_entity, CurveEntity};
use crate::error::StepError;
use crate::fields::Field::{self, *};
use crate::loader::Record;
use crate::reader::StepReader;

/// `LINE(name, pnt, dir)`
const LINE: &[Field] = &[Skip(&[Text]), Group(&[Skip(&[Text]), Reference, Reference])];

/// `CIRCLE(name, position, radius)`, `PARABOLA(name, position, focal_dist)`
const CONIC_ONE: &[Field] = &[Skip(&[Text]), Group(&[Skip(&[Text]), Reference, Real])];

/// `ELLIPSE(name, position, semi_axis_1, semi_axis_2)` and the hyperbola equivalent
const CONIC_TWO: &[Field] = &[Skip(&[Text]), Group(&[Skip(&[Text]), Reference, Real, Real])];

/// `B_SPLINE_CURVE_WITH_KNOTS(name, degree, points, form, closed, self_intersect,
/// multiplicities, knots, knot_spec)`
const BSPLINE: &[Field] = &[
    Skip(&[Text]),
    Group(&[
        Skip(&[Text]),
        Integer,
        List(&Reference),
        Skip(&[Text, Logical, Logical]),
        List(&Integer),
        List(&Real),
        Skip(&[Text]),
    ]),
];

/// The complex rational form. Part 21 lists the partial entities
/// alphabetically, so the layout is fixed:
///
/// ```text
/// ( BOUNDED_CURVE() B_SPLINE_CURVE(degree, points, form, closed, self_intersect)
///   B_SPLINE_CURVE_WITH_KNOTS(multiplicities, knots, knot_spec)
///   CURVE() GEOMETRIC_REPRESENTATION_ITEM() RATIONAL_B_SPLINE_CURVE(weights)
///   REPRESENTATION_ITEM(name) )
/// ```
const RATIONAL_BSPLINE: &[Field] = &[
    Skip(&[Text, Text, Text, Text, Text]),
    Group(&[Integer, List(&Reference), Skip(&[Text, Logical, Logical])]),
    Skip(&[Text]),
    Group(&[List(&Integer), List(&Real), Skip(&[Text])]),
    Skip(&[Text, Text, Text, Text, Text, Text, Text]),
    Group(&[List(&Real)]),
];

/// Partial entity that marks a complex record as a rational curve.
const RATIONAL_MARKER: &str = "RATIONAL_B_SPLINE_CURVE";

impl StepReader<'_> {
    /// Resolve a curve, building it on first use.
    pub fn curve(&mut self, id: u64) -> Result<Arc<Curve>, StepError> {
        if let Some(curve) = self.curves.get(&id) {
            return Ok(Arc::clone(curve));
        }

        let curve = self.enter(id, |r, record| {
            let kind = curve_entity(&record.keyword)
                .filter(|k| *k != CurveEntity::RationalBSplineCurve || record.body.contains(RATIONAL_MARKER))
                .ok_or_else(|| StepError::UnsupportedCurve {
                    entity_id: id,
                    keyword: record.keyword.clone(),
                })?;
            trace!(id, ?kind, "building curve");
            r.build_curve(kind, record)
        })?;

        let curve = Arc::new(curve);
        self.curves.insert(id, Arc::clone(&curve));
        Ok(curve)
    }

    fn build_curve(&mut self, kind: CurveEntity, record: &Record) -> Result<Curve, StepError> {
        let id = record.id;
        let geometry = move |e| StepError::geometry(id, e);

        match kind {
            CurveEntity::Line => {
                let mut fields = record.decode(LINE)?;
                let point = fields.required()?;
                let vector = fields.required()?;
                let origin = self.point(point)?;
                let direction = self.vector(vector)?;
                Line::new(origin, direction).map(Curve::Line).map_err(geometry)
            }
            CurveEntity::Circle | CurveEntity::Parabola => {
                let mut fields = record.decode(CONIC_ONE)?;
                let axis = fields.required()?;
                let value = fields.real()?;
                let axis = self.axis(axis)?;
                let curve = if kind == CurveEntity::Circle {
                    Circle::new(value, axis).map(Curve::Circle)
                } else {
                    Parabola::new(value, axis).map(Curve::Parabola)
                };
                curve.map_err(geometry)
            }
            CurveEntity::Ellipse | CurveEntity::Hyperbola => {
                let mut fields = record.decode(CONIC_TWO)?;
                let axis = fields.required()?;
                let first = fields.real()?;
                let second = fields.real()?;
                let axis = self.axis(axis)?;
                let curve = if kind == CurveEntity::Ellipse {
                    Ellipse::new(first, second, axis).map(Curve::Ellipse)
                } else {
                    Hyperbola::new(first, second, axis).map(Curve::Hyperbola)
                };
                curve.map_err(geometry)
            }
            CurveEntity::BSplineCurveWithKnots => {
                let mut fields = record.decode(BSPLINE)?;
                let degree = fields.integer()?;
                let points = fields.references()?;
                let multiplicities = fields.integers()?;
                let knots = fields.reals()?;
                let points = self.points(points)?;
                BSplineCurve::new(degree, points, &multiplicities, &knots)
                    .map(Curve::BSpline)
                    .map_err(geometry)
            }
            CurveEntity::RationalBSplineCurve => {
                let mut fields = record.decode(RATIONAL_BSPLINE)?;
                let degree = fields.integer()?;
                let points = fields.references()?;
                let multiplicities = fields.integers()?;
                let knots = fields.reals()?;
                let weights = fields.reals()?;
                let points = self.points(points)?;
                BSplineCurve::rational(degree, points, &multiplicities, &knots, weights)
                    .map(Curve::BSpline)
                    .map_err(geometry)
            }
        }
    }

    /// Resolve a list of point references in order.
    pub(crate) fn points(&mut self, ids: Vec<u64>) -> Result<Vec<Point3>, StepError> {
        ids.into_iter().map(|id| self.point(id)).collect()
    }
}
