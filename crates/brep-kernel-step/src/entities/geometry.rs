//! Fundamental geometry entities: points, directions, vectors and placements.

use brep_kernel_geom::GeomError;
use brep_kernel_math::{Axis, Point3, Tolerance, Vec3};

use crate::error::StepError;
use crate::fields::Field::{self, *};
use crate::reader::StepReader;

/// `CARTESIAN_POINT(name, (x, y, z))`, `DIRECTION(name, (x, y, z))`
const TRIPLE: &[Field] = &[Skip(&[Text]), Group(&[Skip(&[Text]), Triple])];

/// `VECTOR(name, direction, magnitude)`
const VECTOR: &[Field] = &[Skip(&[Text]), Group(&[Skip(&[Text]), Reference, Real])];

/// `AXIS2_PLACEMENT_3D(name, location, axis, ref_direction)`
const PLACEMENT: &[Field] = &[
    Skip(&[Text]),
    Group(&[Skip(&[Text]), Reference, Reference, Reference]),
];

/// `VERTEX_POINT(name, point)`
const VERTEX: &[Field] = &[Skip(&[Text]), Group(&[Skip(&[Text]), Reference])];

impl StepReader<'_> {
    /// Resolve a direction to its raw (unnormalized) components.
    pub(crate) fn direction(&mut self, id: u64) -> Result<Vec3, StepError> {
        self.enter(id, |_, record| {
            let [x, y, z] = record.decode(TRIPLE)?.triple()?;
            Ok(Vec3::new(x, y, z))
        })
    }

    /// Resolve a point. Points share the direction layout.
    pub(crate) fn point(&mut self, id: u64) -> Result<Point3, StepError> {
        self.direction(id).map(Point3::from)
    }

    /// Resolve a vector: its direction normalized, scaled by the magnitude.
    pub(crate) fn vector(&mut self, id: u64) -> Result<Vec3, StepError> {
        self.enter(id, |r, record| {
            let mut fields = record.decode(VECTOR)?;
            let direction = fields.required()?;
            let magnitude = fields.real()?;
            let v = r.direction(direction)?;
            let unit = Tolerance::DEFAULT.direction(&v).ok_or_else(|| {
                StepError::geometry(record.id, GeomError::Degenerate { what: "vector direction" })
            })?;
            Ok(unit.into_inner() * magnitude)
        })
    }

    /// Resolve an axis placement.
    ///
    /// An unset axis defaults to global +Z; an unset reference direction is
    /// chosen perpendicular to the axis.
    pub(crate) fn axis(&mut self, id: u64) -> Result<Axis, StepError> {
        self.enter(id, |r, record| {
            let mut fields = record.decode(PLACEMENT)?;
            let center = fields.required()?;
            let z = fields.reference()?;
            let x = fields.reference()?;

            let origin = r.point(center)?;
            let z = match z {
                Some(z) => r.direction(z)?,
                None => Vec3::z(),
            };
            let axis = match x {
                Some(x) => Axis::from_zx(z, r.direction(x)?, origin),
                None => Axis::from_z(z, origin),
            };
            axis.ok_or_else(|| {
                StepError::geometry(record.id, GeomError::Degenerate { what: "axis placement" })
            })
        })
    }

    /// Resolve a vertex to its point.
    pub(crate) fn vertex(&mut self, id: u64) -> Result<Point3, StepError> {
        self.enter(id, |r, record| {
            let point = record.decode(VERTEX)?.required()?;
            r.point(point)
        })
    }
}
