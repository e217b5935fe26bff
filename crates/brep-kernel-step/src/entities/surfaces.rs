//! Surface entities.

use std::sync::Arc;

use brep_kernel_geom::{
    BSplineSurface, ConicalSurface, CylindricalSurface, KnotSpec, Plane, SphericalSurface, Surface,
    ToroidalSurface,
};
use brep_kernel_math::Point3;
use tracing::trace;

use super::{surface_entity, SurfaceEntity};
use crate::error::StepError;
use crate::fields::Field::{self, *};
use crate::loader::Record;
use crate::reader::StepReader;

/// `PLANE(name, position)`
const PLANE: &[Field] = &[Skip(&[Text]), Group(&[Skip(&[Text]), Reference])];

/// `CYLINDRICAL_SURFACE(name, position, radius)`, `SPHERICAL_SURFACE(name, position, radius)`
const RADIUS: &[Field] = &[Skip(&[Text]), Group(&[Skip(&[Text]), Reference, Real])];

/// `CONICAL_SURFACE(name, position, radius, semi_angle)`,
/// `TOROIDAL_SURFACE(name, position, major_radius, minor_radius)`
const TWO_PARAMS: &[Field] = &[Skip(&[Text]), Group(&[Skip(&[Text]), Reference, Real, Real])];

/// `B_SPLINE_SURFACE_WITH_KNOTS(name, u_degree, v_degree, points, form, u_closed,
/// v_closed, self_intersect, u_multiplicities, v_multiplicities, u_knots, v_knots, knot_spec)`
const BSPLINE: &[Field] = &[
    Skip(&[Text]),
    Group(&[
        Skip(&[Text]),
        Integer,
        Integer,
        Matrix(&Reference),
        Skip(&[Text, Logical, Logical, Logical]),
        List(&Integer),
        List(&Integer),
        List(&Real),
        List(&Real),
        Skip(&[Text]),
    ]),
];

/// The complex rational form:
///
/// ```text
/// ( BOUNDED_SURFACE() B_SPLINE_SURFACE(u_degree, v_degree, points, form, u_closed, v_closed, self_intersect)
///   B_SPLINE_SURFACE_WITH_KNOTS(u_mults, v_mults, u_knots, v_knots, knot_spec)
///   GEOMETRIC_REPRESENTATION_ITEM() RATIONAL_B_SPLINE_SURFACE(weights)
///   REPRESENTATION_ITEM(name) SURFACE() )
/// ```
const RATIONAL_BSPLINE: &[Field] = &[
    Skip(&[Text, Text, Text, Text, Text]),
    Group(&[
        Integer,
        Integer,
        Matrix(&Reference),
        Skip(&[Text, Logical, Logical, Logical]),
    ]),
    Skip(&[Text]),
    Group(&[
        List(&Integer),
        List(&Integer),
        List(&Real),
        List(&Real),
        Skip(&[Text]),
    ]),
    Skip(&[Text, Text, Text, Text]),
    Group(&[Matrix(&Real)]),
    Skip(&[Text, Text, Text, Text, Text, Text, Text, Text]),
];

const RATIONAL_MARKER: &str = "RATIONAL_B_SPLINE_SURFACE";

impl StepReader<'_> {
    /// Resolve a surface, building it on first use.
    pub fn surface(&mut self, id: u64) -> Result<Arc<Surface>, StepError> {
        if let Some(surface) = self.surfaces.get(&id) {
            return Ok(Arc::clone(surface));
        }

        let surface = self.enter(id, |r, record| {
            let kind = surface_entity(&record.keyword)
                .filter(|k| {
                    *k != SurfaceEntity::RationalBSplineSurface || record.body.contains(RATIONAL_MARKER)
                })
                .ok_or_else(|| StepError::UnsupportedSurface {
                    entity_id: id,
                    keyword: record.keyword.clone(),
                })?;
            trace!(id, ?kind, "building surface");
            r.build_surface(kind, record)
        })?;

        let surface = Arc::new(surface);
        self.surfaces.insert(id, Arc::clone(&surface));
        Ok(surface)
    }

    fn build_surface(&mut self, kind: SurfaceEntity, record: &Record) -> Result<Surface, StepError> {
        let id = record.id;
        let geometry = move |e| StepError::geometry(id, e);

        match kind {
            SurfaceEntity::Plane => {
                let axis = record.decode(PLANE)?.required()?;
                Ok(Surface::Plane(Plane::new(self.axis(axis)?)))
            }
            SurfaceEntity::CylindricalSurface | SurfaceEntity::SphericalSurface => {
                let mut fields = record.decode(RADIUS)?;
                let axis = fields.required()?;
                let radius = fields.real()?;
                let axis = self.axis(axis)?;
                let surface = if kind == SurfaceEntity::CylindricalSurface {
                    CylindricalSurface::new(radius, axis).map(Surface::Cylindrical)
                } else {
                    SphericalSurface::new(radius, axis).map(Surface::Spherical)
                };
                surface.map_err(geometry)
            }
            SurfaceEntity::ConicalSurface | SurfaceEntity::ToroidalSurface => {
                let mut fields = record.decode(TWO_PARAMS)?;
                let axis = fields.required()?;
                let first = fields.real()?;
                let second = fields.real()?;
                let axis = self.axis(axis)?;
                let surface = if kind == SurfaceEntity::ConicalSurface {
                    ConicalSurface::new(first, second, axis).map(Surface::Conical)
                } else {
                    ToroidalSurface::new(first, second, axis).map(Surface::Toroidal)
                };
                surface.map_err(geometry)
            }
            SurfaceEntity::BSplineSurfaceWithKnots | SurfaceEntity::RationalBSplineSurface => {
                let rational = kind == SurfaceEntity::RationalBSplineSurface;
                let mut fields = record.decode(if rational { RATIONAL_BSPLINE } else { BSPLINE })?;
                let u_degree = fields.integer()?;
                let v_degree = fields.integer()?;
                let grid = fields.reference_grid()?;
                let u_mults = fields.integers()?;
                let v_mults = fields.integers()?;
                let u_knots = fields.reals()?;
                let v_knots = fields.reals()?;
                let weights = if rational { Some(fields.real_grid()?) } else { None };

                let grid = self.point_grid(grid)?;
                let u = KnotSpec {
                    degree: u_degree,
                    multiplicities: &u_mults,
                    values: &u_knots,
                };
                let v = KnotSpec {
                    degree: v_degree,
                    multiplicities: &v_mults,
                    values: &v_knots,
                };
                BSplineSurface::new(grid, u, v, weights)
                    .map(Surface::BSpline)
                    .map_err(geometry)
            }
        }
    }

    fn point_grid(&mut self, grid: Vec<Vec<u64>>) -> Result<Vec<Vec<Point3>>, StepError> {
        let mut rows = Vec::with_capacity(grid.len());
        for row in grid {
            rows.push(self.points(row)?);
        }
        Ok(rows)
    }
}
