//! Topology entities: representation, solid, shell, face, bound, loop and edges.

use std::sync::Arc;

use brep_kernel_geom::{BSplineCurve, Edge, Face, FaceBound, OrientedEdge, Shell};
use brep_kernel_math::Axis;
use tracing::trace;

use crate::error::StepError;
use crate::fields::Field::{self, *};
use crate::reader::StepReader;

/// `ADVANCED_BREP_SHAPE_REPRESENTATION(name, (solids.., axis), context)`
const REPRESENTATION: &[Field] = &[
    Skip(&[Text]),
    Group(&[Skip(&[Text]), List(&Reference), Skip(&[Reference])]),
];

/// `MANIFOLD_SOLID_BREP(name, outer)`
const SOLID: &[Field] = &[Skip(&[Text]), Group(&[Skip(&[Text]), Reference])];

/// `CLOSED_SHELL(name, faces)`, `OPEN_SHELL(name, faces)`
const SHELL: &[Field] = &[Skip(&[Text]), Group(&[Skip(&[Text]), List(&Reference)])];

/// `ORIENTED_CLOSED_SHELL(name, *, shell, orientation)` and the other oriented wrappers
const ORIENTED: &[Field] = &[
    Skip(&[Text]),
    Group(&[Skip(&[Text, Text]), Reference, Logical]),
];

/// `ADVANCED_FACE(name, bounds, surface, same_sense)`, `FACE_SURFACE(..)`
const FACE: &[Field] = &[
    Skip(&[Text]),
    Group(&[Skip(&[Text]), List(&Reference), Reference, Logical]),
];

/// `FACE_BOUND(name, loop, orientation)`, `FACE_OUTER_BOUND(..)`
const BOUND: &[Field] = &[Skip(&[Text]), Group(&[Skip(&[Text]), Reference, Logical])];

/// `EDGE_LOOP(name, edges)`, `OPEN_PATH(name, edges)`
const PATH: &[Field] = &[Skip(&[Text]), Group(&[Skip(&[Text]), List(&Reference)])];

/// `ORIENTED_EDGE(name, *, *, edge, orientation)`
const ORIENTED_EDGE: &[Field] = &[
    Skip(&[Text]),
    Group(&[Skip(&[Text, Text, Text]), Reference, Logical]),
];

/// `EDGE_CURVE(name, start, end, curve, same_sense)`
const EDGE_CURVE: &[Field] = &[
    Skip(&[Text]),
    Group(&[Skip(&[Text]), Reference, Reference, Reference, Logical]),
];

const OUTER_BOUND: &str = "FACE_OUTER_BOUND";

impl StepReader<'_> {
    /// Shell ids of a representation, each paired with the representation's axis.
    pub(crate) fn root(&mut self, id: u64) -> Result<Vec<(u64, Axis)>, StepError> {
        self.enter(id, |r, record| {
            let items = record.decode(REPRESENTATION)?.references()?;
            let (&axis, solids) = items
                .split_last()
                .ok_or_else(|| StepError::syntax(id, "representation has no items"))?;
            let axis = r.axis(axis)?;

            let mut shells = Vec::with_capacity(solids.len());
            for &solid in solids {
                shells.push((r.solid(solid)?, axis.clone()));
            }
            Ok(shells)
        })
    }

    /// The shell id wrapped by a solid.
    pub(crate) fn solid(&mut self, id: u64) -> Result<u64, StepError> {
        self.enter(id, |_, record| record.decode(SOLID)?.required())
    }

    /// Build a shell with its faces in declared order.
    pub(crate) fn shell(&mut self, id: u64, axis: Axis) -> Result<Shell, StepError> {
        let (faces, closed) = self.shell_faces(id)?;
        Ok(Shell::new(axis, faces, closed))
    }

    fn shell_faces(&mut self, id: u64) -> Result<(Vec<Face>, bool), StepError> {
        self.enter(id, |r, record| {
            let closed = matches!(record.keyword.as_str(), "CLOSED_SHELL" | "ORIENTED_CLOSED_SHELL");

            if record.keyword.starts_with("ORIENTED_") {
                let mut fields = record.decode(ORIENTED)?;
                let inner = fields.required()?;
                let orientation = fields.logical()?;
                let (mut faces, _) = r.shell_faces(inner)?;
                if !orientation {
                    for face in &mut faces {
                        face.same_sense = !face.same_sense;
                    }
                }
                return Ok((faces, closed));
            }

            let ids = record.decode(SHELL)?.references()?;
            let mut faces = Vec::with_capacity(ids.len());
            for face in ids {
                faces.push(r.face(face)?);
            }
            Ok((faces, closed))
        })
    }

    /// Build a face. Exactly one of its bounds must be an outer bound.
    pub(crate) fn face(&mut self, id: u64) -> Result<Face, StepError> {
        self.enter(id, |r, record| {
            let mut fields = record.decode(FACE)?;
            let bound_ids = fields.references()?;
            let surface = fields.required()?;
            let same_sense = fields.logical()?;

            let mut outer = Vec::new();
            let mut inner = Vec::new();
            for bound in bound_ids {
                let (is_outer, bound) = r.bound(bound)?;
                if is_outer {
                    outer.push(bound);
                } else {
                    inner.push(bound);
                }
            }
            let count = outer.len();
            let outer = match outer.pop() {
                Some(bound) if count == 1 => bound,
                _ => return Err(StepError::OuterBoundCount { face_id: id, count }),
            };

            let surface = r.surface(surface)?;
            trace!(id, holes = inner.len(), surface = ?surface.kind(), "built face");
            Ok(Face::new(surface, same_sense, outer, inner))
        })
    }

    /// A bound and whether it is the outer one.
    fn bound(&mut self, id: u64) -> Result<(bool, FaceBound), StepError> {
        self.enter(id, |r, record| {
            let mut fields = record.decode(BOUND)?;
            let path = fields.required()?;
            let orientation = fields.logical()?;
            let edges = r.path(path)?;
            Ok((record.keyword == OUTER_BOUND, FaceBound::new(edges, orientation)))
        })
    }

    /// Oriented edges of a loop or path in traversal order.
    pub(crate) fn path(&mut self, id: u64) -> Result<Vec<OrientedEdge>, StepError> {
        self.enter(id, |r, record| {
            if record.keyword == "ORIENTED_PATH" {
                let mut fields = record.decode(ORIENTED)?;
                let inner = fields.required()?;
                let orientation = fields.logical()?;
                let mut edges = r.path(inner)?;
                if !orientation {
                    edges.reverse();
                    for edge in &mut edges {
                        edge.orientation = !edge.orientation;
                    }
                }
                return Ok(edges);
            }

            let ids = record.decode(PATH)?.references()?;
            let mut edges = Vec::with_capacity(ids.len());
            for edge in ids {
                edges.push(r.oriented_edge(edge)?);
            }
            Ok(edges)
        })
    }

    fn oriented_edge(&mut self, id: u64) -> Result<OrientedEdge, StepError> {
        self.enter(id, |r, record| {
            let mut fields = record.decode(ORIENTED_EDGE)?;
            let edge = fields.required()?;
            let orientation = fields.logical()?;
            Ok(OrientedEdge::new(r.edge(edge)?, orientation))
        })
    }

    /// Resolve an edge, building it on first use.
    ///
    /// Both vertices must resolve. Edges on B-spline curves are then trimmed
    /// by the curve's knot domain; all other edges by their vertex points.
    pub fn edge(&mut self, id: u64) -> Result<Arc<Edge>, StepError> {
        if let Some(edge) = self.edges.get(&id) {
            return Ok(Arc::clone(edge));
        }

        let edge = self.enter(id, |r, record| {
            let mut fields = record.decode(EDGE_CURVE)?;
            let start = fields.required()?;
            let end = fields.required()?;
            let curve = fields.required()?;
            let same_sense = fields.logical()?;

            let start = r.vertex(start)?;
            let end = r.vertex(end)?;
            let curve = r.curve(curve)?;
            if let Some((front, back)) = curve.as_bspline().map(BSplineCurve::domain) {
                return Ok(Edge::from_parameters(curve, front, back, same_sense));
            }
            Ok(Edge::from_vertices(curve, start, end, same_sense))
        })?;

        trace!(id, "built edge");
        let edge = Arc::new(edge);
        self.edges.insert(id, Arc::clone(&edge));
        Ok(edge)
    }
}
