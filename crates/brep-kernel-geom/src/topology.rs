//! B-rep aggregates: edges, loops, faces and shells.
//!
//! Geometry is held behind [`Arc`] so that records shared between faces
//! (an edge used by two loops, a surface used by several faces) stay a single
//! object; identity can be checked with [`Arc::ptr_eq`].

use std::sync::Arc;

use brep_kernel_math::{Axis, Point3, Tolerance};

use crate::{Curve, Surface};

/// How an edge is trimmed on its curve.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeBounds {
    /// Trimmed by its two vertex points.
    Vertices {
        /// Start vertex.
        start: Point3,
        /// End vertex.
        end: Point3,
    },
    /// Trimmed by curve parameters (used for B-spline curves).
    Parameters {
        /// Parameter at the curve-direction start.
        front: f64,
        /// Parameter at the curve-direction end.
        back: f64,
    },
}

/// A bounded piece of a curve.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Underlying curve, shared between edges that reference the same record.
    pub curve: Arc<Curve>,
    /// Trim information.
    pub bounds: EdgeBounds,
    /// Whether start→end follows the curve's parameter direction.
    pub same_sense: bool,
}

impl Edge {
    /// Edge trimmed by two vertex points.
    pub fn from_vertices(curve: Arc<Curve>, start: Point3, end: Point3, same_sense: bool) -> Self {
        Self {
            curve,
            bounds: EdgeBounds::Vertices { start, end },
            same_sense,
        }
    }

    /// Edge trimmed by a parameter range of its curve.
    pub fn from_parameters(curve: Arc<Curve>, front: f64, back: f64, same_sense: bool) -> Self {
        Self {
            curve,
            bounds: EdgeBounds::Parameters { front, back },
            same_sense,
        }
    }

    /// Start point of the edge.
    pub fn start(&self) -> Point3 {
        match &self.bounds {
            EdgeBounds::Vertices { start, .. } => *start,
            EdgeBounds::Parameters { front, back } => {
                self.curve.evaluate(if self.same_sense { *front } else { *back })
            }
        }
    }

    /// End point of the edge.
    pub fn end(&self) -> Point3 {
        match &self.bounds {
            EdgeBounds::Vertices { end, .. } => *end,
            EdgeBounds::Parameters { front, back } => {
                self.curve.evaluate(if self.same_sense { *back } else { *front })
            }
        }
    }

    /// Parameter interval `(lo, hi)` covered on the curve, with `lo <= hi`.
    ///
    /// For closed curves the upper end is unwrapped by one period so the
    /// interval follows the curve direction; coincident vertices on a closed
    /// curve give the full period.
    pub fn parameter_range(&self) -> (f64, f64) {
        let (a, b) = match &self.bounds {
            EdgeBounds::Parameters { front, back } => return (front.min(*back), front.max(*back)),
            EdgeBounds::Vertices { start, end } => {
                let t0 = self.curve.parameter_of(start);
                let t1 = self.curve.parameter_of(end);
                if self.same_sense {
                    (t0, t1)
                } else {
                    (t1, t0)
                }
            }
        };
        match self.curve.period() {
            Some(period) if b <= a + Tolerance::DEFAULT.angular => (a, b + period),
            _ => (a.min(b), a.max(b)),
        }
    }
}

/// An edge used in a loop with a traversal direction.
#[derive(Debug, Clone)]
pub struct OrientedEdge {
    /// The shared edge.
    pub edge: Arc<Edge>,
    /// `true` when the loop traverses the edge start→end.
    pub orientation: bool,
}

impl OrientedEdge {
    /// Wrap an edge with a traversal direction.
    pub fn new(edge: Arc<Edge>, orientation: bool) -> Self {
        Self { edge, orientation }
    }

    /// First point in traversal order.
    pub fn start(&self) -> Point3 {
        if self.orientation {
            self.edge.start()
        } else {
            self.edge.end()
        }
    }

    /// Last point in traversal order.
    pub fn end(&self) -> Point3 {
        if self.orientation {
            self.edge.end()
        } else {
            self.edge.start()
        }
    }
}

/// A loop of oriented edges bounding a face.
#[derive(Debug, Clone)]
pub struct FaceBound {
    /// Edges in loop order.
    pub edges: Vec<OrientedEdge>,
    /// Whether the loop is used in its stated direction.
    pub orientation: bool,
}

impl FaceBound {
    /// Create a bound.
    pub fn new(edges: Vec<OrientedEdge>, orientation: bool) -> Self {
        Self { edges, orientation }
    }

    /// Whether each edge ends where the next one starts, wrapping around.
    pub fn is_closed(&self, tol: &Tolerance) -> bool {
        let n = self.edges.len();
        n > 0
            && (0..n).all(|i| tol.points_equal(&self.edges[i].end(), &self.edges[(i + 1) % n].start()))
    }
}

/// A face: a surface region cut out by one outer loop and optional holes.
#[derive(Debug, Clone)]
pub struct Face {
    /// Carrier surface, shared between faces that reference the same record.
    pub surface: Arc<Surface>,
    /// Whether the face normal agrees with the surface normal.
    pub same_sense: bool,
    /// The outer boundary.
    pub outer: FaceBound,
    /// Hole boundaries.
    pub inner: Vec<FaceBound>,
}

impl Face {
    /// Create a face.
    pub fn new(surface: Arc<Surface>, same_sense: bool, outer: FaceBound, inner: Vec<FaceBound>) -> Self {
        Self {
            surface,
            same_sense,
            outer,
            inner,
        }
    }

    /// All bounds, outer first.
    pub fn bounds(&self) -> impl Iterator<Item = &FaceBound> {
        std::iter::once(&self.outer).chain(&self.inner)
    }
}

/// A connected set of faces in one coordinate context.
#[derive(Debug, Clone)]
pub struct Shell {
    /// Placement of the shell's representation context.
    pub axis: Axis,
    /// Faces in declared order.
    pub faces: Vec<Face>,
    /// Whether the shell encloses a volume.
    pub closed: bool,
}

impl Shell {
    /// Create a shell.
    pub fn new(axis: Axis, faces: Vec<Face>, closed: bool) -> Self {
        Self {
            axis,
            faces,
            closed,
        }
    }
}
