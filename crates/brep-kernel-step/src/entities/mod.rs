//! Entity classification and per-entity decoding.
//!
//! The lookup functions here decide which records the loader keeps and which
//! curve or surface variant a record becomes. The submodules add the
//! resolution methods for each entity family to [`StepReader`](crate::StepReader).

mod curves;
mod geometry;
mod surfaces;
mod topology;

/// Keyword of the root shape representation.
pub const ROOT: &str = "ADVANCED_BREP_SHAPE_REPRESENTATION";

/// Keyword of the solid wrapper between root and shell.
pub const SOLID_BREP: &str = "MANIFOLD_SOLID_BREP";

/// Leading token of a complex (multi-part) entity body.
pub const COMPLEX: &str = "(";

/// Curve entities, as distinguished in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveEntity {
    /// `LINE`
    Line,
    /// `CIRCLE`
    Circle,
    /// `ELLIPSE`
    Ellipse,
    /// `HYPERBOLA`
    Hyperbola,
    /// `PARABOLA`
    Parabola,
    /// `B_SPLINE_CURVE_WITH_KNOTS`
    BSplineCurveWithKnots,
    /// Complex entity combining `B_SPLINE_CURVE_WITH_KNOTS` and `RATIONAL_B_SPLINE_CURVE`.
    RationalBSplineCurve,
}

/// Surface entities, as distinguished in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEntity {
    /// `PLANE`
    Plane,
    /// `CYLINDRICAL_SURFACE`
    CylindricalSurface,
    /// `CONICAL_SURFACE`
    ConicalSurface,
    /// `SPHERICAL_SURFACE`
    SphericalSurface,
    /// `TOROIDAL_SURFACE`
    ToroidalSurface,
    /// `B_SPLINE_SURFACE_WITH_KNOTS`
    BSplineSurfaceWithKnots,
    /// Complex entity combining `B_SPLINE_SURFACE_WITH_KNOTS` and `RATIONAL_B_SPLINE_SURFACE`.
    RationalBSplineSurface,
}

/// Curve variant for a keyword, if it names one.
pub fn curve_entity(keyword: &str) -> Option<CurveEntity> {
    Some(match keyword {
        "LINE" => CurveEntity::Line,
        "CIRCLE" => CurveEntity::Circle,
        "ELLIPSE" => CurveEntity::Ellipse,
        "HYPERBOLA" => CurveEntity::Hyperbola,
        "PARABOLA" => CurveEntity::Parabola,
        "B_SPLINE_CURVE_WITH_KNOTS" => CurveEntity::BSplineCurveWithKnots,
        COMPLEX => CurveEntity::RationalBSplineCurve,
        _ => return None,
    })
}

/// Surface variant for a keyword, if it names one.
pub fn surface_entity(keyword: &str) -> Option<SurfaceEntity> {
    Some(match keyword {
        "PLANE" => SurfaceEntity::Plane,
        "CYLINDRICAL_SURFACE" => SurfaceEntity::CylindricalSurface,
        "CONICAL_SURFACE" => SurfaceEntity::ConicalSurface,
        "SPHERICAL_SURFACE" => SurfaceEntity::SphericalSurface,
        "TOROIDAL_SURFACE" => SurfaceEntity::ToroidalSurface,
        "B_SPLINE_SURFACE_WITH_KNOTS" => SurfaceEntity::BSplineSurfaceWithKnots,
        COMPLEX => SurfaceEntity::RationalBSplineSurface,
        _ => return None,
    })
}

/// Whether records with this keyword are kept by the loader.
pub fn is_supported(keyword: &str) -> bool {
    matches!(
        keyword,
        ROOT | SOLID_BREP
            | "CARTESIAN_POINT"
            | "VECTOR"
            | "DIRECTION"
            | "AXIS2_PLACEMENT_3D"
            | "AXIS2_PLACEMENT_2D"
            | "VERTEX_POINT"
            | "EDGE_CURVE"
            | "ORIENTED_EDGE"
            | "EDGE_LOOP"
            | "OPEN_PATH"
            | "ORIENTED_PATH"
            | "FACE_BOUND"
            | "FACE_OUTER_BOUND"
            | "FACE_SURFACE"
            | "ADVANCED_FACE"
            | "CLOSED_SHELL"
            | "ORIENTED_CLOSED_SHELL"
            | "OPEN_SHELL"
            | "ORIENTED_OPEN_SHELL"
            // kept so a reference to it fails as an unsupported curve
            | "CIRCULAR_INVOLUTE"
    ) || curve_entity(keyword).is_some()
        || surface_entity(keyword).is_some()
}
