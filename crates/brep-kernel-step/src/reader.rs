//! STEP file reader: resolves loaded records into B-rep shells.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use brep_kernel_geom::{Curve, Edge, Shell, Surface};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::entities::ROOT;
use crate::error::StepError;
use crate::loader::{load_records, Record, RecordMap};
use crate::settings::ReadSettings;

/// Read a STEP file from a path.
///
/// # Arguments
///
/// * `path` - Path to the STEP file
///
/// # Returns
///
/// The shells of every solid in the file, in declared order.
pub fn read_step(path: impl AsRef<Path>) -> Result<Vec<Shell>, StepError> {
    read_step_with_settings(path, &ReadSettings::default())
}

/// Read a STEP file from a path with explicit settings.
pub fn read_step_with_settings(
    path: impl AsRef<Path>,
    settings: &ReadSettings,
) -> Result<Vec<Shell>, StepError> {
    let file = File::open(path)?;
    read_step_from_reader_with_settings(BufReader::new(file), settings)
}

/// Read a STEP file from any byte stream.
pub fn read_step_from_reader(reader: impl Read) -> Result<Vec<Shell>, StepError> {
    read_step_from_reader_with_settings(reader, &ReadSettings::default())
}

/// Read a STEP file from any byte stream with explicit settings.
pub fn read_step_from_reader_with_settings(
    reader: impl Read,
    settings: &ReadSettings,
) -> Result<Vec<Shell>, StepError> {
    settings.validate()?;
    let records = load_records(reader)?;
    StepReader::new(&records, settings.clone()).read_shells()
}

/// Read a STEP file from a byte buffer.
///
/// # Arguments
///
/// * `data` - Raw STEP file contents
pub fn read_step_from_buffer(data: &[u8]) -> Result<Vec<Shell>, StepError> {
    read_step_from_reader(data)
}

/// Read a STEP file from a byte buffer with explicit settings.
pub fn read_step_from_buffer_with_settings(
    data: &[u8],
    settings: &ReadSettings,
) -> Result<Vec<Shell>, StepError> {
    read_step_from_reader_with_settings(data, settings)
}

/// Resolves records into geometry and topology.
///
/// Edges, curves and surfaces are built once per record id and shared through
/// [`Arc`]; resolving the same id again returns the cached handle. One reader
/// serves one parse.
pub struct StepReader<'a> {
    pub(crate) records: &'a RecordMap,
    pub(crate) settings: ReadSettings,
    /// STEP edge id to constructed edge.
    pub(crate) edges: FxHashMap<u64, Arc<Edge>>,
    /// STEP curve id to constructed curve.
    pub(crate) curves: FxHashMap<u64, Arc<Curve>>,
    /// STEP surface id to constructed surface.
    pub(crate) surfaces: FxHashMap<u64, Arc<Surface>>,
    /// Records currently being resolved, outermost first.
    stack: Vec<u64>,
}

impl<'a> StepReader<'a> {
    /// Create a reader over loaded records.
    pub fn new(records: &'a RecordMap, settings: ReadSettings) -> Self {
        Self {
            records,
            settings,
            edges: FxHashMap::default(),
            curves: FxHashMap::default(),
            surfaces: FxHashMap::default(),
            stack: Vec::new(),
        }
    }

    /// Resolve every shape representation into its shells.
    pub fn read_shells(&mut self) -> Result<Vec<Shell>, StepError> {
        self.settings.validate()?;

        let roots: Vec<u64> = self
            .records
            .iter()
            .filter(|r| r.keyword == ROOT)
            .map(|r| r.id)
            .collect();
        if roots.is_empty() {
            if self.settings.require_root {
                return Err(StepError::NoRoot);
            }
            warn!(records = self.records.len(), "no shape representation found, no shells read");
            return Ok(Vec::new());
        }

        let mut placed = Vec::new();
        for root in roots {
            placed.extend(self.root(root)?);
        }

        let total = placed.len();
        let mut shells = Vec::with_capacity(total);
        for (index, (shell_id, axis)) in placed.into_iter().enumerate() {
            let shell = self.shell(shell_id, axis)?;
            debug!(shell = index, total, faces = shell.faces.len(), "resolved shell");
            shells.push(shell);
        }

        debug!(
            edges = self.edges.len(),
            curves = self.curves.len(),
            surfaces = self.surfaces.len(),
            "resolved model"
        );
        Ok(shells)
    }

    /// Run `f` on record `id` with the depth limit and cycle guard applied.
    pub(crate) fn enter<T>(
        &mut self,
        id: u64,
        f: impl FnOnce(&mut Self, &'a Record) -> Result<T, StepError>,
    ) -> Result<T, StepError> {
        let records = self.records;
        let record = records.get(id).ok_or(StepError::MissingEntity {
            id,
            referenced_by: self.stack.last().copied(),
        })?;
        if self.stack.contains(&id) {
            return Err(StepError::CyclicReference(id));
        }
        if self.stack.len() >= self.settings.max_depth {
            return Err(StepError::DepthExceeded {
                entity_id: id,
                limit: self.settings.max_depth,
            });
        }

        self.stack.push(id);
        let result = f(self, record);
        self.stack.pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_str;
    use approx::assert_relative_eq;
    use brep_kernel_geom::{CurveKind, EdgeBounds, GeomError, SurfaceKind};
    use brep_kernel_math::{Point2, Point3, Tolerance, Vec3};

    /// Unit right triangle in the XY plane, one face, three line edges.
    const TRIANGLE: &str = r#"ISO-10303-21;
HEADER;
FILE_DESCRIPTION((''),'2;1');
FILE_NAME('triangle.step','2024-01-01',(''),(''),'','','');
FILE_SCHEMA(('AUTOMOTIVE_DESIGN'));
ENDSEC;
DATA;
#1 = ADVANCED_BREP_SHAPE_REPRESENTATION('', (#2, #50), #99);
#2 = MANIFOLD_SOLID_BREP('solid', #3);
#3 = CLOSED_SHELL('', (#4));
#4 = ADVANCED_FACE('', (#5), #40, .F.);
#5 = FACE_OUTER_BOUND('', #6, .T.);
#6 = EDGE_LOOP('', (#7, #8, #9));
#7 = ORIENTED_EDGE('', *, *, #10, .T.);
#8 = ORIENTED_EDGE('', *, *, #11, .T.);
#9 = ORIENTED_EDGE('', *, *, #12, .F.);
#10 = EDGE_CURVE('', #20, #21, #30, .T.);
#11 = EDGE_CURVE('', #21, #22, #31, .T.);
#12 = EDGE_CURVE('', #20, #22, #32, .T.);
#20 = VERTEX_POINT('', #23);
#21 = VERTEX_POINT('', #24);
#22 = VERTEX_POINT('', #25);
#23 = CARTESIAN_POINT('', (0., 0., 0.));
#24 = CARTESIAN_POINT('', (1., 0., 0.));
#25 = CARTESIAN_POINT('', (0., 1., 0.));
#30 = LINE('', #23, #33);
#31 = LINE('', #24, #34);
#32 = LINE('', #23, #35);
#33 = VECTOR('', #36, 1.);
#34 = VECTOR('', #37, 1.4142135623730951);
#35 = VECTOR('', #38, 1.);
#36 = DIRECTION('', (1., 0., 0.));
#37 = DIRECTION('', (-1., 1., 0.));
#38 = DIRECTION('', (0., 1., 0.));
#40 = PLANE('', #50);
#50 = AXIS2_PLACEMENT_3D('', #23, #51, #36);
#51 = DIRECTION('', (0., 0., 1.));
#60 = PRESENTATION_STYLE_ASSIGNMENT((#61));
#99 = GEOMETRIC_REPRESENTATION_CONTEXT(3);
ENDSEC;
END-ISO-10303-21;
"#;

    /// Records shared by the single-record fixtures below.
    const SCAFFOLD: &str = "\
#100 = CARTESIAN_POINT('', (0., 0., 0.));
#101 = DIRECTION('', (0., 0., 1.));
#102 = DIRECTION('', (1., 0., 0.));
#103 = AXIS2_PLACEMENT_3D('', #100, #101, #102);
#110 = CARTESIAN_POINT('', (0., 0., 0.));
#111 = CARTESIAN_POINT('', (1., 1., 0.));
#112 = CARTESIAN_POINT('', (2., 0., 0.));
#113 = CARTESIAN_POINT('', (0., 1., 0.));
";

    fn with_scaffold(records: &str) -> RecordMap {
        load_str(&format!("DATA;\n{SCAFFOLD}{records}ENDSEC;\n")).unwrap()
    }

    fn read(text: &str) -> Result<Vec<Shell>, StepError> {
        read_step_from_buffer(text.as_bytes())
    }

    #[test]
    fn test_triangle_end_to_end() {
        let shells = read(TRIANGLE).unwrap();
        assert_eq!(shells.len(), 1);
        let shell = &shells[0];
        assert!(shell.closed);
        assert_eq!(shell.faces.len(), 1);

        let face = &shell.faces[0];
        assert!(!face.same_sense);
        assert!(face.inner.is_empty());
        assert_eq!(face.surface.kind(), SurfaceKind::Plane);

        let outer = &face.outer;
        assert!(outer.orientation);
        assert_eq!(outer.edges.len(), 3);
        let orientations: Vec<bool> = outer.edges.iter().map(|e| e.orientation).collect();
        assert_eq!(orientations, vec![true, true, false]);

        let starts: Vec<Point3> = outer.edges.iter().map(|e| e.start()).collect();
        assert_eq!(
            starts,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ]
        );
        assert!(outer.is_closed(&Tolerance::DEFAULT));
        for oe in &outer.edges {
            assert_eq!(oe.edge.curve.kind(), CurveKind::Line);
            assert!(oe.edge.same_sense);
        }
    }

    #[test]
    fn test_triangle_axis_from_representation() {
        let shells = read(TRIANGLE).unwrap();
        let axis = &shells[0].axis;
        assert_relative_eq!(axis.z.as_ref(), &Vec3::z(), epsilon = 1e-12);
        assert_relative_eq!(axis.x.as_ref(), &Vec3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_line_vector_magnitude() {
        let shells = read(TRIANGLE).unwrap();
        let hyp = &shells[0].faces[0].outer.edges[1].edge;
        match hyp.curve.as_ref() {
            Curve::Line(line) => {
                assert_relative_eq!(line.direction.norm(), 2f64.sqrt(), epsilon = 1e-12);
            }
            other => panic!("expected a line, got {other:?}"),
        }
        let (lo, hi) = hyp.parameter_range();
        assert_relative_eq!(lo, 0.0, epsilon = 1e-12);
        assert_relative_eq!(hi, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unsupported_records_dropped() {
        let records = load_str(TRIANGLE).unwrap();
        assert!(!records.contains(60));
        assert!(!records.contains(99));
        // #1 still references #99; the trailing context is never resolved
        assert_eq!(StepReader::new(&records, ReadSettings::default()).read_shells().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_outer_bound() {
        let text = TRIANGLE.replace("#5 = FACE_OUTER_BOUND", "#5 = FACE_BOUND");
        match read(&text).unwrap_err() {
            StepError::OuterBoundCount { face_id, count } => {
                assert_eq!(face_id, 4);
                assert_eq!(count, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_two_outer_bounds() {
        let text = TRIANGLE.replace("ADVANCED_FACE('', (#5), #40", "ADVANCED_FACE('', (#5, #5), #40");
        assert!(matches!(
            read(&text).unwrap_err(),
            StepError::OuterBoundCount { face_id: 4, count: 2 }
        ));
    }

    #[test]
    fn test_inner_bound_is_a_hole() {
        let text = TRIANGLE
            .replace("ADVANCED_FACE('', (#5), #40", "ADVANCED_FACE('', (#70, #5), #40")
            .replace("ENDSEC;\nEND-ISO", "#70 = FACE_BOUND('', #6, .F.);\nENDSEC;\nEND-ISO");
        let shells = read(&text).unwrap();
        let face = &shells[0].faces[0];
        assert_eq!(face.inner.len(), 1);
        assert!(!face.inner[0].orientation);
        assert!(face.outer.orientation);
    }

    #[test]
    fn test_shared_geometry_is_one_object() {
        let text = TRIANGLE
            .replace("CLOSED_SHELL('', (#4))", "OPEN_SHELL('', (#4, #80))")
            .replace(
                "ENDSEC;\nEND-ISO",
                "#80 = ADVANCED_FACE('', (#81), #40, .T.);\n\
                 #81 = FACE_OUTER_BOUND('', #82, .T.);\n\
                 #82 = EDGE_LOOP('', (#83));\n\
                 #83 = ORIENTED_EDGE('', *, *, #10, .F.);\n\
                 ENDSEC;\nEND-ISO",
            );
        let shells = read(&text).unwrap();
        let shell = &shells[0];
        assert!(!shell.closed);
        assert_eq!(shell.faces.len(), 2);
        let (a, b) = (&shell.faces[0], &shell.faces[1]);
        assert!(Arc::ptr_eq(&a.surface, &b.surface));
        assert!(Arc::ptr_eq(&a.outer.edges[0].edge, &b.outer.edges[0].edge));
        assert!(Arc::ptr_eq(&a.outer.edges[0].edge.curve, &b.outer.edges[0].edge.curve));
        assert!(a.outer.edges[0].orientation);
        assert!(!b.outer.edges[0].orientation);
    }

    #[test]
    fn test_cache_reuse_across_calls() {
        let records = load_str(TRIANGLE).unwrap();
        let mut reader = StepReader::new(&records, ReadSettings::default());
        let first = reader.surface(40).unwrap();
        let second = reader.surface(40).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(reader.surfaces.len(), 1);

        let edge = reader.edge(10).unwrap();
        assert!(Arc::ptr_eq(&edge.curve, &reader.curve(30).unwrap()));
    }

    #[test]
    fn test_no_root_is_an_error_by_default() {
        let text = TRIANGLE.replace("#1 = ADVANCED_BREP_SHAPE_REPRESENTATION", "#1 = SHAPE_REPRESENTATION");
        assert!(matches!(read(&text).unwrap_err(), StepError::NoRoot));

        let lenient = ReadSettings {
            require_root: false,
            ..Default::default()
        };
        let shells = read_step_from_buffer_with_settings(text.as_bytes(), &lenient).unwrap();
        assert!(shells.is_empty());
    }

    #[test]
    fn test_missing_reference() {
        let text = TRIANGLE.replace("#40 = PLANE('', #50);\n", "");
        match read(&text).unwrap_err() {
            StepError::MissingEntity { id, referenced_by } => {
                assert_eq!(id, 40);
                assert_eq!(referenced_by, Some(4));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unset_required_reference() {
        let text = TRIANGLE.replace("#40 = PLANE('', #50)", "#40 = PLANE('', $)");
        assert!(matches!(
            read(&text).unwrap_err(),
            StepError::UnsetReference { entity_id: 40 }
        ));
    }

    #[test]
    fn test_depth_limit() {
        let shallow = ReadSettings {
            max_depth: 4,
            ..Default::default()
        };
        // shell, face, bound, loop; the oriented edge is one level too deep
        match read_step_from_buffer_with_settings(TRIANGLE.as_bytes(), &shallow).unwrap_err() {
            StepError::DepthExceeded { entity_id, limit } => {
                assert_eq!(entity_id, 7);
                assert_eq!(limit, 4);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = ReadSettings {
            max_depth: 0,
            ..Default::default()
        };
        assert!(matches!(
            read_step_from_buffer_with_settings(TRIANGLE.as_bytes(), &settings),
            Err(StepError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_self_reference_is_cyclic() {
        let records = with_scaffold("#5 = VERTEX_POINT('', #5);\n");
        let mut reader = StepReader::new(&records, ReadSettings::default());
        assert!(matches!(reader.vertex(5), Err(StepError::CyclicReference(5))));
    }

    #[test]
    fn test_indirect_cycle() {
        let records = with_scaffold(
            "#5 = ORIENTED_PATH('', *, #6, .T.);\n#6 = ORIENTED_PATH('', *, #5, .F.);\n",
        );
        let mut reader = StepReader::new(&records, ReadSettings::default());
        assert!(matches!(reader.path(5), Err(StepError::CyclicReference(5))));
    }

    #[test]
    fn test_syntax_error_names_record() {
        let text = TRIANGLE.replace("#24 = CARTESIAN_POINT('', (1., 0., 0.))", "#24 = CARTESIAN_POINT('', (1., 0.))");
        match read(&text).unwrap_err() {
            StepError::Syntax { entity_id, .. } => assert_eq!(entity_id, 24),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_missing_endsec_reads_to_end() {
        let text = TRIANGLE.replace("ENDSEC;\nEND-ISO-10303-21;\n", "");
        assert_eq!(read(&text).unwrap().len(), 1);
    }

    #[test]
    fn test_read_from_path() {
        let path = std::env::temp_dir().join(format!("brep-step-{}.step", std::process::id()));
        std::fs::write(&path, TRIANGLE).unwrap();
        let shells = read_step(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(shells.unwrap()[0].faces.len(), 1);
    }

    #[test]
    fn test_read_missing_path() {
        assert!(matches!(
            read_step("/nonexistent/brep-step/model.step"),
            Err(StepError::Io(_))
        ));
    }

    #[test]
    fn test_oriented_shell_flips_faces() {
        let text = TRIANGLE
            .replace("MANIFOLD_SOLID_BREP('solid', #3)", "MANIFOLD_SOLID_BREP('solid', #90)")
            .replace("ENDSEC;\nEND-ISO", "#90 = ORIENTED_CLOSED_SHELL('', *, #3, .F.);\nENDSEC;\nEND-ISO");
        let shells = read(&text).unwrap();
        assert!(shells[0].closed);
        assert!(shells[0].faces[0].same_sense);
    }

    #[test]
    fn test_oriented_path_reverses_loop() {
        let text = TRIANGLE
            .replace("#5 = FACE_OUTER_BOUND('', #6, .T.)", "#5 = FACE_OUTER_BOUND('', #91, .T.)")
            .replace("ENDSEC;\nEND-ISO", "#91 = ORIENTED_PATH('', *, #6, .F.);\nENDSEC;\nEND-ISO");
        let shells = read(&text).unwrap();
        let outer = &shells[0].faces[0].outer;
        let orientations: Vec<bool> = outer.edges.iter().map(|e| e.orientation).collect();
        assert_eq!(orientations, vec![true, false, false]);
        assert_eq!(outer.edges[0].start(), Point3::new(0.0, 0.0, 0.0));
        assert!(outer.is_closed(&Tolerance::DEFAULT));
    }

    #[test]
    fn test_bspline_edge_uses_parameter_range() {
        let records = with_scaffold(
            "#5 = B_SPLINE_CURVE_WITH_KNOTS('', 1, (#110, #112), .POLYLINE_FORM., .F., .F., (2, 2), (0., 3.), .UNSPECIFIED.);\n\
             #6 = VERTEX_POINT('', #110);\n\
             #7 = VERTEX_POINT('', #112);\n\
             #8 = EDGE_CURVE('', #6, #7, #5, .T.);\n",
        );
        let mut reader = StepReader::new(&records, ReadSettings::default());
        let edge = reader.edge(8).unwrap();
        assert_eq!(edge.bounds, EdgeBounds::Parameters { front: 0.0, back: 3.0 });
        assert_relative_eq!(edge.end(), Point3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_each_curve_kind() {
        let records = with_scaffold(
            "#5 = CIRCLE('', #103, 2.);\n\
             #6 = ELLIPSE('', #103, 3., 1.);\n\
             #7 = HYPERBOLA('', #103, 1., 2.);\n\
             #8 = PARABOLA('', #103, 0.5);\n\
             #9 = B_SPLINE_CURVE_WITH_KNOTS('', 2, (#110, #111, #112), .UNSPECIFIED., .F., .F., (3, 3), (0., 1.), .UNSPECIFIED.);\n\
             #10 = ( BOUNDED_CURVE() B_SPLINE_CURVE(2, (#110, #111, #112), .CIRCULAR_ARC., .F., .F.) \
             B_SPLINE_CURVE_WITH_KNOTS((3, 3), (0., 1.), .UNSPECIFIED.) CURVE() GEOMETRIC_REPRESENTATION_ITEM() \
             RATIONAL_B_SPLINE_CURVE((1., 0.5, 1.)) REPRESENTATION_ITEM('') );\n",
        );
        let mut reader = StepReader::new(&records, ReadSettings::default());
        let kinds: Vec<CurveKind> = (5..=10).map(|id| reader.curve(id).unwrap().kind()).collect();
        assert_eq!(
            kinds,
            vec![
                CurveKind::Circle,
                CurveKind::Ellipse,
                CurveKind::Hyperbola,
                CurveKind::Parabola,
                CurveKind::BSpline,
                CurveKind::RationalBSpline,
            ]
        );

        let circle = reader.curve(5).unwrap();
        assert_relative_eq!(circle.evaluate(0.0), Point3::new(2.0, 0.0, 0.0), epsilon = 1e-12);

        let rational = reader.curve(10).unwrap();
        let spline = rational.as_bspline().unwrap();
        assert_eq!(spline.weights.as_deref(), Some(&[1.0, 0.5, 1.0][..]));
        assert_relative_eq!(rational.evaluate(1.0), Point3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_each_surface_kind() {
        let records = with_scaffold(
            "#5 = PLANE('', #103);\n\
             #6 = CYLINDRICAL_SURFACE('', #103, 2.);\n\
             #7 = CONICAL_SURFACE('', #103, 1., 0.5);\n\
             #8 = SPHERICAL_SURFACE('', #103, 3.);\n\
             #9 = TOROIDAL_SURFACE('', #103, 5., 1.);\n\
             #10 = B_SPLINE_SURFACE_WITH_KNOTS('', 1, 1, ((#110, #113), (#112, #111)), .UNSPECIFIED., .F., .F., .F., (2, 2), (2, 2), (0., 1.), (0., 1.), .UNSPECIFIED.);\n\
             #11 = ( BOUNDED_SURFACE() B_SPLINE_SURFACE(1, 1, ((#110, #113), (#112, #111)), .UNSPECIFIED., .F., .F., .F.) \
             B_SPLINE_SURFACE_WITH_KNOTS((2, 2), (2, 2), (0., 1.), (0., 1.), .UNSPECIFIED.) GEOMETRIC_REPRESENTATION_ITEM() \
             RATIONAL_B_SPLINE_SURFACE(((1., 1.), (1., 2.))) REPRESENTATION_ITEM('') SURFACE() );\n",
        );
        let mut reader = StepReader::new(&records, ReadSettings::default());
        let kinds: Vec<SurfaceKind> = (5..=11).map(|id| reader.surface(id).unwrap().kind()).collect();
        assert_eq!(
            kinds,
            vec![
                SurfaceKind::Plane,
                SurfaceKind::Cylindrical,
                SurfaceKind::Conical,
                SurfaceKind::Spherical,
                SurfaceKind::Toroidal,
                SurfaceKind::BSpline,
                SurfaceKind::RationalBSpline,
            ]
        );

        let sphere = reader.surface(8).unwrap();
        assert_relative_eq!(sphere.evaluate(Point2::new(0.0, 0.0)), Point3::new(3.0, 0.0, 0.0), epsilon = 1e-12);

        let patch = reader.surface(10).unwrap();
        assert_relative_eq!(patch.evaluate(Point2::new(1.0, 1.0)), Point3::new(1.0, 1.0, 0.0), epsilon = 1e-12);

        match reader.surface(11).unwrap().as_ref() {
            Surface::BSpline(s) => {
                assert_eq!(s.weights, Some(vec![vec![1.0, 1.0], vec![1.0, 2.0]]));
            }
            other => panic!("expected a B-spline surface, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_family_is_unsupported() {
        let records = with_scaffold("#5 = PLANE('', #103);\n#6 = CIRCLE('', #103, 1.);\n");
        let mut reader = StepReader::new(&records, ReadSettings::default());
        assert!(matches!(
            reader.curve(5),
            Err(StepError::UnsupportedCurve { entity_id: 5, .. })
        ));
        assert!(matches!(
            reader.surface(6),
            Err(StepError::UnsupportedSurface { entity_id: 6, .. })
        ));
    }

    #[test]
    fn test_complex_surface_is_not_a_curve() {
        let records = with_scaffold(
            "#5 = ( BOUNDED_SURFACE() B_SPLINE_SURFACE(1, 1, ((#110, #113), (#112, #111)), .UNSPECIFIED., .F., .F., .F.) \
             B_SPLINE_SURFACE_WITH_KNOTS((2, 2), (2, 2), (0., 1.), (0., 1.), .UNSPECIFIED.) GEOMETRIC_REPRESENTATION_ITEM() \
             RATIONAL_B_SPLINE_SURFACE(((1., 1.), (1., 1.))) REPRESENTATION_ITEM('') SURFACE() );\n",
        );
        let mut reader = StepReader::new(&records, ReadSettings::default());
        assert!(matches!(
            reader.curve(5),
            Err(StepError::UnsupportedCurve { entity_id: 5, .. })
        ));
    }

    #[test]
    fn test_degenerate_geometry_is_an_error() {
        let records = with_scaffold("#5 = CIRCLE('', #103, 0.);\n#6 = DIRECTION('', (0., 0., 0.));\n#7 = VECTOR('', #6, 1.);\n");
        let mut reader = StepReader::new(&records, ReadSettings::default());
        assert!(matches!(
            reader.curve(5),
            Err(StepError::Geometry { entity_id: 5, .. })
        ));
        assert!(matches!(
            reader.vector(7),
            Err(StepError::Geometry { entity_id: 7, .. })
        ));
    }

    #[test]
    fn test_bad_knots_are_a_geometry_error() {
        let records = with_scaffold(
            "#5 = B_SPLINE_CURVE_WITH_KNOTS('', 2, (#110, #111, #112), .UNSPECIFIED., .F., .F., (2, 2), (0., 1.), .UNSPECIFIED.);\n",
        );
        let mut reader = StepReader::new(&records, ReadSettings::default());
        assert!(matches!(
            reader.curve(5),
            Err(StepError::Geometry { entity_id: 5, .. })
        ));
    }

    #[test]
    fn test_non_finite_knot_is_rejected() {
        let records = with_scaffold(
            "#5 = B_SPLINE_CURVE_WITH_KNOTS('', 1, (#110, #112), .UNSPECIFIED., .F., .F., (2, 2), (0., +nan), .UNSPECIFIED.);\n\
             #6 = VERTEX_POINT('', #110);\n\
             #7 = VERTEX_POINT('', #112);\n\
             #8 = EDGE_CURVE('', #6, #7, #5, .T.);\n",
        );
        let mut reader = StepReader::new(&records, ReadSettings::default());
        assert!(matches!(reader.edge(8), Err(StepError::Syntax { entity_id: 5, .. })));
        assert!(reader.edges.is_empty());
    }

    #[test]
    fn test_huge_multiplicity_is_a_geometry_error() {
        let records = with_scaffold(
            "#5 = B_SPLINE_CURVE_WITH_KNOTS('', 1, (#110, #112), .UNSPECIFIED., .F., .F., (2, 4000000000), (0., 1.), .UNSPECIFIED.);\n",
        );
        let mut reader = StepReader::new(&records, ReadSettings::default());
        match reader.curve(5).unwrap_err() {
            StepError::Geometry { entity_id, source } => {
                assert_eq!(entity_id, 5);
                assert_eq!(
                    source,
                    GeomError::KnotMismatch {
                        expected: 4,
                        actual: 4_000_000_002
                    }
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bspline_edge_needs_its_vertices() {
        let records = with_scaffold(
            "#5 = B_SPLINE_CURVE_WITH_KNOTS('', 1, (#110, #112), .UNSPECIFIED., .F., .F., (2, 2), (0., 1.), .UNSPECIFIED.);\n\
             #6 = VERTEX_POINT('', #110);\n\
             #8 = EDGE_CURVE('', #6, #778, #5, .T.);\n",
        );
        let mut reader = StepReader::new(&records, ReadSettings::default());
        assert!(matches!(
            reader.edge(8),
            Err(StepError::MissingEntity { id: 778, referenced_by: Some(8) })
        ));
        assert!(reader.edges.is_empty());
    }

    #[test]
    fn test_axis_defaults() {
        let records = with_scaffold(
            "#5 = AXIS2_PLACEMENT_3D('', #111, $, $);\n\
             #6 = DIRECTION('', (1., 0., 0.));\n\
             #7 = AXIS2_PLACEMENT_3D('', #110, #6, $);\n\
             #8 = AXIS2_PLACEMENT_3D('', #110, #6, #6);\n\
             #9 = AXIS2_PLACEMENT_3D('', $, #6, $);\n",
        );
        let mut reader = StepReader::new(&records, ReadSettings::default());

        let a = reader.axis(5).unwrap();
        assert_eq!(a.origin, Point3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(a.z.as_ref(), &Vec3::z(), epsilon = 1e-12);

        let b = reader.axis(7).unwrap();
        assert_relative_eq!(b.z.as_ref(), &Vec3::x(), epsilon = 1e-12);
        assert!(b.x.as_ref().dot(b.z.as_ref()).abs() < 1e-12);

        assert!(matches!(reader.axis(8), Err(StepError::Geometry { entity_id: 8, .. })));
        assert!(matches!(reader.axis(9), Err(StepError::UnsetReference { entity_id: 9 })));
    }
}
