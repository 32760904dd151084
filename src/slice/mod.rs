//! Incremental cross-section slicing.
//!
//! The slicer sweeps a plane along an [`Axis`] through a closed triangle mesh
//! and emits the cross-section at evenly spaced heights. Instead of
//! intersecting every triangle with every plane, it keeps the topology of
//! the cross-section as a set of rings of edge and face [`Token`]s and only
//! updates it when the plane passes a vertex.
//!
//! # Pipeline
//!
//! 1. [`build_towers`]: one [`VertexTower`] per vertex holding the fragments
//!    its incident triangles start there.
//! 2. [`Sweep`]: pops vertices in `(height, id)` order, retires their
//!    incoming edges with [`split_on_edge`], splices in the tower and
//!    re-closes the ring set with [`join_fragments`].
//! 3. [`emit_layer`]: cuts every edge token of every ring at a layer height,
//!    producing one [`Polygon`] per ring.
//!
//! # Example
//!
//! ```
//! use sliver::mesh::primitives;
//! use sliver::slice::{slice_mesh, SliceOptions};
//!
//! let mesh = primitives::unit_cube();
//! let layers = slice_mesh(&mesh, &SliceOptions::new(0.25)).unwrap();
//!
//! assert_eq!(layers.len(), 4);
//! for layer in &layers {
//!     assert_eq!(layer.polygons.len(), 1);
//!     assert_eq!(layer.polygons[0].len(), 4);
//! }
//! ```

mod layer;
mod progress;
mod sweep;
mod token;
mod tower;

use std::time::Duration;

pub use layer::{emit_layer, interpolate_edge, ring_polygon, Layer, Polygon};
pub use progress::{Progress, ProgressEvent};
pub use sweep::Sweep;
pub use token::{join_fragments, split_on_edge, Fragment, Token};
pub use tower::{build_towers, VertexTower};

use crate::error::{PartialSlice, Result, SliceError};
use crate::mesh::{Axis, TriangleMesh};

/// Options for slicing.
#[derive(Debug, Clone)]
pub struct SliceOptions {
    /// Distance between consecutive layers along the axis.
    pub layer_height: f64,

    /// Axis the layers are stacked along.
    pub axis: Axis,

    /// Whether to use parallel execution for tower building and emission
    /// (default: true).
    pub parallel: bool,

    /// Tolerance for dropping repeated and collinear polygon points.
    /// `None` keeps one point per crossed edge.
    pub collinear_tolerance: Option<f64>,

    /// Refuse meshes with more faces than this.
    pub max_triangles: Option<usize>,

    /// Wall-clock budget, checked between vertex events.
    pub time_budget: Option<Duration>,
}

impl Default for SliceOptions {
    fn default() -> Self {
        Self {
            layer_height: 0.2,
            axis: Axis::Z,
            parallel: true,
            collinear_tolerance: Some(1e-9),
            max_triangles: None,
            time_budget: None,
        }
    }
}

impl SliceOptions {
    /// Create options with the given layer height.
    pub fn new(layer_height: f64) -> Self {
        Self {
            layer_height,
            ..Default::default()
        }
    }

    /// Set the layer height.
    pub fn with_layer_height(mut self, layer_height: f64) -> Self {
        self.layer_height = layer_height;
        self
    }

    /// Set the slicing axis.
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the collinear merge tolerance, or `None` for raw output.
    pub fn with_collinear_tolerance(mut self, tolerance: Option<f64>) -> Self {
        self.collinear_tolerance = tolerance;
        self
    }

    /// Emit one point per crossed edge, without simplification.
    pub fn raw(mut self) -> Self {
        self.collinear_tolerance = None;
        self
    }

    /// Set the maximum number of faces accepted.
    pub fn with_max_triangles(mut self, limit: usize) -> Self {
        self.max_triangles = Some(limit);
        self
    }

    /// Set the wall-clock budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Check that the options are usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.layer_height.is_finite() && self.layer_height > 0.0) {
            return Err(SliceError::invalid_param(
                "layer_height",
                self.layer_height,
                "must be finite and positive",
            ));
        }
        if let Some(tol) = self.collinear_tolerance {
            if !(tol.is_finite() && tol >= 0.0) {
                return Err(SliceError::invalid_param(
                    "collinear_tolerance",
                    tol,
                    "must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }
}

/// Slice a closed mesh into layers.
///
/// # Errors
/// Input validation errors ([`SliceError::is_input_error`]) are reported
/// before the sweep starts. Topology errors during the sweep abort it; use
/// [`slice_mesh_partial`] to keep the layers emitted up to that point.
pub fn slice_mesh(mesh: &TriangleMesh, options: &SliceOptions) -> Result<Vec<Layer>> {
    slice_mesh_partial(mesh, options, &Progress::none()).map_err(SliceError::from)
}

/// Slice a closed mesh into layers, reporting progress.
pub fn slice_mesh_with_progress(
    mesh: &TriangleMesh,
    options: &SliceOptions,
    progress: &Progress,
) -> Result<Vec<Layer>> {
    slice_mesh_partial(mesh, options, progress).map_err(SliceError::from)
}

/// Slice a closed mesh, returning the layers emitted before any failure
/// together with the error.
pub fn slice_mesh_partial(
    mesh: &TriangleMesh,
    options: &SliceOptions,
    progress: &Progress,
) -> std::result::Result<Vec<Layer>, PartialSlice> {
    let sweep = Sweep::new(mesh, options).map_err(|error| PartialSlice {
        layers: Vec::new(),
        error,
    })?;
    sweep.run(progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_triangles, primitives, to_face_vertex, EdgeTable};
    use nalgebra::Point3;

    fn assert_unit_square(polygon: &Polygon, height: f64) {
        assert_eq!(polygon.len(), 4, "{:?}", polygon.points);
        for p in &polygon.points {
            assert!((p.z - height).abs() < 1e-12);
            assert!(p.x.abs() < 1e-12 || (p.x - 1.0).abs() < 1e-12);
            assert!(p.y.abs() < 1e-12 || (p.y - 1.0).abs() < 1e-12);
        }
        for (a, b) in polygon.segments() {
            assert!(((b - a).norm() - 1.0).abs() < 1e-12);
        }
        assert!((polygon.signed_area(Axis::Z) - 1.0).abs() < 1e-12);
    }

    /// Two unit cubes, one above the other with a gap of one unit.
    fn stacked_cubes() -> TriangleMesh {
        let (mut vertices, mut faces) = to_face_vertex(&primitives::unit_cube());
        let offset = vertices.len();
        let upper: Vec<Point3<f64>> = vertices.iter().map(|p| Point3::new(p.x, p.y, p.z + 2.0)).collect();
        vertices.extend(upper);
        let upper_faces: Vec<[usize; 3]> = faces.iter().map(|f| f.map(|v| v + offset)).collect();
        faces.extend(upper_faces);
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_options_validation() {
        assert!(SliceOptions::default().validate().is_ok());
        assert!(matches!(
            SliceOptions::new(0.0).validate(),
            Err(SliceError::InvalidParameter { name: "layer_height", .. })
        ));
        assert!(SliceOptions::new(f64::NAN).validate().is_err());
        assert!(SliceOptions::new(-1.0).validate().is_err());
        assert!(SliceOptions::default()
            .with_collinear_tolerance(Some(-1.0))
            .validate()
            .is_err());

        let mesh = primitives::unit_cube();
        let err = slice_mesh(&mesh, &SliceOptions::new(0.0)).unwrap_err();
        assert!(matches!(err, SliceError::InvalidParameter { .. }));
    }

    #[test]
    fn test_tetrahedron_single_triangle() {
        let mesh = primitives::tetrahedron();
        let layers = slice_mesh(&mesh, &SliceOptions::new(1.0)).unwrap();

        assert_eq!(layers.len(), 1);
        let layer = &layers[0];
        assert!((layer.height - 0.5).abs() < 1e-12);
        assert_eq!(layer.polygons.len(), 1);
        assert_eq!(layer.polygons[0].len(), 3);
        // Half-scale copy of the base triangle.
        assert!((layer.area(Axis::Z) - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_unit_cube_quarter_layers() {
        let mesh = primitives::unit_cube();
        let layers = slice_mesh(&mesh, &SliceOptions::new(0.25)).unwrap();

        assert_eq!(layers.len(), 4);
        for (k, layer) in layers.iter().enumerate() {
            let height = 0.125 + 0.25 * k as f64;
            assert_eq!(layer.index, k);
            assert!((layer.height - height).abs() < 1e-12);
            assert!((layer.bottom - 0.25 * k as f64).abs() < 1e-12);
            assert!((layer.top - 0.25 * (k + 1) as f64).abs() < 1e-12);
            assert_eq!(layer.polygons.len(), 1);
            assert_unit_square(&layer.polygons[0], height);
        }
    }

    #[test]
    fn test_unused_vertex_does_not_shift_layers() {
        let (mut vertices, faces) = to_face_vertex(&primitives::unit_cube());
        vertices.push(Point3::new(5.0, 5.0, -3.0));
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        for options in [SliceOptions::new(0.25), SliceOptions::new(0.25).sequential()] {
            let layers = slice_mesh(&mesh, &options).unwrap();
            assert_eq!(layers.len(), 4);
            for (k, layer) in layers.iter().enumerate() {
                let height = 0.125 + 0.25 * k as f64;
                assert!((layer.height - height).abs() < 1e-12);
                assert_eq!(layer.polygons.len(), 1);
                assert_unit_square(&layer.polygons[0], height);
            }
        }
    }

    #[test]
    fn test_unit_cube_raw_points_match_crossed_edges() {
        let mesh = primitives::unit_cube();
        let edges = EdgeTable::build(&mesh, Axis::Z).unwrap();
        let layers = slice_mesh(&mesh, &SliceOptions::new(0.25).raw()).unwrap();

        for layer in &layers {
            assert_eq!(layer.point_count(), edges.count_crossing(&mesh, layer.height));
            assert_eq!(layer.point_count(), 8);
        }
    }

    #[test]
    fn test_sphere_points_match_crossed_edges() {
        let mesh = primitives::uv_sphere(1.0, 24, 12);
        let options = SliceOptions::new(0.1).raw();
        let edges = EdgeTable::build(&mesh, options.axis).unwrap();
        let layers = slice_mesh(&mesh, &options).unwrap();

        assert_eq!(layers.len(), 20);
        for layer in &layers {
            let on_vertex = mesh
                .positions()
                .iter()
                .any(|p| (p.z - layer.height).abs() < 1e-9);
            if on_vertex {
                continue;
            }
            assert_eq!(layer.polygons.len(), 1);
            assert_eq!(layer.point_count(), edges.count_crossing(&mesh, layer.height));
            assert!(layer.area(Axis::Z) > 0.0);
        }
    }

    #[test]
    fn test_slicing_along_other_axes() {
        let mesh = primitives::unit_cube();
        for axis in [Axis::X, Axis::Y] {
            let layers = slice_mesh(&mesh, &SliceOptions::new(0.5).with_axis(axis)).unwrap();
            assert_eq!(layers.len(), 2);
            for layer in &layers {
                assert_eq!(layer.polygons.len(), 1);
                assert_eq!(layer.polygons[0].len(), 4);
                assert!((layer.area(axis) - 1.0).abs() < 1e-12, "axis {:?}", axis);
            }
        }
    }

    #[test]
    fn test_torus_topology_changes() {
        let mesh = primitives::torus(2.0, 0.5, 32, 12);
        let layers = slice_mesh(&mesh, &SliceOptions::new(0.1).with_axis(Axis::Y)).unwrap();

        let counts: Vec<usize> = layers.iter().map(|l| l.polygons.len()).collect();
        assert_eq!(counts.first(), Some(&1));
        assert_eq!(counts.last(), Some(&1));

        let middle = layers
            .iter()
            .min_by(|a, b| a.height.abs().total_cmp(&b.height.abs()))
            .unwrap();
        assert_eq!(middle.polygons.len(), 2);
        assert!(counts.iter().all(|&c| c == 1 || c == 2));
    }

    #[test]
    fn test_torus_annulus_has_hole() {
        let mesh = primitives::torus(2.0, 0.5, 32, 12);
        let layers = slice_mesh(&mesh, &SliceOptions::new(0.2)).unwrap();

        for layer in &layers {
            assert_eq!(layer.polygons.len(), 2);
            let mut areas: Vec<f64> = layer.polygons.iter().map(|p| p.signed_area(Axis::Z)).collect();
            areas.sort_by(f64::total_cmp);
            assert!(areas[0] < 0.0, "hole should run clockwise");
            assert!(areas[1] > 0.0, "outer boundary should run counter-clockwise");
            assert!(areas[1] > -areas[0]);
        }
    }

    #[test]
    fn test_gap_between_bodies_yields_empty_layers() {
        let mesh = stacked_cubes();
        let layers = slice_mesh(&mesh, &SliceOptions::new(0.5)).unwrap();

        // Heights 0.25 .. 2.75: two inside each cube, two in the gap.
        assert_eq!(layers.len(), 6);
        let counts: Vec<usize> = layers.iter().map(|l| l.polygons.len()).collect();
        assert_eq!(counts, vec![1, 1, 0, 0, 1, 1]);
    }

    #[test]
    fn test_repeated_slicing_is_identical() {
        let mesh = primitives::uv_sphere(1.0, 16, 8);
        let options = SliceOptions::new(0.05);

        let first = slice_mesh(&mesh, &options).unwrap();
        let second = slice_mesh(&mesh, &options).unwrap();
        let sequential = slice_mesh(&mesh, &options.clone().sequential()).unwrap();

        assert_eq!(format!("{:?}", first), format!("{:?}", second));
        assert_eq!(first, sequential);
    }

    #[test]
    fn test_thin_mesh_has_no_layers() {
        let mesh = primitives::tetrahedron();
        let layers = slice_mesh(&mesh, &SliceOptions::new(5.0)).unwrap();
        assert!(layers.is_empty());
    }

    #[test]
    fn test_open_mesh_is_rejected() {
        let (vertices, mut faces) = to_face_vertex(&primitives::unit_cube());
        faces.pop();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        let partial = slice_mesh_partial(&mesh, &SliceOptions::default(), &Progress::none()).unwrap_err();
        assert!(partial.layers.is_empty());
        assert!(partial.error.is_input_error());
        assert!(matches!(partial.error, SliceError::NonManifoldEdge { faces: 1, .. }));
    }

    #[test]
    fn test_progress_events() {
        use std::sync::{Arc, Mutex};

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let progress = Progress::new(move |e| sink.lock().unwrap().push(e.clone()));

        let mesh = primitives::unit_cube();
        let layers = slice_mesh_with_progress(&mesh, &SliceOptions::new(0.5), &progress).unwrap();
        let events = events.lock().unwrap();

        assert_eq!(events[0], ProgressEvent::TowersBuilt { towers: 8 });
        let vertices = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::VertexProcessed { .. }))
            .count();
        assert_eq!(vertices, 8);
        let emitted = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::LayerEmitted { polygons: 1, .. }))
            .count();
        assert_eq!(emitted, layers.len());
    }
}
