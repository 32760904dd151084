//! Core mesh data structures.
//!
//! This module provides the immutable input model consumed by the slicer:
//! an indexed triangle mesh, the undirected edges derived from it, and the
//! [`Axis`] along which heights are measured.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`FaceId`] - Identifies a triangle
//! - [`EdgeId`] - Identifies an undirected edge in an [`EdgeTable`]
//!
//! # Construction
//!
//! Meshes are typically constructed from file I/O or from face-vertex lists:
//!
//! ```
//! use sliver::mesh::{build_from_triangles, TriangleMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh: TriangleMesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_faces(), 1);
//! ```

mod builder;
mod edges;
mod index;
pub mod primitives;

use std::cmp::Ordering;

use ordered_float::OrderedFloat;

use nalgebra::Point3;

pub use builder::{build_from_triangles, to_face_vertex};
pub use edges::{Edge, EdgeTable};
pub use index::{EdgeId, FaceId, VertexId};

/// The coordinate axis used as the slicing height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    /// Slice along X; layers lie in the YZ plane.
    X,
    /// Slice along Y; layers lie in the ZX plane.
    Y,
    /// Slice along Z; layers lie in the XY plane.
    #[default]
    Z,
}

impl Axis {
    /// Coordinate index of this axis.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Height of a point along this axis.
    #[inline]
    pub fn height(self, p: &Point3<f64>) -> f64 {
        p[self.index()]
    }

    /// The two in-plane coordinate indices `(u, v)` for this axis.
    ///
    /// The pair is cyclic (`u × v` points along the axis), so a loop that is
    /// counter-clockwise seen from the positive end of the axis has positive
    /// area in `(u, v)`.
    #[inline]
    pub fn plane(self) -> (usize, usize) {
        match self {
            Axis::X => (1, 2),
            Axis::Y => (2, 0),
            Axis::Z => (0, 1),
        }
    }
}

/// An indexed triangle mesh.
///
/// Triangles are stored as vertex index triples wound counter-clockwise when
/// seen from outside the solid. The mesh is immutable once built; use
/// [`build_from_triangles`] to construct one with validation.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    pub(crate) positions: Vec<Point3<f64>>,
    pub(crate) triangles: Vec<[VertexId; 3]>,
}

impl TriangleMesh {
    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.triangles.len()
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.positions[v.index()]
    }

    /// All vertex positions, indexed by [`VertexId`].
    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Get the three vertices of a face, in winding order.
    #[inline]
    pub fn triangle(&self, f: FaceId) -> [VertexId; 3] {
        self.triangles[f.index()]
    }

    /// All faces, indexed by [`FaceId`].
    #[inline]
    pub fn triangles(&self) -> &[[VertexId; 3]] {
        &self.triangles
    }

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.positions.len()).map(VertexId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.triangles.len()).map(FaceId::new)
    }

    /// Height of a vertex along `axis`.
    #[inline]
    pub fn height(&self, v: VertexId, axis: Axis) -> f64 {
        axis.height(self.position(v))
    }

    /// Compare two vertices in sweep order: by height, then by id.
    ///
    /// This is a total order even when heights tie, which is what makes the
    /// sweep deterministic for meshes with coplanar vertices.
    #[inline]
    pub fn sweep_cmp(&self, a: VertexId, b: VertexId, axis: Axis) -> Ordering {
        OrderedFloat(self.height(a, axis))
            .cmp(&OrderedFloat(self.height(b, axis)))
            .then(a.cmp(&b))
    }

    /// Vertices used by at least one face, in id order.
    ///
    /// Positions that no face references are carried along by loaders but
    /// take no part in slicing.
    pub fn referenced_vertices(&self) -> Vec<VertexId> {
        let mut used = vec![false; self.positions.len()];
        for tri in &self.triangles {
            for v in tri {
                used[v.index()] = true;
            }
        }
        self.vertex_ids().filter(|v| used[v.index()]).collect()
    }

    /// The lowest and highest heights along `axis` over the vertices that
    /// faces reference.
    pub fn height_range(&self, axis: Axis) -> Option<(f64, f64)> {
        let mut heights = self
            .referenced_vertices()
            .into_iter()
            .map(|v| self.height(v, axis));
        let first = heights.next()?;
        Some(heights.fold((first, first), |(lo, hi), h| (lo.min(h), hi.max(h))))
    }

    /// Compute the bounding box of the referenced vertices.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let used = self.referenced_vertices();
        let first = *self.position(*used.first()?);
        let mut min = first;
        let mut max = first;

        for &v in &used {
            let p = self.position(v);
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        Some((min, max))
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.triangles
            .iter()
            .map(|&[a, b, c]| {
                let p0 = self.position(a);
                let e1 = self.position(b) - p0;
                let e2 = self.position(c) - p0;
                0.5 * e1.cross(&e2).norm()
            })
            .sum()
    }

    /// Compute the enclosed volume (divergence theorem).
    ///
    /// Positive for a closed mesh with outward (counter-clockwise) winding.
    pub fn signed_volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|&[a, b, c]| {
                let p0 = self.position(a).coords;
                let p1 = self.position(b).coords;
                let p2 = self.position(c).coords;
                p0.dot(&p1.cross(&p2)) / 6.0
            })
            .sum()
    }
}
