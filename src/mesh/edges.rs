//! Undirected edges derived from a triangle mesh.
//!
//! Each edge is stored once, oriented from its sweep-lower endpoint to its
//! sweep-higher endpoint (height along the slicing axis, ties broken by
//! vertex id). Deriving the table also validates that the mesh is a closed,
//! consistently wound 2-manifold.

use std::collections::HashMap;

use super::index::{EdgeId, FaceId, VertexId};
use super::{Axis, TriangleMesh};
use crate::error::{Result, SliceError};

/// An undirected mesh edge in canonical low → high orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Endpoint reached first by the sweep.
    pub low: VertexId,
    /// Endpoint reached last by the sweep.
    pub high: VertexId,
}

/// All edges of a mesh, plus the three edges of every face.
#[derive(Debug, Clone)]
pub struct EdgeTable {
    axis: Axis,
    edges: Vec<Edge>,
    /// `face_edges[f][i]` joins `triangle(f)[i]` and `triangle(f)[(i + 1) % 3]`.
    face_edges: Vec<[EdgeId; 3]>,
}

#[derive(Default)]
struct EdgeUse {
    id: EdgeId,
    /// Faces traversing the edge from the smaller to the larger vertex index.
    forward: usize,
    /// Faces traversing it the other way.
    backward: usize,
}

impl EdgeTable {
    /// Derive the edge table of `mesh` for slicing along `axis`.
    ///
    /// Edge ids are assigned in first-seen order while walking faces, so the
    /// table is identical for identical input.
    ///
    /// # Errors
    /// [`SliceError::NonManifoldEdge`] if an edge is used by a number of
    /// faces other than two, and [`SliceError::InconsistentWinding`] if its
    /// two faces traverse it in the same direction.
    pub fn build(mesh: &TriangleMesh, axis: Axis) -> Result<Self> {
        let mut uses: HashMap<(usize, usize), EdgeUse> = HashMap::with_capacity(mesh.num_faces() * 3 / 2);
        let mut edges: Vec<Edge> = Vec::with_capacity(mesh.num_faces() * 3 / 2);
        let mut order: Vec<(usize, usize)> = Vec::with_capacity(mesh.num_faces() * 3 / 2);
        let mut face_edges = Vec::with_capacity(mesh.num_faces());

        for tri in mesh.triangles() {
            let mut ids = [EdgeId::invalid(); 3];
            for i in 0..3 {
                let a = tri[i];
                let b = tri[(i + 1) % 3];
                let key = (a.index().min(b.index()), a.index().max(b.index()));

                let entry = uses.entry(key).or_insert_with(|| {
                    let id = EdgeId::new(edges.len());
                    let (low, high) = match mesh.sweep_cmp(a, b, axis) {
                        std::cmp::Ordering::Greater => (b, a),
                        _ => (a, b),
                    };
                    edges.push(Edge { low, high });
                    order.push(key);
                    EdgeUse {
                        id,
                        ..EdgeUse::default()
                    }
                });

                if a.index() < b.index() {
                    entry.forward += 1;
                } else {
                    entry.backward += 1;
                }
                ids[i] = entry.id;
            }
            face_edges.push(ids);
        }

        for key in &order {
            let edge_use = &uses[key];
            let faces = edge_use.forward + edge_use.backward;
            if faces != 2 {
                return Err(SliceError::NonManifoldEdge {
                    v0: key.0,
                    v1: key.1,
                    faces,
                });
            }
            if edge_use.forward != 1 {
                return Err(SliceError::InconsistentWinding {
                    v0: key.0,
                    v1: key.1,
                });
            }
        }

        Ok(Self {
            axis,
            edges,
            face_edges,
        })
    }

    /// The axis the edges were oriented for.
    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Number of edges.
    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the table has no edges.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Get an edge by ID.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> Edge {
        self.edges[id.index()]
    }

    /// The three edges of a face, in winding order.
    #[inline]
    pub fn face_edges(&self, f: FaceId) -> [EdgeId; 3] {
        self.face_edges[f.index()]
    }

    /// Iterate over all edges with their IDs.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, e)| (EdgeId::new(i), *e))
    }

    /// Number of edges whose open height span `(low, high)` contains `height`.
    ///
    /// This is the number of points a cross-section at `height` has, provided
    /// no vertex lies exactly at that height.
    pub fn count_crossing(&self, mesh: &TriangleMesh, height: f64) -> usize {
        self.edges
            .iter()
            .filter(|e| {
                let lo = mesh.height(e.low, self.axis);
                let hi = mesh.height(e.high, self.axis);
                lo < height && height < hi
            })
            .count()
    }
}
