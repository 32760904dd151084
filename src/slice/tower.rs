//! Per-vertex event towers.
//!
//! Every triangle edge contributes a two-token fragment to the tower of its
//! lower endpoint. The token order follows the triangle's winding, so that
//! the fragments of one triangle chain edge → face → edge in the direction
//! the cross-section boundary runs.

use rayon::prelude::*;

use super::token::{join_fragments, Fragment, Token};
use crate::mesh::{EdgeId, EdgeTable, FaceId, TriangleMesh, VertexId};

/// The fragments and retired edges of one vertex event.
#[derive(Debug, Clone, Default)]
pub struct VertexTower {
    vertex: VertexId,
    fragments: Vec<Fragment>,
    incoming: Vec<EdgeId>,
}

impl VertexTower {
    fn new(vertex: VertexId) -> Self {
        Self {
            vertex,
            fragments: Vec::new(),
            incoming: Vec::new(),
        }
    }

    /// The vertex this tower belongs to.
    #[inline]
    pub fn vertex(&self) -> VertexId {
        self.vertex
    }

    /// Fragments starting at this vertex, already joined locally.
    #[inline]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Edges whose upper endpoint is this vertex.
    ///
    /// These are the edges that leave the active ring set when the vertex is
    /// processed.
    #[inline]
    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }

    /// Split the tower into its fragments and incoming edges.
    pub fn into_parts(self) -> (Vec<Fragment>, Vec<EdgeId>) {
        (self.fragments, self.incoming)
    }
}

/// The three tower fragments contributed by one face.
fn face_fragments(mesh: &TriangleMesh, edges: &EdgeTable, f: FaceId) -> [(VertexId, Fragment); 3] {
    let tri = mesh.triangle(f);
    let ids = edges.face_edges(f);

    std::array::from_fn(|i| {
        let e = ids[i];
        let edge = edges.edge(e);
        // Winding runs tri[i] -> tri[i + 1] along this edge.
        let tokens = if tri[i] == edge.low {
            vec![Token::Face(f), Token::Edge(e)]
        } else {
            vec![Token::Edge(e), Token::Face(f)]
        };
        (edge.low, Fragment::new(tokens))
    })
}

/// Build one tower per vertex, indexed by vertex id.
///
/// Each tower's fragments are joined locally before the sweep sees them.
/// With `parallel` set, face fragments and the per-tower joins are computed
/// on the rayon pool; the result is the same either way.
pub fn build_towers(mesh: &TriangleMesh, edges: &EdgeTable, parallel: bool) -> Vec<VertexTower> {
    let mut towers: Vec<VertexTower> = mesh.vertex_ids().map(VertexTower::new).collect();

    let per_face: Vec<[(VertexId, Fragment); 3]> = if parallel {
        (0..mesh.num_faces())
            .into_par_iter()
            .map(|i| face_fragments(mesh, edges, FaceId::new(i)))
            .collect()
    } else {
        mesh.face_ids().map(|f| face_fragments(mesh, edges, f)).collect()
    };

    for (vertex, fragment) in per_face.into_iter().flatten() {
        towers[vertex.index()].fragments.push(fragment);
    }

    for (id, edge) in edges.edges() {
        towers[edge.high.index()].incoming.push(id);
    }

    let join = |tower: &mut VertexTower| {
        let fragments = std::mem::take(&mut tower.fragments);
        tower.fragments = join_fragments(fragments);
    };
    if parallel {
        towers.par_iter_mut().for_each(join);
    } else {
        towers.iter_mut().for_each(join);
    }

    towers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{primitives, Axis};

    #[test]
    fn test_every_edge_registered_twice() {
        let mesh = primitives::octahedron();
        let edges = EdgeTable::build(&mesh, Axis::Z).unwrap();

        let mut per_vertex = vec![0usize; mesh.num_vertices()];
        for f in mesh.face_ids() {
            for (v, frag) in face_fragments(&mesh, &edges, f) {
                assert_eq!(frag.len(), 2);
                per_vertex[v.index()] += 1;
            }
        }
        assert_eq!(per_vertex.iter().sum::<usize>(), 2 * edges.len());
        // The top vertex starts no edge.
        assert_eq!(per_vertex[4], 0);
    }

    #[test]
    fn test_bottom_vertex_tower_is_a_ring() {
        let mesh = primitives::octahedron();
        let edges = EdgeTable::build(&mesh, Axis::Z).unwrap();
        let towers = build_towers(&mesh, &edges, false);

        // Vertex 5 is the lowest: its four faces close into one loop.
        let bottom = &towers[5];
        assert_eq!(bottom.vertex(), VertexId::new(5));
        assert_eq!(bottom.fragments().len(), 1);
        let ring = bottom.fragments()[0].to_ring().unwrap();
        assert_eq!(ring.edges().count(), 5);
        assert!(bottom.incoming().is_empty());

        // Vertex 4 is the highest: it only retires edges.
        let top = &towers[4];
        assert!(top.fragments().is_empty());
        assert_eq!(top.incoming().len(), 4);
    }

    #[test]
    fn test_tetrahedron_base_tower() {
        let mesh = primitives::tetrahedron();
        let edges = EdgeTable::build(&mesh, Axis::Z).unwrap();
        let towers = build_towers(&mesh, &edges, false);

        // Vertex 0 is first in sweep order, so all three of its edges lead
        // upward and its faces close into one loop.
        assert_eq!(towers[0].fragments().len(), 1);
        let ring = towers[0].fragments()[0].to_ring().unwrap();
        assert_eq!(ring.cycle().iter().filter(|t| t.is_edge()).count(), 3);
        assert!(towers[0].incoming().is_empty());
        assert_eq!(towers[3].incoming().len(), 3);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mesh = primitives::uv_sphere(1.0, 16, 8);
        let edges = EdgeTable::build(&mesh, Axis::Z).unwrap();

        let seq = build_towers(&mesh, &edges, false);
        let par = build_towers(&mesh, &edges, true);
        assert_eq!(seq.len(), par.len());
        for (a, b) in seq.iter().zip(&par) {
            assert_eq!(a.fragments(), b.fragments());
            assert_eq!(a.incoming(), b.incoming());
        }
    }
}
