//! Mesh construction utilities.
//!
//! This module turns raw face-vertex lists, as found in mesh file formats,
//! into a validated [`TriangleMesh`].

use nalgebra::Point3;

use super::index::VertexId;
use super::TriangleMesh;
use crate::error::{Result, SliceError};

/// Build a triangle mesh from vertices and triangle faces.
///
/// # Arguments
/// * `vertices` - List of vertex positions
/// * `faces` - List of triangle faces, each as [v0, v1, v2] indices (counter-clockwise)
///
/// # Returns
/// A mesh, or an error if a face is out of range or degenerate, or a
/// coordinate is not finite. Manifoldness is checked later, when the
/// [`EdgeTable`](super::EdgeTable) is derived.
///
/// # Example
/// ```
/// use sliver::mesh::{build_from_triangles, TriangleMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh: TriangleMesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Result<TriangleMesh> {
    if faces.is_empty() {
        return Err(SliceError::EmptyMesh);
    }

    for (vi, p) in vertices.iter().enumerate() {
        if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
            return Err(SliceError::NonFiniteVertex { vertex: vi });
        }
    }

    let mut triangles = Vec::with_capacity(faces.len());
    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(SliceError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(SliceError::DegenerateFace { face: fi });
        }
        triangles.push(face.map(VertexId::new));
    }

    Ok(TriangleMesh {
        positions: vertices.to_vec(),
        triangles,
    })
}

/// Convert a mesh back to a face-vertex representation.
///
/// Returns (vertices, faces) tuple.
pub fn to_face_vertex(mesh: &TriangleMesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let faces = mesh
        .triangles
        .iter()
        .map(|tri| tri.map(VertexId::index))
        .collect();
    (mesh.positions.clone(), faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2]];
        (vertices, faces)
    }

    #[test]
    fn test_single_triangle() {
        let (vertices, faces) = single_triangle();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(
            mesh.triangle(crate::mesh::FaceId::new(0)),
            [VertexId::new(0), VertexId::new(1), VertexId::new(2)]
        );
    }

    #[test]
    fn test_roundtrip() {
        let (vertices, faces) = single_triangle();
        let mesh = build_from_triangles(&vertices, &faces).unwrap();

        let (out_verts, out_faces) = to_face_vertex(&mesh);
        assert_eq!(out_faces, faces);
        for (v_in, v_out) in vertices.iter().zip(out_verts.iter()) {
            assert!((v_in - v_out).norm() < 1e-10);
        }
    }

    #[test]
    fn test_empty_faces() {
        let (vertices, _) = single_triangle();
        let result = build_from_triangles(&vertices, &[]);
        assert!(matches!(result, Err(SliceError::EmptyMesh)));
    }

    #[test]
    fn test_invalid_vertex_index() {
        let vertices = vec![Point3::new(0.0, 0.0, 0.0)];
        let faces = vec![[0, 1, 2]];

        let result = build_from_triangles(&vertices, &faces);
        assert!(matches!(
            result,
            Err(SliceError::InvalidVertexIndex { face: 0, vertex: 1 })
        ));
    }

    #[test]
    fn test_degenerate_face() {
        let (vertices, _) = single_triangle();
        let faces = vec![[0, 0, 2]];

        let result = build_from_triangles(&vertices, &faces);
        assert!(matches!(result, Err(SliceError::DegenerateFace { face: 0 })));
    }

    #[test]
    fn test_non_finite_vertex() {
        let (mut vertices, faces) = single_triangle();
        vertices[2].z = f64::NAN;

        let result = build_from_triangles(&vertices, &faces);
        assert!(matches!(result, Err(SliceError::NonFiniteVertex { vertex: 2 })));
    }
}
