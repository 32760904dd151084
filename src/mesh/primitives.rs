//! Procedural closed meshes.
//!
//! All primitives are closed 2-manifolds wound counter-clockwise when seen
//! from outside, so they can be sliced directly.

use std::f64::consts::PI;

use nalgebra::Point3;

use super::index::VertexId;
use super::TriangleMesh;

fn from_lists(positions: Vec<Point3<f64>>, faces: &[[usize; 3]]) -> TriangleMesh {
    TriangleMesh {
        positions,
        triangles: faces.iter().map(|f| f.map(VertexId::new)).collect(),
    }
}

/// A tetrahedron with its base triangle at z = 0 and apex at z = 1.
pub fn tetrahedron() -> TriangleMesh {
    let positions = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.5, 1.0, 0.0),
        Point3::new(0.5, 0.5, 1.0),
    ];
    let faces = [
        [0, 2, 1], // bottom
        [0, 1, 3], // front
        [1, 2, 3], // right
        [2, 0, 3], // left
    ];
    from_lists(positions, &faces)
}

/// The unit cube `[0, 1]^3`, two triangles per side.
pub fn unit_cube() -> TriangleMesh {
    let positions = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(0.0, 1.0, 1.0),
    ];
    let faces = [
        [0, 2, 1], // bottom (z = 0)
        [0, 3, 2],
        [4, 5, 6], // top (z = 1)
        [4, 6, 7],
        [0, 1, 5], // front (y = 0)
        [0, 5, 4],
        [3, 7, 6], // back (y = 1)
        [3, 6, 2],
        [0, 4, 7], // left (x = 0)
        [0, 7, 3],
        [1, 2, 6], // right (x = 1)
        [1, 6, 5],
    ];
    from_lists(positions, &faces)
}

/// The regular octahedron with vertices at the unit axis points.
pub fn octahedron() -> TriangleMesh {
    let positions = vec![
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, -1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(0.0, 0.0, -1.0),
    ];
    let faces = [
        [0, 2, 4],
        [2, 1, 4],
        [1, 3, 4],
        [3, 0, 4],
        [2, 0, 5],
        [1, 2, 5],
        [3, 1, 5],
        [0, 3, 5],
    ];
    from_lists(positions, &faces)
}

/// A UV sphere centred at the origin with poles on the Z axis.
///
/// `segments` is the number of longitudinal divisions (at least 3) and
/// `rings` the number of latitudinal bands (at least 2).
pub fn uv_sphere(radius: f64, segments: usize, rings: usize) -> TriangleMesh {
    let segments = segments.max(3);
    let rings = rings.max(2);

    let mut positions = Vec::with_capacity(segments * (rings - 1) + 2);
    positions.push(Point3::new(0.0, 0.0, radius));
    for i in 1..rings {
        let theta = PI * i as f64 / rings as f64;
        for j in 0..segments {
            let phi = 2.0 * PI * j as f64 / segments as f64;
            positions.push(Point3::new(
                radius * theta.sin() * phi.cos(),
                radius * theta.sin() * phi.sin(),
                radius * theta.cos(),
            ));
        }
    }
    positions.push(Point3::new(0.0, 0.0, -radius));

    let top = 0;
    let bottom = positions.len() - 1;
    let ring = |i: usize, j: usize| 1 + (i - 1) * segments + j % segments;

    let mut faces = Vec::with_capacity(2 * segments * (rings - 1));
    for j in 0..segments {
        faces.push([top, ring(1, j), ring(1, j + 1)]);
    }
    for i in 1..rings - 1 {
        for j in 0..segments {
            let a0 = ring(i, j);
            let a1 = ring(i, j + 1);
            let b0 = ring(i + 1, j);
            let b1 = ring(i + 1, j + 1);
            faces.push([a0, b0, b1]);
            faces.push([a0, b1, a1]);
        }
    }
    for j in 0..segments {
        faces.push([bottom, ring(rings - 1, j + 1), ring(rings - 1, j)]);
    }

    from_lists(positions, &faces)
}

/// A torus centred at the origin whose axis of revolution is Z.
///
/// `segments` divides the major circle and `sides` the tube (each at least 3).
/// Sliced along Z every cross-section is an annulus (two loops); sliced along
/// X or Y the loop count goes one → two → one.
pub fn torus(major_radius: f64, minor_radius: f64, segments: usize, sides: usize) -> TriangleMesh {
    let segments = segments.max(3);
    let sides = sides.max(3);

    let mut positions = Vec::with_capacity(segments * sides);
    for i in 0..segments {
        let u = 2.0 * PI * i as f64 / segments as f64;
        for j in 0..sides {
            let v = 2.0 * PI * j as f64 / sides as f64;
            let r = major_radius + minor_radius * v.cos();
            positions.push(Point3::new(r * u.cos(), r * u.sin(), minor_radius * v.sin()));
        }
    }

    let idx = |i: usize, j: usize| (i % segments) * sides + j % sides;
    let mut faces = Vec::with_capacity(2 * segments * sides);
    for i in 0..segments {
        for j in 0..sides {
            let p00 = idx(i, j);
            let p10 = idx(i + 1, j);
            let p11 = idx(i + 1, j + 1);
            let p01 = idx(i, j + 1);
            faces.push([p00, p10, p11]);
            faces.push([p00, p11, p01]);
        }
    }

    from_lists(positions, &faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Axis, EdgeTable};

    fn assert_closed_and_outward(mesh: &TriangleMesh) {
        let table = EdgeTable::build(mesh, Axis::Z).unwrap();
        // Euler characteristic V - E + F
        let chi = mesh.num_vertices() as i64 - table.len() as i64 + mesh.num_faces() as i64;
        assert!(chi == 2 || chi == 0, "unexpected Euler characteristic {}", chi);
        assert!(mesh.signed_volume() > 0.0, "mesh is wound inward");
    }

    #[test]
    fn test_all_primitives_are_closed() {
        assert_closed_and_outward(&tetrahedron());
        assert_closed_and_outward(&unit_cube());
        assert_closed_and_outward(&octahedron());
        assert_closed_and_outward(&uv_sphere(1.0, 12, 8));
        assert_closed_and_outward(&torus(2.0, 0.5, 16, 8));
    }

    #[test]
    fn test_sphere_counts() {
        let mesh = uv_sphere(2.0, 10, 6);
        assert_eq!(mesh.num_vertices(), 10 * 5 + 2);
        assert_eq!(mesh.num_faces(), 2 * 10 * 5);
        assert_eq!(mesh.height_range(Axis::Z), Some((-2.0, 2.0)));
    }

    #[test]
    fn test_torus_volume() {
        let (big, small) = (2.0, 0.5);
        let mesh = torus(big, small, 64, 32);
        let exact = 2.0 * PI * PI * big * small * small;
        let volume = mesh.signed_volume();
        assert!((volume - exact).abs() / exact < 0.02, "volume {} vs {}", volume, exact);
    }
}
