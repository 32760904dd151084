//! PLY (Stanford polygon) format support.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::debug;
use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{Result, SliceError};
use crate::mesh::{build_from_triangles, TriangleMesh};

fn load_error(path: &Path, message: &str) -> SliceError {
    SliceError::LoadError {
        path: PathBuf::from(path),
        message: message.to_string(),
    }
}

/// Load a mesh from a PLY file.
///
/// Faces with more than three corners are fan-triangulated, which keeps
/// their winding.
///
/// # Example
///
/// ```no_run
/// use sliver::io::ply;
///
/// let mesh = ply::load("model.ply").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(&mut reader).map_err(|e| SliceError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error(path, "PLY file has no vertex element"))?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let coord = |name: &str| {
            get_float_property(vertex, name).ok_or_else(|| load_error(path, "vertex missing a coordinate"))
        };
        vertices.push(Point3::new(coord("x")?, coord("y")?, coord("z")?));
    }

    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| load_error(path, "PLY file has no face element"))?;

    let mut faces: Vec<[usize; 3]> = Vec::with_capacity(face_element.len());
    for face in face_element {
        let indices = get_list_property(face, "vertex_indices")
            .or_else(|| get_list_property(face, "vertex_index"))
            .ok_or_else(|| load_error(path, "face missing vertex_indices property"))?;

        if indices.len() >= 3 {
            for i in 1..indices.len() - 1 {
                faces.push([indices[0], indices[i], indices[i + 1]]);
            }
        }
    }

    if faces.is_empty() {
        return Err(load_error(path, "PLY file contains no faces"));
    }

    debug!(
        "loaded {}: {} vertices, {} triangles",
        path.display(),
        vertices.len(),
        faces.len()
    );
    build_from_triangles(&vertices, &faces)
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Axis;
    use crate::slice::{slice_mesh, SliceOptions};

    /// A unit cube with one quad per side.
    const QUAD_CUBE: &str = "ply
format ascii 1.0
element vertex 8
property float x
property float y
property float z
element face 6
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
1 1 0
0 1 0
0 0 1
1 0 1
1 1 1
0 1 1
4 0 3 2 1
4 4 5 6 7
4 0 1 5 4
4 3 7 6 2
4 0 4 7 3
4 1 2 6 5
";

    #[test]
    fn test_quads_are_triangulated() {
        let path = std::env::temp_dir().join(format!("sliver_ply_quads_{}.ply", std::process::id()));
        std::fs::write(&path, QUAD_CUBE).unwrap();

        let mesh = load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_faces(), 12);
        assert!((mesh.signed_volume() - 1.0).abs() < 1e-12);

        let layers = slice_mesh(&mesh, &SliceOptions::new(0.5)).unwrap();
        assert_eq!(layers.len(), 2);
        assert!((layers[0].area(Axis::Z) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_faces() {
        let path = std::env::temp_dir().join(format!("sliver_ply_nofaces_{}.ply", std::process::id()));
        std::fs::write(
            &path,
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nend_header\n0 0 0\n",
        )
        .unwrap();

        let result = load(&path);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(result, Err(SliceError::LoadError { .. })));
    }
}
