//! STL (stereolithography) format support.
//!
//! STL is the usual interchange format for printable solids. Both binary and
//! ASCII files are read.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use log::debug;
use nalgebra::Point3;

use crate::error::{Result, SliceError};
use crate::mesh::{build_from_triangles, to_face_vertex, TriangleMesh};

/// Load a mesh from an STL file.
///
/// Automatically detects binary vs ASCII format. Corners with bit-identical
/// coordinates are merged into one vertex, and triangles that collapse as a
/// result are skipped.
///
/// # Example
///
/// ```no_run
/// use sliver::io::stl;
///
/// let mesh = stl::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let mut file = File::open(path)?;

    let stl = stl_io::read_stl(&mut file).map_err(|e| SliceError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut vertices: Vec<Point3<f64>> = Vec::with_capacity(stl.vertices.len());
    let mut lookup: HashMap<[u64; 3], usize> = HashMap::with_capacity(stl.vertices.len());

    let mut faces: Vec<[usize; 3]> = Vec::with_capacity(stl.faces.len());
    let mut skipped = 0usize;
    for tri in &stl.faces {
        let corners = tri.vertices.map(|i| corner(&stl.vertices[i]));
        let [(a, _), (b, _), (c, _)] = corners;
        // Degenerate triangles are dropped before their corners are indexed.
        if a == b || b == c || a == c {
            skipped += 1;
            continue;
        }
        faces.push(corners.map(|(key, p)| {
            *lookup.entry(key).or_insert_with(|| {
                vertices.push(p);
                vertices.len() - 1
            })
        }));
    }

    if faces.is_empty() {
        return Err(SliceError::LoadError {
            path: path.to_path_buf(),
            message: "STL file contains no valid triangles".to_string(),
        });
    }

    debug!(
        "loaded {}: {} vertices, {} faces ({} degenerate skipped)",
        path.display(),
        vertices.len(),
        faces.len(),
        skipped
    );
    build_from_triangles(&vertices, &faces)
}

/// A corner position and its deduplication key.
fn corner(v: &stl_io::Vertex) -> ([u64; 3], Point3<f64>) {
    let p = Point3::new(v[0] as f64, v[1] as f64, v[2] as f64);
    // +0.0 and -0.0 are the same corner
    let key = [p.x, p.y, p.z].map(|c| if c == 0.0 { 0u64 } else { c.to_bits() });
    (key, p)
}

/// Save a mesh to a binary STL file.
pub fn save<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let (vertices, faces) = to_face_vertex(mesh);
    let to_vertex = |p: &Point3<f64>| stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32]);

    let triangles: Vec<stl_io::Triangle> = faces
        .iter()
        .map(|f| {
            let [p0, p1, p2] = f.map(|i| &vertices[i]);
            let n = (p1 - p0).cross(&(p2 - p0)).normalize();
            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [to_vertex(p0), to_vertex(p1), to_vertex(p2)],
            }
        })
        .collect();

    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| SliceError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}
