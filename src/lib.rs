//! # Sliver
//!
//! Incremental cross-section slicing of closed triangle meshes.
//!
//! Sliver cuts a closed, consistently wound 2-manifold into a stack of
//! layers, each holding the closed polygons of the mesh's cross-section at
//! one height. It sweeps a plane through the mesh once, tracking the
//! cross-section as rings of edge and face tokens, so the work per layer is
//! proportional to the size of the cross-section rather than the mesh.
//!
//! ## Features
//!
//! - **Topology-tracking sweep**: loops split, merge, appear and vanish as
//!   the plane passes vertices, without per-layer triangle intersection
//! - **Deterministic**: ties in height are broken by vertex id
//! - **Any axis**: slice along X, Y or Z
//! - **File formats**: STL and PLY input, SVG layer output
//! - **Parallel where it is safe**: tower building and layer interpolation
//!   run on rayon
//!
//! ## Quick Start
//!
//! ```no_run
//! use sliver::prelude::*;
//!
//! let mesh = sliver::io::load("model.stl").unwrap();
//! let layers = slice_mesh(&mesh, &SliceOptions::new(0.2)).unwrap();
//!
//! for layer in &layers {
//!     println!("z = {:.3}: {} polygon(s)", layer.height, layer.polygons.len());
//! }
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use sliver::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//!
//! let mesh = build_from_triangles(&vertices, &faces).unwrap();
//! let layers = slice_mesh(&mesh, &SliceOptions::new(0.5)).unwrap();
//!
//! // One triangle at z = 0.25 and one at z = 0.75.
//! assert_eq!(layers.len(), 2);
//! assert!(layers.iter().all(|l| l.polygons.len() == 1 && l.polygons[0].len() == 3));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod io;
pub mod mesh;
pub mod slice;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use sliver::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{PartialSlice, Result, SliceError};
    pub use crate::mesh::{build_from_triangles, Axis, EdgeId, FaceId, TriangleMesh, VertexId};
    pub use crate::slice::{slice_mesh, Layer, Polygon, SliceOptions};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
