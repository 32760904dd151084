//! Mesh loading and layer export.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Notes |
//! |--------|-----------|------|-------|
//! | STL | `.stl` | ✓ | Binary and ASCII |
//! | PLY | `.ply` | ✓ | Polygons are fan-triangulated |
//!
//! Emitted layers are written as SVG with [`svg::save_layers`].
//!
//! # Usage
//!
//! ```no_run
//! use sliver::io::load;
//! use sliver::slice::{slice_mesh, SliceOptions};
//!
//! let mesh = load("model.stl").unwrap();
//! let layers = slice_mesh(&mesh, &SliceOptions::new(0.2)).unwrap();
//! ```

pub mod ply;
pub mod stl;
pub mod svg;

use std::path::Path;

use crate::error::{Result, SliceError};
use crate::mesh::TriangleMesh;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// STL (stereolithography) format.
    Stl,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "stl" => Some(Format::Stl),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

/// Load a mesh from a file, choosing the format by extension.
///
/// The result is validated as a triangle list but not yet checked for
/// manifoldness; that happens when slicing starts.
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    let format = Format::from_path(path).ok_or_else(|| SliceError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })?;

    match format {
        Format::Stl => stl::load(path),
        Format::Ply => ply::load(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path("a/b/part.STL"), Some(Format::Stl));
        assert_eq!(Format::from_path("part.ply"), Some(Format::Ply));
        assert_eq!(Format::from_path("part.obj"), None);
        assert_eq!(Format::from_path("part"), None);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load("model.obj").unwrap_err();
        assert!(matches!(err, SliceError::UnsupportedFormat { ref extension } if extension == "obj"));

        let err = load("model").unwrap_err();
        assert!(matches!(err, SliceError::UnsupportedFormat { ref extension } if extension == "(none)"));
    }
}
