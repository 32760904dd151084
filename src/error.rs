//! Error types for sliver.
//!
//! Every failure in this crate is fatal for the mesh being sliced: the sweep
//! is a deterministic pass over static input, so nothing is retried.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::mesh::{EdgeId, VertexId};
use crate::slice::Layer;

/// Result type alias using [`SliceError`].
pub type Result<T> = std::result::Result<T, SliceError>;

/// Errors that can occur while building, validating or slicing a mesh.
#[derive(Error, Debug)]
pub enum SliceError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices (degenerate triangle).
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A vertex position contains NaN or an infinity.
    #[error("vertex {vertex} has a non-finite coordinate")]
    NonFiniteVertex {
        /// The vertex index.
        vertex: usize,
    },

    /// An edge is shared by a number of faces other than two.
    #[error("edge ({v0}, {v1}) is shared by {faces} faces (closed 2-manifold input requires 2)")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
        /// Number of faces using the edge.
        faces: usize,
    },

    /// The two faces sharing an edge traverse it in the same direction.
    #[error("faces sharing edge ({v0}, {v1}) have inconsistent winding")]
    InconsistentWinding {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// Joining left an open chain behind after a vertex event.
    #[error("unresolved fragment after processing {vertex:?} at height {height}: {chain}")]
    UnresolvedFragment {
        /// The vertex whose event left the fragment open.
        vertex: VertexId,
        /// Height of that vertex.
        height: f64,
        /// The offending token chain.
        chain: String,
    },

    /// A ring in the active set does not start and end on the same edge.
    #[error("ring failed closure check after processing {vertex:?} at height {height}: {chain}")]
    RingClosure {
        /// The vertex whose event produced the ring.
        vertex: VertexId,
        /// Height of that vertex.
        height: f64,
        /// The offending token chain.
        chain: String,
    },

    /// The emitter was asked to interpolate an edge that does not straddle the layer.
    #[error("edge {edge:?} spans [{low}, {high}] and cannot be cut at height {height}")]
    InterpolationRange {
        /// The edge being interpolated.
        edge: EdgeId,
        /// The requested layer height.
        height: f64,
        /// Height of the edge's low endpoint.
        low: f64,
        /// Height of the edge's high endpoint.
        high: f64,
    },

    /// Rings were still active after every vertex had been processed.
    #[error("{count} ring(s) left active after the last vertex event")]
    LeftoverRings {
        /// Number of rings left in the active set.
        count: usize,
    },

    /// The mesh is larger than the configured triangle budget.
    #[error("mesh has {faces} faces, exceeding the budget of {limit}")]
    TooManyTriangles {
        /// Number of faces in the mesh.
        faces: usize,
        /// Configured limit.
        limit: usize,
    },

    /// The configured wall-clock budget ran out between two vertex events.
    #[error("time budget of {budget:?} exceeded after {processed} vertex events")]
    BudgetExceeded {
        /// Configured budget.
        budget: Duration,
        /// Vertex events completed before the budget check failed.
        processed: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error writing output to file.
    #[error("failed to save {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },
}

impl SliceError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        SliceError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Whether the error points at the input mesh rather than at slicing itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SliceError::EmptyMesh
                | SliceError::InvalidVertexIndex { .. }
                | SliceError::DegenerateFace { .. }
                | SliceError::NonFiniteVertex { .. }
                | SliceError::NonManifoldEdge { .. }
                | SliceError::InconsistentWinding { .. }
        )
    }
}

/// A failed slice together with the layers emitted before the failure.
#[derive(Error, Debug)]
#[error("{error} ({} layer(s) emitted before failure)", .layers.len())]
pub struct PartialSlice {
    /// Layers that were completed before the error.
    pub layers: Vec<Layer>,
    /// The error that aborted the slice.
    #[source]
    pub error: SliceError,
}

impl From<PartialSlice> for SliceError {
    fn from(partial: PartialSlice) -> Self {
        partial.error
    }
}
