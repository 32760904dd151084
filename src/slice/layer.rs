//! Layer emission.
//!
//! A layer materialises the active ring set at one output height: every edge
//! token is cut at that height and each ring becomes one closed [`Polygon`].

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use super::token::{Fragment, Token};
use crate::error::{Result, SliceError};
use crate::mesh::{Axis, EdgeId, EdgeTable, TriangleMesh};

/// A closed loop of points.
///
/// The closing segment from the last point back to the first is implicit.
/// Outer boundaries run counter-clockwise seen from the positive end of the
/// slicing axis; holes run clockwise.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    /// Points in boundary order.
    pub points: Vec<Point3<f64>>,
}

impl Polygon {
    /// Create a polygon from its points.
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the polygon has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the segments, including the closing one.
    pub fn segments(&self) -> impl Iterator<Item = (&Point3<f64>, &Point3<f64>)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (&self.points[i], &self.points[(i + 1) % n]))
    }

    /// Total boundary length.
    pub fn perimeter(&self) -> f64 {
        self.segments().map(|(a, b)| (b - a).norm()).sum()
    }

    /// Signed area in the plane perpendicular to `axis` (shoelace formula).
    ///
    /// Positive for counter-clockwise loops seen from the positive end of
    /// the axis.
    pub fn signed_area(&self, axis: Axis) -> f64 {
        let (u, v) = axis.plane();
        0.5 * self
            .segments()
            .map(|(a, b)| a[u] * b[v] - b[u] * a[v])
            .sum::<f64>()
    }

    /// Average of the points.
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.points.is_empty() {
            return None;
        }
        let sum: Vector3<f64> = self.points.iter().map(|p| p.coords).sum();
        Some(Point3::from(sum / self.points.len() as f64))
    }

    /// Remove repeated points and points lying on a straight run.
    ///
    /// A point is dropped when it coincides with its predecessor within
    /// `tolerance`, or when the sine of the turn angle at that point is at
    /// most `tolerance` and the boundary keeps going forward. Polygons are
    /// never reduced below three points.
    pub fn merge_collinear(&mut self, tolerance: f64) {
        let mut changed = true;
        while changed && self.points.len() > 3 {
            changed = false;
            let mut i = 0;
            while i < self.points.len() && self.points.len() > 3 {
                let n = self.points.len();
                let a = self.points[(i + n - 1) % n];
                let b = self.points[i];
                let c = self.points[(i + 1) % n];
                if is_redundant(&a, &b, &c, tolerance) {
                    self.points.remove(i);
                    changed = true;
                } else {
                    i += 1;
                }
            }
        }
    }
}

fn is_redundant(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>, tolerance: f64) -> bool {
    let ab = b - a;
    let bc = c - b;
    let (lab, lbc) = (ab.norm(), bc.norm());
    if lab <= tolerance {
        return true;
    }
    if lbc <= tolerance {
        return false;
    }
    ab.dot(&bc) > 0.0 && ab.cross(&bc).norm() <= tolerance * lab * lbc
}

/// The cross-section polygons at one output height.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layer {
    /// Position in the layer sequence, starting at zero.
    pub index: usize,
    /// Height of the cutting plane along the slicing axis.
    pub height: f64,
    /// Lower bound of the band the layer stands for.
    pub bottom: f64,
    /// Upper bound of the band the layer stands for.
    pub top: f64,
    /// One polygon per active ring.
    pub polygons: Vec<Polygon>,
}

impl Layer {
    /// Set the band `[bottom, top]` represented by this layer.
    pub fn with_band(mut self, bottom: f64, top: f64) -> Self {
        self.bottom = bottom;
        self.top = top;
        self
    }

    /// Extent of the band along the slicing axis.
    pub fn thickness(&self) -> f64 {
        self.top - self.bottom
    }

    /// Whether the layer has no polygons.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Number of polygons.
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Total number of points over all polygons.
    pub fn point_count(&self) -> usize {
        self.polygons.iter().map(Polygon::len).sum()
    }

    /// Net enclosed area (outer boundaries minus holes).
    pub fn area(&self, axis: Axis) -> f64 {
        self.polygons.iter().map(|p| p.signed_area(axis)).sum()
    }
}

/// Cut an edge at `height`.
///
/// # Errors
/// [`SliceError::InterpolationRange`] if the edge does not span `height`, or
/// if it is flat.
pub fn interpolate_edge(mesh: &TriangleMesh, edges: &EdgeTable, id: EdgeId, height: f64) -> Result<Point3<f64>> {
    let axis = edges.axis();
    let edge = edges.edge(id);
    let p0 = mesh.position(edge.low);
    let p1 = mesh.position(edge.high);
    let (low, high) = (axis.height(p0), axis.height(p1));

    if !(low <= height && height <= high) || low == high {
        return Err(SliceError::InterpolationRange {
            edge: id,
            height,
            low,
            high,
        });
    }

    let t = (height - low) / (high - low);
    let mut p = p0 + (p1 - p0) * t;
    // Pin the cut exactly onto the plane.
    p[axis.index()] = height;
    Ok(p)
}

/// Turn one ring into a polygon at `height`, one point per edge token.
pub fn ring_polygon(mesh: &TriangleMesh, edges: &EdgeTable, ring: &Fragment, height: f64) -> Result<Polygon> {
    let points = ring
        .cycle()
        .iter()
        .filter_map(|t| match t {
            Token::Edge(e) => Some(*e),
            Token::Face(_) => None,
        })
        .map(|e| interpolate_edge(mesh, edges, e, height))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(points))
}

/// Materialise the active rings at `height`.
///
/// The returned layer has a zero-thickness band at `height`; see
/// [`Layer::with_band`].
///
/// With `parallel` set the rings are interpolated on the rayon pool;
/// polygons keep the order of `rings` either way. When `collinear_tolerance`
/// is set, each polygon is simplified with [`Polygon::merge_collinear`].
pub fn emit_layer(
    mesh: &TriangleMesh,
    edges: &EdgeTable,
    rings: &[&Fragment],
    index: usize,
    height: f64,
    parallel: bool,
    collinear_tolerance: Option<f64>,
) -> Result<Layer> {
    let cut = |ring: &&Fragment| -> Result<Polygon> {
        let mut polygon = ring_polygon(mesh, edges, ring, height)?;
        if let Some(tol) = collinear_tolerance {
            polygon.merge_collinear(tol);
        }
        Ok(polygon)
    };

    let polygons = if parallel {
        rings.par_iter().map(cut).collect::<Result<Vec<_>>>()?
    } else {
        rings.iter().map(cut).collect::<Result<Vec<_>>>()?
    };

    Ok(Layer {
        index,
        height,
        bottom: height,
        top: height,
        polygons,
    })
}
