//! SVG export of emitted layers.
//!
//! Each layer becomes one SVG document drawing all its polygons as a single
//! even-odd filled path, so holes show through without needing to know
//! which loop is which.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Result, SliceError};
use crate::mesh::Axis;
use crate::slice::Layer;

/// Options for SVG export.
#[derive(Debug, Clone)]
pub struct SvgOptions {
    /// Width of the SVG in pixels.
    pub width: u32,
    /// Height of the SVG in pixels.
    pub height: u32,
    /// Padding around the content in pixels.
    pub padding: u32,
    /// Stroke width in pixels.
    pub stroke_width: f64,
    /// Fill color for solid regions (CSS color string).
    pub fill_color: String,
    /// Stroke color for polygon outlines.
    pub stroke_color: String,
    /// Background color.
    pub background_color: String,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            padding: 20,
            stroke_width: 1.0,
            fill_color: "#4a90d9".to_string(),
            stroke_color: "#2d5986".to_string(),
            background_color: "#f5f5f5".to_string(),
        }
    }
}

impl SvgOptions {
    /// Set the canvas size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set fill and stroke colors.
    pub fn with_colors(mut self, fill: &str, stroke: &str) -> Self {
        self.fill_color = fill.to_string();
        self.stroke_color = stroke.to_string();
        self
    }
}

/// Axis-aligned bounds in the layer plane: `(min_u, min_v, max_u, max_v)`.
type Bounds = (f64, f64, f64, f64);

fn layer_bounds<'a>(layers: impl IntoIterator<Item = &'a Layer>, axis: Axis) -> Option<Bounds> {
    let (u, v) = axis.plane();
    layers
        .into_iter()
        .flat_map(|l| l.polygons.iter())
        .flat_map(|p| p.points.iter())
        .fold(None, |acc, p| {
            let (x, y) = (p[u], p[v]);
            Some(match acc {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            })
        })
}

/// Render one layer, fitting its own extent to the canvas.
///
/// # Example
///
/// ```
/// use sliver::io::svg::{layer_to_svg, SvgOptions};
/// use sliver::mesh::{primitives, Axis};
/// use sliver::slice::{slice_mesh, SliceOptions};
///
/// let layers = slice_mesh(&primitives::unit_cube(), &SliceOptions::new(0.5)).unwrap();
/// let svg = layer_to_svg(&layers[0], Axis::Z, &SvgOptions::default());
/// assert!(svg.starts_with("<svg"));
/// ```
pub fn layer_to_svg(layer: &Layer, axis: Axis, options: &SvgOptions) -> String {
    render(layer, axis, layer_bounds([layer], axis), options)
}

fn render(layer: &Layer, axis: Axis, bounds: Option<Bounds>, options: &SvgOptions) -> String {
    let (w, h) = (options.width, options.height);
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n  \
         <rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n",
        options.background_color
    );

    if let (Some((x0, y0, x1, y1)), false) = (bounds, layer.is_empty()) {
        let padding = f64::from(options.padding);
        let avail_w = f64::from(w) - 2.0 * padding;
        let avail_h = f64::from(h) - 2.0 * padding;
        let (cw, ch) = (x1 - x0, y1 - y0);
        let scale = if cw > 0.0 && ch > 0.0 {
            (avail_w / cw).min(avail_h / ch)
        } else {
            1.0
        };
        let off_x = padding + (avail_w - cw * scale) / 2.0;
        let off_y = padding + (avail_h - ch * scale) / 2.0;

        let (u, v) = axis.plane();
        let mut d = String::new();
        for polygon in layer.polygons.iter().filter(|p| !p.is_empty()) {
            for (i, p) in polygon.points.iter().enumerate() {
                // SVG y grows downward.
                let x = off_x + (p[u] - x0) * scale;
                let y = off_y + (y1 - p[v]) * scale;
                let cmd = if i == 0 { 'M' } else { 'L' };
                let _ = write!(d, "{cmd}{x:.3} {y:.3} ");
            }
            d.push_str("Z ");
        }

        let _ = writeln!(
            svg,
            "  <path d=\"{}\" fill=\"{}\" fill-rule=\"evenodd\" stroke=\"{}\" stroke-width=\"{:.2}\"/>",
            d.trim_end(),
            options.fill_color,
            options.stroke_color,
            options.stroke_width
        );
    }

    let _ = writeln!(
        svg,
        "  <text x=\"10\" y=\"20\" font-family=\"monospace\" font-size=\"12\" fill=\"#666\">layer {} at {:.4}: {} polygon(s)</text>",
        layer.index,
        layer.height,
        layer.polygon_count()
    );
    svg.push_str("</svg>\n");
    svg
}

/// Write one SVG per layer into `dir` as `layer_0000.svg`, `layer_0001.svg`, ...
///
/// All layers share one scale so they line up when viewed in sequence. The
/// directory is created if needed. Returns the written paths.
pub fn save_layers<P: AsRef<Path>>(layers: &[Layer], axis: Axis, dir: P, options: &SvgOptions) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let bounds = layer_bounds(layers, axis);
    let mut written = Vec::with_capacity(layers.len());
    for layer in layers {
        let path = dir.join(format!("layer_{:04}.svg", layer.index));
        fs::write(&path, render(layer, axis, bounds, options)).map_err(|e| SliceError::SaveError {
            path: path.clone(),
            message: e.to_string(),
        })?;
        written.push(path);
    }

    debug!("wrote {} SVG layers to {}", written.len(), dir.display());
    Ok(written)
}
