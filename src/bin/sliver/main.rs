//! Sliver CLI - slice closed meshes into layers.
//!
//! Usage: sliver <COMMAND> [OPTIONS] <INPUT>
//!
//! Run `sliver --help` for available commands. Set `RUST_LOG=debug` for
//! per-layer diagnostics.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use sliver::io;
use sliver::io::svg::{save_layers, SvgOptions};
use sliver::mesh::{Axis, EdgeTable};
use sliver::slice::{slice_mesh_partial, Progress, ProgressEvent, SliceOptions};

#[derive(Parser)]
#[command(name = "sliver")]
#[command(author, version, about = "Slice closed triangle meshes into layer contours", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file (.stl or .ply)
        input: PathBuf,

        /// Slicing axis used for the height range
        #[arg(long, value_enum, default_value = "z")]
        axis: AxisArg,
    },

    /// Slice a mesh into layers
    Slice {
        /// Input mesh file (.stl or .ply)
        input: PathBuf,

        /// Distance between layers
        #[arg(short = 'l', long, default_value = "0.2")]
        layer_height: f64,

        /// Slicing axis
        #[arg(long, value_enum, default_value = "z")]
        axis: AxisArg,

        /// Write one SVG per layer into this directory
        #[arg(long)]
        svg_dir: Option<PathBuf>,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,

        /// Keep one point per crossed edge (no collinear merging)
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum AxisArg {
    X,
    Y,
    Z,
}

impl From<AxisArg> for Axis {
    fn from(arg: AxisArg) -> Self {
        match arg {
            AxisArg::X => Axis::X,
            AxisArg::Y => Axis::Y,
            AxisArg::Z => Axis::Z,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input, axis } => {
            cmd_info(&input, axis.into())?;
        }

        Commands::Slice {
            input,
            layer_height,
            axis,
            svg_dir,
            sequential,
            raw,
        } => {
            let mut options = SliceOptions::new(layer_height)
                .with_axis(axis.into())
                .with_parallel(!sequential);
            if raw {
                options = options.raw();
            }
            cmd_slice(&input, &options, svg_dir.as_deref())?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let last_percent = Arc::new(AtomicUsize::new(usize::MAX));

    Progress::new(move |event| {
        let ProgressEvent::VertexProcessed { processed, total, .. } = *event else {
            return;
        };
        if total == 0 {
            return;
        }

        let percent = ((processed * 100) + (total / 2)) / total;
        // Only redraw when the percentage changes
        if last_percent.swap(percent, Ordering::Relaxed) == percent {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);
        eprint!("\r[{}{}] {:3}% sweeping", bar, space, percent);
        let _ = std::io::stderr().flush();

        if processed >= total {
            eprintln!();
        }
    })
}

fn cmd_info(input: &Path, axis: Axis) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Faces: {}", mesh.num_faces());
    println!("Surface area: {:.6}", mesh.surface_area());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }
    if let Some((lo, hi)) = mesh.height_range(axis) {
        println!("Height range along {:?}: [{:.6}, {:.6}]", axis, lo, hi);
    }

    match EdgeTable::build(&mesh, axis) {
        Ok(edges) => {
            println!("Edges: {}", edges.len());
            println!("Manifold: yes (closed, consistently wound)");
            println!("Volume: {:.6}", mesh.signed_volume());
        }
        Err(e) => println!("Manifold: no ({})", e),
    }

    Ok(())
}

fn cmd_slice(input: &Path, options: &SliceOptions, svg_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    println!(
        "Input: {} vertices, {} faces",
        mesh.num_vertices(),
        mesh.num_faces()
    );

    let start = Instant::now();
    let progress = create_progress();
    let layers = match slice_mesh_partial(&mesh, options, &progress) {
        Ok(layers) => layers,
        Err(partial) => {
            eprintln!();
            eprintln!("{} layer(s) were emitted before the failure", partial.layers.len());
            return Err(partial.error.into());
        }
    };
    let elapsed = start.elapsed();

    for layer in &layers {
        println!(
            "layer {:4} at {:10.4} [{:.4}, {:.4}]: {} polygon(s), {} point(s), area {:.6}",
            layer.index,
            layer.height,
            layer.bottom,
            layer.top,
            layer.polygon_count(),
            layer.point_count(),
            layer.area(options.axis)
        );
    }
    println!("Sliced into {} layers in {:.2?}", layers.len(), elapsed);

    if let Some(dir) = svg_dir {
        let written = save_layers(&layers, options.axis, dir, &SvgOptions::default())?;
        println!("Wrote {} SVG files to {}", written.len(), dir.display());
    }

    Ok(())
}
