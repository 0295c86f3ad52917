//! CLI for meshing molecular surfaces of atomic balls.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{ArgAction, Parser, ValueEnum};
use log::info;
use molsurf::graphics::{GraphicsWriter, write_obj};
use molsurf::input::{ElementRadii, ParseOptions, parse_file, parse_stdin};
use molsurf::{
    Ball, DEFAULT_JOIN_THRESHOLD, DEFAULT_PROBE, DEFAULT_VOXEL_SIZE, SurfaceInfo, SurfaceParams,
    SurfaceResult, SurfaceType, TriangleMesh, compute_surface,
};
use serde::Serialize;

/// Mesh output format
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Wavefront OBJ
    Obj,
    /// `PyMOL` CGO script
    Pymol,
    /// JSON with vertices, triangles and summary
    Json,
}

/// Mesh statistics printed after every run
#[derive(Serialize)]
struct Summary {
    surface: SurfaceType,
    balls: usize,
    num_vertices: usize,
    /// Vertices used by at least one triangle
    referenced_vertices: usize,
    num_triangles: usize,
    /// Volume enclosed by the mesh; `volume` is the field-based estimate
    mesh_volume: f64,
    area: f64,
    #[serde(flatten)]
    info: SurfaceInfo,
}

impl Summary {
    fn new(result: &SurfaceResult, surface: SurfaceType, balls: usize) -> Self {
        Self {
            surface,
            balls,
            num_vertices: result.mesh.num_vertices(),
            referenced_vertices: result.mesh.num_referenced_vertices(),
            num_triangles: result.mesh.num_triangles(),
            mesh_volume: result.mesh.signed_volume(),
            area: result.mesh.area(),
            info: result.info,
        }
    }
}

/// Full JSON mesh output
#[derive(Serialize)]
struct JsonMesh<'a> {
    #[serde(flatten)]
    summary: &'a Summary,
    vertices: Vec<[f64; 3]>,
    triangles: &'a [[usize; 3]],
}

impl<'a> JsonMesh<'a> {
    fn new(summary: &'a Summary, mesh: &'a TriangleMesh) -> Self {
        Self {
            summary,
            vertices: mesh.vertices.iter().map(|p| [p.x, p.y, p.z]).collect(),
            triangles: &mesh.triangles,
        }
    }
}

#[derive(Parser)]
#[command(name = "molsurf")]
#[command(about = "Compute marching-cubes molecular surfaces of atomic balls")]
#[command(
    long_about = "Rasterizes atomic balls onto a lattice, optionally rolls a solvent probe \
    over them, and extracts the surface with marching cubes. Supports van der Waals, \
    solvent-accessible (Lee-Richards) and solvent-excluded (Connolly) surfaces.\n\n\
    Reads PDB and XYZR input (auto-detected from extension or content) and writes \
    OBJ, PyMOL CGO or JSON meshes."
)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Input file (PDB or XYZR format). Reads from stdin if not specified
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output mesh file. Writes to stdout if not specified
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Mesh output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Obj)]
    format: OutputFormat,

    /// Rolling probe radius
    #[arg(long, default_value_t = DEFAULT_PROBE)]
    probe: f64,

    /// Lattice spacing
    #[arg(long, default_value_t = DEFAULT_VOXEL_SIZE)]
    voxel_size: f64,

    /// Surface type: connolly, lee-richards or vdw
    #[arg(long, default_value_t = SurfaceType::Connolly)]
    surface: SurfaceType,

    /// Edge fraction within which crossings merge into one corner vertex (0 disables)
    #[arg(long, default_value_t = DEFAULT_JOIN_THRESHOLD)]
    join_threshold: f64,

    /// Custom radii file (format: element radius per line)
    #[arg(long)]
    radii_file: Option<PathBuf>,

    /// Include hydrogen atoms
    #[arg(long)]
    include_hydrogens: bool,

    /// Exclude heteroatoms (HETATM records)
    #[arg(long)]
    exclude_heteroatoms: bool,

    /// Also draw the input balls in `PyMOL` output
    #[arg(long)]
    draw_balls: bool,

    /// Also draw the triangle wireframe in `PyMOL` output
    #[arg(long)]
    wireframe: bool,

    /// Increase verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Reduce verbosity to warnings only
    #[arg(short, long)]
    quiet: bool,

    /// Maximum number of threads to use (default: all available)
    #[arg(long)]
    processors: Option<usize>,

    /// Measure and output running time to stderr
    #[arg(long)]
    measure_running_time: bool,
}

/// Object name for `PyMOL` output, taken from the input file stem.
fn object_name(input: Option<&Path>) -> String {
    input
        .and_then(Path::file_stem)
        .and_then(|s| s.to_str())
        .map_or_else(|| "molsurf".to_string(), str::to_string)
}

fn write_mesh<W: Write>(
    mut writer: W,
    cli: &Cli,
    result: &SurfaceResult,
    summary: &Summary,
    balls: &[Ball],
) -> io::Result<()> {
    match cli.format {
        OutputFormat::Obj => write_obj(&result.mesh, &mut writer)?,
        OutputFormat::Pymol => {
            let mut graphics = GraphicsWriter::new(&result.mesh).with_wireframe(cli.wireframe);
            if cli.draw_balls {
                graphics = graphics.with_balls(balls);
            }
            graphics.write_pymol(&mut writer, &object_name(cli.input.as_deref()))?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &JsonMesh::new(summary, &result.mesh))?;
            writeln!(writer)?;
        }
    }
    writer.flush()
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let params = SurfaceParams::default()
        .with_voxel_size(cli.voxel_size)
        .with_probe(cli.probe)
        .with_surface_type(cli.surface)
        .with_join_threshold(cli.join_threshold);
    params
        .validate()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    // Configure thread pool if --processors specified
    if let Some(num_threads) = cli.processors {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(io::Error::other)?;
        info!("Using {num_threads} threads");
    }

    // Setup radii lookup
    let mut radii = ElementRadii::new();
    if let Some(ref radii_path) = cli.radii_file {
        let content = std::fs::read_to_string(radii_path)?;
        radii
            .load_from_text(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        info!("Loaded custom radii from {}", radii_path.display());
    }

    let options = ParseOptions {
        exclude_heteroatoms: cli.exclude_heteroatoms,
        include_hydrogens: cli.include_hydrogens,
    };

    let balls = match &cli.input {
        Some(path) => parse_file(path, &options, &radii)?,
        None => parse_stdin(&options, &radii)?,
    };
    info!("Read {} balls", balls.len());

    let start = Instant::now();
    let result = compute_surface(&balls, &params);
    let elapsed = start.elapsed();

    if cli.measure_running_time {
        info!("Meshing time: {} ms", elapsed.as_millis());
    }

    let summary = Summary::new(&result, params.surface_type, balls.len());

    if let Some(path) = &cli.output {
        let file = BufWriter::new(File::create(path)?);
        write_mesh(file, &cli, &result, &summary, &balls)?;
        info!("Wrote {:?} mesh to {}", cli.format, path.display());

        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &summary)?;
        writeln!(stdout)?;
    } else {
        write_mesh(io::stdout().lock(), &cli, &result, &summary, &balls)?;
        info!(
            "{} vertices, {} triangles, volume {:.3}, area {:.3}",
            summary.num_vertices, summary.num_triangles, summary.info.volume, summary.area
        );
    }

    Ok(())
}
