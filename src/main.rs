use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use fractal_terrain::export;
use fractal_terrain::{FractalMode, TerrainConfig, TerrainFile, TerrainGenerator};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Julia,
    Mandelbrot,
}

impl From<ModeArg> for FractalMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Julia => FractalMode::Julia,
            ModeArg::Mandelbrot => FractalMode::Mandelbrot,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "fractal_terrain")]
#[command(about = "Generate terrain meshes from Perlin noise and Mandelbrot/Julia fractal masks")]
struct Args {
    /// JSON terrain file (config plus optional response curves)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grid cells along X
    #[arg(short = 'x', long)]
    x_size: Option<i32>,

    /// Grid cells along Z
    #[arg(short = 'z', long)]
    z_size: Option<i32>,

    /// Noise scale (values <= 0 are clamped)
    #[arg(long)]
    scale: Option<f32>,

    /// Number of noise octaves
    #[arg(short, long)]
    octaves: Option<u32>,

    /// Frequency multiplier per octave
    #[arg(long)]
    lacunarity: Option<f32>,

    /// Height the fractal mask pulls terrain towards
    #[arg(long)]
    base_height: Option<f32>,

    /// Water plane height
    #[arg(long)]
    water_height: Option<f32>,

    /// Fractal mask type
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Number of island centres
    #[arg(long)]
    islands: Option<u32>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Export the heightmap as a 16-bit PNG
    #[arg(long)]
    png: Option<PathBuf>,

    /// Export the mesh as Wavefront OBJ
    #[arg(long)]
    obj: Option<PathBuf>,

    /// Export the random layout and config as JSON
    #[arg(long)]
    layout_json: Option<PathBuf>,

    /// Export raw vertex and index buffers with this path prefix (.verts.bin / .indices.bin)
    #[arg(long)]
    raw: Option<PathBuf>,
}

impl Args {
    /// Command-line flags take precedence over the terrain file.
    fn apply_overrides(&self, config: &mut TerrainConfig) {
        if let Some(v) = self.x_size {
            config.x_size = v;
        }
        if let Some(v) = self.z_size {
            config.z_size = v;
        }
        if let Some(v) = self.scale {
            config.scale = v;
        }
        if let Some(v) = self.octaves {
            config.octaves = v;
        }
        if let Some(v) = self.lacunarity {
            config.lacunarity = v;
        }
        if let Some(v) = self.base_height {
            config.base_height = v;
        }
        if let Some(v) = self.water_height {
            config.water_height = v;
        }
        if let Some(v) = self.mode {
            config.mode = v.into();
        }
        if let Some(v) = self.islands {
            config.island_count = v;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let file = match &args.config {
        Some(path) => TerrainFile::load(path)?,
        None => TerrainFile::default(),
    };

    let mut config = file.terrain.clone();
    args.apply_overrides(&mut config);

    let seed = args.seed.unwrap_or_else(|| rand::random());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    println!("Generating terrain with seed: {}", seed);
    println!("Grid size: {}x{} cells, {} mask", config.x_size, config.z_size, config.mode);
    if config.is_degenerate() {
        println!("Negative grid size: the terrain will be empty");
    }

    let generator =
        TerrainGenerator::new(config.clone(), file.height_curve(), file.influence_curve());

    println!("Generating heightfield...");
    let output = generator.generate(&mut rng);
    let layout = &output.layout;
    println!(
        "Layout: rotation {}°, reflect x={} z={}, zoom {:.3}, noise seed {}",
        layout.rotation_degrees,
        layout.reflect_x,
        layout.reflect_z,
        layout.mandelbrot_zoom,
        layout.noise_seed
    );
    for (i, c) in layout.julia_constants.iter().enumerate() {
        println!("  Julia constant {}: {:.4} {:+.4}i", i + 1, c.re, c.im);
    }
    for (i, (x, z)) in layout.island_centers.iter().enumerate() {
        println!("  Island {}: ({:.1}, {:.1})", i + 1, x, z);
    }

    match output.heightfield.height_range() {
        Some((min_h, max_h)) => println!(
            "Heightfield: {} vertices, range {:.2} to {:.2}",
            output.heightfield.len(),
            min_h,
            max_h
        ),
        None => println!("Heightfield: empty"),
    }
    println!("Triangles: {}", output.triangles.len() / 3);
    let water = &output.water_plane;
    println!(
        "Water plane at ({:.1}, {:.1}, {:.1}), extent {:.1} x {:.1}",
        water.center[0],
        water.center[1],
        water.center[2],
        water.extent[0],
        water.extent[2]
    );

    if let Some(path) = &args.png {
        println!("Exporting heightmap to {}...", path.display());
        export::export_heightmap_png(&output.heightfield, path)?;
    }
    if let Some(path) = &args.obj {
        println!("Exporting mesh to {}...", path.display());
        export::export_obj(&output.mesh(), path)?;
    }
    if let Some(path) = &args.layout_json {
        println!("Exporting layout to {}...", path.display());
        export::export_layout_json(&config, &output, path)?;
    }
    if let Some(prefix) = &args.raw {
        let vertex_path = prefix.with_extension("verts.bin");
        let index_path = prefix.with_extension("indices.bin");
        println!(
            "Exporting raw buffers to {} and {}...",
            vertex_path.display(),
            index_path.display()
        );
        export::export_raw_buffers(&output.mesh(), &vertex_path, &index_path)?;
    }

    println!("Done.");
    Ok(())
}
