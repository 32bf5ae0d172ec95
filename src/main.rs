use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use tiled_ray_tracer::camera::Camera;
use tiled_ray_tracer::config::RenderConfig;
use tiled_ray_tracer::consts::OUT_FILE;
use tiled_ray_tracer::parallel::parallel_render;
use tiled_ray_tracer::scene::load_scene;
use tiled_ray_tracer::world::World;

/// Renders a scene description to an image, in parallel tiles.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Scene description, one shape per line.
    scene: PathBuf,

    /// JSON file overriding the default render configuration.
    #[clap(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output image; `.ppm` is written as plain PPM, other extensions are
    /// encoded by format.
    #[clap(short, long, value_name = "FILE", default_value = OUT_FILE)]
    output: PathBuf,

    #[clap(long)]
    width: Option<usize>,

    #[clap(long)]
    height: Option<usize>,

    /// Tiles per image axis.
    #[clap(long)]
    divisions: Option<usize>,

    /// Maximum number of traced rays per pixel.
    #[clap(long)]
    depth_max: Option<usize>,

    #[clap(long, value_name = "LEVEL", default_value = "info")]
    log_level: tracing::Level,
}

impl Args {
    /// Builds the render configuration: command line over config file over
    /// defaults.
    fn render_config(&self) -> anyhow::Result<RenderConfig> {
        let mut config = match self.config {
            Some(ref path) => RenderConfig::from_json_file(path)?,
            None => RenderConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(divisions) = self.divisions {
            config.divisions = divisions;
        }
        if let Some(depth_max) = self.depth_max {
            config.depth_max = depth_max;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    let config = args.render_config()?;
    let objects = load_scene(&args.scene)
        .with_context(|| format!("failed to load scene {:?}", args.scene))?;

    let camera = Camera::new(&config);
    let world = World::new(objects, config);

    let canvas = parallel_render(world, camera)?;
    canvas.save(&args.output)?;
    info!(path = %args.output.display(), "saved render");

    Ok(())
}
