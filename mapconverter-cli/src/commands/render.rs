//! Render command - produce one map image without starting the server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use mapconverter::pipeline::{DEFAULT_HEIGHT, DEFAULT_WIDTH, DEFAULT_ZOOM};
use mapconverter::provider::MapType;
use mapconverter::reduce::{DitherType, OutputMode};
use mapconverter::telemetry::PipelineMetrics;
use mapconverter::{HttpMapPipeline, RequestGeometry};
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the render command.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Zoom level (0-18)
    #[arg(long, default_value_t = DEFAULT_ZOOM as i64)]
    pub zoom: i64,

    /// Output width in pixels (50-800)
    #[arg(long, default_value_t = DEFAULT_WIDTH as i64)]
    pub width: i64,

    /// Output height in pixels (50-600)
    #[arg(long, default_value_t = DEFAULT_HEIGHT as i64)]
    pub height: i64,

    /// Counter-clockwise rotation in degrees (-360 to 360)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub rotation: f64,

    /// Map type id (1-10)
    #[arg(long, default_value_t = 1)]
    pub map_type: i64,

    /// Dither type: 1 threshold, 2 Floyd-Steinberg, 3 ordered, 4 Atkinson
    #[arg(long, default_value_t = 2)]
    pub dither: i64,

    /// Image type: 1 color, 2 grayscale, 3 4-level grayscale, 4 dithered
    #[arg(long, default_value_t = 1)]
    pub itype: i64,

    /// Draw tile borders and a cross at the requested point
    #[arg(long)]
    pub debug: bool,

    /// Write the bit-packed JSON document instead of a PNG
    #[arg(long)]
    pub json: bool,

    /// Output file path
    #[arg(long, short)]
    pub output: PathBuf,
}

impl RenderArgs {
    fn geometry(&self) -> Result<RequestGeometry, CliError> {
        Ok(RequestGeometry::new(self.lat, self.lon)?
            .with_zoom(self.zoom)
            .with_size(self.width, self.height)
            .with_rotation(self.rotation)?
            .with_map_type(MapType::from_id(self.map_type))
            .with_dither_type(DitherType::from_id(self.dither))
            .with_output_mode(OutputMode::from_id(self.itype))
            .with_debug(self.debug))
    }
}

/// Run the render command.
pub fn run(runner: &CliRunner, args: RenderArgs) -> Result<(), CliError> {
    let geometry = args.geometry()?;
    let runtime = runner.runtime()?;

    println!("Rendering map for:");
    println!("  Location: {}, {}", geometry.point.latitude, geometry.point.longitude);
    println!("  Zoom: {}  Rotation: {}°", geometry.zoom, geometry.rotation_degrees);
    println!("  Size: {}x{}  Map: {}", geometry.width, geometry.height, geometry.map_type);
    println!();

    let metrics = Arc::new(PipelineMetrics::new());
    let pipeline = HttpMapPipeline::from_config(runner.config(), Arc::clone(&metrics))?;

    let bytes = if args.json {
        let document = runtime.block_on(pipeline.produce_json(&geometry))?;
        serde_json::to_vec_pretty(&document).map_err(CliError::Json)?
    } else {
        runtime.block_on(pipeline.produce_png(&geometry))?
    };

    std::fs::write(&args.output, &bytes).map_err(|e| CliError::FileWrite {
        path: args.output.display().to_string(),
        error: e,
    })?;

    let snapshot = metrics.snapshot();
    info!(
        path = %args.output.display(),
        bytes = bytes.len(),
        tiles_downloaded = snapshot.tiles_downloaded,
        placeholders = snapshot.placeholder_tiles,
        "Render written"
    );
    println!("Saved {} ({} bytes)", args.output.display(), bytes.len());
    if snapshot.placeholder_tiles > 0 {
        println!(
            "Note: {} tile(s) could not be downloaded and were drawn as placeholders",
            snapshot.placeholder_tiles
        );
    }
    println!();
    println!("{}", snapshot);
    Ok(())
}
