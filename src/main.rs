use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use silhouette3d::config::{ContourMode, PipelineConfig, StlFormat, ThresholdConfig, load_config};
use silhouette3d::float_types::Real;
use silhouette3d::pipeline::{ConversionReport, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "silhouette3d")]
#[command(about = "Extrude image silhouettes into STL solids")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Threshold, trace and extrude a PNG/JPEG/BMP image
    #[command(name = "image")]
    Image(ImageArgs),
    /// Sample and extrude the paths of an SVG document
    #[command(name = "svg")]
    Svg(CommonArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    input: PathBuf,
    /// Output STL; defaults to output.stl next to the input
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// JSON configuration, overridden by the flags below
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    height: Option<Real>,
    /// Points sampled per SVG segment
    #[arg(long)]
    samples: Option<usize>,
    /// Douglas-Peucker tolerance, 0 keeps every corner
    #[arg(long)]
    simplify: Option<Real>,
    /// Write ASCII instead of binary STL
    #[arg(long, default_value_t = false)]
    ascii: bool,
}

#[derive(Args, Debug, Clone)]
struct ImageArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long)]
    window_size: Option<u32>,
    #[arg(long)]
    bias: Option<Real>,
    /// Fixed global threshold level instead of the adaptive mean
    #[arg(long, conflicts_with_all = ["window_size", "bias"])]
    threshold: Option<u8>,
    /// Ignore holes inside the silhouette
    #[arg(long, default_value_t = false)]
    external_only: bool,
    /// Also save the traced outlines as SVG
    #[arg(long)]
    svg: Option<PathBuf>,
    /// Save the binary mask as PNG
    #[arg(long)]
    debug_mask: Option<PathBuf>,
}

fn base_config(common: &CommonArgs) -> Result<PipelineConfig> {
    let mut config = match &common.config {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(height) = common.height {
        config.extrusion_height = height;
    }
    if let Some(samples) = common.samples {
        config.sample_density = samples;
    }
    if let Some(epsilon) = common.simplify {
        config.simplification_epsilon = epsilon;
    }
    if common.ascii {
        config.stl_format = StlFormat::Ascii;
    }
    Ok(config)
}

fn image_config(args: &ImageArgs) -> Result<PipelineConfig> {
    let mut config = base_config(&args.common)?;
    if let Some(level) = args.threshold {
        config.threshold = ThresholdConfig::Global { level };
    } else if args.window_size.is_some() || args.bias.is_some() {
        let (window, bias) = match config.threshold {
            ThresholdConfig::AdaptiveMean { window_size, bias } => (window_size, bias),
            ThresholdConfig::Global { .. } => (silhouette3d::config::DEFAULT_WINDOW_SIZE, 0.0),
        };
        config.threshold = ThresholdConfig::AdaptiveMean {
            window_size: args.window_size.unwrap_or(window),
            bias: args.bias.unwrap_or(bias),
        };
    }
    if args.external_only {
        config.contour_mode = ContourMode::External;
    }
    if args.svg.is_some() {
        config.vector_output = args.svg.clone();
    }
    if args.debug_mask.is_some() {
        config.debug_mask = args.debug_mask.clone();
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<ConversionReport> {
    match cli.cmd {
        Command::Image(args) => {
            let pipeline = Pipeline::new(image_config(&args)?)?;
            let input = &args.common.input;
            pipeline
                .convert(input, args.common.output.as_deref())
                .with_context(|| format!("converting image {}", input.display()))
        },
        Command::Svg(args) => {
            let pipeline = Pipeline::new(base_config(&args)?)?;
            let input: &Path = &args.input;
            pipeline
                .convert_document(input, args.output.as_deref())
                .with_context(|| format!("converting SVG {}", input.display()))
        },
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let report = run(Cli::parse())?;
    println!(
        "{} polygon(s), {} vertices, {} triangles -> {}",
        report.polygons,
        report.vertices,
        report.triangles,
        report.output.display()
    );
    if let Some(svg) = report.vector_output {
        println!("outlines -> {}", svg.display());
    }
    Ok(())
}
