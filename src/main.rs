// Command-line front end: optimizes files as if they had just been uploaded
// and prints one JSON result per file on stdout.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use upload_image_optimizer::utils::validate_options;
use upload_image_optimizer::{
    optimize_uploads, BatchSummary, ImageOptimizer, Imaging, LocalUpload, OptimizeMode,
    OptimizeOptions, OptimizerSettings,
};

#[derive(Parser, Debug)]
#[command(name = "upload-image-optimizer", version, about = "Optimize uploaded images for storage")]
struct Cli {
    /// JSON settings file (defaults to $IMAGE_OPTIMIZER_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the always-JPEG raster pipeline
    #[arg(long)]
    raster: bool,

    /// Use the libvips backend for the standard pipeline
    #[cfg(feature = "vips")]
    #[arg(long)]
    vips: bool,

    /// Override the configured maximum width
    #[arg(long)]
    max_width: Option<u32>,

    /// Override the configured quality (0-100)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: Option<u8>,

    /// Client-declared file name, when FILES is a single spooled upload
    #[arg(long)]
    name: Option<String>,

    /// Uploaded files to optimize
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_file(false)         // Remove file path
        .with_line_number(false)  // Remove line numbers
        .with_thread_ids(false)   // Remove thread IDs
        .with_thread_names(false) // Remove thread names
        .with_target(false)       // Remove module path
        .with_writer(std::io::stderr) // stdout carries the JSON results
        .compact();

    subscriber.init();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => OptimizerSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => OptimizerSettings::from_env().context("loading settings from environment")?,
    };

    let options = OptimizeOptions {
        max_width: cli.max_width,
        quality: cli.quality,
    };
    validate_options(&options)?;

    if cli.name.is_some() && cli.files.len() != 1 {
        bail!("--name only applies to a single file");
    }

    let uploads = cli
        .files
        .iter()
        .map(|path| match &cli.name {
            Some(name) => LocalUpload::with_client_name(path, name.clone()),
            None => LocalUpload::from_path(path),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mode = if cli.raster { OptimizeMode::Raster } else { OptimizeMode::Standard };

    #[cfg(feature = "vips")]
    if cli.vips {
        let backend = upload_image_optimizer::VipsImaging::new()?;
        return run(ImageOptimizer::with_backend(settings, backend), uploads, mode, options);
    }

    run(ImageOptimizer::new(settings), uploads, mode, options)
}

fn run<B: Imaging + 'static>(
    optimizer: ImageOptimizer<B>,
    uploads: Vec<LocalUpload>,
    mode: OptimizeMode,
    options: OptimizeOptions,
) -> Result<()> {
    info!("=== Optimizing {} file(s) ===", uploads.len());
    debug!("Settings: {:?}", optimizer.settings());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")?;

    let results = runtime.block_on(optimize_uploads(Arc::new(optimizer), uploads, mode, options));

    let summary = BatchSummary::from_results(&results);
    info!(
        "Done: {} optimized, {} passed through, {} fell back ({} bytes saved)",
        summary.optimized, summary.passed_through, summary.fallbacks, summary.saved_bytes()
    );

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
