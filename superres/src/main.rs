use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use rayon::prelude::*;

use superres::{MergeMethod, NamedFrame, OutlierPolicy, SamplerKind, StackConfig, Stacker};

/// Sigma of the unsharp mask applied with `--sharpen`.
const SHARPEN_SIGMA: f32 = 0.5;

#[derive(Parser, Debug)]
#[clap(name = "superres")]
#[clap(about = "Align a burst of photographs and merge it into one lower-noise image")]
struct Args {
    /// Input images or directories of images. The first image is the reference.
    #[clap(required = true, value_name = "INPUT")]
    inputs: Vec<PathBuf>,

    /// Output image file
    #[clap(short, long, default_value = "output.png", value_name = "FILE")]
    output: PathBuf,

    /// Worker threads (defaults to the available hardware parallelism)
    #[clap(long)]
    parallelism: Option<usize>,

    /// Sampling strategy for motion estimation (uniform, gauss, edge, combined)
    #[clap(long, default_value_t = SamplerKind::Combined)]
    sampler: SamplerKind,

    /// Per-pixel merge reducer (average, median)
    #[clap(long, default_value_t = MergeMethod::Median)]
    merge_method: MergeMethod,

    /// Sample points per motion estimation pass
    #[clap(long, default_value_t = 2048)]
    sample_count: usize,

    /// Motion search window as a fraction of the larger image dimension
    #[clap(long, default_value_t = 0.04)]
    max_motion_fraction: f64,

    /// Spiral turns without improvement before the search stops
    #[clap(long, default_value_t = 32)]
    max_turns_without_improvement: usize,

    /// JSON file caching motions between runs
    #[clap(long, value_name = "FILE")]
    motion_cache: Option<PathBuf>,

    /// What to do with badly aligned frames (warn, exclude)
    #[clap(long, default_value_t = OutlierPolicy::Warn)]
    outliers: OutlierPolicy,

    /// Seed for the random samplers
    #[clap(long)]
    seed: Option<u64>,

    /// Upscale frames 2x before alignment and downscale the result afterwards
    #[clap(long)]
    supersample: bool,

    /// Sharpen the merged image
    #[clap(long)]
    sharpen: bool,

    /// Base log level (overridden by RUST_LOG)
    #[clap(long, default_value = "info")]
    log_level: String,

    /// Also write daily-rotated log files to this directory
    #[clap(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    common::log_setup::setup_logging(&args.log_level, args.log_dir.as_deref());

    let paths = expand_inputs(&args.inputs)?;
    if paths.is_empty() {
        bail!("No input images found");
    }

    let mut frames = load_frames(&paths)?;
    if args.supersample {
        frames = upscale(frames);
    }

    let config = StackConfig {
        parallelism: args
            .parallelism
            .unwrap_or_else(common::default_parallelism),
        sampler: args.sampler,
        merge_method: args.merge_method,
        sample_count: args.sample_count,
        max_motion_fraction: args.max_motion_fraction,
        max_turns_without_improvement: args.max_turns_without_improvement,
        motion_cache_path: args.motion_cache.clone(),
        outlier_policy: args.outliers,
        seed: args.seed,
    };

    let stacker = Stacker::new(config)?;
    let result = stacker.stack(&frames)?;

    if !result.alignment.search_limit_hits.is_empty() {
        tracing::warn!(
            "{} frame(s) hit the motion search limit, consider a larger --max-motion-fraction",
            result.alignment.search_limit_hits.len()
        );
    }

    let mut output = result.image.to_rgba_image();
    if args.sharpen {
        output = imageops::unsharpen(&output, SHARPEN_SIGMA, 0);
    }
    if args.supersample {
        let (width, height) = output.dimensions();
        output = imageops::resize(&output, width / 2, height / 2, FilterType::CatmullRom);
    }

    output
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    tracing::info!("Wrote {}", args.output.display());
    Ok(())
}

/// Replaces every directory by the image files it contains (sorted).
fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let files = common::file_utils::image_files(input)
                .with_context(|| format!("Failed to list {}", input.display()))?;
            tracing::debug!("{}: {} images", input.display(), files.len());
            paths.extend(files);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn load_frames(paths: &[PathBuf]) -> Result<Vec<NamedFrame<RgbaImage>>> {
    paths
        .par_iter()
        .map(|path| -> Result<NamedFrame<RgbaImage>> {
            let frame = load_frame(path)?;
            Ok(NamedFrame::new(path.to_string_lossy(), frame))
        })
        .collect()
}

fn load_frame(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path).with_context(|| format!("Failed to load {}", path.display()))?;
    tracing::debug!("Loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img.to_rgba8())
}

/// Resizes every frame to twice the reference size.
fn upscale(frames: Vec<NamedFrame<RgbaImage>>) -> Vec<NamedFrame<RgbaImage>> {
    let Some(reference) = frames.first() else {
        return frames;
    };
    let (width, height) = reference.frame.dimensions();
    let (width, height) = (width * 2, height * 2);
    tracing::info!("Supersampling {} frames to {}x{}", frames.len(), width, height);

    frames
        .into_par_iter()
        .map(|named| NamedFrame {
            frame: imageops::resize(&named.frame, width, height, FilterType::Gaussian),
            name: named.name,
        })
        .collect()
}
