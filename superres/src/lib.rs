//! Superres - burst alignment and merging.
//!
//! Aligns a burst of photographs of the same scene to its first frame with an
//! integer-offset spiral search, then merges the motion-corrected frames pixel
//! by pixel into a single lower-noise image.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use superres::prelude::*;
//!
//! let frames: Vec<NamedFrame<image::RgbaImage>> = paths
//!     .iter()
//!     .map(|p| Ok(NamedFrame::new(p, image::open(p)?.to_rgba8())))
//!     .collect::<anyhow::Result<_>>()?;
//!
//! let stacker = Stacker::new(StackConfig::default())?;
//! let result = stacker.stack(&frames)?;
//! result.image.to_rgba_image().save("merged.png")?;
//! ```

mod cancel;
mod color;
mod error;
mod frame;
mod merge;
mod motion;
mod motion_cache;
mod outliers;
mod pipeline;
mod pixel_cache;
mod sampler;

#[cfg(test)]
pub(crate) mod testing;

pub mod prelude;

// ============================================================================
// Errors
// ============================================================================

pub use color::ColorError;
pub use error::Error;

// ============================================================================
// Color model
// ============================================================================

pub use color::{
    distance, merge_average, merge_median, try_distance, Color, MergeMethod,
};

// ============================================================================
// Frames
// ============================================================================

pub use frame::{Frame, MergedImage, NamedFrame, Point};

// ============================================================================
// Sampling
// ============================================================================

pub use sampler::{
    CombinedSampler, EdgeSampler, GaussSampler, Sampler, SamplerCache, SamplerKind,
    UniformSampler,
};
pub use pixel_cache::PixelCache;

// ============================================================================
// Motion estimation
// ============================================================================

pub use cancel::CancelToken;
pub use motion::{
    estimate_motion, InvalidCandidateOffset, Motion, MotionConfig, MotionEstimate,
    MotionEstimator, Spiral,
};
pub use motion_cache::MotionCache;
pub use outliers::find_outliers;

// ============================================================================
// Merging and orchestration
// ============================================================================

pub use merge::merge_frames;
pub use pipeline::{Alignment, OutlierPolicy, StackConfig, StackResult, Stacker};
