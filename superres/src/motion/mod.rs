//! Integer-offset motion estimation against a reference frame.
//!
//! The estimator walks candidate offsets in a square spiral around `(0, 0)`,
//! scoring each one by the mean squared color distance between sampled reference
//! pixels and the candidate pixels they map to. Small motions are explored first,
//! so the walk stops once it has circled the best offset for a while without
//! finding anything better.

mod spiral;


pub use spiral::Spiral;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cancel::CancelToken;
use crate::color::distance;
use crate::error::Error;
use crate::frame::Frame;
use crate::pixel_cache::PixelCache;
use crate::sampler::{Sampler, SamplerKind};

/// Estimated offset of a frame relative to the reference.
///
/// `diff` is the mean squared color distance at the chosen offset. The serialized
/// form uses the `X`/`Y`/`Diff` keys of the motion cache file; `Diff` is optional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Motion {
    #[serde(rename = "X")]
    pub dx: i32,
    #[serde(rename = "Y")]
    pub dy: i32,
    #[serde(rename = "Diff", default)]
    pub diff: f64,
}

impl Motion {
    /// Motion of the reference frame.
    pub const ZERO: Motion = Motion {
        dx: 0,
        dy: 0,
        diff: 0.0,
    };

    pub const fn new(dx: i32, dy: i32, diff: f64) -> Self {
        Self { dx, dy, diff }
    }
}

/// Settings consumed by [`MotionEstimator`].
#[derive(Debug, Clone)]
pub struct MotionConfig {
    /// Sampling strategy over the reference frame.
    pub sampler: SamplerKind,
    /// Target sample points per pass.
    pub sample_count: usize,
    /// Side of the search window as a fraction of the larger frame dimension.
    pub max_motion_fraction: f64,
    /// Direction changes without improvement before the spiral gives up.
    pub max_turns_without_improvement: usize,
    /// Seed for the random samplers (None for random).
    pub seed: Option<u64>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            sampler: SamplerKind::default(),
            sample_count: 2048,
            max_motion_fraction: 0.04,
            max_turns_without_improvement: 32,
            seed: None,
        }
    }
}

impl MotionConfig {
    /// Returns [`Error::InvalidConfig`] for the first violated constraint.
    pub fn validate(&self) -> Result<(), Error> {
        if self.sample_count == 0 {
            return Err(Error::InvalidConfig(
                "sample_count must be positive".into(),
            ));
        }
        if !(self.max_motion_fraction > 0.0 && self.max_motion_fraction < 0.5) {
            return Err(Error::InvalidConfig(format!(
                "max_motion_fraction must be in (0, 0.5), got {}",
                self.max_motion_fraction
            )));
        }
        if self.max_turns_without_improvement == 0 {
            return Err(Error::InvalidConfig(
                "max_turns_without_improvement must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Search radius in pixels for a reference of the given size.
    pub fn search_radius(&self, width: u32, height: u32) -> u32 {
        let max_offset = (self.max_motion_fraction * width.max(height) as f64).round() as u32;
        max_offset / 2
    }
}

/// An offset at which no sample point lands inside the candidate frame.
///
/// Such offsets carry no score and are never compared against the best one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No sample overlaps the candidate at offset ({dx}, {dy})")]
pub struct InvalidCandidateOffset {
    pub dx: i32,
    pub dy: i32,
}

/// Result of one estimation plus search diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionEstimate {
    pub motion: Motion,
    /// The best offset touches the search radius; the true motion may lie outside.
    pub hit_search_limit: bool,
    /// Offsets that produced a score.
    pub offsets_evaluated: usize,
    /// At least one offset produced a score. When `false` the reference had no
    /// usable sample (a featureless frame under the edge sampler, for instance)
    /// and `motion` is [`Motion::ZERO`].
    pub scored: bool,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

/// Spiral-search motion estimator.
#[derive(Debug, Clone, Default)]
pub struct MotionEstimator {
    config: MotionConfig,
    cancel: Option<CancelToken>,
}

impl MotionEstimator {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Checks `token` between offsets and aborts with [`Error::Cancelled`].
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[inline]
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Finds the offset `(dx, dy)` for which `candidate(x + dx, y + dy)` best
    /// matches `reference(x, y)`.
    pub fn estimate<R, C>(&self, reference: &R, candidate: &C) -> Result<MotionEstimate, Error>
    where
        R: Frame + ?Sized,
        C: Frame + ?Sized,
    {
        let (width, height) = reference.bounds();
        let radius = self.config.search_radius(width, height);

        let mut sampler = self
            .config
            .sampler
            .build(reference, self.config.sample_count, self.config.seed);
        let mut reference = PixelCache::new(reference);
        let mut spiral = Spiral::new(radius);

        let mut best: Option<Motion> = None;
        let mut improved_at_turn = 0;
        let mut offsets_evaluated = 0;

        while let Some((dx, dy)) = spiral.next() {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Err(Error::Cancelled);
            }

            match score_offset(&mut *sampler, &mut reference, candidate, dx, dy) {
                Ok(score) => {
                    offsets_evaluated += 1;
                    if best.map_or(true, |b| score < b.diff) {
                        best = Some(Motion::new(dx, dy, score));
                        improved_at_turn = spiral.turns();
                    }
                }
                Err(err) => tracing::trace!("{err}"),
            }

            if spiral.turns() - improved_at_turn > self.config.max_turns_without_improvement {
                tracing::trace!(
                    "Spiral search converged after {} offsets",
                    offsets_evaluated
                );
                break;
            }
        }

        let scored = best.is_some();
        let motion = best.unwrap_or_else(|| {
            tracing::warn!(
                "No sample of the {}x{} reference overlaps the candidate at any offset, assuming no motion",
                width,
                height
            );
            Motion::ZERO
        });

        let limit = radius as i32;
        let hit_search_limit = radius > 0 && (motion.dx.abs() == limit || motion.dy.abs() == limit);
        if hit_search_limit {
            tracing::warn!(
                "Hit motion search limit: best offset ({}, {}) at radius {}, consider raising max_motion_fraction (currently {})",
                motion.dx,
                motion.dy,
                radius,
                self.config.max_motion_fraction
            );
        }

        tracing::debug!(
            "Motion ({}, {}) diff {:.6} after {} offsets, pixel cache {} hits / {} misses",
            motion.dx,
            motion.dy,
            motion.diff,
            offsets_evaluated,
            reference.hits(),
            reference.misses()
        );

        Ok(MotionEstimate {
            motion,
            hit_search_limit,
            offsets_evaluated,
            scored,
            cache_hits: reference.hits(),
            cache_misses: reference.misses(),
        })
    }
}

/// Mean squared color distance over the samples that stay inside `candidate`
/// after shifting by `(dx, dy)`.
fn score_offset<R, C>(
    sampler: &mut dyn Sampler,
    reference: &mut PixelCache<'_, R>,
    candidate: &C,
    dx: i32,
    dy: i32,
) -> Result<f64, InvalidCandidateOffset>
where
    R: Frame + ?Sized,
    C: Frame + ?Sized,
{
    let mut sum = 0.0f64;
    let mut compared = 0usize;

    sampler.reset();
    while sampler.has_more() {
        let p = sampler.next();
        let shifted = p.offset(dx, dy);
        if !candidate.contains(shifted) {
            continue;
        }

        let d = distance(reference.at(p.x, p.y), candidate.color_at(shifted)) as f64;
        sum += d * d;
        compared += 1;
    }

    if compared == 0 {
        return Err(InvalidCandidateOffset { dx, dy });
    }
    Ok(sum / compared as f64)
}

/// Estimates the motion of `candidate` relative to `reference` with `config`.
pub fn estimate_motion<R, C>(
    reference: &R,
    candidate: &C,
    config: &MotionConfig,
) -> Result<Motion, Error>
where
    R: Frame + ?Sized,
    C: Frame + ?Sized,
{
    MotionEstimator::new(config.clone())
        .estimate(reference, candidate)
        .map(|estimate| estimate.motion)
}
