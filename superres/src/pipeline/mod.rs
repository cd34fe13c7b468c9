//! Alignment and merge orchestration.
//!
//! Alignment fans the per-frame motion estimations out over a bounded worker
//! pool. Each job first consults the motion cache and only runs the estimator on
//! a miss. All jobs are joined before the cache is flushed (once, atomically) and
//! before the merge starts, since the merge needs every motion.

mod config;


pub use config::{OutlierPolicy, StackConfig};

use std::time::Instant;

use common::WorkerPool;
use parking_lot::Mutex;

use crate::cancel::CancelToken;
use crate::error::Error;
use crate::frame::{Frame, MergedImage, NamedFrame};
use crate::merge::merge_frames;
use crate::motion::{Motion, MotionEstimator};
use crate::motion_cache::MotionCache;
use crate::outliers::find_outliers;

/// Outcome of the alignment phase, indexed like the input frames.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Alignment {
    /// One motion per frame; `motions[0]` is always [`Motion::ZERO`].
    pub motions: Vec<Motion>,
    /// Frames whose `diff` exceeds mean + 1 sigma of the non-reference frames.
    pub outliers: Vec<usize>,
    /// Frames whose best offset touched the search radius.
    pub search_limit_hits: Vec<usize>,
    /// Frames whose motion came from the motion cache.
    pub cached: Vec<usize>,
    /// Frames no offset could be scored for; their motion is assumed zero.
    pub unscored: Vec<usize>,
}

impl Alignment {
    /// Frames that take part in the merge under `policy`, in input order.
    pub fn merged_frames(&self, policy: OutlierPolicy) -> Vec<usize> {
        (0..self.motions.len())
            .filter(|i| policy == OutlierPolicy::Warn || !self.outliers.contains(i))
            .collect()
    }
}

/// Result of [`Stacker::stack`].
#[derive(Debug, Clone)]
pub struct StackResult {
    pub image: MergedImage,
    pub alignment: Alignment,
}

struct FrameMotion {
    motion: Motion,
    cached: bool,
    hit_search_limit: bool,
    scored: bool,
}

/// Aligns and merges bursts of frames with one configuration.
#[derive(Debug)]
pub struct Stacker {
    config: StackConfig,
    pool: WorkerPool,
    cancel: CancelToken,
}

impl Stacker {
    /// Validates `config` and starts the worker pool.
    pub fn new(config: StackConfig) -> Result<Self, Error> {
        config.validate()?;
        let pool = WorkerPool::new(config.parallelism)?;

        Ok(Self {
            config,
            pool,
            cancel: CancelToken::new(),
        })
    }

    #[inline]
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Token that aborts running and future operations of this stacker.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Estimates the motion of every frame relative to `frames[0]`.
    pub fn align<F>(&self, frames: &[NamedFrame<F>]) -> Result<Alignment, Error>
    where
        F: Frame + Sync,
    {
        let Some((reference, candidates)) = frames.split_first() else {
            return Err(Error::NoFrames);
        };
        self.check_cancelled()?;

        let start = Instant::now();
        tracing::info!(
            frame_count = frames.len(),
            reference = %reference.name,
            sampler = %self.config.sampler,
            sample_count = self.config.sample_count,
            threads = self.pool.threads(),
            "Starting alignment"
        );

        let cache = match &self.config.motion_cache_path {
            Some(path) => MotionCache::load(path)?,
            None => MotionCache::new(),
        };
        let cache = Mutex::new(cache);

        let estimator =
            MotionEstimator::new(self.config.motion_config()).with_cancel_token(self.cancel.clone());

        let results = self.pool.map(candidates, |named| -> Result<FrameMotion, Error> {
            self.check_cancelled()?;

            let cached = cache.lock().get(&named.name);
            if let Some(motion) = cached {
                tracing::info!(
                    "{}: cached motion ({}, {}) diff {:.6}",
                    named.name,
                    motion.dx,
                    motion.dy,
                    motion.diff
                );
                return Ok(FrameMotion {
                    motion,
                    cached: true,
                    hit_search_limit: false,
                    scored: true,
                });
            }

            let estimate = estimator
                .estimate(&reference.frame, &named.frame)
                .inspect_err(|err| {
                    tracing::error!("Motion estimation failed for {}: {err}", named.name)
                })?;
            cache.lock().insert(named.name.clone(), estimate.motion);

            if !estimate.scored {
                tracing::warn!("{}: no usable samples, assuming no motion", named.name);
            }
            tracing::info!(
                "{}: motion ({}, {}) diff {:.6}",
                named.name,
                estimate.motion.dx,
                estimate.motion.dy,
                estimate.motion.diff
            );
            Ok(FrameMotion {
                motion: estimate.motion,
                cached: false,
                hit_search_limit: estimate.hit_search_limit,
                scored: estimate.scored,
            })
        });

        let computed = results
            .iter()
            .filter(|r| r.as_ref().is_ok_and(|m| !m.cached))
            .count();
        if let Some(path) = &self.config.motion_cache_path {
            if computed > 0 {
                if let Err(err) = cache.into_inner().save(path) {
                    tracing::warn!("{err}, continuing without persisting motions");
                }
            }
        }

        let mut alignment = Alignment {
            motions: Vec::with_capacity(frames.len()),
            ..Default::default()
        };
        alignment.motions.push(Motion::ZERO);
        for (i, result) in results.into_iter().enumerate() {
            let frame_motion = result?;
            let index = i + 1;
            if frame_motion.cached {
                alignment.cached.push(index);
            }
            if frame_motion.hit_search_limit {
                alignment.search_limit_hits.push(index);
            }
            if !frame_motion.scored {
                alignment.unscored.push(index);
            }
            alignment.motions.push(frame_motion.motion);
        }

        alignment.outliers = find_outliers(&alignment.motions[1..])
            .into_iter()
            .map(|i| i + 1)
            .collect();
        for &i in &alignment.outliers {
            let action = match self.config.outlier_policy {
                OutlierPolicy::Warn => "keeping it",
                OutlierPolicy::Exclude => "excluding it from the merge",
            };
            tracing::warn!(
                "{} looks misaligned (diff {:.6} above mean + 1 sigma), {action}",
                frames[i].name,
                alignment.motions[i].diff
            );
        }

        tracing::info!(
            computed,
            cached = alignment.cached.len(),
            outliers = alignment.outliers.len(),
            elapsed = ?start.elapsed(),
            "Alignment finished"
        );
        Ok(alignment)
    }

    /// Merges `frames` using the motions in `alignment`.
    ///
    /// # Panics
    ///
    /// Panics if `alignment` does not hold one motion per frame.
    pub fn merge<F>(
        &self,
        frames: &[NamedFrame<F>],
        alignment: &Alignment,
    ) -> Result<MergedImage, Error>
    where
        F: Frame + Sync,
    {
        if frames.is_empty() {
            return Err(Error::NoFrames);
        }
        assert_eq!(
            frames.len(),
            alignment.motions.len(),
            "Alignment must hold one motion per frame"
        );
        self.check_cancelled()?;

        let selected = alignment.merged_frames(self.config.outlier_policy);
        let members: Vec<&F> = selected.iter().map(|&i| &frames[i].frame).collect();
        let motions: Vec<Motion> = selected.iter().map(|&i| alignment.motions[i]).collect();

        let start = Instant::now();
        let image = merge_frames(&self.pool, &members, &motions, self.config.merge_method);
        tracing::info!(
            frames = members.len(),
            method = %self.config.merge_method,
            elapsed = ?start.elapsed(),
            "Merge finished"
        );
        Ok(image)
    }

    /// [`Stacker::align`] followed by [`Stacker::merge`].
    pub fn stack<F>(&self, frames: &[NamedFrame<F>]) -> Result<StackResult, Error>
    where
        F: Frame + Sync,
    {
        let alignment = self.align(frames)?;
        let image = self.merge(frames, &alignment)?;
        Ok(StackResult { image, alignment })
    }

    fn check_cancelled(&self) -> Result<(), Error> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}
