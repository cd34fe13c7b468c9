//! Configuration of a stacking run.

use std::path::PathBuf;

use strum_macros::{Display, EnumString};

use crate::color::MergeMethod;
use crate::error::Error;
use crate::motion::MotionConfig;
use crate::sampler::SamplerKind;

/// What to do with frames whose alignment looks unreliable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutlierPolicy {
    /// Log a warning and merge the frame anyway.
    #[default]
    Warn,
    /// Leave the frame out of the merge.
    Exclude,
}

/// Immutable settings of a [`Stacker`](crate::Stacker).
#[derive(Debug, Clone)]
pub struct StackConfig {
    /// Worker threads for alignment and merging.
    pub parallelism: usize,
    pub sampler: SamplerKind,
    pub merge_method: MergeMethod,
    /// Target sample points per estimation pass.
    pub sample_count: usize,
    /// Side of the motion search window as a fraction of the larger frame
    /// dimension, in (0, 0.5).
    pub max_motion_fraction: f64,
    /// Direction changes without improvement before the spiral search stops.
    pub max_turns_without_improvement: usize,
    /// JSON file of motions from earlier runs. `None` disables caching.
    pub motion_cache_path: Option<PathBuf>,
    pub outlier_policy: OutlierPolicy,
    /// Seed for the random samplers (None for random).
    pub seed: Option<u64>,
}

impl Default for StackConfig {
    fn default() -> Self {
        let motion = MotionConfig::default();
        Self {
            parallelism: common::default_parallelism(),
            sampler: motion.sampler,
            merge_method: MergeMethod::default(),
            sample_count: motion.sample_count,
            max_motion_fraction: motion.max_motion_fraction,
            max_turns_without_improvement: motion.max_turns_without_improvement,
            motion_cache_path: None,
            outlier_policy: OutlierPolicy::default(),
            seed: motion.seed,
        }
    }
}

impl StackConfig {
    /// Returns [`Error::InvalidConfig`] for the first violated constraint.
    pub fn validate(&self) -> Result<(), Error> {
        if self.parallelism == 0 {
            return Err(Error::InvalidConfig("parallelism must be positive".into()));
        }
        self.motion_config().validate()
    }

    /// The subset consumed by the motion estimator.
    pub fn motion_config(&self) -> MotionConfig {
        MotionConfig {
            sampler: self.sampler,
            sample_count: self.sample_count,
            max_motion_fraction: self.max_motion_fraction,
            max_turns_without_improvement: self.max_turns_without_improvement,
            seed: self.seed,
        }
    }
}
