//! Pixel-coordinate generators that approximate a full-frame comparison.
//!
//! Every sampler follows the same pull protocol: call [`Sampler::has_more`]
//! before each [`Sampler::next`], and [`Sampler::reset`] to start another pass.
//! The motion estimator runs one pass per candidate offset, so expensive
//! samplers are wrapped in a [`SamplerCache`].

mod cache;
mod combined;
mod edge;
mod gauss;
mod uniform;


pub use cache::SamplerCache;
pub use combined::CombinedSampler;
pub use edge::EdgeSampler;
pub use gauss::GaussSampler;
pub use uniform::UniformSampler;

use strum_macros::{Display, EnumString};

use crate::frame::{Frame, Point};

/// Pull-based source of sample coordinates.
pub trait Sampler {
    /// Whether [`Sampler::next`] may be called.
    fn has_more(&mut self) -> bool;

    /// Next coordinate. Only valid while [`Sampler::has_more`] returns `true`.
    fn next(&mut self) -> Point;

    /// Rewinds for an independent pass.
    fn reset(&mut self);
}

impl<S: Sampler + ?Sized> Sampler for Box<S> {
    #[inline]
    fn has_more(&mut self) -> bool {
        (**self).has_more()
    }

    #[inline]
    fn next(&mut self) -> Point {
        (**self).next()
    }

    #[inline]
    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Sampling strategy selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SamplerKind {
    /// Regular grid of cell centers.
    Uniform,
    /// Normally distributed around the frame center.
    Gauss,
    /// Thinned edge pixels above an adaptive threshold.
    Edge,
    /// Half Gauss, half edge.
    #[default]
    Combined,
}

impl SamplerKind {
    /// Builds a sampler over `frame` targeting roughly `samples` points per pass.
    ///
    /// Every variant except `Uniform` is wrapped in a [`SamplerCache`], so all
    /// passes after the first visit the same points.
    pub fn build<F: Frame + ?Sized>(
        self,
        frame: &F,
        samples: usize,
        seed: Option<u64>,
    ) -> Box<dyn Sampler> {
        let (width, height) = frame.bounds();

        match self {
            SamplerKind::Uniform => Box::new(UniformSampler::new(width, height, samples)),
            SamplerKind::Gauss => Box::new(SamplerCache::new(GaussSampler::new(
                width, height, samples, seed,
            ))),
            SamplerKind::Edge => Box::new(SamplerCache::new(EdgeSampler::new(frame, samples))),
            SamplerKind::Combined => {
                let per_sampler = samples.div_ceil(2);
                let children: Vec<Box<dyn Sampler>> = vec![
                    Box::new(GaussSampler::new(width, height, per_sampler, seed)),
                    Box::new(EdgeSampler::new(frame, per_sampler)),
                ];
                Box::new(SamplerCache::new(CombinedSampler::new(
                    children,
                    per_sampler,
                )))
            }
        }
    }
}
