use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::frame::Point;
use crate::sampler::Sampler;

/// Points drawn from a 2-D normal distribution centered on the image.
///
/// The standard deviation along each axis is one fifth of the half-dimension, so
/// almost every point lands in the central region where the subject usually is.
/// [`Sampler::reset`] only restores the remaining count; the random stream keeps
/// going, so each pass yields different points. Wrap in
/// [`SamplerCache`](crate::sampler::SamplerCache) for repeatable passes.
#[derive(Debug, Clone)]
pub struct GaussSampler {
    width: u32,
    height: u32,
    max_samples: usize,
    remaining: usize,
    rng: ChaCha8Rng,
}

impl GaussSampler {
    /// `seed = None` seeds from the OS.
    pub fn new(width: u32, height: u32, samples: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };

        let samples = if width == 0 || height == 0 { 0 } else { samples };

        Self {
            width,
            height,
            max_samples: samples,
            remaining: samples,
            rng,
        }
    }

    /// Two independent standard normal values (Box-Muller).
    fn standard_normal_pair(&mut self) -> (f64, f64) {
        let u1: f64 = self.rng.random_range(f64::EPSILON..1.0);
        let u2: f64 = self.rng.random_range(0.0..1.0);
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * std::f64::consts::PI * u2;
        (r * theta.cos(), r * theta.sin())
    }
}

impl Sampler for GaussSampler {
    fn has_more(&mut self) -> bool {
        self.remaining > 0
    }

    fn next(&mut self) -> Point {
        debug_assert!(self.remaining > 0, "next() called on an exhausted sampler");
        self.remaining = self.remaining.saturating_sub(1);

        let half_w = self.width as f64 / 2.0;
        let half_h = self.height as f64 / 2.0;
        let (nx, ny) = self.standard_normal_pair();

        // Tails beyond 5 sigma would leave the frame.
        let x = (nx * half_w / 5.0 + half_w).clamp(0.0, (self.width - 1) as f64);
        let y = (ny * half_h / 5.0 + half_h).clamp(0.0, (self.height - 1) as f64);

        Point::new(x as i32, y as i32)
    }

    fn reset(&mut self) {
        self.remaining = self.max_samples;
    }
}
