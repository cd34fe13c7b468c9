use rayon::prelude::*;

use crate::frame::{Frame, Point};
use crate::sampler::Sampler;

/// 5x5 Gaussian denoising kernel (sigma ~1.4), normalized by 159.
const GAUSS_5X5: [f32; 25] = [
    2.0 / 159.0, 4.0 / 159.0, 5.0 / 159.0, 4.0 / 159.0, 2.0 / 159.0, //
    4.0 / 159.0, 9.0 / 159.0, 12.0 / 159.0, 9.0 / 159.0, 4.0 / 159.0, //
    5.0 / 159.0, 12.0 / 159.0, 15.0 / 159.0, 12.0 / 159.0, 5.0 / 159.0, //
    4.0 / 159.0, 9.0 / 159.0, 12.0 / 159.0, 9.0 / 159.0, 4.0 / 159.0, //
    2.0 / 159.0, 4.0 / 159.0, 5.0 / 159.0, 4.0 / 159.0, 2.0 / 159.0,
];

const SOBEL_X: [f32; 9] = [
    1.0, 0.0, -1.0, //
    2.0, 0.0, -2.0, //
    1.0, 0.0, -1.0,
];

const SOBEL_Y: [f32; 9] = [
    1.0, 2.0, 1.0, //
    0.0, 0.0, 0.0, //
    -1.0, -2.0, -1.0,
];

/// Pixels brighter than this suppress their 8 neighbors during thinning.
const THINNING_FLOOR: u32 = 128;

/// First threshold tried by the doubling search.
const INITIAL_THRESHOLD: u32 = 1;

const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Emits edge pixels in raster order.
///
/// Construction denoises the frame, takes the Sobel gradient magnitude of each
/// channel, folds the channels into one brightness value per pixel
/// (`2r + 3g + 4b` on a 16-bit scale) and thins the result. The brightness threshold
/// is then doubled until no more than `samples` pixels exceed it. Iteration is
/// deterministic and every [`Sampler::reset`] rewinds to the origin.
#[derive(Debug, Clone)]
pub struct EdgeSampler {
    width: usize,
    magnitude: Vec<u32>,
    threshold: u32,
    cursor: usize,
}

impl EdgeSampler {
    pub fn new<F: Frame + ?Sized>(frame: &F, samples: usize) -> Self {
        let (width, _) = frame.bounds();
        let magnitude = edge_magnitude(frame);
        let threshold = find_threshold(&magnitude, samples);

        tracing::debug!(
            "Edge sampler: threshold {} keeps {} of {} pixels",
            threshold,
            count_above(&magnitude, threshold),
            magnitude.len()
        );

        Self {
            width: width as usize,
            magnitude,
            threshold,
            cursor: 0,
        }
    }

    #[inline]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Number of points one full pass emits.
    pub fn edge_count(&self) -> usize {
        count_above(&self.magnitude, self.threshold)
    }

    fn seek(&mut self) {
        while self.cursor < self.magnitude.len() && self.magnitude[self.cursor] <= self.threshold
        {
            self.cursor += 1;
        }
    }
}

impl Sampler for EdgeSampler {
    fn has_more(&mut self) -> bool {
        self.seek();
        self.cursor < self.magnitude.len()
    }

    fn next(&mut self) -> Point {
        self.seek();
        debug_assert!(
            self.cursor < self.magnitude.len(),
            "next() called on an exhausted sampler"
        );

        let idx = self.cursor;
        self.cursor += 1;
        Point::new((idx % self.width) as i32, (idx / self.width) as i32)
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }
}

fn count_above(magnitude: &[u32], threshold: u32) -> usize {
    magnitude.iter().filter(|&&m| m > threshold).count()
}

/// Doubles the threshold until at most `samples` pixels exceed it. If that leaves
/// no pixels at all, steps back once.
pub(super) fn find_threshold(magnitude: &[u32], samples: usize) -> u32 {
    let mut threshold = INITIAL_THRESHOLD;
    while count_above(magnitude, threshold) > samples && threshold <= u32::MAX / 2 {
        threshold *= 2;
    }

    if count_above(magnitude, threshold) == 0 {
        threshold /= 2;
    }
    threshold
}

fn edge_magnitude<F: Frame + ?Sized>(frame: &F) -> Vec<u32> {
    let (width, height) = frame.bounds();
    let (width, height) = (width as usize, height as usize);
    let len = width * height;
    if len == 0 {
        return Vec::new();
    }

    let mut channels: [Vec<f32>; 3] = std::array::from_fn(|_| vec![0.0; len]);
    for y in 0..height {
        for x in 0..width {
            let p = frame.pixel_at(x as u32, y as u32);
            let idx = y * width + x;
            for (c, channel) in channels.iter_mut().enumerate() {
                channel[idx] = p[c] as f32;
            }
        }
    }

    let gradients = channels.map(|channel| {
        let denoised = convolve(&channel, width, height, &GAUSS_5X5, 5);
        let gx = convolve(&denoised, width, height, &SOBEL_X, 3);
        let gy = convolve(&denoised, width, height, &SOBEL_Y, 3);
        gx.iter()
            .zip(&gy)
            .map(|(h, v)| (h.abs() + v.abs()).min(255.0))
            .collect::<Vec<f32>>()
    });

    let [r, g, b] = &gradients;
    let mut magnitude: Vec<u32> = (0..len)
        .map(|i| {
            let brightness = 2.0 * r[i] + 3.0 * g[i] + 4.0 * b[i];
            (brightness * 257.0) as u32
        })
        .collect();

    thin(&mut magnitude, width, height);
    magnitude
}

/// Keeps the first bright pixel of every neighborhood in raster order.
fn thin(magnitude: &mut [u32], width: usize, height: usize) {
    for y in 0..height {
        for x in 0..width {
            if magnitude[y * width + x] <= THINNING_FLOOR {
                continue;
            }
            for (dx, dy) in NEIGHBORS {
                let nx = x as isize + dx;
                let ny = y as isize + dy;
                if nx >= 0 && ny >= 0 && (nx as usize) < width && (ny as usize) < height {
                    magnitude[ny as usize * width + nx as usize] = 0;
                }
            }
        }
    }
}

/// Square-kernel correlation with clamp-to-edge borders.
fn convolve(src: &[f32], width: usize, height: usize, kernel: &[f32], size: usize) -> Vec<f32> {
    debug_assert_eq!(kernel.len(), size * size);
    let radius = (size / 2) as isize;
    let max_x = width as isize - 1;
    let max_y = height as isize - 1;

    let mut out = vec![0.0f32; src.len()];
    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, dst) in row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for ky in 0..size {
                let sy = (y as isize + ky as isize - radius).clamp(0, max_y) as usize;
                for kx in 0..size {
                    let sx = (x as isize + kx as isize - radius).clamp(0, max_x) as usize;
                    acc += src[sy * width + sx] * kernel[ky * size + kx];
                }
            }
            *dst = acc;
        }
    });
    out
}
