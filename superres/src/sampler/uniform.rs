use crate::frame::Point;
use crate::sampler::Sampler;

/// Deterministic grid of cell centers in row-major order.
///
/// The grid has `floor(sqrt(samples))` cells along each axis, so it emits roughly
/// `samples` points regardless of the aspect ratio.
#[derive(Debug, Clone)]
pub struct UniformSampler {
    width: i32,
    height: i32,
    start: Point,
    step_x: i32,
    step_y: i32,
    cursor: Point,
}

impl UniformSampler {
    pub fn new(width: u32, height: u32, samples: usize) -> Self {
        let per_axis = ((samples as f64).sqrt() as i32).max(1);
        let width = width as i32;
        let height = height as i32;

        let step_x = (width / per_axis).max(1);
        let step_y = (height / per_axis).max(1);
        let start = Point::new(step_x / 2, step_y / 2);

        Self {
            width,
            height,
            start,
            step_x,
            step_y,
            cursor: start,
        }
    }
}

impl Sampler for UniformSampler {
    fn has_more(&mut self) -> bool {
        self.cursor.x < self.width && self.cursor.y < self.height
    }

    fn next(&mut self) -> Point {
        debug_assert!(self.has_more(), "next() called on an exhausted sampler");

        let point = self.cursor;
        self.cursor.x += self.step_x;
        if self.cursor.x >= self.width {
            self.cursor.x = self.start.x;
            self.cursor.y += self.step_y;
        }
        point
    }

    fn reset(&mut self) {
        self.cursor = self.start;
    }
}
