//! Memoized color lookups for one motion estimation.

use std::collections::HashMap;

use crate::color::Color;
use crate::frame::Frame;

/// Converts each coordinate of `frame` to [`Color`] at most once.
///
/// The estimator revisits the same reference pixels once per candidate offset,
/// so caching the Lab conversion removes most of the per-offset cost. A cache
/// belongs to a single estimation; it is not shared across threads.
#[derive(Debug)]
pub struct PixelCache<'a, F: Frame + ?Sized> {
    frame: &'a F,
    cache: HashMap<i32, HashMap<i32, Color>>,
    hits: usize,
    misses: usize,
}

impl<'a, F: Frame + ?Sized> PixelCache<'a, F> {
    pub fn new(frame: &'a F) -> Self {
        Self {
            frame,
            cache: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Color at `(x, y)`. The coordinate must lie inside the frame.
    pub fn at(&mut self, x: i32, y: i32) -> Color {
        let column = self.cache.entry(x).or_default();
        if let Some(&color) = column.get(&y) {
            self.hits += 1;
            return color;
        }

        self.misses += 1;
        let color = Color::from_rgba8(self.frame.pixel_at(x as u32, y as u32));
        column.insert(y, color);
        color
    }

    #[inline]
    pub fn hits(&self) -> usize {
        self.hits
    }

    #[inline]
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Number of distinct coordinates converted so far.
    pub fn len(&self) -> usize {
        self.cache.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
