//! Square spiral over integer offsets.

/// Visits every offset of the square `[-radius, radius]²` exactly once, starting
/// at the origin and winding outwards (right, down, left, up, with segment lengths
/// 1, 1, 2, 2, 3, 3, ...).
///
/// [`Spiral::turns`] counts the direction changes taken so far, which lets the
/// caller stop once the search has circled the best offset often enough.
#[derive(Debug, Clone)]
pub struct Spiral {
    position: (i32, i32),
    direction: (i32, i32),
    segment_len: usize,
    segment_progress: usize,
    segments_done: usize,
    emitted: usize,
    total: usize,
    turns: usize,
}

impl Spiral {
    pub fn new(radius: u32) -> Self {
        let side = 2 * radius as usize + 1;
        Self {
            position: (0, 0),
            direction: (1, 0),
            segment_len: 1,
            segment_progress: 0,
            segments_done: 0,
            emitted: 0,
            total: side * side,
            turns: 0,
        }
    }

    #[inline]
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Offsets not yet emitted.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.total - self.emitted
    }

    fn step(&mut self) {
        self.position.0 += self.direction.0;
        self.position.1 += self.direction.1;
        self.segment_progress += 1;

        if self.segment_progress == self.segment_len {
            // Rotate 90 degrees: right -> down -> left -> up.
            self.direction = (-self.direction.1, self.direction.0);
            self.turns += 1;
            self.segment_progress = 0;
            self.segments_done += 1;
            if self.segments_done % 2 == 0 {
                self.segment_len += 1;
            }
        }
    }
}

impl Iterator for Spiral {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted == self.total {
            return None;
        }
        let offset = self.position;
        self.emitted += 1;
        self.step();
        Some(offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

impl ExactSizeIterator for Spiral {}
