use crate::frame::Point;
use crate::sampler::Sampler;

/// Drains a fixed budget from each child in turn.
///
/// A child that runs dry before its budget is spent hands over to the next one,
/// so the combined pass ends only after the last child is exhausted or has
/// used up its budget.
pub struct CombinedSampler {
    samplers: Vec<Box<dyn Sampler>>,
    per_sampler: usize,
    remaining: usize,
    current: usize,
}

impl CombinedSampler {
    pub fn new(samplers: Vec<Box<dyn Sampler>>, per_sampler: usize) -> Self {
        Self {
            samplers,
            per_sampler,
            remaining: per_sampler,
            current: 0,
        }
    }

    /// Moves `current` to the first child that still has budget and points.
    fn advance(&mut self) {
        while self.current < self.samplers.len() {
            if self.remaining > 0 && self.samplers[self.current].has_more() {
                return;
            }
            self.current += 1;
            self.remaining = self.per_sampler;
        }
    }
}

impl std::fmt::Debug for CombinedSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedSampler")
            .field("samplers", &self.samplers.len())
            .field("per_sampler", &self.per_sampler)
            .field("remaining", &self.remaining)
            .field("current", &self.current)
            .finish()
    }
}

impl Sampler for CombinedSampler {
    fn has_more(&mut self) -> bool {
        self.advance();
        self.current < self.samplers.len()
    }

    fn next(&mut self) -> Point {
        self.advance();
        debug_assert!(
            self.current < self.samplers.len(),
            "next() called on an exhausted sampler"
        );

        self.remaining -= 1;
        self.samplers[self.current].next()
    }

    fn reset(&mut self) {
        for sampler in &mut self.samplers {
            sampler.reset();
        }
        self.current = 0;
        self.remaining = self.per_sampler;
    }
}
