use crate::frame::Point;
use crate::sampler::Sampler;

enum State<S> {
    Recording(S),
    Replay,
}

/// Records the first full pass of the wrapped sampler and replays it afterwards.
///
/// Once the inner sampler reports exhaustion it is dropped (edge samplers keep a
/// full-frame magnitude map alive) and every later pass is served from the
/// recorded points. With compaction enabled (the default) the recording is
/// sorted by `(y, x)` and deduplicated before the first replay.
///
/// The pass that exhausts the inner sampler ends like any other: `has_more()`
/// stays `false` until [`Sampler::reset`].
pub struct SamplerCache<S> {
    state: State<S>,
    points: Vec<Point>,
    cursor: usize,
    compact: bool,
}

impl<S: Sampler> SamplerCache<S> {
    pub fn new(inner: S) -> Self {
        Self {
            state: State::Recording(inner),
            points: Vec::new(),
            cursor: 0,
            compact: true,
        }
    }

    pub fn with_compaction(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    #[inline]
    pub fn is_replaying(&self) -> bool {
        matches!(self.state, State::Replay)
    }

    /// Points recorded so far.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    fn finish_recording(&mut self) {
        if self.compact {
            self.points.sort_unstable_by_key(|p| (p.y, p.x));
            self.points.dedup();
        }
        self.points.shrink_to_fit();
        self.state = State::Replay;
        self.cursor = self.points.len();

        tracing::trace!("Sampler cache replaying {} points", self.points.len());
    }
}

impl<S> std::fmt::Debug for SamplerCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplerCache")
            .field("replay", &matches!(self.state, State::Replay))
            .field("points", &self.points.len())
            .field("cursor", &self.cursor)
            .field("compact", &self.compact)
            .finish()
    }
}

impl<S: Sampler> Sampler for SamplerCache<S> {
    fn has_more(&mut self) -> bool {
        match &mut self.state {
            State::Recording(inner) => {
                if inner.has_more() {
                    return true;
                }
                self.finish_recording();
                false
            }
            State::Replay => self.cursor < self.points.len(),
        }
    }

    fn next(&mut self) -> Point {
        match &mut self.state {
            State::Recording(inner) => {
                let point = inner.next();
                self.points.push(point);
                point
            }
            State::Replay => {
                let point = self.points[self.cursor];
                self.cursor += 1;
                point
            }
        }
    }

    fn reset(&mut self) {
        match &mut self.state {
            State::Recording(inner) => {
                inner.reset();
                self.points.clear();
            }
            State::Replay => self.cursor = 0,
        }
    }
}
