//! Per-pixel merge of motion-corrected frames.

use common::WorkerPool;

use crate::color::{Color, MergeMethod};
use crate::frame::{Frame, MergedImage, Point};
use crate::motion::Motion;

/// Merges `frames` into one image the size of `frames[0]` (the reference).
///
/// Output pixel `(x, y)` reduces, with `method`, the colors of every frame `i`
/// at `(x + motions[i].dx, y + motions[i].dy)` that lies inside that frame. When
/// no frame contributes, the reference pixel is used as is. Rows are split across
/// the pool; the result does not depend on the split.
///
/// # Panics
///
/// Panics if `frames` is empty or `motions.len() != frames.len()`.
pub fn merge_frames<F>(
    pool: &WorkerPool,
    frames: &[&F],
    motions: &[Motion],
    method: MergeMethod,
) -> MergedImage
where
    F: Frame + Sync + ?Sized,
{
    assert!(!frames.is_empty(), "Cannot merge an empty frame list");
    assert_eq!(
        frames.len(),
        motions.len(),
        "Every frame needs exactly one motion"
    );

    let reference = frames[0];
    let (width, height) = reference.bounds();

    tracing::debug!(
        "Merging {} frames into {}x{} with {} on {} threads",
        frames.len(),
        width,
        height,
        method,
        pool.threads()
    );

    let mut pixels = vec![Color::BLACK; width as usize * height as usize];
    pool.for_each_row_chunk(&mut pixels, width as usize, |first_row, chunk| {
        let mut scratch: Vec<Color> = Vec::with_capacity(frames.len());

        for (row_offset, row) in chunk.chunks_mut(width as usize).enumerate() {
            let y = (first_row + row_offset) as i32;
            for (x, dst) in row.iter_mut().enumerate() {
                let p = Point::new(x as i32, y);

                scratch.clear();
                for (frame, motion) in frames.iter().zip(motions) {
                    let shifted = p.offset(motion.dx, motion.dy);
                    if frame.contains(shifted) {
                        scratch.push(frame.color_at(shifted));
                    }
                }

                *dst = if scratch.is_empty() {
                    reference.color_at(p)
                } else {
                    method.merge(&mut scratch)
                };
            }
        }
    });

    MergedImage::from_pixels(width, height, pixels)
}
