//! Bounded parallel processing over a dedicated rayon pool.

use rayon::prelude::*;

#[cfg(test)]
mod tests;

/// Multiplier for number of chunks relative to worker threads.
/// Using 3x threads provides good load balancing when some chunks finish faster.
const CHUNKS_PER_THREAD: usize = 3;

/// Number of threads the hardware can run in parallel, at least 1.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Rows per chunk so that `height` rows split into roughly `threads * 3` chunks.
#[inline]
pub fn rows_per_chunk(height: usize, threads: usize) -> usize {
    let num_chunks = threads.max(1) * CHUNKS_PER_THREAD;
    (height / num_chunks).max(1)
}

/// Fixed-size worker pool.
///
/// Every parallel operation started through the pool runs on its own threads,
/// so at most [`WorkerPool::threads`] jobs are in flight at once regardless of
/// the global rayon configuration.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    threads: usize,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads)
            .finish()
    }
}

impl WorkerPool {
    /// Creates a pool with exactly `threads` workers.
    ///
    /// # Panics
    ///
    /// Panics if `threads` is 0.
    pub fn new(threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        assert!(threads > 0, "threads must be > 0");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("superres-worker-{i}"))
            .build()?;

        Ok(Self { pool, threads })
    }

    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Maps `f` over `items` on the pool. Output order matches input order.
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        self.pool.install(|| items.par_iter().map(&f).collect())
    }

    /// Like [`WorkerPool::map`], but the closure returns `Result<R, E>`.
    ///
    /// Every job runs to completion before the first error (in input order) is returned.
    pub fn try_map<T, R, E, F>(&self, items: &[T], f: F) -> Result<Vec<R>, E>
    where
        T: Sync,
        R: Send,
        E: Send,
        F: Fn(&T) -> Result<R, E> + Sync + Send,
    {
        let results: Vec<Result<R, E>> = self.map(items, f);
        results.into_iter().collect()
    }

    /// Splits `data` into row-aligned chunks and calls `f(first_row, chunk)` for each
    /// chunk in parallel. `data.len()` must be a multiple of `width`.
    pub fn for_each_row_chunk<T, F>(&self, data: &mut [T], width: usize, f: F)
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        if data.is_empty() || width == 0 {
            return;
        }
        assert_eq!(
            data.len() % width,
            0,
            "data length must be a multiple of width"
        );

        let height = data.len() / width;
        let chunk_rows = rows_per_chunk(height, self.threads);

        self.pool.install(|| {
            data.par_chunks_mut(width * chunk_rows)
                .enumerate()
                .for_each(|(chunk_idx, chunk)| f(chunk_idx * chunk_rows, chunk));
        });
    }
}
