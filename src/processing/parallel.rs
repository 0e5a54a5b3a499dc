// src/processing/parallel.rs
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::error::{NdviError, Result};

/// Rasters at or below this many pixels always run on the calling thread.
const SMALL_RASTER_PIXELS: usize = 512 * 512;

/// Runs the per-pixel kernel either inline or on a dedicated rayon pool.
pub struct ParallelProcessor {
    pool: Option<ThreadPool>,
}

impl ParallelProcessor {
    /// `None` or `Some(1)` keeps everything on the calling thread, `Some(0)`
    /// uses every CPU.
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let threads = match threads {
            None | Some(1) => return Ok(Self::sequential()),
            Some(0) => num_cpus::get(),
            Some(n) => n,
        };

        if threads <= 1 {
            return Ok(Self::sequential());
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("ndvi-worker-{i}"))
            .build()
            .map_err(|e| NdviError::Config(format!("cannot start {threads} worker threads: {e}")))?;

        debug!(threads, "created worker pool");
        Ok(Self { pool: Some(pool) })
    }

    pub fn sequential() -> Self {
        Self { pool: None }
    }

    pub fn threads(&self) -> usize {
        self.pool
            .as_ref()
            .map(ThreadPool::current_num_threads)
            .unwrap_or(1)
    }

    /// Fill `out[i] = kernel(i)` for every index.
    pub fn fill<F>(&self, out: &mut [f32], kernel: F)
    where
        F: Fn(usize) -> f32 + Send + Sync,
    {
        match &self.pool {
            Some(pool) if out.len() > SMALL_RASTER_PIXELS => pool.install(|| {
                out.par_iter_mut()
                    .enumerate()
                    .for_each(|(i, value)| *value = kernel(i));
            }),
            _ => {
                for (i, value) in out.iter_mut().enumerate() {
                    *value = kernel(i);
                }
            }
        }
    }
}

impl Default for ParallelProcessor {
    fn default() -> Self {
        Self::sequential()
    }
}
