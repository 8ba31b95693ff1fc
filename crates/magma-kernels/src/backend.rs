//! Execution backends for the per-row kernel contract.
//!
//! A kernel describes its work as a function that fills one output row
//! given the row index. A backend decides where those calls run:
//!
//! - [`SerialBackend`]: rows in order on the calling thread (reference).
//! - [`RayonBackend`]: rows spread across a dedicated rayon pool.
//!
//! Every `fill_rows_*` call returns only after all rows are written,
//! which is the barrier between the diffusion and display phases.

use magma_core::{Precision, ResourceError, Rgba};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

/// Per-row work item: `(row_index, row_slice)`.
pub type RowFn<'a, T> = dyn Fn(usize, &mut [T]) + Sync + 'a;

/// Runs a per-row function over every row of an output buffer.
///
/// # Contract
///
/// - `row` is invoked exactly once per row, with `row.len() == row_len`
///   (the final row may be shorter only if `out.len()` is not a multiple
///   of `row_len`).
/// - Rows may run concurrently and in any order, so `row` must not
///   depend on the output of other rows.
/// - The call returns only after every row has been written.
/// - `Err(ResourceError::ContextLost)` means the output is unspecified and
///   the caller must discard it.
///
/// # Object safety
///
/// This trait is object-safe; the scheduler stores its backend as
/// `Box<dyn ExecutionBackend>`.
pub trait ExecutionBackend: Send + Sync {
    /// Human-readable name for logs and metrics.
    fn name(&self) -> &str;

    /// Storage formats this backend can hold field buffers in.
    fn supported_precisions(&self) -> &[Precision] {
        &[Precision::F32, Precision::F64]
    }

    /// Fill a scalar buffer row by row.
    fn fill_rows_f32(
        &self,
        out: &mut [f32],
        row_len: usize,
        row: &RowFn<'_, f32>,
    ) -> Result<(), ResourceError>;

    /// Fill a colour buffer row by row.
    fn fill_rows_rgba(
        &self,
        out: &mut [Rgba],
        row_len: usize,
        row: &RowFn<'_, Rgba>,
    ) -> Result<(), ResourceError>;
}

/// CPU reference backend: rows in order on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialBackend;

impl SerialBackend {
    fn fill<T>(out: &mut [T], row_len: usize, row: &RowFn<'_, T>) {
        if row_len == 0 {
            return;
        }
        for (y, chunk) in out.chunks_mut(row_len).enumerate() {
            row(y, chunk);
        }
    }
}

impl ExecutionBackend for SerialBackend {
    fn name(&self) -> &str {
        "serial"
    }

    fn fill_rows_f32(
        &self,
        out: &mut [f32],
        row_len: usize,
        row: &RowFn<'_, f32>,
    ) -> Result<(), ResourceError> {
        Self::fill(out, row_len, row);
        Ok(())
    }

    fn fill_rows_rgba(
        &self,
        out: &mut [Rgba],
        row_len: usize,
        row: &RowFn<'_, Rgba>,
    ) -> Result<(), ResourceError> {
        Self::fill(out, row_len, row);
        Ok(())
    }
}

/// Thread-pool backend: rows distributed over a dedicated rayon pool.
pub struct RayonBackend {
    pool: ThreadPool,
}

impl RayonBackend {
    /// Build a pool with `threads` workers, or rayon's default
    /// (one per logical CPU) for `None`.
    ///
    /// Returns `ResourceError::ContextLost` if the pool cannot be created.
    pub fn new(threads: Option<usize>) -> Result<Self, ResourceError> {
        let mut builder =
            ThreadPoolBuilder::new().thread_name(|i| format!("magma-kernel-{i}"));
        if let Some(n) = threads {
            builder = builder.num_threads(n.max(1));
        }
        let pool = builder.build().map_err(|e| ResourceError::ContextLost {
            reason: format!("rayon pool: {e}"),
        })?;
        debug!(threads = pool.current_num_threads(), "rayon backend ready");
        Ok(Self { pool })
    }

    /// Number of worker threads in the pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn fill<T: Send>(&self, out: &mut [T], row_len: usize, row: &RowFn<'_, T>) {
        if row_len == 0 {
            return;
        }
        self.pool.install(|| {
            out.par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(y, chunk)| row(y, chunk));
        });
    }
}

impl std::fmt::Debug for RayonBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RayonBackend")
            .field("threads", &self.threads())
            .finish()
    }
}

impl ExecutionBackend for RayonBackend {
    fn name(&self) -> &str {
        "rayon"
    }

    fn fill_rows_f32(
        &self,
        out: &mut [f32],
        row_len: usize,
        row: &RowFn<'_, f32>,
    ) -> Result<(), ResourceError> {
        self.fill(out, row_len, row);
        Ok(())
    }

    fn fill_rows_rgba(
        &self,
        out: &mut [Rgba],
        row_len: usize,
        row: &RowFn<'_, Rgba>,
    ) -> Result<(), ResourceError> {
        self.fill(out, row_len, row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_rows(backend: &dyn ExecutionBackend) -> Vec<f32> {
        let mut out = vec![0.0f32; 12];
        backend
            .fill_rows_f32(&mut out, 4, &|y, row| {
                for (x, v) in row.iter_mut().enumerate() {
                    *v = (y * 10 + x) as f32;
                }
            })
            .unwrap();
        out
    }

    #[test]
    fn serial_visits_every_row() {
        let out = index_rows(&SerialBackend);
        assert_eq!(&out[..4], &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(&out[8..], &[20.0, 21.0, 22.0, 23.0]);
    }

    #[test]
    fn rayon_matches_serial() {
        let rayon = RayonBackend::new(Some(3)).unwrap();
        assert_eq!(rayon.threads(), 3);
        assert_eq!(index_rows(&rayon), index_rows(&SerialBackend));
    }

    #[test]
    fn zero_row_len_is_a_no_op() {
        let mut out = vec![1.0f32; 4];
        SerialBackend
            .fill_rows_f32(&mut out, 0, &|_, row| row.fill(9.0))
            .unwrap();
        assert_eq!(out, vec![1.0; 4]);
    }

    #[test]
    fn rgba_rows_filled() {
        let rayon = RayonBackend::new(Some(2)).unwrap();
        let mut out = vec![Rgba::TRANSPARENT; 6];
        rayon
            .fill_rows_rgba(&mut out, 3, &|y, row| {
                row.fill(Rgba::new(y as f32, 0.0, 0.0, 1.0));
            })
            .unwrap();
        assert_eq!(out[0].r, 0.0);
        assert_eq!(out[5].r, 1.0);
    }

    #[test]
    fn default_precisions_include_f32() {
        assert!(SerialBackend.supported_precisions().contains(&Precision::F32));
    }
}
