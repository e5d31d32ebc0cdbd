//! Row-parallel execution of a single filtering pass.
//!
//! The row range `[0, rows)` of a buffer is split into contiguous bands, one
//! per worker. Each worker owns a disjoint `&mut` band of the output, so the
//! only synchronisation is the final join. Workers poll the
//! [`StatusMonitor`] before every row and flush progress in batches of
//! roughly [`PROGRESS_CHUNK`] samples.
//!
//! Cancellation is reported through [`WorkStatus`] rather than unwinding, and
//! the per-worker statuses are folded into one result for the pass.
//!
//! With the `parallel` feature the bands run on the rayon pool; without it
//! they run one after another on the calling thread.

pub mod monitor;

use log::trace;
use std::ops::Range;

pub use monitor::{LogMonitor, ProgressCounter, SilentMonitor, StatusMonitor};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Samples processed by a worker between two progress updates.
pub const PROGRESS_CHUNK: usize = 65536;

/// Default lower bound of rows handled by one worker.
pub const DEFAULT_MIN_ROWS_PER_WORKER: usize = 4;

/// Outcome of one worker's band, or of a whole pass once aggregated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkStatus {
    Completed,
    Aborted,
}

impl WorkStatus {
    #[inline]
    pub fn combine(self, other: WorkStatus) -> WorkStatus {
        if self == WorkStatus::Aborted || other == WorkStatus::Aborted {
            WorkStatus::Aborted
        } else {
            WorkStatus::Completed
        }
    }

    pub fn is_aborted(self) -> bool {
        self == WorkStatus::Aborted
    }
}

/// Number of hardware threads, at least one.
pub fn available_processors() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParallelDriver {
    parallel: bool,
    max_processors: usize,
    min_rows_per_worker: usize,
}

impl Default for ParallelDriver {
    fn default() -> Self {
        Self::new(true, available_processors(), DEFAULT_MIN_ROWS_PER_WORKER)
    }
}

impl ParallelDriver {
    pub fn new(parallel: bool, max_processors: usize, min_rows_per_worker: usize) -> Self {
        Self {
            parallel,
            max_processors: max_processors.max(1),
            min_rows_per_worker: min_rows_per_worker.max(1),
        }
    }

    /// Driver that always runs a pass on the calling thread.
    pub fn serial() -> Self {
        Self::new(false, 1, DEFAULT_MIN_ROWS_PER_WORKER)
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn max_processors(&self) -> usize {
        self.max_processors
    }

    /// Workers used for `rows` rows: bounded by the processor limit and by the
    /// minimum useful band height.
    pub fn number_of_workers(&self, rows: usize) -> usize {
        if !self.parallel {
            return 1;
        }
        self.max_processors
            .min((rows / self.min_rows_per_worker).max(1))
    }

    /// Contiguous bands covering `[0, rows)`; the last band takes the remainder.
    pub fn partition(&self, rows: usize) -> Vec<Range<usize>> {
        if rows == 0 {
            return Vec::new();
        }
        let workers = self.number_of_workers(rows);
        let per_worker = rows / workers;
        (0..workers)
            .map(|i| {
                let start = i * per_worker;
                let end = if i + 1 < workers {
                    start + per_worker
                } else {
                    rows
                };
                start..end
            })
            .collect()
    }

    /// Run `f(row_index, row)` over every `row_len`-sized row of `data`.
    pub fn run_rows<T, F>(
        &self,
        data: &mut [T],
        row_len: usize,
        monitor: &dyn StatusMonitor,
        f: F,
    ) -> WorkStatus
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        self.run_rows_with(data, row_len, monitor, || (), |_, y, row| f(y, row))
    }

    /// Like [`ParallelDriver::run_rows`], with per-worker scratch state built
    /// by `init` once per band.
    pub fn run_rows_with<T, S, I, F>(
        &self,
        data: &mut [T],
        row_len: usize,
        monitor: &dyn StatusMonitor,
        init: I,
        f: F,
    ) -> WorkStatus
    where
        T: Send,
        I: Fn() -> S + Sync,
        F: Fn(&mut S, usize, &mut [T]) + Sync,
    {
        if row_len == 0 || data.is_empty() {
            return WorkStatus::Completed;
        }
        let rows = data.len() / row_len;
        let bands = self.partition(rows);
        trace!(
            "ParallelDriver: {} rows of {} samples in {} band(s)",
            rows,
            row_len,
            bands.len()
        );

        let mut chunks: Vec<(usize, &mut [T])> = Vec::with_capacity(bands.len());
        let mut rest = data;
        for band in &bands {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(band.len() * row_len);
            chunks.push((band.start, head));
            rest = tail;
        }

        let work = |(first_row, chunk): (usize, &mut [T])| {
            run_band(first_row, chunk, row_len, monitor, &init, &f)
        };

        #[cfg(feature = "parallel")]
        {
            if chunks.len() > 1 {
                return chunks
                    .into_par_iter()
                    .map(work)
                    .reduce(|| WorkStatus::Completed, WorkStatus::combine);
            }
        }
        chunks
            .into_iter()
            .map(work)
            .fold(WorkStatus::Completed, WorkStatus::combine)
    }
}

fn run_band<T, S, I, F>(
    first_row: usize,
    chunk: &mut [T],
    row_len: usize,
    monitor: &dyn StatusMonitor,
    init: &I,
    f: &F,
) -> WorkStatus
where
    I: Fn() -> S,
    F: Fn(&mut S, usize, &mut [T]),
{
    let mut state = init();
    let mut pending_rows = 0u64;
    let mut pending_samples = 0usize;
    for (i, row) in chunk.chunks_exact_mut(row_len).enumerate() {
        if monitor.is_aborted() {
            monitor.advance(pending_rows);
            return WorkStatus::Aborted;
        }
        f(&mut state, first_row + i, row);
        pending_rows += 1;
        pending_samples += row_len;
        if pending_samples >= PROGRESS_CHUNK {
            monitor.advance(pending_rows);
            pending_rows = 0;
            pending_samples = 0;
        }
    }
    if pending_rows > 0 {
        monitor.advance(pending_rows);
    }
    if monitor.is_aborted() {
        WorkStatus::Aborted
    } else {
        WorkStatus::Completed
    }
}
