//! Chunk scheduler for long-running work on a single-threaded host.
//!
//! Parsing and reconciliation over tens of thousands of keywords must not
//! hold the host's thread for one unbounded stretch. Work is expressed as a
//! [`ChunkedJob`] and stepped through a caller-owned [`ChunkCursor`]: each
//! call to [`ChunkCursor::advance`] processes one bounded slice
//! synchronously and hands back the updated cursor plus a [`Progress`]
//! report. Between calls the host is free to yield to its event loop,
//! redraw, or stop stepping altogether.
//!
//! The scheduler holds no global state and cannot be interrupted
//! mid-slice. Slicing never changes what a job produces, only when.
//!
//! # Example
//!
//! ```rust
//! use std::ops::Range;
//! use swat_core::schedule::{ChunkCursor, ChunkedJob};
//!
//! struct Sum { items: Vec<u64>, acc: u64 }
//!
//! impl ChunkedJob for Sum {
//!     fn total(&self) -> usize { self.items.len() }
//!     fn process(&mut self, range: Range<usize>) {
//!         self.acc += self.items[range].iter().sum::<u64>();
//!     }
//!     fn label(&self) -> String { "Summing".to_string() }
//! }
//!
//! let mut job = Sum { items: (1..=10).collect(), acc: 0 };
//! let mut cursor = ChunkCursor::new(job.total(), 4);
//! loop {
//!     let (next, progress) = cursor.advance(&mut job);
//!     cursor = next;
//!     if progress.done { break; }
//! }
//! assert_eq!(job.acc, 55);
//! ```

use std::ops::Range;

/// Keywords per slice used by the comparator.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Work that can be processed in index ranges.
pub trait ChunkedJob {
    /// Number of items the job will process.
    fn total(&self) -> usize;

    /// Process items `range`. Ranges arrive in order and never overlap.
    fn process(&mut self, range: Range<usize>);

    /// Short human-readable description used in status lines.
    fn label(&self) -> String;
}

/// Position of a chunked run. A plain value: the caller owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkCursor {
    total: usize,
    processed: usize,
    chunk_size: usize,
}

impl ChunkCursor {
    /// A cursor at the start of `total` items. A zero chunk size is treated as 1.
    pub fn new(total: usize, chunk_size: usize) -> Self {
        Self {
            total,
            processed: 0,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn is_done(&self) -> bool {
        self.processed >= self.total
    }

    /// `processed / total`, clamped to 1.0. An empty run is complete.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            (self.processed as f64 / self.total as f64).min(1.0)
        }
    }

    /// The next slice to process and the cursor positioned after it.
    ///
    /// Once done, the range is empty and the cursor no longer moves.
    pub fn next_range(self) -> (Range<usize>, ChunkCursor) {
        let start = self.processed.min(self.total);
        let end = start.saturating_add(self.chunk_size).min(self.total);
        let next = ChunkCursor {
            processed: end,
            ..self
        };
        (start..end, next)
    }

    /// Process one slice of `job` and report progress.
    pub fn advance<J: ChunkedJob + ?Sized>(self, job: &mut J) -> (ChunkCursor, Progress) {
        let (range, next) = self.next_range();
        if !range.is_empty() {
            job.process(range);
        }
        let progress = Progress::at(&next, &job.label());
        (next, progress)
    }
}

/// Progress snapshot after one slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
    /// Monotonically increasing, in `[0.0, 1.0]`.
    pub fraction: f64,
    pub status: String,
    pub done: bool,
}

impl Progress {
    fn at(cursor: &ChunkCursor, label: &str) -> Self {
        let status = if cursor.total() == 0 {
            format!("{}: nothing to process", label)
        } else {
            format!(
                "{}: {} / {} ({:.0}%)",
                label,
                cursor.processed(),
                cursor.total(),
                cursor.fraction() * 100.0
            )
        };
        Self {
            processed: cursor.processed(),
            total: cursor.total(),
            fraction: cursor.fraction(),
            status,
            done: cursor.is_done(),
        }
    }
}

/// Run a job to completion without yielding, calling `on_progress` after each slice.
pub fn drive_blocking<J, F>(job: &mut J, chunk_size: usize, mut on_progress: F)
where
    J: ChunkedJob + ?Sized,
    F: FnMut(&Progress),
{
    let mut cursor = ChunkCursor::new(job.total(), chunk_size);
    loop {
        let (next, progress) = cursor.advance(job);
        on_progress(&progress);
        cursor = next;
        if progress.done {
            break;
        }
    }
}
