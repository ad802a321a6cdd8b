//! # Region Walk
//!
//! The odometer behind block traversal.
//!
//! Given fixed [`Bounds`] and an optional per-block element budget, a
//! [`RegionWalk`] plans the sequence of contiguous sub-regions that
//! partition the bounds in row-major order (last dimension fastest).
//! It does no I/O: the cursor in the engine pairs each planned region
//! with a read from the source.
//!
//! ```text
//! shape (2, 5), buf_size 3
//!
//!   row 0: [0 1 2][3 4]
//!   row 1: [0 1 2][3 4]
//! ```
//!
//! A block never crosses a boundary of a slower dimension unless it
//! covers the faster dimensions entirely.

use super::region::{Bounds, DimSlice, Region};

/// Lazy, finite, non-restartable plan of block regions
#[derive(Debug, Clone)]
pub struct RegionWalk {
    /// Fixed traversal bounds
    bounds: Region,

    /// Bounded shape, computed once from `bounds`
    shape: Vec<usize>,

    /// Max elements per block (`None` = whole region at once)
    buf_size: Option<usize>,

    /// Working start position (the odometer)
    start: Vec<usize>,

    /// Working stop position for the step in flight
    stop: Vec<usize>,

    done: bool,
}

impl RegionWalk {
    /// Plan a walk over `bounds`
    ///
    /// A `buf_size` of zero is treated as unset.
    pub fn new(bounds: &Bounds, buf_size: Option<usize>) -> Self {
        let region = bounds.region().clone();
        let shape = region.shape();
        let start = region.dims().iter().map(|d| d.start).collect();
        let stop = region.dims().iter().map(|d| d.stop).collect();

        // degenerate dimensions: nothing to visit
        let done = shape.iter().any(|&len| len == 0);

        Self {
            bounds: region,
            shape,
            buf_size: buf_size.filter(|&n| n > 0),
            start,
            stop,
            done,
        }
    }

    /// Shape of the bounded region
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn buf_size(&self) -> Option<usize> {
        self.buf_size
    }

    /// Total number of elements this walk covers
    pub fn total_len(&self) -> usize {
        if self.shape.iter().any(|&len| len == 0) {
            0
        } else {
            self.shape.iter().product()
        }
    }

    /// Size the step in flight: fill `self.stop`, return the running dim
    fn plan_step(&mut self) -> usize {
        let dims = self.bounds.dims();
        let mut count = self.buf_size.unwrap_or_else(|| self.shape.iter().product());
        let mut run_dim = 0;

        for i in (0..dims.len()).rev() {
            let fixed = dims[i];
            let stop = if count == 0 {
                // budget spent on faster dims: one position along this one
                self.start[i].saturating_add(1)
            } else if count <= self.shape[i] {
                run_dim = i;
                self.start[i].saturating_add(count.saturating_mul(fixed.step))
            } else {
                fixed.stop
            };
            self.stop[i] = stop.min(fixed.stop);
            count /= self.shape[i];
        }

        run_dim
    }

    /// Advance the odometer past the block just planned
    fn carry(&mut self, run_dim: usize) {
        let dims = self.bounds.dims();
        let ndim = dims.len();
        if ndim == 0 {
            // scalar: one block only
            self.done = true;
            return;
        }

        self.start[run_dim] = self.stop[run_dim];
        for i in (1..ndim).rev() {
            if self.start[i] >= dims[i].stop {
                self.start[i] = dims[i].start;
                self.start[i - 1] = self.start[i - 1].saturating_add(dims[i - 1].step);
            }
        }

        if self.start[0] >= dims[0].stop {
            self.done = true;
        }
    }
}

impl Iterator for RegionWalk {
    type Item = Region;

    fn next(&mut self) -> Option<Region> {
        if self.done {
            return None;
        }

        let run_dim = self.plan_step();
        let region = Region::new(
            self.bounds
                .dims()
                .iter()
                .enumerate()
                .map(|(i, d)| DimSlice::new(self.start[i], self.stop[i], d.step))
                .collect(),
        );

        self.carry(run_dim);
        Some(region)
    }
}

impl std::iter::FusedIterator for RegionWalk {}
