//! # Block Cursor
//!
//! Buffered traversal of one array source.
//!
//! A [`BlockCursor`] reads a big array in small contiguous blocks without
//! ever materializing the whole thing. Each step yields the region it
//! covered together with the block read from the source:
//!
//! ```rust
//! use std::sync::Arc;
//! use chunkwalk::{BlockCursor, MemoryArray};
//!
//! let source = Arc::new(MemoryArray::new("/t", vec![10], (0..10).map(f64::from).collect()));
//! let lens: Vec<usize> = BlockCursor::new(source, Some(3))
//!     .map(|step| step.unwrap().1.len())
//!     .collect();
//! assert_eq!(lens, vec![3, 3, 3, 1]);
//! ```
//!
//! Cursors are single-use: once exhausted, build a new one over the same
//! bounds to traverse again.

use std::sync::Arc;

use ndarray::ArrayD;
use tracing::{debug, trace};

use crate::core::{Bounds, Region, RegionWalk, Selector};
use crate::ports::{ArraySource, SourceResult};

use super::error::TraversalResult;

/// Buffered iterator over an [`ArraySource`]
pub struct BlockCursor {
    source: Arc<dyn ArraySource>,
    bounds: Bounds,
    buf_size: Option<usize>,
    walk: RegionWalk,
    current: Option<Region>,
    failed: bool,
}

impl BlockCursor {
    /// Cursor over the whole source
    ///
    /// `buf_size` caps the elements per block; `None` reads everything in
    /// one block.
    pub fn new(source: Arc<dyn ArraySource>, buf_size: Option<usize>) -> Self {
        let bounds = Bounds::full(source.shape());
        Self::with_bounds(source, bounds, buf_size)
    }

    fn with_bounds(source: Arc<dyn ArraySource>, bounds: Bounds, buf_size: Option<usize>) -> Self {
        let walk = RegionWalk::new(&bounds, buf_size);
        if walk.total_len() == 0 {
            debug!(source = source.name(), shape = ?bounds.shape(), "degenerate bounds, nothing to read");
        }

        Self {
            source,
            bounds,
            buf_size,
            walk,
            current: None,
            failed: false,
        }
    }

    /// A new cursor over a sub-selection of this cursor's bounds
    ///
    /// This cursor is left untouched.
    pub fn restrict(&self, selectors: &[Selector]) -> TraversalResult<BlockCursor> {
        let bounds = self.bounds.restrict(selectors)?;
        Ok(Self::with_bounds(Arc::clone(&self.source), bounds, self.buf_size))
    }

    pub fn source(&self) -> &Arc<dyn ArraySource> {
        &self.source
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn buf_size(&self) -> Option<usize> {
        self.buf_size
    }

    /// Shape of the bounded region
    pub fn shape(&self) -> Vec<usize> {
        self.bounds.shape()
    }

    /// Region of the most recently yielded block
    pub fn current_region(&self) -> Option<&Region> {
        self.current.as_ref()
    }

    /// The remaining plan of regions, without reading anything
    pub fn regions(&self) -> RegionWalk {
        self.walk.clone()
    }

    /// Read the whole bounded region in one slice
    pub fn materialize(&self) -> SourceResult<ArrayD<f64>> {
        if self.walk.total_len() == 0 {
            return Ok(ArrayD::zeros(self.shape()));
        }
        self.source.read(self.bounds.region())
    }

    /// Element-wise iteration, one block in memory at a time
    pub fn flat(self) -> impl Iterator<Item = SourceResult<f64>> {
        self.flat_map(|step| {
            let values: Vec<SourceResult<f64>> = match step {
                Ok((_, block)) => block.into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            values
        })
    }
}

impl Iterator for BlockCursor {
    type Item = SourceResult<(Region, ArrayD<f64>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let region = self.walk.next()?;
        trace!(source = self.source.name(), region = %region, "reading block");

        self.current = Some(region.clone());
        match self.source.read(&region) {
            Ok(block) => Some(Ok((region, block))),
            Err(e) => {
                // a failed read ends the traversal of this source
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl std::fmt::Debug for BlockCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockCursor")
            .field("source", &self.source.name())
            .field("bounds", &self.bounds)
            .field("buf_size", &self.buf_size)
            .field("current", &self.current)
            .finish()
    }
}
