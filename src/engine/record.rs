//! # Output Records
//!
//! What a traversal hands to its consumer, one record at a time.
//!
//! Every record owns its arrays outright; holding on to one never
//! observes later accumulation.

use ndarray::{Array1, ArrayD};

use crate::core::{Region, ValueRange};

/// Why a record was emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A dataset smaller than the block size, read in one go
    Whole,
    /// A block read by the cursor
    Block,
    /// Leftover elements handed out when the traversal ended
    Flush,
}

/// One emitted step of a traversal
#[derive(Debug, Clone)]
pub struct OutputRecord {
    /// Requested (local) variable name
    pub variable_name: String,

    /// Label of the file the data came from
    pub file: String,

    /// Full path of the dataset inside the file
    pub dataset: String,

    pub kind: RecordKind,

    /// Region of the dataset covered by `current_block`
    pub current_region: Region,

    /// Min/max of `current_block` ignoring NaN (`None` if all NaN)
    pub range: Option<ValueRange>,

    /// The block just read, in its native shape
    pub current_block: ArrayD<f64>,

    /// The concatenation buffer, when accumulation is on
    pub accumulated: Option<Array1<f64>>,

    /// Part of `current_block` carried into the next buffer
    pub overflow: Option<Array1<f64>>,
}

impl OutputRecord {
    /// Elements in the accumulated buffer (0 when there is none)
    pub fn accumulated_len(&self) -> usize {
        self.accumulated.as_ref().map_or(0, |a| a.len())
    }

    /// Elements carried over (0 when there is no overflow)
    pub fn overflow_len(&self) -> usize {
        self.overflow.as_ref().map_or(0, |a| a.len())
    }
}
