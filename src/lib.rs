//! # chunkwalk
//!
//! > Read arrays bigger than memory, one bounded block at a time.
//!
//! chunkwalk traverses large, named, multidimensional numeric arrays held
//! in hierarchical array files (trees of groups and datasets) without ever
//! materializing a whole array. A cursor cuts each array into contiguous
//! blocks of at most `buf_size` elements in row-major order; an
//! orchestrator concatenates those blocks per variable into buffers of an
//! exact target size, carrying any excess forward.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        chunkwalk                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  CORE (pure math, no I/O)                                   │
//! │    Region, Selector, Bounds, RegionWalk, Accumulator        │
//! │                                                             │
//! │  PORTS (trait contracts)                                    │
//! │    ArraySource, Node, ArrayFile, OpenFile                   │
//! │                                                             │
//! │  ADAPTERS (swappable implementations)                       │
//! │    Storage: MemoryArray, MemoryFile, JsonFile               │
//! │    API: Python bindings                                     │
//! │                                                             │
//! │  ENGINE (orchestration)                                     │
//! │    BlockCursor, find_variables, Traversal                   │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use chunkwalk::{MemoryArray, MemoryFile, RecordKind, Traversal, TraversalConfig};
//!
//! let file = MemoryFile::new("cast-001")
//!     .with_array(MemoryArray::new("/temperature", vec![10, 10], vec![12.5; 100]));
//!
//! let config = TraversalConfig::new()
//!     .with_variables(["temperature"])
//!     .with_block_size(40);
//!
//! for record in Traversal::new(vec![file], config).unwrap() {
//!     let record = record.unwrap();
//!     if record.kind != RecordKind::Flush {
//!         assert!(record.current_block.len() <= 40);
//!     }
//! }
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// Core domain - pure math, no I/O
/// Contains: Region, Selector, Bounds, RegionWalk, Accumulator, config
pub mod core;

/// Port definitions - trait contracts for adapters
/// Contains: ArraySource, Node, ArrayFile, OpenFile
pub mod ports;

/// Adapter implementations - swappable components
/// Contains: storage, python submodules
pub mod adapters;

/// Engine - orchestration layer
/// Contains: BlockCursor, namespace search, Traversal
pub mod engine;

// ============================================================================
// PYTHON BINDINGS (when enabled)
// ============================================================================

#[cfg(feature = "python")]
pub use adapters::python::*;

// ============================================================================
// RE-EXPORTS (public API)
// ============================================================================

// Core types
pub use crate::core::{Accumulator, Bounds, DimSlice, Flushed, Region, RegionWalk, Selector};
pub use crate::core::{ConfigError, TailPolicy, TraversalConfig, ValueRange, DEFAULT_VARIABLES};

// Port traits
pub use crate::ports::{ArrayFile, ArraySource, DType, Group, Node, NodeVisitor, OpenFile};
pub use crate::ports::{SourceError, SourceResult};

// Adapters
pub use crate::adapters::storage::{JsonFile, MemoryArray, MemoryFile};

// Engine
pub use crate::engine::{find_variables, BlockCursor, OutputRecord, RecordKind, Traversal};
pub use crate::engine::{TraversalError, TraversalResult};
