//! # Ports
//!
//! Trait contracts between the engine and the outside world.
//!
//! - [`ArraySource`]: one N-dimensional array, sliced on demand
//! - [`Node`] / [`NodeVisitor`]: a file's tree of groups and datasets
//! - [`ArrayFile`] / [`OpenFile`]: scoped acquisition of a file
//!
//! Adapters implement these; the engine only ever talks to the traits.

mod namespace;
mod source;

pub use namespace::{ArrayFile, Group, Node, NodeVisitor, OpenFile};
pub use source::{ArraySource, DType, SourceError, SourceResult};
