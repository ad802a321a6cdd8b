//! # Storage Adapters
//!
//! Implementations of the source and file ports.
//!
//! Available adapters:
//! - `MemoryArray` / `MemoryFile` - In-memory datasets and trees (fast, volatile)
//! - `JsonFile` - Trees loaded from JSON documents on disk

mod json;
mod memory;

pub use json::JsonFile;
pub use memory::{MemoryArray, MemoryFile, Values};
