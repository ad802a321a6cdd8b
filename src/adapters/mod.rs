//! # Adapters
//!
//! Swappable implementations of port traits.
//!
//! - Storage adapters: in-memory arrays and files, JSON files
//! - Python bindings (when enabled)
//!
//! The engine never names an adapter; anything implementing
//! `ArraySource` / `ArrayFile` can be traversed.

pub mod storage;

#[cfg(feature = "python")]
pub mod python;
