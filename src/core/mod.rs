//! # Core
//!
//! Pure traversal math. No I/O, no sources, no files.
//!
//! - [`region`]: `DimSlice`, `Region`, `Selector`, `Bounds`
//! - [`walk`]: the odometer that plans block regions
//! - [`accumulate`]: bounded per-variable concatenation
//! - [`range`]: NaN-aware min/max
//! - [`config`]: traversal configuration

pub mod accumulate;
pub mod config;
pub mod range;
pub mod region;
pub mod walk;

pub use accumulate::{Accumulator, Flushed};
pub use config::{ConfigError, TailPolicy, TraversalConfig, DEFAULT_VARIABLES};
pub use range::ValueRange;
pub use region::{Bounds, DimSlice, Region, SelectionError, Selector};
pub use walk::RegionWalk;
