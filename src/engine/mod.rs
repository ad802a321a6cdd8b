//! # Engine
//!
//! The orchestration layer that wires everything together.
//!
//! This is where:
//! - Regions planned by the core are paired with reads from a source
//! - File namespaces are searched for the requested variables
//! - Blocks flow into per-variable accumulators and out as records

mod cursor;
mod error;
mod record;
mod search;
mod traversal;

pub use cursor::BlockCursor;
pub use error::{TraversalError, TraversalResult};
pub use record::{OutputRecord, RecordKind};
pub use search::{find_variables, VariableMap};
pub use traversal::Traversal;
