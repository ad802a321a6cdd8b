//! # Source Port
//!
//! Read-only access to one N-dimensional array.

use ndarray::ArrayD;

use crate::core::Region;

/// Element type declared by a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Float64,
    Float32,
    Int64,
    Int32,
    UInt8,
    Bool,
    Text,
}

impl DType {
    /// Whether blocks of this type can be read as `f64`
    pub fn is_numeric(&self) -> bool {
        !matches!(self, DType::Text)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DType::Float64 => "float64",
            DType::Float32 => "float32",
            DType::Int64 => "int64",
            DType::Int32 => "int32",
            DType::UInt8 => "uint8",
            DType::Bool => "bool",
            DType::Text => "text",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "float64" | "f64" | "double" => Some(DType::Float64),
            "float32" | "f32" | "float" => Some(DType::Float32),
            "int64" | "i64" => Some(DType::Int64),
            "int32" | "i32" | "int" => Some(DType::Int32),
            "uint8" | "u8" => Some(DType::UInt8),
            "bool" => Some(DType::Bool),
            "text" | "str" | "string" => Some(DType::Text),
            _ => None,
        }
    }
}

/// A read-only N-dimensional array
///
/// Implementations own (or borrow from their file) the underlying data
/// and never change shape after construction.
pub trait ArraySource: Send + Sync {
    /// Full path of the dataset inside its file, e.g. `/ctd/temperature`
    fn name(&self) -> &str;

    /// Extent along each dimension
    fn shape(&self) -> &[usize];

    /// Declared element type
    fn dtype(&self) -> DType;

    /// Materialize the elements selected by `region`
    ///
    /// The returned block has exactly `region.shape()`.
    fn read(&self, region: &Region) -> SourceResult<ArrayD<f64>>;

    /// Local name: the path with any group prefix stripped
    fn local_name(&self) -> &str {
        let name = self.name();
        name.rsplit('/').next().unwrap_or(name)
    }

    /// Number of elements in the whole array
    fn len(&self) -> usize {
        self.shape().iter().product()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialize everything
    fn read_all(&self) -> SourceResult<ArrayD<f64>> {
        self.read(&Region::full(self.shape()))
    }
}

/// Errors raised by sources and files
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to open {file}: {reason}")]
    Open { file: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Content disagrees with the declared shape or type
    #[error("data integrity error in {name}: {reason}")]
    DataIntegrity { name: String, reason: String },

    #[error("region {region} does not fit shape {shape:?} of {name}")]
    RegionMismatch {
        name: String,
        region: String,
        shape: Vec<usize>,
    },
}

pub type SourceResult<T> = Result<T, SourceError>;
