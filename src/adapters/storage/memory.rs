//! # Memory Storage Adapter
//!
//! In-memory arrays and files.
//! Fast, volatile, and fully deterministic.
//!
//! Good for:
//! - Testing
//! - Data already resident in memory
//! - Building trees handed over by another loader (see `JsonFile`)

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ndarray::{ArrayD, ArrayView, IxDyn, Slice};
use tracing::debug;

use crate::core::Region;
use crate::ports::{ArrayFile, ArraySource, DType, Node, OpenFile, SourceError, SourceResult};

/// Raw content of a dataset, as stored
#[derive(Debug, Clone, PartialEq)]
pub enum Values {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl Values {
    pub fn len(&self) -> usize {
        match self {
            Values::Numeric(v) => v.len(),
            Values::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory dataset
///
/// Shape and content are kept as declared; disagreements between them
/// surface as [`SourceError::DataIntegrity`] on the first read.
#[derive(Debug, Clone)]
pub struct MemoryArray {
    /// Full path inside the file
    name: String,

    /// Declared shape
    shape: Vec<usize>,

    /// Declared element type
    dtype: DType,

    /// Row-major content
    values: Values,
}

impl MemoryArray {
    /// A float64 dataset
    pub fn new(name: impl Into<String>, shape: Vec<usize>, data: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            shape,
            dtype: DType::Float64,
            values: Values::Numeric(data),
        }
    }

    /// A float64 dataset from an existing array
    pub fn from_array(name: impl Into<String>, array: ArrayD<f64>) -> Self {
        let shape = array.shape().to_vec();
        let data = if array.is_standard_layout() {
            array.into_raw_vec()
        } else {
            array.iter().copied().collect()
        };
        Self::new(name, shape, data)
    }

    /// A text dataset; never readable as numbers
    pub fn text(name: impl Into<String>, shape: Vec<usize>, data: Vec<String>) -> Self {
        Self {
            name: name.into(),
            shape,
            dtype: DType::Text,
            values: Values::Text(data),
        }
    }

    /// Any declared type over raw values
    pub fn with_values(
        name: impl Into<String>,
        shape: Vec<usize>,
        dtype: DType,
        values: Values,
    ) -> Self {
        Self {
            name: name.into(),
            shape,
            dtype,
            values,
        }
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    /// Borrow the content as numbers, checking it against the declaration
    fn numeric(&self) -> SourceResult<&[f64]> {
        let data = match (&self.values, self.dtype.is_numeric()) {
            (Values::Numeric(data), true) => data,
            _ => {
                return Err(SourceError::DataIntegrity {
                    name: self.name.clone(),
                    reason: format!("element type {} is not numeric", self.dtype.as_str()),
                })
            }
        };

        let expected: usize = self.shape.iter().product();
        if data.len() != expected {
            return Err(SourceError::DataIntegrity {
                name: self.name.clone(),
                reason: format!(
                    "declared shape {:?} holds {} elements but {} were stored",
                    self.shape,
                    expected,
                    data.len()
                ),
            });
        }

        Ok(data)
    }
}

impl ArraySource for MemoryArray {
    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn dtype(&self) -> DType {
        self.dtype
    }

    fn read(&self, region: &Region) -> SourceResult<ArrayD<f64>> {
        let data = self.numeric()?;

        if !region.fits(&self.shape) {
            return Err(SourceError::RegionMismatch {
                name: self.name.clone(),
                region: region.to_string(),
                shape: self.shape.clone(),
            });
        }

        let view = ArrayView::from_shape(IxDyn(&self.shape), data).map_err(|e| {
            SourceError::DataIntegrity {
                name: self.name.clone(),
                reason: e.to_string(),
            }
        })?;

        let dims = region.dims();
        let block = view.slice_each_axis(|ax| {
            let d = dims[ax.axis.index()];
            let step = d.step.min(isize::MAX as usize) as isize;
            Slice::new(d.start as isize, Some(d.stop as isize), step)
        });

        Ok(block.to_owned())
    }
}

/// In-memory file: a fixed tree of nodes
///
/// Tracks how many handles are open so callers can check that a
/// traversal released everything it acquired.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    label: String,
    root: Vec<Node>,
    open_handles: Arc<AtomicUsize>,
}

impl MemoryFile {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            root: Vec::new(),
            open_handles: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Add a top-level node
    pub fn with_node(mut self, node: Node) -> Self {
        self.root.push(node);
        self
    }

    /// Add a top-level dataset
    pub fn with_array(self, array: MemoryArray) -> Self {
        self.with_node(Node::Array(Arc::new(array)))
    }

    pub fn root(&self) -> &[Node] {
        &self.root
    }

    /// Handles currently open on this file
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }
}

impl ArrayFile for MemoryFile {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn open(&self) -> SourceResult<Box<dyn OpenFile>> {
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        debug!(file = %self.label, "opened in-memory file");

        Ok(Box::new(MemoryHandle {
            label: self.label.clone(),
            root: self.root.clone(),
            open_handles: Arc::clone(&self.open_handles),
        }))
    }
}

/// Open handle on a [`MemoryFile`]
struct MemoryHandle {
    label: String,
    root: Vec<Node>,
    open_handles: Arc<AtomicUsize>,
}

impl OpenFile for MemoryHandle {
    fn root(&self) -> &[Node] {
        &self.root
    }
}

impl Drop for MemoryHandle {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
        debug!(file = %self.label, "closed in-memory file");
    }
}
