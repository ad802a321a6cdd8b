//! # Python Bindings
//!
//! PyO3 bindings for chunkwalk, so replay pipelines written in Python can
//! walk arrays with the same block plan as the Rust engine.
//!
//! ## Python API
//!
//! ```python
//! from chunkwalk import BlockCursor
//!
//! # A 2 x 5 grid, at most 3 elements per block
//! cursor = BlockCursor(list(range(10)), [2, 5], buf_size=3)
//!
//! for region, values in cursor.blocks():
//!     print(region, values)   # [(0, 1, 1), (0, 3, 1)] [0.0, 1.0, 2.0] ...
//!
//! # Narrow to row 1, columns 1..5 step 2
//! row = cursor.restrict([1, (1, 5, 2)])
//! print(row.shape)            # [1, 2]
//! ```

use std::sync::Arc;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::adapters::storage::MemoryArray;
use crate::core::{Region, Selector};
use crate::engine::BlockCursor;
use crate::ports::ArraySource;

type PyRegion = Vec<(usize, usize, usize)>;

fn region_to_py(region: &Region) -> PyRegion {
    region
        .dims()
        .iter()
        .map(|d| (d.start, d.stop, d.step))
        .collect()
}

/// Python wrapper for a block cursor over an in-memory array
#[pyclass(name = "BlockCursor")]
pub struct PyBlockCursor {
    source: Arc<dyn ArraySource>,
    selectors: Vec<Selector>,
    buf_size: Option<usize>,
}

impl PyBlockCursor {
    /// A fresh Rust cursor; Python cursors are re-iterable, Rust ones are not
    fn cursor(&self) -> PyResult<BlockCursor> {
        let base = BlockCursor::new(Arc::clone(&self.source), self.buf_size);
        if self.selectors.is_empty() {
            return Ok(base);
        }
        base.restrict(&self.selectors)
            .map_err(|e| PyValueError::new_err(format!("{}", e)))
    }
}

#[pymethods]
impl PyBlockCursor {
    /// Create a cursor
    ///
    /// Args:
    ///     data: Row-major values
    ///     shape: Extent of each dimension
    ///     buf_size: Max elements per block (None = one block)
    #[new]
    #[pyo3(signature = (data, shape, buf_size=None))]
    fn new(data: Vec<f64>, shape: Vec<usize>, buf_size: Option<usize>) -> PyResult<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(PyValueError::new_err(format!(
                "shape {:?} needs {} values, got {}",
                shape,
                expected,
                data.len()
            )));
        }

        Ok(Self {
            source: Arc::new(MemoryArray::new("/data", shape, data)),
            selectors: Vec::new(),
            buf_size,
        })
    }

    /// Shape of the bounded region
    #[getter]
    fn shape(&self) -> PyResult<Vec<usize>> {
        Ok(self.cursor()?.shape())
    }

    /// Narrow the bounds
    ///
    /// Args:
    ///     selectors: One entry per leading dimension: an int index,
    ///         a (start, stop) or (start, stop, step) tuple, or None for
    ///         the whole dimension
    ///
    /// Returns:
    ///     BlockCursor: A new cursor; this one is unchanged
    fn restrict(&self, selectors: Vec<Option<PyObject>>, py: Python<'_>) -> PyResult<Self> {
        let parsed = selectors
            .into_iter()
            .map(|s| parse_selector(py, s))
            .collect::<PyResult<Vec<_>>>()?;

        // compose through the Rust cursor so errors surface here
        let restricted = self
            .cursor()?
            .restrict(&parsed)
            .map_err(|e| PyValueError::new_err(format!("{}", e)))?;

        let bounds: Vec<Selector> = restricted
            .bounds()
            .region()
            .dims()
            .iter()
            .map(|d| Selector::stepped(d.start, d.stop, d.step))
            .collect();

        Ok(Self {
            source: Arc::clone(&self.source),
            selectors: bounds,
            buf_size: self.buf_size,
        })
    }

    /// Planned block regions, without reading
    fn regions(&self) -> PyResult<Vec<PyRegion>> {
        Ok(self.cursor()?.regions().map(|r| region_to_py(&r)).collect())
    }

    /// All blocks as (region, flat values) pairs
    fn blocks(&self) -> PyResult<Vec<(PyRegion, Vec<f64>)>> {
        self.cursor()?
            .map(|step| {
                let (region, block) = step.map_err(|e| PyValueError::new_err(format!("{}", e)))?;
                Ok((region_to_py(&region), block.iter().copied().collect()))
            })
            .collect()
    }

    fn __repr__(&self) -> String {
        let shape = self.cursor().map(|c| c.shape()).unwrap_or_default();
        format!("BlockCursor(shape={:?}, buf_size={:?})", shape, self.buf_size)
    }
}

fn parse_selector(py: Python<'_>, obj: Option<PyObject>) -> PyResult<Selector> {
    let Some(obj) = obj else {
        return Ok(Selector::All);
    };
    let obj = obj.bind(py);

    if let Ok(index) = obj.extract::<usize>() {
        return Ok(Selector::Index(index));
    }
    if let Ok((start, stop, step)) = obj.extract::<(usize, usize, usize)>() {
        return Ok(Selector::stepped(start, stop, step));
    }
    if let Ok((start, stop)) = obj.extract::<(usize, usize)>() {
        return Ok(Selector::range(start, stop));
    }

    Err(PyValueError::new_err(format!(
        "unsupported selector: {}",
        obj.repr()?
    )))
}

/// chunkwalk Python module
#[pymodule]
fn chunkwalk(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyBlockCursor>()?;

    m.add("__doc__", "chunkwalk: memory-bounded block traversal of large arrays")?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
