//! # JSON File Adapter
//!
//! Array files described as JSON documents on disk.
//!
//! ```text
//! {
//!   "datasets": {
//!     "time": { "shape": [3], "data": [0, 1, 2] }
//!   },
//!   "groups": {
//!     "ctd": {
//!       "datasets": {
//!         "temperature": { "shape": [3], "dtype": "float32", "data": [4.1, null, 4.3] },
//!         "station":     { "shape": [1], "dtype": "text", "data": ["A7"] }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! `null` reads as NaN. The whole tree is loaded on `open` and released
//! when the handle is dropped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::memory::{MemoryArray, Values};
use crate::ports::{ArrayFile, DType, Group, Node, OpenFile, SourceError, SourceResult};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JsonGroup {
    groups: BTreeMap<String, JsonGroup>,
    datasets: BTreeMap<String, JsonDataset>,
}

#[derive(Debug, Deserialize)]
struct JsonDataset {
    shape: Vec<usize>,
    #[serde(default)]
    dtype: Option<String>,
    data: Vec<Value>,
}

/// An array file stored as JSON
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a document into top-level nodes
    pub fn parse(text: &str) -> SourceResult<Vec<Node>> {
        let doc: JsonGroup = serde_json::from_str(text)?;
        build_nodes("", doc)
    }
}

impl ArrayFile for JsonFile {
    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> SourceResult<Box<dyn OpenFile>> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| SourceError::Open {
            file: self.label(),
            reason: e.to_string(),
        })?;
        let root = Self::parse(&text)?;
        debug!(file = %self.label(), nodes = root.len(), "opened JSON array file");

        Ok(Box::new(JsonHandle {
            label: self.label(),
            root,
        }))
    }
}

struct JsonHandle {
    label: String,
    root: Vec<Node>,
}

impl OpenFile for JsonHandle {
    fn root(&self) -> &[Node] {
        &self.root
    }
}

impl Drop for JsonHandle {
    fn drop(&mut self) {
        debug!(file = %self.label, "closed JSON array file");
    }
}

fn build_nodes(prefix: &str, group: JsonGroup) -> SourceResult<Vec<Node>> {
    let mut nodes = Vec::with_capacity(group.groups.len() + group.datasets.len());

    for (name, dataset) in group.datasets {
        let path = format!("{}/{}", prefix, name);
        nodes.push(Node::Array(Arc::new(build_dataset(path, dataset)?)));
    }

    for (name, child) in group.groups {
        let path = format!("{}/{}", prefix, name);
        let children = build_nodes(&path, child)?;
        nodes.push(Node::Group(Group {
            name: path,
            children,
        }));
    }

    Ok(nodes)
}

fn build_dataset(path: String, dataset: JsonDataset) -> SourceResult<MemoryArray> {
    let dtype = match dataset.dtype.as_deref() {
        Some(s) => DType::from_str(s).ok_or_else(|| SourceError::DataIntegrity {
            name: path.clone(),
            reason: format!("unknown dtype {:?}", s),
        })?,
        None if dataset.data.iter().any(Value::is_string) => DType::Text,
        None => DType::Float64,
    };

    let values = if dtype.is_numeric() {
        let numbers = dataset
            .data
            .iter()
            .map(|v| match v {
                Value::Null => Ok(f64::NAN),
                Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
                Value::Number(n) => n.as_f64().ok_or_else(|| integrity(&path, v)),
                other => Err(integrity(&path, other)),
            })
            .collect::<SourceResult<Vec<f64>>>()?;
        Values::Numeric(numbers)
    } else {
        Values::Text(
            dataset
                .data
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        )
    };

    Ok(MemoryArray::with_values(path, dataset.shape, dtype, values))
}

fn integrity(path: &str, value: &Value) -> SourceError {
    SourceError::DataIntegrity {
        name: path.to_string(),
        reason: format!("non-numeric element {}", value),
    }
}
