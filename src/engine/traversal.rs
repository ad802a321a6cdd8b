//! # Traversal
//!
//! The orchestrator: files in, records out.
//!
//! For each file, in order:
//! 1. open it (the handle is held until its variables are exhausted)
//! 2. find the requested variables in its namespace
//! 3. for each variable, in configured order, either read a small dataset
//!    whole or drive a [`BlockCursor`] over it, feeding every block into
//!    the variable's [`Accumulator`]
//!
//! Accumulators live for the whole traversal, so a variable split over
//! several files fills its buffers across file boundaries.
//!
//! ```rust
//! use chunkwalk::{MemoryArray, MemoryFile, Traversal, TraversalConfig};
//!
//! let file = MemoryFile::new("a.h5")
//!     .with_array(MemoryArray::new("/temperature", vec![100], vec![4.0; 100]));
//! let config = TraversalConfig::new().with_block_size(40);
//!
//! let sizes: Vec<usize> = Traversal::new(vec![file], config)
//!     .unwrap()
//!     .map(|r| r.unwrap().accumulated_len())
//!     .collect();
//! assert_eq!(sizes, vec![40, 40, 20]);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use ndarray::{Array1, ArrayD};
use tracing::{debug, warn};

use crate::core::{Accumulator, Region, Selector, TailPolicy, TraversalConfig, ValueRange};
use crate::ports::{ArrayFile, ArraySource, OpenFile};

use super::cursor::BlockCursor;
use super::error::{TraversalError, TraversalResult};
use super::record::{OutputRecord, RecordKind};
use super::search::find_variables;

/// Lazy stream of [`OutputRecord`]s over a set of files
///
/// Errors for one dataset or file are yielded in-line and the traversal
/// moves on; dropping the traversal early releases any open file.
pub struct Traversal<F: ArrayFile> {
    config: TraversalConfig,
    files: VecDeque<F>,
    current: Option<OpenState>,
    variables: HashMap<String, VariableState>,
    tail: Option<VecDeque<String>>,
    records: usize,
}

/// The file being read and what is left to read in it
struct OpenState {
    label: String,
    pending: VecDeque<(String, Arc<dyn ArraySource>)>,
    active: Option<(String, BlockCursor)>,
    // last field: released after the cursor
    _handle: Box<dyn OpenFile>,
}

/// Accumulation state for one variable across the whole traversal
struct VariableState {
    accumulator: Accumulator,
    file: String,
    dataset: String,
    region: Region,
}

/// One block pulled from the active cursor
struct Step {
    variable: String,
    file: String,
    dataset: String,
    result: crate::ports::SourceResult<(Region, ArrayD<f64>)>,
}

impl<F: ArrayFile> Traversal<F> {
    /// Start a traversal
    ///
    /// Nothing is opened until the first record is pulled.
    pub fn new(files: Vec<F>, config: TraversalConfig) -> TraversalResult<Self> {
        if files.is_empty() {
            return Err(TraversalError::NoSourcesProvided);
        }
        config.validate()?;

        debug!(
            files = files.len(),
            variables = ?config.variable_names,
            block_size = ?config.concatenate_block_size,
            bounds = ?config.bounds,
            "starting traversal"
        );

        Ok(Self {
            config,
            files: files.into(),
            current: None,
            variables: HashMap::new(),
            tail: None,
            records: 0,
        })
    }

    pub fn config(&self) -> &TraversalConfig {
        &self.config
    }

    /// Records emitted so far
    pub fn records_emitted(&self) -> usize {
        self.records
    }

    /// Elements currently held in a variable's buffer
    pub fn buffered(&self, variable: &str) -> usize {
        self.variables
            .get(variable)
            .map_or(0, |v| v.accumulator.len())
    }

    // ========================================================================
    // FILES
    // ========================================================================

    /// Open the next file that holds at least one requested variable
    ///
    /// Returns `Some(Err)` for a file that failed to open, `None` when
    /// the file list is exhausted.
    fn open_next(&mut self) -> Option<TraversalResult<()>> {
        while let Some(file) = self.files.pop_front() {
            let label = file.label();
            let handle = match file.open() {
                Ok(handle) => handle,
                Err(e) => {
                    warn!(file = %label, error = %e, "skipping file that failed to open");
                    return Some(Err(e.into()));
                }
            };
            debug!(file = %label, "reading file");

            let mut found = find_variables(handle.root(), &self.config.variable_names);
            if found.is_empty() {
                debug!(file = %label, "no requested variable in file");
                continue;
            }

            let pending: VecDeque<_> = self
                .config
                .variable_names
                .iter()
                .filter_map(|name| found.remove(name).map(|src| (name.clone(), src)))
                .collect();
            debug!(file = %label, variables = pending.len(), "variables found");

            self.current = Some(OpenState {
                label,
                pending,
                active: None,
                _handle: handle,
            });
            return Some(Ok(()));
        }
        None
    }

    // ========================================================================
    // VARIABLES
    // ========================================================================

    /// Begin reading one variable of the open file
    ///
    /// Small datasets are answered immediately with a `Whole` record,
    /// unless the variable still buffers elements from an earlier file.
    fn start_variable(
        &mut self,
        name: String,
        source: Arc<dyn ArraySource>,
    ) -> Option<TraversalResult<OutputRecord>> {
        let state = self.current.as_mut()?;
        let block_size = self.config.concatenate_block_size;

        if !source.dtype().is_numeric() {
            let reason = format!("element type {} is not numeric", source.dtype().as_str());
            warn!(variable = %name, file = %state.label, %reason, "skipping dataset");
            return Some(Err(TraversalError::DataIntegrity {
                variable: name,
                file: state.label.clone(),
                reason,
            }));
        }

        // a pending tail must be emitted before this dataset's elements,
        // so only an empty buffer lets a small dataset skip the cursor
        let pending_tail = self
            .variables
            .get(&name)
            .map_or(false, |v| !v.accumulator.is_empty());
        if let Some(size) = block_size {
            if source.len() < size && !pending_tail {
                return Some(whole_record(&name, &state.label, source.as_ref()));
            }
        }

        let mut cursor = BlockCursor::new(Arc::clone(&source), block_size);
        // bounds apply along the first dimension; scalars have none
        if let Some((start, stop)) = self.config.bounds.filter(|_| !source.shape().is_empty()) {
            cursor = match cursor.restrict(&[Selector::range(start, stop)]) {
                Ok(c) => c,
                Err(e) => return Some(Err(e)),
            };
        }
        debug!(
            variable = %name,
            dataset = source.name(),
            shape = ?cursor.shape(),
            "traversing dataset"
        );

        state.active = Some((name, cursor));
        None
    }

    /// Turn one block into a record, or absorb it silently
    fn on_block(&mut self, step: Step) -> Option<TraversalResult<OutputRecord>> {
        let (region, block) = match step.result {
            Ok(ok) => ok,
            Err(e) => {
                warn!(variable = %step.variable, file = %step.file, error = %e, "read failed");
                return Some(Err(TraversalError::in_variable(
                    e,
                    &step.variable,
                    &step.file,
                )));
            }
        };
        let range = ValueRange::of(block.iter());

        let Some(capacity) = self.config.concatenate_block_size else {
            return Some(Ok(OutputRecord {
                variable_name: step.variable,
                file: step.file,
                dataset: step.dataset,
                kind: RecordKind::Block,
                current_region: region,
                range,
                current_block: block,
                accumulated: None,
                overflow: None,
            }));
        };

        let flat: Vec<f64> = block.iter().copied().collect();
        let state = self
            .variables
            .entry(step.variable.clone())
            .or_insert_with(|| VariableState {
                accumulator: Accumulator::new(capacity),
                file: String::new(),
                dataset: String::new(),
                region: Region::default(),
            });
        state.file = step.file.clone();
        state.dataset = step.dataset.clone();
        state.region = region.clone();

        let flushed = state.accumulator.push(&flat)?;
        Some(Ok(OutputRecord {
            variable_name: step.variable,
            file: step.file,
            dataset: step.dataset,
            kind: RecordKind::Block,
            current_region: region,
            range,
            current_block: block,
            accumulated: Some(Array1::from(flushed.accumulated)),
            overflow: Some(Array1::from(flushed.overflow)),
        }))
    }

    /// Pull the next block of the active cursor, if any
    fn pull(&mut self) -> Option<Step> {
        let state = self.current.as_mut()?;
        let (variable, cursor) = state.active.as_mut()?;

        match cursor.next() {
            Some(result) => Some(Step {
                variable: variable.clone(),
                file: state.label.clone(),
                dataset: cursor.source().name().to_string(),
                result,
            }),
            None => {
                state.active = None;
                None
            }
        }
    }

    // ========================================================================
    // END OF STREAM
    // ========================================================================

    /// Next leftover buffer to hand out
    fn next_tail(&mut self) -> Option<OutputRecord> {
        if self.tail.is_none() {
            let names = match self.config.tail {
                TailPolicy::Flush => self.config.variable_names.iter().cloned().collect(),
                TailPolicy::Drop => {
                    for (name, state) in &self.variables {
                        if !state.accumulator.is_empty() {
                            debug!(
                                variable = %name,
                                dropped = state.accumulator.len(),
                                "dropping partial buffer at end of stream"
                            );
                        }
                    }
                    VecDeque::new()
                }
            };
            self.tail = Some(names);
        }

        while let Some(name) = self.tail.as_mut()?.pop_front() {
            let Some(state) = self.variables.get_mut(&name) else {
                continue;
            };
            let Some(rest) = state.accumulator.drain() else {
                continue;
            };

            let range = ValueRange::of(rest.iter());
            return Some(OutputRecord {
                variable_name: name,
                file: state.file.clone(),
                dataset: state.dataset.clone(),
                kind: RecordKind::Flush,
                current_region: state.region.clone(),
                range,
                current_block: ArrayD::zeros(vec![0]),
                accumulated: Some(Array1::from(rest)),
                overflow: None,
            });
        }
        None
    }

    fn emit(&mut self, record: OutputRecord) -> Option<TraversalResult<OutputRecord>> {
        self.records += 1;
        Some(Ok(record))
    }
}

impl<F: ArrayFile> Iterator for Traversal<F> {
    type Item = TraversalResult<OutputRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(step) = self.pull() {
                match self.on_block(step) {
                    Some(Ok(record)) => return self.emit(record),
                    Some(Err(e)) => return Some(Err(e)),
                    None => continue,
                }
            }

            if let Some(state) = self.current.as_mut() {
                if state.active.is_some() {
                    continue;
                }
                match state.pending.pop_front() {
                    Some((name, source)) => match self.start_variable(name, source) {
                        Some(Ok(record)) => return self.emit(record),
                        Some(Err(e)) => return Some(Err(e)),
                        None => continue,
                    },
                    None => {
                        if let Some(done) = self.current.take() {
                            debug!(file = %done.label, "file exhausted");
                        }
                        continue;
                    }
                }
            }

            if self.tail.is_none() {
                match self.open_next() {
                    Some(Ok(())) => continue,
                    Some(Err(e)) => return Some(Err(e)),
                    None => {}
                }
            }

            let record = self.next_tail()?;
            return self.emit(record);
        }
    }
}

/// A dataset small enough to read in one piece
fn whole_record(
    name: &str,
    file: &str,
    source: &dyn ArraySource,
) -> TraversalResult<OutputRecord> {
    let block = source
        .read_all()
        .map_err(|e| TraversalError::in_variable(e, name, file))?;
    let flat = Array1::from_iter(block.iter().copied());

    Ok(OutputRecord {
        variable_name: name.to_string(),
        file: file.to_string(),
        dataset: source.name().to_string(),
        kind: RecordKind::Whole,
        current_region: Region::full(source.shape()),
        range: ValueRange::of(block.iter()),
        current_block: block,
        accumulated: Some(flat),
        overflow: None,
    })
}
