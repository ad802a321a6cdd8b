//! # Regions
//!
//! Index regions over an N-dimensional array.
//!
//! A [`Region`] is one `(start, stop, step)` triple per dimension. It is
//! both the traversal bounds of a cursor and the slice a cursor reads at
//! each step. [`Bounds`] is a region anchored to a source shape that can
//! be narrowed with [`Selector`]s without touching its parent.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One dimension of a region: `start..stop` with a stride of `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimSlice {
    pub start: usize,
    pub stop: usize,
    pub step: usize,
}

impl DimSlice {
    pub fn new(start: usize, stop: usize, step: usize) -> Self {
        Self { start, stop, step }
    }

    /// The whole of a dimension of length `len`
    pub fn full(len: usize) -> Self {
        Self::new(0, len, 1)
    }

    /// Number of indices selected along this dimension
    ///
    /// `max(0, floor((stop - start - 1) / step) + 1)`; a non-positive
    /// extent selects nothing.
    pub fn len(&self) -> usize {
        if self.stop <= self.start || self.step == 0 {
            0
        } else {
            (self.stop - self.start - 1) / self.step + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the absolute indices selected by this slice
    pub fn indices(&self) -> impl Iterator<Item = usize> {
        let step = self.step.max(1);
        (self.start..self.stop).step_by(step)
    }
}

impl fmt::Display for DimSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.step == 1 {
            write!(f, "{}:{}", self.start, self.stop)
        } else {
            write!(f, "{}:{}:{}", self.start, self.stop, self.step)
        }
    }
}

/// An ordered sequence of [`DimSlice`]s, one per dimension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Region(Vec<DimSlice>);

impl Region {
    pub fn new(dims: Vec<DimSlice>) -> Self {
        Self(dims)
    }

    /// The region covering an entire array of the given shape
    pub fn full(shape: &[usize]) -> Self {
        Self(shape.iter().map(|&len| DimSlice::full(len)).collect())
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    pub fn dims(&self) -> &[DimSlice] {
        &self.0
    }

    /// Extent of the region along each dimension
    pub fn shape(&self) -> Vec<usize> {
        self.0.iter().map(DimSlice::len).collect()
    }

    /// Number of elements selected (1 for a zero-dimensional region)
    pub fn len(&self) -> usize {
        self.0.iter().map(DimSlice::len).product()
    }

    /// True when any dimension selects nothing
    pub fn is_empty(&self) -> bool {
        self.0.iter().any(DimSlice::is_empty)
    }

    /// Whether every index of this region lies inside `shape`
    pub fn fits(&self, shape: &[usize]) -> bool {
        self.ndim() == shape.len()
            && self
                .0
                .iter()
                .zip(shape)
                .all(|(d, &len)| d.step >= 1 && d.start <= d.stop && d.stop <= len)
    }

    /// Row-major multi-indices covered by this region
    pub fn multi_indices(&self) -> Vec<Vec<usize>> {
        let mut out: Vec<Vec<usize>> = vec![Vec::new()];
        for dim in &self.0 {
            let mut next = Vec::with_capacity(out.len() * dim.len());
            for prefix in &out {
                for idx in dim.indices() {
                    let mut v = prefix.clone();
                    v.push(idx);
                    next.push(v);
                }
            }
            out = next;
        }
        out
    }
}

impl From<Vec<DimSlice>> for Region {
    fn from(dims: Vec<DimSlice>) -> Self {
        Self(dims)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

/// One entry of a bounds-narrowing request
///
/// Selectors are relative to the bounds they narrow: `Index(0)` is the
/// first index *of the current bounds*, not of the underlying array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    /// Keep the whole dimension
    All,
    /// A single position, kept as a length-1 slice
    Index(usize),
    /// `start..stop` by `step`; `None` falls back to the current bounds
    Range {
        start: Option<usize>,
        stop: Option<usize>,
        step: Option<usize>,
    },
    /// Stands for as many `All` entries as needed to cover the remaining dims
    Ellipsis,
}

impl Selector {
    pub fn range(start: usize, stop: usize) -> Self {
        Selector::Range {
            start: Some(start),
            stop: Some(stop),
            step: None,
        }
    }

    pub fn stepped(start: usize, stop: usize, step: usize) -> Self {
        Selector::Range {
            start: Some(start),
            stop: Some(stop),
            step: Some(step),
        }
    }
}

/// Errors raised while narrowing bounds
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("too many selectors: got {got} for {ndim} dimensions")]
    TooManySelectors { got: usize, ndim: usize },

    #[error("only one ellipsis is allowed per selection")]
    MultipleEllipsis,

    #[error("step must be at least 1 (dimension {dim})")]
    ZeroStep { dim: usize },
}

/// Fixed traversal bounds over an array of a known shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounds {
    region: Region,
}

impl Bounds {
    /// Bounds covering the full shape with unit steps
    pub fn full(shape: &[usize]) -> Self {
        Self {
            region: Region::full(shape),
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn ndim(&self) -> usize {
        self.region.ndim()
    }

    /// Computed shape of the bounded region
    pub fn shape(&self) -> Vec<usize> {
        self.region.shape()
    }

    /// Narrow these bounds, returning new bounds
    ///
    /// Steps compose multiplicatively, starts additively, and the new stop
    /// is clipped to the current stop. Missing trailing selectors keep the
    /// whole dimension.
    pub fn restrict(&self, selectors: &[Selector]) -> Result<Bounds, SelectionError> {
        let fixed = normalize(selectors, self.ndim())?;

        let dims = self
            .region
            .dims()
            .iter()
            .zip(fixed)
            .enumerate()
            .map(|(dim, (parent, sel))| {
                let (start, stop, step) = match sel {
                    Selector::All | Selector::Ellipsis => (None, None, None),
                    Selector::Index(i) => (Some(i), Some(i.saturating_add(1)), Some(1)),
                    Selector::Range { start, stop, step } => (start, stop, step),
                };
                if step == Some(0) {
                    return Err(SelectionError::ZeroStep { dim });
                }

                let extent = parent.stop.saturating_sub(parent.start);
                // out-of-range selectors clip to an empty dimension
                let new_start = parent.start.saturating_add(start.unwrap_or(0));
                let new_stop = parent
                    .start
                    .saturating_add(stop.unwrap_or(extent))
                    .min(parent.stop);
                let new_step = parent.step.saturating_mul(step.unwrap_or(1));
                Ok(DimSlice::new(new_start, new_stop, new_step))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Bounds {
            region: Region::new(dims),
        })
    }
}

/// Expand ellipsis and pad to `ndim` selectors
fn normalize(selectors: &[Selector], ndim: usize) -> Result<Vec<Selector>, SelectionError> {
    let ellipses = selectors
        .iter()
        .filter(|s| matches!(s, Selector::Ellipsis))
        .count();
    if ellipses > 1 {
        return Err(SelectionError::MultipleEllipsis);
    }

    let explicit = selectors.len() - ellipses;
    if explicit > ndim {
        return Err(SelectionError::TooManySelectors {
            got: explicit,
            ndim,
        });
    }

    let mut fixed = Vec::with_capacity(ndim);
    for sel in selectors {
        match sel {
            Selector::Ellipsis => {
                fixed.extend(std::iter::repeat(Selector::All).take(ndim - explicit));
            }
            other => fixed.push(*other),
        }
    }
    fixed.resize(ndim, Selector::All);
    Ok(fixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dim_slice_len() {
        assert_eq!(DimSlice::new(0, 10, 1).len(), 10);
        assert_eq!(DimSlice::new(0, 10, 3).len(), 4);
        assert_eq!(DimSlice::new(2, 3, 5).len(), 1);
        assert_eq!(DimSlice::new(5, 5, 1).len(), 0);
        assert_eq!(DimSlice::new(7, 5, 1).len(), 0);
    }

    #[test]
    fn test_region_len_and_scalar() {
        let r = Region::full(&[2, 5]);
        assert_eq!(r.len(), 10);
        assert_eq!(r.shape(), vec![2, 5]);

        let scalar = Region::full(&[]);
        assert_eq!(scalar.len(), 1);
        assert!(!scalar.is_empty());
    }

    #[test]
    fn test_region_display() {
        let r = Region::new(vec![DimSlice::new(0, 1, 1), DimSlice::new(3, 9, 2)]);
        assert_eq!(r.to_string(), "[0:1, 3:9:2]");
    }

    #[test]
    fn test_multi_indices_row_major() {
        let r = Region::new(vec![DimSlice::new(1, 3, 1), DimSlice::new(0, 4, 2)]);
        assert_eq!(
            r.multi_indices(),
            vec![vec![1, 0], vec![1, 2], vec![2, 0], vec![2, 2]]
        );
    }

    #[test]
    fn test_restrict_pads_missing_dims() {
        let b = Bounds::full(&[4, 6]);
        let narrowed = b.restrict(&[Selector::range(1, 3)]).unwrap();
        assert_eq!(
            narrowed.region().dims(),
            &[DimSlice::new(1, 3, 1), DimSlice::new(0, 6, 1)]
        );
        // parent untouched
        assert_eq!(b.shape(), vec![4, 6]);
    }

    #[test]
    fn test_restrict_index_is_length_one() {
        let b = Bounds::full(&[4, 6]);
        let narrowed = b.restrict(&[Selector::Index(2), Selector::All]).unwrap();
        assert_eq!(narrowed.shape(), vec![1, 6]);
        assert_eq!(narrowed.region().dims()[0], DimSlice::new(2, 3, 1));
    }

    #[test]
    fn test_restrict_composes_with_parent() {
        let b = Bounds::full(&[20]);
        let first = b.restrict(&[Selector::stepped(2, 18, 2)]).unwrap();
        let second = first.restrict(&[Selector::stepped(1, 100, 3)]).unwrap();

        // start adds, step multiplies, stop clips to the parent
        assert_eq!(second.region().dims()[0], DimSlice::new(3, 18, 6));
    }

    #[test]
    fn test_restrict_start_past_stop_is_empty() {
        let b = Bounds::full(&[5]);
        let narrowed = b.restrict(&[Selector::range(7, 9)]).unwrap();
        assert_eq!(narrowed.shape(), vec![0]);
    }

    #[test]
    fn test_restrict_huge_selectors_saturate() {
        let b = Bounds::full(&[5]);
        let narrowed = b.restrict(&[Selector::Index(usize::MAX)]).unwrap();
        assert_eq!(narrowed.shape(), vec![0]);

        let inner = Bounds::full(&[10]).restrict(&[Selector::range(2, 8)]).unwrap();
        let narrowed = inner
            .restrict(&[Selector::range(usize::MAX, usize::MAX)])
            .unwrap();
        assert_eq!(narrowed.shape(), vec![0]);

        let strided = inner
            .restrict(&[Selector::stepped(1, 6, usize::MAX)])
            .unwrap();
        assert_eq!(strided.region().dims()[0], DimSlice::new(3, 8, usize::MAX));
        assert_eq!(strided.shape(), vec![1]);
    }

    #[test]
    fn test_restrict_ellipsis() {
        let b = Bounds::full(&[3, 4, 5]);
        let narrowed = b
            .restrict(&[Selector::Ellipsis, Selector::Index(4)])
            .unwrap();
        assert_eq!(narrowed.shape(), vec![3, 4, 1]);
    }

    #[test]
    fn test_restrict_errors() {
        let b = Bounds::full(&[3]);
        assert_eq!(
            b.restrict(&[Selector::All, Selector::All]),
            Err(SelectionError::TooManySelectors { got: 2, ndim: 1 })
        );
        assert_eq!(
            b.restrict(&[Selector::stepped(0, 3, 0)]),
            Err(SelectionError::ZeroStep { dim: 0 })
        );
        assert_eq!(
            b.restrict(&[Selector::Ellipsis, Selector::Ellipsis]),
            Err(SelectionError::MultipleEllipsis)
        );
    }
}
