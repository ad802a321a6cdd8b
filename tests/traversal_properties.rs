//! Property-based tests for block traversal and accumulation.
//!
//! Uses proptest to check the partition, block-size, and no-loss
//! invariants over randomly generated shapes, bounds, and budgets.

use std::collections::HashSet;

use chunkwalk::{
    Accumulator, Bounds, MemoryArray, MemoryFile, RecordKind, RegionWalk, Selector, Traversal,
    TraversalConfig,
};
use proptest::prelude::*;

/// Shapes of up to 4 dims with at most a few hundred elements
fn arb_shape() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..7, 0..=4)
}

/// A selector valid for a dimension of length `len`
fn arb_selector(len: usize) -> impl Strategy<Value = Selector> {
    let len = len.max(1);
    prop_oneof![
        Just(Selector::All),
        (0..len).prop_map(Selector::Index),
        (0..len, 0..=len, 1usize..4).prop_map(|(a, b, s)| Selector::stepped(a, b, s)),
    ]
}

fn arb_bounds() -> impl Strategy<Value = Bounds> {
    arb_shape().prop_flat_map(|shape| {
        let sels: Vec<_> = shape.iter().map(|&len| arb_selector(len)).collect();
        (Just(shape), sels).prop_map(|(shape, sels)| {
            Bounds::full(&shape).restrict(&sels).expect("one selector per dim")
        })
    })
}

/// Row-major multi-indices of the whole bounded region
fn expected_indices(bounds: &Bounds) -> Vec<Vec<usize>> {
    if bounds.shape().iter().any(|&d| d == 0) {
        return Vec::new();
    }
    bounds.region().multi_indices()
}

proptest! {
    #[test]
    fn prop_regions_partition_bounds(bounds in arb_bounds(), buf in prop::option::of(1usize..20)) {
        let walked: Vec<Vec<usize>> = RegionWalk::new(&bounds, buf)
            .flat_map(|r| r.multi_indices())
            .collect();

        // same indices, same row-major order: no gap, no overlap
        prop_assert_eq!(walked, expected_indices(&bounds));
    }

    #[test]
    fn prop_blocks_respect_budget(bounds in arb_bounds(), buf in 1usize..20) {
        for region in RegionWalk::new(&bounds, Some(buf)) {
            prop_assert!(region.len() <= buf);
            prop_assert!(region.len() > 0);
        }
    }

    #[test]
    fn prop_unbounded_walk_is_single_block(shape in arb_shape()) {
        let regions: Vec<_> = RegionWalk::new(&Bounds::full(&shape), None).collect();
        if shape.iter().any(|&d| d == 0) {
            prop_assert!(regions.is_empty());
        } else {
            prop_assert_eq!(regions.len(), 1);
            prop_assert_eq!(regions[0].shape(), shape);
        }
    }

    #[test]
    fn prop_regions_are_unique(bounds in arb_bounds(), buf in 1usize..10) {
        let mut seen = HashSet::new();
        for region in RegionWalk::new(&bounds, Some(buf)) {
            prop_assert!(seen.insert(region));
        }
    }

    #[test]
    fn prop_accumulator_never_loses_data(
        blocks in prop::collection::vec(1usize..=8, 0..30),
        cap in 8usize..20,
    ) {
        let mut acc = Accumulator::new(cap);
        let mut next = 0usize;
        let mut out = Vec::new();

        for len in blocks.iter().copied() {
            let block: Vec<f64> = (next..next + len).map(|v| v as f64).collect();
            next += len;
            if let Some(f) = acc.push(&block) {
                prop_assert_eq!(f.accumulated.len(), cap);
                out.extend(f.accumulated);
            }
            prop_assert!(acc.len() <= cap);
        }
        out.extend(acc.drain().unwrap_or_default());

        let expected: Vec<f64> = (0..next).map(|v| v as f64).collect();
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn prop_traversal_reconstructs_stream(
        shape in prop::collection::vec(1usize..6, 1..=3),
        cap in 1usize..15,
    ) {
        let n: usize = shape.iter().product();
        let data: Vec<f64> = (0..n).map(|v| v as f64).collect();
        let file = MemoryFile::new("a").with_array(MemoryArray::new("/temperature", shape, data.clone()));

        let records: Vec<_> = Traversal::new(vec![file], TraversalConfig::new().with_block_size(cap))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();

        let mut stream = Vec::new();
        for (i, r) in records.iter().enumerate() {
            let acc = r.accumulated.as_ref().unwrap();
            let last = i + 1 == records.len();
            match r.kind {
                RecordKind::Block => prop_assert_eq!(acc.len(), cap),
                RecordKind::Flush => prop_assert!(last && acc.len() <= cap),
                RecordKind::Whole => prop_assert!(n < cap),
            }
            stream.extend(acc.iter().copied());
        }
        prop_assert_eq!(stream, data);
    }

    #[test]
    fn prop_stream_order_survives_file_boundaries(
        lens in prop::collection::vec(1usize..30, 1..5),
        cap in 1usize..20,
    ) {
        let mut next = 0usize;
        let files: Vec<MemoryFile> = lens
            .iter()
            .enumerate()
            .map(|(i, &len)| {
                let data: Vec<f64> = (next..next + len).map(|v| v as f64).collect();
                next += len;
                MemoryFile::new(format!("f{}", i))
                    .with_array(MemoryArray::new("/temperature", vec![len], data))
            })
            .collect();

        let stream: Vec<f64> = Traversal::new(files, TraversalConfig::new().with_block_size(cap))
            .unwrap()
            .flat_map(|r| r.unwrap().accumulated.unwrap().to_vec())
            .collect();

        let expected: Vec<f64> = (0..next).map(|v| v as f64).collect();
        prop_assert_eq!(stream, expected);
    }
}
