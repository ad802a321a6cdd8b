//! Benchmarks for region planning, block reads, and full traversals.

use std::sync::Arc;

use chunkwalk::{BlockCursor, Bounds, MemoryArray, MemoryFile, RegionWalk, Traversal, TraversalConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn grid(shape: &[usize]) -> MemoryArray {
    let n = shape.iter().product::<usize>();
    MemoryArray::new("/temperature", shape.to_vec(), (0..n).map(|v| v as f64).collect())
}

fn bench_region_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_walk");
    let bounds = Bounds::full(&[64, 128, 256]);

    for buf in [100usize, 4_096, 65_536] {
        group.bench_with_input(BenchmarkId::from_parameter(buf), &buf, |b, &buf| {
            b.iter(|| RegionWalk::new(black_box(&bounds), Some(buf)).count())
        });
    }
    group.finish();
}

fn bench_block_cursor(c: &mut Criterion) {
    let source = Arc::new(grid(&[256, 1024]));

    c.bench_function("block_cursor_256x1024_buf_4096", |b| {
        b.iter(|| {
            BlockCursor::new(source.clone(), Some(4_096))
                .map(|step| step.map(|(_, block)| block.len()).unwrap_or(0))
                .sum::<usize>()
        })
    });
}

fn bench_traversal(c: &mut Criterion) {
    let file = MemoryFile::new("bench").with_array(grid(&[512, 512]));

    c.bench_function("traversal_512x512_block_1000", |b| {
        b.iter(|| {
            let config = TraversalConfig::new().with_block_size(1_000);
            Traversal::new(vec![file.clone()], config)
                .map(|t| t.filter_map(Result::ok).count())
                .unwrap_or(0)
        })
    });
}

criterion_group!(benches, bench_region_walk, bench_block_cursor, bench_traversal);
criterion_main!(benches);
