//! Benchmarks for the segmented-stream edit overlay: scattered inserts,
//! removals, and the single-pass commit.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use relic_stream::{shared, MemStream, SegmentedStream, Stream, Whence};

/// Build a backing of `len` bytes with a repeating pattern.
fn test_backing(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn bench_insert_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("seg_insert_commit");
    for size in [4 * 1024usize, 64 * 1024, 512 * 1024] {
        let base = test_backing(size);
        group.bench_with_input(BenchmarkId::new("bytes", size), &size, |b, &size| {
            b.iter(|| {
                let backing = shared(MemStream::from_vec(base.clone()));
                let mut seg = SegmentedStream::new(backing.clone()).unwrap();
                // Sixteen scattered 64-byte insertions.
                for i in 0..16u64 {
                    let at = (size as u64 / 16) * i;
                    seg.seek_write(at as i64, Whence::Start).unwrap();
                    seg.insert(64);
                    seg.write_all(&[0xAA; 64]).unwrap();
                }
                seg.commit(|n| backing.borrow_mut().truncate(n)).unwrap();
                black_box(backing.borrow_mut().size().unwrap());
            });
        });
    }
    group.finish();
}

fn bench_remove_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("seg_remove_commit");
    for size in [4 * 1024usize, 64 * 1024, 512 * 1024] {
        let base = test_backing(size);
        group.bench_with_input(BenchmarkId::new("bytes", size), &size, |b, &size| {
            b.iter(|| {
                let backing = shared(MemStream::from_vec(base.clone()));
                let mut seg = SegmentedStream::new(backing.clone()).unwrap();
                for i in (0..8u64).rev() {
                    let at = (size as u64 / 8) * i;
                    seg.seek_write(at as i64, Whence::Start).unwrap();
                    seg.remove(32).unwrap();
                }
                seg.commit(|n| backing.borrow_mut().truncate(n)).unwrap();
                black_box(backing.borrow_mut().size().unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert_commit, bench_remove_commit);
criterion_main!(benches);
