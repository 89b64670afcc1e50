// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

use canopy_packed::PackedRTreeBuilder;
use canopy_rtree::{Entry, Envelope, RTree};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Envelope> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Envelope::new(x0, y0, x0 + cell, y0 + cell));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_rects(count: usize, max_w: f64, max_h: f64, rect_w: f64, rect_h: f64) -> Vec<Envelope> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        let x0 = rng.next_f64() * (max_w - rect_w).max(1.0);
        let y0 = rng.next_f64() * (max_h - rect_h).max(1.0);
        out.push(Envelope::new(x0, y0, x0 + rect_w, y0 + rect_h));
    }
    out
}

fn bench_rtree_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_insert");
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("insert_query_n{}", n), |b| {
            b.iter_batched(
                RTree::<u32>::new,
                |mut tree| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        tree.insert(r, i as u32);
                    }
                    let hits = tree
                        .query(&Envelope::new(100.0, 100.0, 500.0, 500.0))
                        .len();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_rtree_bulk_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_bulk_load");
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("load_query_n{}", n), |b| {
            b.iter_batched(
                || {
                    rects
                        .iter()
                        .copied()
                        .enumerate()
                        .map(|(i, r)| Entry::new(r, i as u32))
                        .collect::<Vec<_>>()
                },
                |entries| {
                    let tree = RTree::from_entries(entries);
                    let hits = tree
                        .query(&Envelope::new(100.0, 100.0, 500.0, 500.0))
                        .len();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_packed_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("packed_build");
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("build_query_n{}", n), |b| {
            b.iter_batched(
                || rects.clone(),
                |rects| {
                    let mut builder = PackedRTreeBuilder::new(rects.len()).unwrap();
                    for (i, r) in rects.into_iter().enumerate() {
                        builder.add(r, i as u32).unwrap();
                    }
                    let tree = builder.build().unwrap();
                    let hits = tree
                        .query(&Envelope::new(100.0, 100.0, 500.0, 500.0))
                        .len();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_query_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_heavy");
    let rects = gen_random_rects(8192, 2000.0, 2000.0, 12.0, 12.0);

    group.bench_function("rtree_build_then_many_queries", |b| {
        b.iter_batched(
            || {
                RTree::from_entries(
                    rects
                        .iter()
                        .copied()
                        .enumerate()
                        .map(|(i, r)| Entry::new(r, i as u32))
                        .collect(),
                )
            },
            |tree| {
                let mut total = 0usize;
                for q in 0..256 {
                    let x = (q % 16) as f64 * 120.0;
                    let y = (q / 16) as f64 * 120.0;
                    total += tree.query(&Envelope::new(x, y, x + 64.0, y + 64.0)).len();
                }
                black_box(total);
            },
            BatchSize::SmallInput,
        )
    });

    group.bench_function("packed_build_then_many_queries", |b| {
        b.iter_batched(
            || {
                let mut builder = PackedRTreeBuilder::new(rects.len()).unwrap();
                for (i, r) in rects.iter().copied().enumerate() {
                    builder.add(r, i as u32).unwrap();
                }
                builder.build().unwrap()
            },
            |tree| {
                let mut total = 0usize;
                for q in 0..256 {
                    let x = (q % 16) as f64 * 120.0;
                    let y = (q / 16) as f64 * 120.0;
                    total += tree.query(&Envelope::new(x, y, x + 64.0, y + 64.0)).len();
                }
                black_box(total);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_remove_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_remove_heavy");
    let rects = gen_grid_rects(64, 10.0);
    group.bench_function("load_then_remove_half", |b| {
        b.iter_batched(
            || {
                RTree::from_entries(
                    rects
                        .iter()
                        .copied()
                        .enumerate()
                        .map(|(i, r)| Entry::new(r, i as u32))
                        .collect(),
                )
            },
            |mut tree| {
                for (i, r) in rects.iter().copied().enumerate().step_by(2) {
                    let removed = tree.remove(&r, &(i as u32));
                    black_box(removed);
                }
                black_box(tree.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_rtree_insert,
    bench_rtree_bulk_load,
    bench_packed_build,
    bench_query_heavy,
    bench_remove_heavy,
);
criterion_main!(benches);
