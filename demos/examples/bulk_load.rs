// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bulk loading.
//!
//! Pack a large batch in one call, then merge a second batch into the same
//! tree and run a window query over both.
//!
//! Run:
//! - `cargo run -p canopy_examples --example bulk_load`

use canopy_rtree::{Entry, Envelope, RTree};

fn grid(n: usize, cell: f64, offset_x: f64, tag: usize) -> Vec<Entry<usize>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = offset_x + x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Entry::new(
                Envelope::new(x0, y0, x0 + cell, y0 + cell),
                tag + y * n + x,
            ));
        }
    }
    out
}

fn main() {
    let mut tree = RTree::from_entries(grid(32, 10.0, 0.0, 0));
    println!(
        "loaded {} cells, height {} after bulk build",
        tree.len(),
        tree.height()
    );

    // A second load merges with the existing content.
    tree.load(grid(16, 10.0, 1000.0, 10_000));
    println!("after merge: {} cells, height {}", tree.len(), tree.height());

    let window = Envelope::new(95.0, 95.0, 165.0, 165.0);
    let hits = tree.query(&window);
    println!("{} cells intersect {window:?}", hits.len());

    let far_window = Envelope::new(1000.0, 0.0, 1040.0, 40.0);
    let far_hits = tree.query(&far_window);
    println!("{} merged cells intersect {far_window:?}", far_hits.len());
    assert!(!far_hits.is_empty());
}
