// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed tree basics.
//!
//! Declare the item count up front, fill the builder, build once, query
//! many times.
//!
//! Run:
//! - `cargo run -p canopy_examples --example packed_tree`

use canopy_packed::{PackedError, PackedRTreeBuilder};
use canopy_rtree::Envelope;

fn main() -> Result<(), PackedError> {
    const N: usize = 1000;

    let mut builder = PackedRTreeBuilder::new(N)?;
    for i in 0..N {
        let x = (i % 40) as f64 * 25.0;
        let y = (i / 40) as f64 * 25.0;
        builder.add(Envelope::new(x, y, x + 20.0, y + 20.0), i)?;
    }

    let tree = builder.build()?;
    println!("packed {} boxes, overall bounds {:?}", tree.len(), tree.bounds());

    let window = Envelope::new(200.0, 200.0, 400.0, 400.0);
    let hits = tree.query(&window);
    println!("{} boxes intersect {window:?}", hits.len());

    // Streaming variant, no intermediate collection.
    let mut count = 0;
    tree.query_with(&window, |_| count += 1);
    assert_eq!(count, hits.len());
    println!("visitor saw {count} boxes");

    Ok(())
}
