// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamic tree basics.
//!
//! Insert a few boxes, query a window, remove one, query again.
//!
//! Run:
//! - `cargo run -p canopy_examples --example dynamic_tree`

use canopy_rtree::{Envelope, RTree};

fn main() {
    let mut tree = RTree::new();

    // A few labelled regions.
    tree.insert(Envelope::new(0.0, 0.0, 30.0, 30.0), "meadow");
    tree.insert(Envelope::new(20.0, 20.0, 60.0, 60.0), "pond");
    tree.insert(Envelope::new(100.0, 0.0, 140.0, 40.0), "ridge");
    tree.insert(Envelope::new(25.0, 25.0, 35.0, 35.0), "island");

    println!("stored {} regions, tree height {}", tree.len(), tree.height());

    // What overlaps the viewport?
    let viewport = Envelope::new(10.0, 10.0, 40.0, 40.0);
    let visible = tree.query(&viewport);
    println!("visible in {viewport:?}: {visible:?}");
    assert_eq!(visible.len(), 3);

    // Drain the pond and look again.
    let removed = tree.remove(&Envelope::new(20.0, 20.0, 60.0, 60.0), &"pond");
    println!("removed pond: {removed}");
    let visible = tree.query(&viewport);
    println!("visible now: {visible:?}");
    assert_eq!(visible.len(), 2);
}
