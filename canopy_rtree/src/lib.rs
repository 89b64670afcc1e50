// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=canopy_rtree --heading-base-level=0

//! Canopy R-tree: a dynamic 2D spatial index over axis-aligned envelopes.
//!
//! Canopy R-tree stores `(envelope, payload)` pairs and answers rectangle
//! queries: which payloads have an envelope intersecting a search window?
//!
//! - Incremental [`insert`](RTree::insert) and [`remove`](RTree::remove) at
//!   any time; the tree rebalances with R*-style node splits.
//! - Bulk [`load`](RTree::load) packs batches with OMT (overlap-minimizing
//!   top-down) tiling and merges them into existing content.
//! - [`query`](RTree::query) collects matches; [`query_with`](RTree::query_with)
//!   streams them to a visitor without allocating.
//!
//! Queries visit each match exactly once in a deterministic but unspecified
//! order; callers should not rely on anything beyond set equality.
//!
//! # Example
//!
//! ```rust
//! use canopy_rtree::{Entry, Envelope, RTree};
//!
//! let mut tree = RTree::new();
//! tree.insert(Envelope::new(0.0, 0.0, 10.0, 10.0), "a");
//! tree.insert(Envelope::new(20.0, 0.0, 30.0, 10.0), "b");
//!
//! let hits = tree.query(&Envelope::new(5.0, 5.0, 25.0, 8.0));
//! assert_eq!(hits.len(), 2);
//!
//! // Bulk loading merges with what is already there.
//! tree.load(
//!     (0..10)
//!         .map(|i| Entry::new(Envelope::from_point(i as f64 * 5.0, 50.0), "grid"))
//!         .collect(),
//! );
//! assert_eq!(tree.len(), 12);
//!
//! assert!(tree.remove(&Envelope::new(0.0, 0.0, 10.0, 10.0), &"a"));
//! assert_eq!(tree.len(), 11);
//! ```
//!
//! ## Float semantics
//!
//! Coordinates are `f64` and assumed finite; NaNs are not supported.
//! Envelopes are closed, so touching edges count as intersecting.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod bulk;
pub mod select;
pub mod tree;
pub mod types;

pub use tree::RTree;
pub use types::{Entry, Envelope};

/// The query surface shared by the spatial indexes in this family.
///
/// Object-safe so callers can hold heterogeneous indexes behind one seam;
/// both the dynamic tree here and the packed tree in `canopy_packed`
/// implement it.
pub trait SpatialIndex<P> {
    /// Visit every stored payload whose envelope intersects `env`, exactly
    /// once each.
    fn search(&self, env: &Envelope, visit: &mut dyn FnMut(&P));

    /// Number of stored items.
    fn count(&self) -> usize;
}
