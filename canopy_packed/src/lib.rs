// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=canopy_packed --heading-base-level=0

//! Canopy Packed: a static, Hilbert-packed 2D R-tree in flat arrays.
//!
//! Where [`canopy_rtree`] mutates freely, this index is built exactly once
//! from a declared number of items and is immutable afterwards. Items are
//! sorted by the Hilbert index of their envelope centers and packed
//! bottom-up into parallel arrays, so every tree level is a contiguous run
//! of memory and queries are linear scans over small windows.
//!
//! The lifecycle is split across two types: [`PackedRTreeBuilder`] accepts
//! exactly the declared number of `(envelope, payload)` pairs, and
//! [`PackedRTreeBuilder::build`] turns them into an immutable
//! [`PackedRTree`]. Filling past the declared capacity or building before
//! the fill completes are the only error paths; everything after `build` is
//! infallible, and shared references to a built tree can be queried from
//! multiple threads.
//!
//! # Example
//!
//! ```rust
//! use canopy_packed::PackedRTreeBuilder;
//! use canopy_rtree::Envelope;
//!
//! let mut builder = PackedRTreeBuilder::new(4)?;
//! builder.add(Envelope::new(0.0, 0.0, 2.0, 2.0), "low")?;
//! builder.add(Envelope::new(1.0, 1.0, 3.0, 3.0), "mid")?;
//! builder.add(Envelope::new(5.0, 5.0, 6.0, 6.0), "high")?;
//! builder.add(Envelope::new(1.5, 1.5, 2.5, 2.5), "inner")?;
//!
//! let tree = builder.build()?;
//! let hits = tree.query(&Envelope::new(1.2, 1.2, 2.8, 2.8));
//! assert_eq!(hits.len(), 3);
//! assert_eq!(tree.len(), 4);
//! # Ok::<(), canopy_packed::PackedError>(())
//! ```
//!
//! Insertion order is what payload indexes refer to; query visit order
//! follows the packed layout and is deterministic but unspecified.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod hilbert;

use alloc::vec::Vec;
use core::fmt::Debug;

use canopy_rtree::{Envelope, SpatialIndex};
use thiserror::Error;

/// Default node fan-out. Wider than a dynamic tree's: packed levels are
/// scanned linearly, so bigger windows amortize better.
const DEFAULT_NODE_SIZE: usize = 16;

/// Node size bounds; the upper limit keeps child counts addressable in u16
/// grids elsewhere in the family.
const MIN_NODE_SIZE: usize = 2;
const MAX_NODE_SIZE: usize = 65_535;

/// Hilbert grid resolution per axis (2^16 cells).
const HILBERT_MAX: f64 = 65_535.0;

/// Errors from declaring, filling, or finishing a packed tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PackedError {
    /// A packed tree must be declared with at least one item.
    #[error("a packed tree must be declared with at least one item")]
    ZeroItems,
    /// More items were added than were declared up front.
    #[error("capacity exceeded: {declared} items were declared")]
    CapacityExceeded {
        /// Declared capacity.
        declared: usize,
    },
    /// `build` was called before every declared item was added.
    #[error("only {added} of {declared} declared items were added before build")]
    Incomplete {
        /// Items added so far.
        added: usize,
        /// Declared capacity.
        declared: usize,
    },
}

/// Accumulates exactly the declared number of items, then [`build`]s the
/// immutable [`PackedRTree`].
///
/// [`build`]: PackedRTreeBuilder::build
pub struct PackedRTreeBuilder<P> {
    node_size: usize,
    num_items: usize,
    boxes: Vec<Envelope>,
    indices: Vec<usize>,
    items: Vec<P>,
    bounds: Envelope,
}

impl<P> PackedRTreeBuilder<P> {
    /// Declare a tree of `num_items` items with the default node size.
    pub fn new(num_items: usize) -> Result<Self, PackedError> {
        Self::with_node_size(num_items, DEFAULT_NODE_SIZE)
    }

    /// Declare a tree of `num_items` items with a custom node size (clamped
    /// to `[2, 65535]`).
    pub fn with_node_size(num_items: usize, node_size: usize) -> Result<Self, PackedError> {
        if num_items == 0 {
            return Err(PackedError::ZeroItems);
        }
        let node_size = node_size.clamp(MIN_NODE_SIZE, MAX_NODE_SIZE);
        Ok(Self {
            node_size,
            num_items,
            boxes: Vec::with_capacity(num_items),
            indices: Vec::with_capacity(num_items),
            items: Vec::with_capacity(num_items),
            bounds: Envelope::EMPTY,
        })
    }

    /// Declared capacity.
    pub fn capacity(&self) -> usize {
        self.num_items
    }

    /// Items added so far.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been added yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one `(envelope, payload)` pair, returning its insertion index.
    /// Fails once the declared capacity is reached.
    pub fn add(&mut self, bounds: Envelope, item: P) -> Result<usize, PackedError> {
        if self.items.len() == self.num_items {
            return Err(PackedError::CapacityExceeded {
                declared: self.num_items,
            });
        }
        let index = self.items.len();
        self.boxes.push(bounds);
        self.indices.push(index);
        self.items.push(item);
        self.bounds.expand(&bounds);
        Ok(index)
    }

    /// Sort by Hilbert index and pack the tree bottom-up. Fails if fewer
    /// items than declared were added.
    pub fn build(self) -> Result<PackedRTree<P>, PackedError> {
        let Self {
            node_size,
            num_items,
            mut boxes,
            mut indices,
            items,
            bounds,
        } = self;
        if items.len() < num_items {
            return Err(PackedError::Incomplete {
                added: items.len(),
                declared: num_items,
            });
        }

        // Exclusive end positions of each level, leaves first. Runs at
        // least once so even a single item gets a root level above it.
        let mut level_bounds = alloc::vec![num_items];
        let mut level_size = num_items;
        let mut total = num_items;
        loop {
            level_size = level_size.div_ceil(node_size);
            total += level_size;
            level_bounds.push(total);
            if level_size == 1 {
                break;
            }
        }
        boxes.reserve_exact(total - boxes.len());
        indices.reserve_exact(total - indices.len());

        if num_items <= node_size {
            // Everything fits under a single root node.
            boxes.push(bounds);
            indices.push(0);
            return Ok(PackedRTree {
                node_size,
                num_items,
                level_bounds,
                boxes,
                indices,
                items,
                bounds,
            });
        }

        // Map envelope centers onto the Hilbert grid spanning the total
        // bounds; degenerate extents collapse to cell 0.
        let width = bounds.width();
        let height = bounds.height();
        let mut values = Vec::with_capacity(num_items);
        for envelope in &boxes[..num_items] {
            let (cx, cy) = envelope.center();
            let x = if width > 0.0 {
                (HILBERT_MAX * (cx - bounds.min_x) / width) as u32
            } else {
                0
            };
            let y = if height > 0.0 {
                (HILBERT_MAX * (cy - bounds.min_y) / height) as u32
            } else {
                0
            };
            values.push(hilbert::xy_to_index(x, y));
        }

        sort_triples(&mut values, &mut boxes, &mut indices, 0, num_items - 1, node_size);

        // Pack parents level by level: fold up to node_size consecutive
        // children into a node appended after them, remembering where its
        // children start.
        let mut pos = 0;
        for level in 0..level_bounds.len() - 1 {
            let end = level_bounds[level];
            while pos < end {
                let first_child = pos;
                let mut node_bounds = Envelope::EMPTY;
                let stop = (pos + node_size).min(end);
                while pos < stop {
                    node_bounds.expand(&boxes[pos]);
                    pos += 1;
                }
                boxes.push(node_bounds);
                indices.push(first_child);
            }
        }

        debug_assert_eq!(boxes.len(), total);
        Ok(PackedRTree {
            node_size,
            num_items,
            level_bounds,
            boxes,
            indices,
            items,
            bounds,
        })
    }
}

impl<P> Debug for PackedRTreeBuilder<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PackedRTreeBuilder")
            .field("node_size", &self.node_size)
            .field("capacity", &self.num_items)
            .field("added", &self.items.len())
            .finish_non_exhaustive()
    }
}

/// Tandem Hoare quicksort of (hilbert value, envelope, index) triples.
/// Ranges that fall inside a single node are left unsorted: order within a
/// node never affects the tree shape.
fn sort_triples(
    values: &mut [u32],
    boxes: &mut [Envelope],
    indices: &mut [usize],
    left: usize,
    right: usize,
    node_size: usize,
) {
    if left / node_size >= right / node_size {
        return;
    }
    let pivot = values[(left + right) >> 1];
    let mut i = left as isize - 1;
    let mut j = right as isize + 1;
    loop {
        loop {
            i += 1;
            if values[i as usize] >= pivot {
                break;
            }
        }
        loop {
            j -= 1;
            if values[j as usize] <= pivot {
                break;
            }
        }
        if i >= j {
            break;
        }
        values.swap(i as usize, j as usize);
        boxes.swap(i as usize, j as usize);
        indices.swap(i as usize, j as usize);
    }
    sort_triples(values, boxes, indices, left, j as usize, node_size);
    sort_triples(values, boxes, indices, j as usize + 1, right, node_size);
}

/// An immutable Hilbert-packed R-tree.
///
/// Produced by [`PackedRTreeBuilder::build`]. The layout is a set of
/// parallel arrays: item envelopes in Hilbert order followed by internal
/// node envelopes level by level, an index array mapping leaves back to
/// insertion order and internal nodes to their child windows, and payloads
/// kept in insertion order.
pub struct PackedRTree<P> {
    node_size: usize,
    num_items: usize,
    level_bounds: Vec<usize>,
    boxes: Vec<Envelope>,
    indices: Vec<usize>,
    items: Vec<P>,
    bounds: Envelope,
}

impl<P> PackedRTree<P> {
    /// Number of items; constant time.
    pub fn len(&self) -> usize {
        self.num_items
    }

    /// Always false: a packed tree holds at least one item.
    pub fn is_empty(&self) -> bool {
        self.num_items == 0
    }

    /// Node fan-out the tree was packed with.
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Envelope covering every item.
    pub fn bounds(&self) -> Envelope {
        self.bounds
    }

    /// Payloads in insertion order.
    pub fn items(&self) -> &[P] {
        &self.items
    }

    /// A packed tree is static: nothing can be removed. Always returns
    /// `false`, mirroring the dynamic tree's signature.
    pub fn remove(&mut self, _bounds: &Envelope, _item: &P) -> bool {
        false
    }

    /// Collect references to every payload whose envelope intersects `env`.
    /// Result order follows the packed layout and is unspecified.
    pub fn query<'a>(&'a self, env: &Envelope) -> Vec<&'a P> {
        let mut out = Vec::new();
        self.query_with(env, |item| out.push(item));
        out
    }

    /// Visit every payload whose envelope intersects `env`, exactly once
    /// each, without collecting.
    pub fn query_with<'a, F>(&'a self, env: &Envelope, mut visit: F)
    where
        F: FnMut(&'a P),
    {
        if env.is_empty() || !env.intersects(&self.bounds) {
            return;
        }
        // (window start, level) pairs; the root is the last box, alone on
        // the top level.
        let mut stack: Vec<(usize, usize)> = Vec::new();
        let mut window = (self.boxes.len() - 1, self.level_bounds.len() - 1);
        loop {
            let (start, level) = window;
            let end = (start + self.node_size).min(self.level_bounds[level]);
            for pos in start..end {
                if !env.intersects(&self.boxes[pos]) {
                    continue;
                }
                if level == 0 {
                    visit(&self.items[self.indices[pos]]);
                } else {
                    stack.push((self.indices[pos], level - 1));
                }
            }
            match stack.pop() {
                Some(next) => window = next,
                None => break,
            }
        }
    }
}

impl<P> Debug for PackedRTree<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PackedRTree")
            .field("node_size", &self.node_size)
            .field("num_items", &self.num_items)
            .field("levels", &self.level_bounds.len())
            .field("total_nodes", &self.boxes.len())
            .finish_non_exhaustive()
    }
}

impl<P> SpatialIndex<P> for PackedRTree<P> {
    fn search(&self, env: &Envelope, visit: &mut dyn FnMut(&P)) {
        self.query_with(env, |item| visit(item));
    }

    fn count(&self) -> usize {
        self.num_items
    }
}
