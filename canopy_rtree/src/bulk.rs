// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! OMT bulk loading.
//!
//! Builds a packed subtree top-down by carving the input into roughly square
//! tiles: vertical slabs by minimum x, then tiles inside each slab by minimum
//! y, recursing per tile. Partitioning uses [`multi_select`] so nothing is
//! ever fully sorted. The built subtree then merges into the existing tree
//! height-aware, so loading into a non-empty tree is legal and keeps balance.

use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::select::multi_select;
use crate::tree::{Child, Node, NodeIdx, RTree};
use crate::types::{Entry, Envelope};

fn cmp_min_x<P>(a: &Entry<P>, b: &Entry<P>) -> Ordering {
    a.bounds
        .min_x
        .partial_cmp(&b.bounds.min_x)
        .unwrap_or(Ordering::Equal)
}

fn cmp_min_y<P>(a: &Entry<P>, b: &Entry<P>) -> Ordering {
    a.bounds
        .min_y
        .partial_cmp(&b.bounds.min_y)
        .unwrap_or(Ordering::Equal)
}

impl<P> RTree<P> {
    /// Bulk-load entries, merging them into the tree.
    ///
    /// An empty batch is a no-op; a batch smaller than the minimum fill is
    /// inserted one by one. Anything larger is packed into its own subtree
    /// and grafted in: adopted as the root when the tree is empty, joined
    /// under a fresh root when heights match, and otherwise inserted whole
    /// at the level where its height fits.
    pub fn load(&mut self, entries: Vec<Entry<P>>) {
        if entries.is_empty() {
            return;
        }
        if entries.len() < self.min_entries {
            for entry in entries {
                self.insert(entry.bounds, entry.item);
            }
            return;
        }

        let built = self.build_omt(entries, 0, true);
        if self.node(self.root).children.is_empty() {
            self.root = built;
        } else if self.node(self.root).height == self.node(built).height {
            self.grow_root(built);
        } else {
            let mut taller = self.root;
            let mut shorter = built;
            if self.node(taller).height < self.node(shorter).height {
                core::mem::swap(&mut taller, &mut shorter);
            }
            self.root = taller;
            let shorter_height = self.node(shorter).height;
            self.insert_child(Child::Node(shorter), shorter_height);
        }
    }

    /// Build a tree directly from a batch of entries.
    pub fn from_entries(entries: Vec<Entry<P>>) -> Self {
        let mut tree = Self::new();
        tree.load(entries);
        tree
    }

    /// Recursive OMT packing. `top` marks the outermost call, which derives
    /// the subtree height and widens the root fan-out so the root stays
    /// close to full.
    fn build_omt(&mut self, mut items: Vec<Entry<P>>, height: usize, top: bool) -> NodeIdx {
        let n = items.len();

        if n <= self.max_entries {
            let bounds = items
                .iter()
                .fold(Envelope::EMPTY, |acc, e| acc.union(&e.bounds));
            return self.push_node(Node {
                bounds,
                height: 1,
                leaf: true,
                children: items.into_iter().map(Child::Entry).collect(),
            });
        }

        let (height, m) = if top {
            let max = self.max_entries as f64;
            let h = libm::ceil(libm::log(n as f64) / libm::log(max)) as usize;
            let m = libm::ceil(n as f64 / libm::pow(max, (h - 1) as f64)) as usize;
            (h, m)
        } else {
            (height, self.max_entries)
        };

        // Tile geometry: m tiles of ~n2 entries arranged in vertical slabs
        // of n1.
        let n2 = n.div_ceil(m);
        let n1 = n2 * libm::ceil(libm::sqrt(m as f64)) as usize;

        multi_select(&mut items, 0, n - 1, n1, &mut cmp_min_x);

        let mut children = Vec::new();
        while !items.is_empty() {
            // Carve the trailing slab, then its tiles, from the tail; child
            // order within a node is unspecified.
            let slab_start = ((items.len() - 1) / n1) * n1;
            let mut slab = items.split_off(slab_start);
            if slab.len() > 1 {
                let last = slab.len() - 1;
                multi_select(&mut slab, 0, last, n2, &mut cmp_min_y);
            }
            while !slab.is_empty() {
                let tile_start = ((slab.len() - 1) / n2) * n2;
                let tile = slab.split_off(tile_start);
                children.push(Child::Node(self.build_omt(tile, height - 1, false)));
            }
        }

        let bounds = self.children_bounds(&children);
        self.push_node(Node {
            bounds,
            height,
            leaf: false,
            children,
        })
    }
}
