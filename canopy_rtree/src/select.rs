// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-place selection: k-th order statistic and stride partitioning.
//!
//! [`select`] is the classic quickselect with the Floyd–Rivest sampling
//! refinement for long ranges; [`multi_select`] applies it at every stride
//! boundary, which is all the bulk loader needs to carve slabs and tiles
//! without fully sorting anything.

use alloc::vec;
use core::cmp::Ordering;

/// Ranges longer than this narrow through a Floyd–Rivest sampling window
/// before partitioning.
const SAMPLING_CUTOFF: usize = 600;

/// Partially sort `items` so that `items[k]` holds the k-th order statistic
/// of `items[left..=right]` under `cmp`.
///
/// Elements left of `k` compare less-or-equal and elements right of it
/// greater-or-equal, but each side stays unordered internally. `right` is
/// inclusive. `k` must lie within `left..=right`.
pub fn select<T, F>(items: &mut [T], k: usize, left: usize, right: usize, cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut left = left;
    let mut right = right;
    while right > left {
        if right - left > SAMPLING_CUTOFF {
            // Floyd-Rivest: recurse on a sampled window expected to bracket
            // the k-th element, shrinking the partition work dramatically.
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = libm::log(n);
            let s = 0.5 * libm::exp(2.0 * z / 3.0);
            let sign = if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 };
            let sd = 0.5 * libm::sqrt(z * s * (n - s) / n) * sign;
            let kf = k as f64;
            let new_left = left.max(libm::floor(kf - m * s / n + sd) as usize);
            let new_right = right.min(libm::floor(kf + (n - m) * s / n + sd) as usize);
            select(items, k, new_left, new_right, cmp);
        }

        // Hoare partition around the candidate at `k`. The pivot is tracked
        // by position (`p`) rather than by value so payloads never need to
        // be cloned.
        items.swap(left, k);
        let mut p = left;
        if cmp(&items[right], &items[p]) == Ordering::Greater {
            items.swap(left, right);
            p = right;
        }

        let mut i = left as isize;
        let mut j = right as isize;
        while i < j {
            items.swap(i as usize, j as usize);
            if p == i as usize {
                p = j as usize;
            } else if p == j as usize {
                p = i as usize;
            }
            i += 1;
            j -= 1;
            while cmp(&items[i as usize], &items[p]) == Ordering::Less {
                i += 1;
            }
            while cmp(&items[j as usize], &items[p]) == Ordering::Greater {
                j -= 1;
            }
        }

        // Park the pivot at the partition boundary.
        if cmp(&items[left], &items[p]) == Ordering::Equal {
            items.swap(left, j as usize);
        } else {
            j += 1;
            items.swap(j as usize, right);
        }

        if j <= k as isize {
            left = j as usize + 1;
        }
        if k as isize <= j {
            if j == 0 {
                break;
            }
            right = j as usize - 1;
        }
    }
}

/// Partition `items[left..=right]` in place at every multiple of `n`, so
/// each chunk of `n` consecutive elements holds a contiguous run of the
/// sorted order without being sorted itself.
pub fn multi_select<T, F>(items: &mut [T], left: usize, right: usize, n: usize, cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut stack = vec![(left, right)];
    while let Some((left, right)) = stack.pop() {
        if right - left <= n {
            continue;
        }
        let mid = left + (right - left).div_ceil(2 * n) * n;
        select(items, mid, left, right, cmp);
        stack.push((left, mid));
        stack.push((mid, right));
    }
}
