/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Sparse accounting of probability mass.
//!
//! Local algorithms touch a number of nodes that is usually much smaller than
//! the number of nodes of the graph. A [`SparseAccounting`] stores a value for
//! every node in a dense array, but keeps track of the nodes that have been
//! touched, so that enumeration and clearing take time proportional to the
//! number of touched nodes rather than to the size of the graph.
//!
//! Presence is recorded explicitly: a touched node whose value is zero (for
//! example, a residual that has just been pushed) is still reported as
//! touched, and it is distinguishable from a node that was never touched.

use kahan::KahanSum;
use pushrank::utils::mem::{AllocationFailure, try_filled, try_with_capacity};

/// A mapping from nodes to values with O(touched) enumeration and reset.
///
/// Untouched nodes have value zero. Nodes are enumerated in the order in
/// which they were first touched.
///
/// # Examples
///
/// ```
/// use pushrank_algo::rank::SparseAccounting;
///
/// let mut acc = SparseAccounting::new(10).unwrap();
/// acc.add(7, 0.5);
/// acc.add(3, 0.25);
/// acc.add(7, 0.5);
/// assert_eq!(acc.get(7), 1.0);
/// assert_eq!(acc.iter().collect::<Vec<_>>(), vec![(7, 1.0), (3, 0.25)]);
///
/// assert_eq!(acc.set_zero(7), 1.0);
/// assert!(acc.contains(7));
/// assert_eq!(acc.iter_nonzero().count(), 1);
///
/// assert_eq!(acc.reset(), 2);
/// assert!(acc.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct SparseAccounting {
    values: Box<[f64]>,
    present: Box<[bool]>,
    touched: Vec<usize>,
}

impl SparseAccounting {
    /// Allocates a new accounting structure for nodes in [0 . . `capacity`).
    pub fn new(capacity: usize) -> Result<Self, AllocationFailure> {
        Ok(Self {
            values: try_filled("accounting values", capacity, 0.0)?.into(),
            present: try_filled("accounting presence markers", capacity, false)?.into(),
            // Each node is touched at most once, so this never reallocates
            touched: try_with_capacity("touched nodes", capacity)?,
        })
    }

    /// Returns the number of nodes this structure can account for.
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Returns the number of touched nodes.
    pub fn len(&self) -> usize {
        self.touched.len()
    }

    /// Returns true if no node has been touched since the last reset.
    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }

    /// Returns true if `node` has been touched since the last reset.
    #[inline(always)]
    pub fn contains(&self, node: usize) -> bool {
        self.present[node]
    }

    /// Returns the value associated with `node` (zero if untouched).
    #[inline(always)]
    pub fn get(&self, node: usize) -> f64 {
        self.values[node]
    }

    /// Adds `delta` to the value of `node`, touching it if necessary, and
    /// returns the new value.
    #[inline(always)]
    pub fn add(&mut self, node: usize, delta: f64) -> f64 {
        if !self.present[node] {
            self.present[node] = true;
            self.touched.push(node);
        }
        self.values[node] += delta;
        self.values[node]
    }

    /// Sets the value of `node` to zero and returns the previous value.
    ///
    /// The node stays touched.
    #[inline(always)]
    pub fn set_zero(&mut self, node: usize) -> f64 {
        core::mem::take(&mut self.values[node])
    }

    /// Zeroes all touched values and forgets the touched nodes, returning
    /// their number.
    ///
    /// The cost is proportional to the number of touched nodes.
    pub fn reset(&mut self) -> usize {
        let cleared = self.touched.len();
        for &node in &self.touched {
            self.values[node] = 0.0;
            self.present[node] = false;
        }
        self.touched.clear();
        cleared
    }

    /// Returns the touched nodes, in the order in which they were touched.
    pub fn nodes(&self) -> &[usize] {
        &self.touched
    }

    /// Returns an iterator over the touched nodes and their values.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (usize, f64)> + '_ {
        self.touched.iter().map(|&node| (node, self.values[node]))
    }

    /// Returns an iterator over the touched nodes with nonzero value and their
    /// values.
    pub fn iter_nonzero(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.iter().filter(|&(_, value)| value != 0.0)
    }

    /// Returns the sum of all values, computed with compensated summation.
    pub fn sum(&self) -> f64 {
        self.iter()
            .fold(KahanSum::<f64>::new(), |sum, (_, value)| sum + value)
            .sum()
    }
}
