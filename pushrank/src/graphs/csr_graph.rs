/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::traits::RandomAccessGraph;
use crate::utils::arcs::{ArcsOptions, ReadArcsError, read_arcs};
use crate::utils::mem::{AllocationFailure, try_filled};
use dsi_progress_logger::{ProgressLog, no_logging};
use std::io::BufRead;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A compressed sparse-row graph.
///
/// The graph stores its outdegrees, the degree-cumulative function (DCF) and
/// the concatenation of all successor lists. The DCF is a sequence of `n + 1`
/// offsets such that the successors of node `x` are found in the successor
/// array between positions `dcf[x]` (included) and `dcf[x + 1]` (excluded).
/// Arcs are a multiset: loops and duplicate arcs are kept.
///
/// Successors of a node appear in the order in which the corresponding arcs
/// were provided at construction time. The structure is immutable: once
/// built, it can be shared by any number of computations.
///
/// # Examples
///
/// ```
/// use pushrank::prelude::*;
///
/// let g = CsrGraph::from_arcs(&[(0, 1), (0, 2), (2, 0), (2, 0)]).unwrap();
/// assert_eq!(g.num_nodes(), 3);
/// assert_eq!(g.num_arcs(), 4);
/// assert_eq!(g.successors(0), &[1, 2]);
/// assert_eq!(g.outdegree(1), 0);
/// assert_eq!(g.successors(2), &[0, 0]);
/// ```
pub struct CsrGraph {
    outdegrees: Box<[usize]>,
    dcf: Box<[usize]>,
    successors: Box<[usize]>,
}

impl core::default::Default for CsrGraph {
    fn default() -> Self {
        Self {
            outdegrees: vec![].into(),
            dcf: vec![0].into(),
            successors: vec![].into(),
        }
    }
}

impl CsrGraph {
    /// Creates an empty CSR graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new CSR graph from a list of arcs.
    ///
    /// The number of nodes is the largest node identifier plus one.
    pub fn from_arcs(arcs: &[(usize, usize)]) -> Result<Self, AllocationFailure> {
        Self::from_arcs_with_logging(arcs, None, no_logging![])
    }

    /// Creates a new CSR graph from a list of arcs, logging progress.
    ///
    /// If `num_nodes` is larger than the largest node identifier plus one,
    /// the graph is padded with isolated nodes; if it is smaller, it is
    /// ignored.
    pub fn from_arcs_with_logging(
        arcs: &[(usize, usize)],
        num_nodes: Option<usize>,
        pl: &mut impl ProgressLog,
    ) -> Result<Self, AllocationFailure> {
        let inferred = arcs
            .iter()
            .map(|&(src, dst)| src.max(dst).saturating_add(1))
            .max()
            .unwrap_or(0);
        let n = match num_nodes {
            Some(num_nodes) if num_nodes < inferred => {
                log::warn!(
                    "The requested number of nodes ({num_nodes}) is smaller than the number of nodes found in the arcs ({inferred})"
                );
                inferred
            }
            Some(num_nodes) => num_nodes,
            None => inferred,
        };

        let mut outdegrees = try_filled("outdegrees", n, 0_usize)?;
        let mut dcf = try_filled("degree-cumulative function", n + 1, 0_usize)?;
        let mut successors = try_filled("successors", arcs.len(), 0_usize)?;

        pl.item_name("arc");
        pl.expected_updates(Some(2 * arcs.len()));
        pl.start(format!("Building CSR graph with {n} nodes..."));

        for &(src, _) in arcs {
            outdegrees[src] += 1;
            pl.light_update();
        }

        for x in 0..n {
            dcf[x + 1] = dcf[x] + outdegrees[x];
        }

        // Write cursors, consumed during the scatter; outdegrees stay intact.
        let mut cursors = try_filled("write cursors", n, 0_usize)?;
        cursors.copy_from_slice(&dcf[..n]);
        for &(src, dst) in arcs {
            successors[cursors[src]] = dst;
            cursors[src] += 1;
            pl.light_update();
        }
        debug_assert!((0..n).all(|x| cursors[x] == dcf[x + 1]));

        pl.done();

        Ok(Self {
            outdegrees: outdegrees.into(),
            dcf: dcf.into(),
            successors: successors.into(),
        })
    }

    /// Reads an arc list from `reader` using default [options](ArcsOptions)
    /// and builds the corresponding CSR graph.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, ReadArcsError> {
        Self::from_reader_with_logging(reader, ArcsOptions::default(), None, no_logging![])
    }

    /// Reads an arc list from `reader` and builds the corresponding CSR
    /// graph, logging progress.
    ///
    /// See [`from_arcs_with_logging`](Self::from_arcs_with_logging) for the
    /// meaning of `num_nodes`.
    pub fn from_reader_with_logging(
        reader: impl BufRead,
        options: ArcsOptions,
        num_nodes: Option<usize>,
        pl: &mut impl ProgressLog,
    ) -> Result<Self, ReadArcsError> {
        let arcs = read_arcs(reader, options, pl)?;
        Ok(Self::from_arcs_with_logging(&arcs, num_nodes, pl)?)
    }

    /// Returns the outdegrees.
    pub fn outdegrees(&self) -> &[usize] {
        &self.outdegrees
    }

    /// Returns the degree-cumulative function.
    pub fn dcf(&self) -> &[usize] {
        &self.dcf
    }

    /// Returns all successor lists, concatenated.
    pub fn all_successors(&self) -> &[usize] {
        &self.successors
    }

    /// Returns the successors of `node`.
    #[inline(always)]
    pub fn successors(&self, node: usize) -> &[usize] {
        &self.successors[self.dcf[node]..self.dcf[node + 1]]
    }

    /// Returns an iterator over all arcs, in node order.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.num_nodes()).flat_map(move |x| self.successors(x).iter().map(move |&y| (x, y)))
    }
}

impl RandomAccessGraph for CsrGraph {
    type Successors<'succ> = core::iter::Copied<core::slice::Iter<'succ, usize>>;

    #[inline(always)]
    fn num_nodes(&self) -> usize {
        self.outdegrees.len()
    }

    #[inline(always)]
    fn num_arcs(&self) -> u64 {
        self.successors.len() as u64
    }

    #[inline(always)]
    fn outdegree(&self, node: usize) -> usize {
        self.outdegrees[node]
    }

    #[inline(always)]
    fn successors(&self, node: usize) -> Self::Successors<'_> {
        CsrGraph::successors(self, node).iter().copied()
    }
}

/// Reads an arc list with default [options](ArcsOptions) and builds a
/// [`CsrGraph`].
pub fn build_graph(reader: impl BufRead) -> Result<CsrGraph, ReadArcsError> {
    CsrGraph::from_reader(reader)
}
