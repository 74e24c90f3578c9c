/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Basic traits to access graphs in random-access fashion.

Local algorithms such as push-based rooted PageRank never scan the whole
graph: they only need, for a node, its outdegree and its successors. The
[`RandomAccessGraph`] trait provides exactly that, and algorithms are written
against it rather than against a specific representation.

*/

/// A graph providing random access to outdegrees and successor lists.
///
/// Nodes are identified by integers in the interval [0 . . *n*), where *n* is
/// the value returned by [`num_nodes`](RandomAccessGraph::num_nodes).
/// Successor lists may contain loops and duplicates; the outdegree of a node
/// is the length of its successor list, duplicates included.
pub trait RandomAccessGraph {
    /// The type of the iterator over the successors of a node.
    type Successors<'succ>: IntoIterator<Item = usize>
    where
        Self: 'succ;

    /// Returns the number of nodes.
    fn num_nodes(&self) -> usize;

    /// Returns the number of arcs.
    fn num_arcs(&self) -> u64;

    /// Returns the outdegree of a node.
    fn outdegree(&self, node: usize) -> usize;

    /// Returns the successors of a node.
    fn successors(&self, node: usize) -> Self::Successors<'_>;

    /// Returns whether there is an arc going from `src_node_id` to `dst_node_id`.
    ///
    /// Note that the default implementation performs a linear scan.
    fn has_arc(&self, src_node_id: usize, dst_node_id: usize) -> bool {
        self.successors(src_node_id)
            .into_iter()
            .any(|succ| succ == dst_node_id)
    }

    /// Returns true if `node` is a sink, that is, it has no successors.
    #[inline(always)]
    fn is_sink(&self, node: usize) -> bool {
        self.outdegree(node) == 0
    }
}
