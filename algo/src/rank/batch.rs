/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Rooted PageRank from many sources.

use super::accounting::SparseAccounting;
use super::push::{InvalidParameter, PushArena, PushRank, check_node};
use dsi_progress_logger::{ProgressLog, no_logging};
use pushrank::traits::RandomAccessGraph;
use pushrank::utils::mem::AllocationFailure;

/// Aggregate statistics about a run of [`BatchPush`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// The number of sources processed.
    pub sources: usize,
    /// The total number of pushes.
    pub pushes: usize,
    /// The largest number of nodes with a nonzero approximation.
    pub max_support: usize,
    /// The total number of accounting entries cleared between sources.
    pub cleared: usize,
}

/// Runs the push method from a sequence of sources, reusing a single
/// [`PushArena`].
///
/// For each source the arena is cleared, the push method is run, and the
/// approximation is passed to a callback, after which it is discarded. Since
/// clearing the arena costs time proportional to the number of nodes touched
/// by the previous source, the cost of processing all sources does not
/// depend quadratically on the number of nodes.
///
/// # Examples
///
/// ```
/// use pushrank::prelude::*;
/// use pushrank_algo::rank::{BatchPush, Threshold};
///
/// let g = CsrGraph::from_arcs(&[(0, 1), (1, 2), (2, 0)]).unwrap();
/// let mut batch = BatchPush::new(&g).unwrap();
/// batch.push_rank().epsilon(1E-6).threshold(Threshold::DegreeScaled);
///
/// let mut totals = vec![];
/// let stats = batch
///     .run_all(|_source, rank| {
///         totals.push(rank.sum());
///         Ok(())
///     })
///     .unwrap();
///
/// assert_eq!(stats.sources, 3);
/// assert!(totals.iter().all(|&t| (t - 1.0).abs() < 1E-5));
/// ```
pub struct BatchPush<'a, G: RandomAccessGraph> {
    push_rank: PushRank<'a, G>,
    arena: PushArena,
}

impl<G: RandomAccessGraph> std::fmt::Debug for BatchPush<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchPush")
            .field("push_rank", &self.push_rank)
            .field("num_nodes", &self.arena.num_nodes())
            .finish_non_exhaustive()
    }
}

impl<'a, G: RandomAccessGraph> BatchPush<'a, G> {
    /// Creates a new batch computation on the given graph, allocating the
    /// arena.
    ///
    /// The underlying [`PushRank`] has default parameters, which can be
    /// changed using [`push_rank`](Self::push_rank).
    pub fn new(graph: &'a G) -> Result<Self, AllocationFailure> {
        Ok(Self {
            push_rank: PushRank::new(graph),
            arena: PushArena::new(graph.num_nodes())?,
        })
    }

    /// Returns the underlying [`PushRank`], so that its parameters can be
    /// configured.
    pub fn push_rank(&mut self) -> &mut PushRank<'a, G> {
        &mut self.push_rank
    }

    /// Returns the arena, which contains the state left by the last source.
    pub fn arena(&self) -> &PushArena {
        &self.arena
    }

    /// Runs the push method from each of the given sources, in order.
    pub fn run(
        &mut self,
        sources: &[usize],
        emit: impl FnMut(usize, &SparseAccounting) -> anyhow::Result<()>,
    ) -> anyhow::Result<BatchStats> {
        self.run_with_logging(sources, emit, no_logging![])
    }

    /// Runs the push method from each of the given sources, in order, logging
    /// progress.
    ///
    /// Parameters and sources are checked before any computation takes
    /// place. An error returned by `emit` stops the computation and it is
    /// propagated.
    pub fn run_with_logging(
        &mut self,
        sources: &[usize],
        mut emit: impl FnMut(usize, &SparseAccounting) -> anyhow::Result<()>,
        pl: &mut impl ProgressLog,
    ) -> anyhow::Result<BatchStats> {
        self.push_rank.validate()?;
        let num_nodes = self.push_rank.graph().num_nodes();
        for &source in sources {
            check_node(source, num_nodes)?;
        }
        if self.arena.num_nodes() != num_nodes {
            return Err(InvalidParameter::ArenaSize {
                arena: self.arena.num_nodes(),
                num_nodes,
            }
            .into());
        }

        let mut stats = BatchStats::default();

        pl.item_name("source");
        pl.expected_updates(Some(sources.len()));
        pl.start(format!("Pushing from {} sources...", sources.len()));

        for &source in sources {
            let push_stats = self.push_rank.run(source, &mut self.arena)?;
            stats.sources += 1;
            stats.pushes += push_stats.pushes;
            stats.cleared += push_stats.cleared;
            stats.max_support = stats.max_support.max(push_stats.rank_support);
            emit(source, self.arena.rank())?;
            pl.light_update();
        }

        pl.done();
        log::info!(
            "{} pushes in total, largest support {}",
            stats.pushes,
            stats.max_support
        );
        Ok(stats)
    }

    /// Runs the push method from all nodes, in increasing order.
    pub fn run_all(
        &mut self,
        emit: impl FnMut(usize, &SparseAccounting) -> anyhow::Result<()>,
    ) -> anyhow::Result<BatchStats> {
        self.run_all_with_logging(emit, no_logging![])
    }

    /// Runs the push method from all nodes, in increasing order, logging
    /// progress.
    pub fn run_all_with_logging(
        &mut self,
        emit: impl FnMut(usize, &SparseAccounting) -> anyhow::Result<()>,
        pl: &mut impl ProgressLog,
    ) -> anyhow::Result<BatchStats> {
        let sources = (0..self.push_rank.graph().num_nodes()).collect::<Vec<_>>();
        self.run_with_logging(&sources, emit, pl)
    }
}
