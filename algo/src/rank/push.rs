/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Local push approximation of rooted PageRank.
//!
//! The _rooted_ (or _personalized_) PageRank of a source node *s* is the
//! stationary distribution of a random walk that at each step restarts from
//! *s* with probability α, and otherwise follows a uniformly chosen arc. It is
//! the solution of
//!
//! > **p** = α **e**ₛ + (1 − α) *P*ᵀ **p**,
//!
//! where *P* is the row-normalized adjacency matrix (with zero rows for
//! sinks).
//!
//! # The push method
//!
//! The [push method] of Andersen, Chung, and Lang maintains an approximation
//! **p** and a _residual_ **r**, starting from **p** = **0** and **r** =
//! **e**ₛ. The invariant is that the exact rooted PageRank of *s* is **p**
//! plus the combination, weighted by **r**, of the rooted PageRank vectors of
//! all nodes. A _push_ on node *u* moves an α-fraction of *rᵤ* into *pᵤ* and
//! distributes the remaining (1 − α) *rᵤ* evenly among the successors of *u*.
//!
//! Pushes are performed while some node has a residual above a threshold
//! depending on a precision ε and on a [threshold policy](Threshold):
//!
//! - [`Flat`](Threshold::Flat): *rᵥ* > ε;
//! - [`DegreeScaled`](Threshold::DegreeScaled): *rᵥ* > ε *d*(*v*), where
//!   *d*(*v*) is the outdegree of *v*; this normalizes the error per unit of
//!   outdegree and it is the choice of Andersen, Chung, and Lang.
//!
//! Since every push removes more than αε units of mass from the residual, the
//! number of pushes with the flat policy is less than 1 / (αε), independently
//! of the size of the graph. Nodes whose residual crosses the threshold are
//! kept in a worklist; a node enters the worklist only when its residual goes
//! from below to above the threshold, so it is never present twice. The order
//! in which nodes are popped (the [discipline](Discipline)) affects only the
//! number of pushes and, within the approximation error, the result.
//!
//! # Sinks
//!
//! When a sink (a node without successors) is pushed, the (1 − α) fraction of
//! its residual that should be redistributed has nowhere to go, and it is
//! dropped. Thus, if a sink is reachable from the source, the sum of **p** and
//! **r** is smaller than one; the amount dropped is reported in
//! [`PushStats::dropped_mass`]. The [power iteration](super::power) drops mass
//! in the same way, so the two methods converge to the same vector.
//!
//! # Memory
//!
//! The residual, the approximation, and the worklist live in a [`PushArena`]
//! owned by the caller, which allocates them once for a given number of
//! nodes. At the start of each run the arena is cleared in time proportional
//! to the number of nodes touched by the previous run, so the cost of a run
//! does not depend on the size of the graph.
//!
//! [push method]: https://doi.org/10.1109/FOCS.2006.44

use super::accounting::SparseAccounting;
use kahan::KahanSum;
use pushrank::traits::RandomAccessGraph;
use pushrank::utils::mem::AllocationFailure;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use std::collections::VecDeque;
use thiserror::Error;

/// A parameter that makes a computation impossible.
///
/// Parameters are checked before any computation takes place, so a failed
/// call leaves the graph and the arena usable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidParameter {
    #[error("The restart probability must be in the interval (0 . . 1), got {0}")]
    Alpha(f64),
    #[error("The precision must be positive, got {0}")]
    Epsilon(f64),
    #[error("Node {node} does not exist: the graph has {num_nodes} nodes")]
    Node { node: usize, num_nodes: usize },
    #[error("The arena has been allocated for {arena} nodes, but the graph has {num_nodes} nodes")]
    ArenaSize { arena: usize, num_nodes: usize },
}

/// Checks that `alpha` is a valid restart probability.
pub(crate) fn check_alpha(alpha: f64) -> Result<(), InvalidParameter> {
    // NaN fails the test
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(InvalidParameter::Alpha(alpha))
    }
}

/// Checks that `node` is a node of a graph with `num_nodes` nodes.
pub(crate) fn check_node(node: usize, num_nodes: usize) -> Result<(), InvalidParameter> {
    if node < num_nodes {
        Ok(())
    } else {
        Err(InvalidParameter::Node { node, num_nodes })
    }
}

/// The rule deciding when the residual of a node must be pushed.
///
/// See the [module-level documentation](self) for the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Threshold {
    /// A node is pushed when its residual exceeds ε. This is the default, and
    /// the natural choice for a single high-precision query.
    #[default]
    Flat,
    /// A node is pushed when its residual exceeds ε times its outdegree. This
    /// is the natural choice when computing from all sources.
    DegreeScaled,
}

impl Threshold {
    /// Returns the residual above which a node with the given outdegree must
    /// be pushed.
    #[inline(always)]
    pub fn limit(self, epsilon: f64, outdegree: usize) -> f64 {
        match self {
            Threshold::Flat => epsilon,
            Threshold::DegreeScaled => epsilon * outdegree as f64,
        }
    }
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Threshold::Flat => f.write_str("flat"),
            Threshold::DegreeScaled => f.write_str("degree-scaled"),
        }
    }
}

/// The order in which nodes are extracted from the worklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Discipline {
    /// Last in, first out. This is the default.
    #[default]
    Stack,
    /// First in, first out.
    Queue,
    /// Uniformly random extraction using a [`SmallRng`] seeded with the given
    /// value at the start of each run.
    Random { seed: u64 },
}

impl std::fmt::Display for Discipline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Discipline::Stack => f.write_str("stack"),
            Discipline::Queue => f.write_str("queue"),
            Discipline::Random { seed } => write!(f, "random (seed {seed})"),
        }
    }
}

/// The state of a push computation: residual, approximation, and worklist.
///
/// An arena is allocated once for a given number of nodes and reused across
/// runs; each run of [`PushRank`] clears it first. After a run,
/// [`rank`](PushArena::rank) contains the approximation and
/// [`residual`](PushArena::residual) the mass that has not been pushed.
///
/// An arena can be used by one computation at a time; independent
/// computations on the same graph need independent arenas.
#[derive(Debug, Clone)]
pub struct PushArena {
    residual: SparseAccounting,
    rank: SparseAccounting,
    worklist: VecDeque<usize>,
}

impl PushArena {
    /// Allocates an arena for graphs with `num_nodes` nodes.
    pub fn new(num_nodes: usize) -> Result<Self, AllocationFailure> {
        let mut worklist = VecDeque::new();
        // A node is never twice in the worklist
        worklist
            .try_reserve_exact(num_nodes)
            .map_err(|_| AllocationFailure::new::<usize>("worklist", num_nodes))?;
        Ok(Self {
            residual: SparseAccounting::new(num_nodes)?,
            rank: SparseAccounting::new(num_nodes)?,
            worklist,
        })
    }

    /// Returns the number of nodes the arena has been allocated for.
    pub fn num_nodes(&self) -> usize {
        self.rank.capacity()
    }

    /// Returns the residual left by the last run.
    pub fn residual(&self) -> &SparseAccounting {
        &self.residual
    }

    /// Returns the approximation of rooted PageRank computed by the last run.
    pub fn rank(&self) -> &SparseAccounting {
        &self.rank
    }

    /// Clears residual, approximation, and worklist, returning the number of
    /// accounting entries cleared.
    pub fn reset(&mut self) -> usize {
        self.worklist.clear();
        self.residual.reset() + self.rank.reset()
    }

    /// Returns the residual and the approximation.
    pub fn into_parts(self) -> (SparseAccounting, SparseAccounting) {
        (self.residual, self.rank)
    }
}

/// Statistics about a run of [`PushRank`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PushStats {
    /// The number of pushes.
    pub pushes: usize,
    /// The number of accounting entries cleared before the run.
    pub cleared: usize,
    /// The number of nodes that received residual mass.
    pub residual_support: usize,
    /// The number of nodes with a nonzero approximation.
    pub rank_support: usize,
    /// The mass dropped at sinks.
    pub dropped_mass: f64,
}

/// Computes an approximation of rooted PageRank using the push method.
///
/// The struct is configured via setters and then executed via
/// [`run`](Self::run), which can be called any number of times with
/// different sources. Parameters are checked by `run`, before any
/// computation takes place.
///
/// # Examples
///
/// ```
/// use pushrank::prelude::*;
/// use pushrank_algo::rank::{PushArena, PushRank, Threshold};
///
/// // A two-node cycle
/// let g = CsrGraph::from_arcs(&[(0, 1), (1, 0)]).unwrap();
/// let mut arena = PushArena::new(g.num_nodes()).unwrap();
///
/// let mut push = PushRank::new(&g);
/// push.alpha(0.15).epsilon(1E-9).threshold(Threshold::Flat);
/// let stats = push.run(0, &mut arena).unwrap();
///
/// assert!(stats.pushes > 0);
/// assert!((arena.rank().get(0) - 1.0 / 1.85).abs() < 1E-8);
/// assert!((arena.rank().get(1) - 0.85 / 1.85).abs() < 1E-8);
/// ```
#[derive(Clone)]
pub struct PushRank<'a, G: RandomAccessGraph> {
    graph: &'a G,
    alpha: f64,
    epsilon: f64,
    threshold: Threshold,
    discipline: Discipline,
}

impl<G: RandomAccessGraph> std::fmt::Debug for PushRank<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushRank")
            .field("alpha", &self.alpha)
            .field("epsilon", &self.epsilon)
            .field("threshold", &self.threshold)
            .field("discipline", &self.discipline)
            .finish_non_exhaustive()
    }
}

impl<'a, G: RandomAccessGraph> PushRank<'a, G> {
    pub const DEFAULT_ALPHA: f64 = 0.15;
    pub const DEFAULT_EPSILON: f64 = 1E-4;

    /// Creates a new push computation on the given graph with default
    /// parameters.
    pub fn new(graph: &'a G) -> Self {
        Self {
            graph,
            alpha: Self::DEFAULT_ALPHA,
            epsilon: Self::DEFAULT_EPSILON,
            threshold: Threshold::default(),
            discipline: Discipline::default(),
        }
    }

    /// Sets the restart probability α, which must be in (0 . . 1).
    pub fn alpha(&mut self, alpha: f64) -> &mut Self {
        self.alpha = alpha;
        self
    }

    /// Sets the precision ε, which must be positive.
    pub fn epsilon(&mut self, epsilon: f64) -> &mut Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the [threshold policy](Threshold).
    pub fn threshold(&mut self, threshold: Threshold) -> &mut Self {
        self.threshold = threshold;
        self
    }

    /// Sets the worklist [discipline](Discipline).
    pub fn discipline(&mut self, discipline: Discipline) -> &mut Self {
        self.discipline = discipline;
        self
    }

    /// Returns the graph.
    pub fn graph(&self) -> &'a G {
        self.graph
    }

    /// Checks restart probability and precision.
    pub fn validate(&self) -> Result<(), InvalidParameter> {
        check_alpha(self.alpha)?;
        if self.epsilon.is_nan() || self.epsilon <= 0.0 {
            return Err(InvalidParameter::Epsilon(self.epsilon));
        }
        Ok(())
    }

    /// Runs the push method from `source`, leaving the result in `arena`.
    ///
    /// The arena is cleared before the computation starts.
    pub fn run(&self, source: usize, arena: &mut PushArena) -> Result<PushStats, InvalidParameter> {
        let num_nodes = self.graph.num_nodes();
        self.validate()?;
        check_node(source, num_nodes)?;
        if arena.num_nodes() != num_nodes {
            return Err(InvalidParameter::ArenaSize {
                arena: arena.num_nodes(),
                num_nodes,
            });
        }

        log::debug!(
            "Pushing from {source} (alpha={}, epsilon={}, threshold {}, discipline {})",
            self.alpha,
            self.epsilon,
            self.threshold,
            self.discipline
        );

        let cleared = arena.reset();
        let PushArena {
            residual,
            rank,
            worklist,
        } = arena;

        let graph = self.graph;
        let (alpha, epsilon, threshold) = (self.alpha, self.epsilon, self.threshold);
        let mut rng = match self.discipline {
            Discipline::Random { seed } => Some(SmallRng::seed_from_u64(seed)),
            _ => None,
        };
        let mut pushes = 0;
        let mut dropped_mass = KahanSum::<f64>::new();

        if residual.add(source, 1.0) > threshold.limit(epsilon, graph.outdegree(source)) {
            worklist.push_back(source);
        }

        loop {
            let u = match (self.discipline, &mut rng) {
                (Discipline::Queue, _) => worklist.pop_front(),
                (Discipline::Random { .. }, Some(rng)) if !worklist.is_empty() => {
                    let pos = rng.random_range(0..worklist.len());
                    worklist.swap_remove_back(pos)
                }
                _ => worklist.pop_back(),
            };
            let Some(u) = u else { break };

            pushes += 1;
            let val = residual.set_zero(u);
            rank.add(u, alpha * val);

            let outdegree = graph.outdegree(u);
            if outdegree == 0 {
                dropped_mass += (1.0 - alpha) * val;
                continue;
            }

            let share = (1.0 - alpha) * val / outdegree as f64;
            for v in graph.successors(u) {
                let limit = threshold.limit(epsilon, graph.outdegree(v));
                let before = residual.get(v);
                // Enqueue only on a below-to-above transition
                if residual.add(v, share) > limit && before <= limit {
                    worklist.push_back(v);
                }
            }
        }

        Ok(PushStats {
            pushes,
            cleared,
            residual_support: residual.len(),
            rank_support: rank.len(),
            dropped_mass: dropped_mass.sum(),
        })
    }
}

/// Runs the push method from `source` with the given parameters and the
/// default discipline.
///
/// This is a shorthand for configuring a [`PushRank`] and calling
/// [`run`](PushRank::run).
pub fn push<G: RandomAccessGraph>(
    graph: &G,
    alpha: f64,
    source: usize,
    epsilon: f64,
    threshold: Threshold,
    arena: &mut PushArena,
) -> Result<PushStats, InvalidParameter> {
    PushRank::new(graph)
        .alpha(alpha)
        .epsilon(epsilon)
        .threshold(threshold)
        .run(source, arena)
}
