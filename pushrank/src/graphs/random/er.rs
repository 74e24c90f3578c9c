/*
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::graphs::csr_graph::CsrGraph;
use crate::utils::mem::AllocationFailure;
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Provides an implementation of Erdös-Rényi random graphs.
///
/// The Erdös-Rényi random graph model is a simple model for generating random
/// graphs. It is parameterized by the number of nodes `n` and the probability
/// `p` of an arc between any two nodes. In this implementation, loops are never
/// included.
///
/// Note that the time required to enumerate the arcs is quadratic in `n`, so
/// if you plan to reuse the graph you should store it in a [`CsrGraph`] using
/// [`to_csr`](ErdosRenyi::to_csr).
#[derive(Debug, Clone)]
pub struct ErdosRenyi {
    n: usize,
    p: f64,
    seed: u64,
}

impl ErdosRenyi {
    /// Creates a new Erdös-Rényi random graph, given the number of
    /// nodes, the probability of an edge between any two nodes, and a
    /// seed for the [pseudorandom number generator](SmallRng).
    pub fn new(n: usize, p: f64, seed: u64) -> Self {
        assert!((0.0..=1.0).contains(&p), "p must be in [0..1]");
        Self { n, p, seed }
    }

    /// Returns the number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.n
    }

    /// Returns an iterator over the arcs of the graph, in lexicographical
    /// order.
    ///
    /// The same seed always yields the same arcs.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let (n, p) = (self.n, self.p);
        (0..n).flat_map(move |x| {
            (0..n)
                .filter(|&y| y != x && rng.random_bool(p))
                .map(|y| (x, y))
                .collect::<Vec<_>>()
        })
    }

    /// Stores the graph in a [`CsrGraph`] with exactly `n` nodes.
    pub fn to_csr(&self) -> Result<CsrGraph, AllocationFailure> {
        let arcs = self.arcs().collect::<Vec<_>>();
        CsrGraph::from_arcs_with_logging(
            &arcs,
            Some(self.n),
            dsi_progress_logger::no_logging![],
        )
    }
}
