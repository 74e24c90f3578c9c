/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Rooted PageRank by power iteration.
//!
//! This implementation computes the same vector as the [push
//! method](super::push), but it iterates on dense vectors, so its cost per
//! iteration is linear in the size of the graph. It is useful as a reference
//! against which local approximations can be checked.
//!
//! Starting from **x**⁽⁰⁾ = **e**ₛ, the iteration is
//!
//! > **x**⁽*ᵗ* ⁺ ¹⁾ = α **e**ₛ + (1 − α) *P*ᵀ **x**⁽*ᵗ*⁾,
//!
//! where *P* is the row-normalized adjacency matrix with zero rows for sinks.
//! As in the push method, the mass reaching a sink is dropped, so the result
//! is not stochastic if a sink is reachable from the source.
//!
//! # Stopping Criteria
//!
//! The [`run`](PowerIteration::run) method accepts a composable [`Predicate`]
//! that is evaluated after each iteration. The predicate receives the current
//! iteration number and the _norm delta_ ‖**x**⁽*ᵗ*⁾ − **x**⁽*ᵗ* − ¹⁾‖₁.
//! Since the iteration is a contraction of factor 1 − α, the ℓ₁ error is at
//! most (1 − α) / α times the norm delta.

pub mod preds {
    //! Predicates implementing stopping conditions.
    //!
    //! The [power iteration](super::PowerIteration) requires a
    //! [predicate](Predicate) to stop the algorithm. This module provides a few
    //! such predicates: they evaluate to true if the computation should be
    //! stopped.
    //!
    //! You can combine the predicates using the `and` and `or` methods provided
    //! by the [`Predicate`] trait.
    //!
    //! # Examples
    //! ```
    //! # fn main() -> Result<(), Box<dyn std::error::Error>> {
    //! use predicates::prelude::*;
    //! use pushrank_algo::rank::power::preds::{L1Norm, MaxIter};
    //!
    //! let mut predicate = L1Norm::try_from(1E-6)?.boxed();
    //! predicate = predicate.or(MaxIter::from(100)).boxed();
    //! #     Ok(())
    //! # }
    //! ```

    use anyhow::ensure;
    use predicates::{Predicate, reflection::PredicateReflection};
    use std::fmt::Display;

    #[doc(hidden)]
    /// This structure is passed to stopping predicates to provide the
    /// information that is needed to evaluate them.
    #[derive(Debug)]
    pub struct PredParams {
        pub iteration: usize,
        pub norm_delta: f64,
    }

    /// Stops after at most the provided number of iterations.
    #[derive(Debug, Clone)]
    pub struct MaxIter {
        max_iter: usize,
    }

    impl MaxIter {
        pub const DEFAULT_MAX_ITER: usize = 1000;
    }

    impl From<usize> for MaxIter {
        fn from(max_iter: usize) -> Self {
            MaxIter { max_iter }
        }
    }

    impl Default for MaxIter {
        fn default() -> Self {
            Self::from(Self::DEFAULT_MAX_ITER)
        }
    }

    impl Display for MaxIter {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_fmt(format_args!("(max iter: {})", self.max_iter))
        }
    }

    impl PredicateReflection for MaxIter {}

    impl Predicate<PredParams> for MaxIter {
        fn eval(&self, pred_params: &PredParams) -> bool {
            pred_params.iteration >= self.max_iter
        }
    }

    /// Stops when the ℓ₁ norm of the difference between successive
    /// approximations falls below a given threshold.
    #[derive(Debug, Clone)]
    pub struct L1Norm {
        threshold: f64,
    }

    impl L1Norm {
        pub const DEFAULT_THRESHOLD: f64 = 1E-9;
    }

    impl TryFrom<Option<f64>> for L1Norm {
        type Error = anyhow::Error;
        fn try_from(threshold: Option<f64>) -> anyhow::Result<Self> {
            Ok(match threshold {
                Some(threshold) => {
                    ensure!(!threshold.is_nan());
                    ensure!(threshold > 0.0, "The threshold must be positive");
                    L1Norm { threshold }
                }
                None => Self::default(),
            })
        }
    }

    impl TryFrom<f64> for L1Norm {
        type Error = anyhow::Error;
        fn try_from(threshold: f64) -> anyhow::Result<Self> {
            Some(threshold).try_into()
        }
    }

    impl Default for L1Norm {
        fn default() -> Self {
            L1Norm {
                threshold: Self::DEFAULT_THRESHOLD,
            }
        }
    }

    impl Display for L1Norm {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_fmt(format_args!("(norm: {})", self.threshold))
        }
    }

    impl PredicateReflection for L1Norm {}
    impl Predicate<PredParams> for L1Norm {
        fn eval(&self, pred_params: &PredParams) -> bool {
            pred_params.norm_delta <= self.threshold
        }
    }
}

use super::push::{InvalidParameter, check_alpha, check_node};
use dsi_progress_logger::{ProgressLog, no_logging};
use kahan::KahanSum;
use predicates::Predicate;
use pushrank::traits::RandomAccessGraph;
use pushrank::utils::mem::{AllocationFailure, try_filled};

/// Computes rooted PageRank by power iteration.
///
/// The struct is configured via setters and then executed via
/// [`run`](Self::run). After completion the rank vector is available via the
/// [`rank`](Self::rank) method.
///
/// # Examples
///
/// ```
/// use pushrank::prelude::*;
/// use pushrank_algo::rank::power::{PowerIteration, preds};
///
/// // A two-node cycle
/// let g = CsrGraph::from_arcs(&[(0, 1), (1, 0)]).unwrap();
///
/// let mut power = PowerIteration::new(&g).unwrap();
/// power.alpha(0.15);
/// power.run(0, preds::L1Norm::try_from(1E-12).unwrap()).unwrap();
///
/// assert!((power.rank()[0] - 1.0 / 1.85).abs() < 1E-9);
/// assert!((power.rank()[1] - 0.85 / 1.85).abs() < 1E-9);
/// ```
pub struct PowerIteration<'a, G: RandomAccessGraph> {
    graph: &'a G,
    alpha: f64,
    norm_delta: f64,
    iteration: usize,

    rank: Box<[f64]>,
    next: Box<[f64]>,
}

impl<G: RandomAccessGraph> std::fmt::Debug for PowerIteration<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PowerIteration")
            .field("alpha", &self.alpha)
            .field("norm_delta", &self.norm_delta)
            .field("iteration", &self.iteration)
            .finish_non_exhaustive()
    }
}

impl<'a, G: RandomAccessGraph> PowerIteration<'a, G> {
    pub const DEFAULT_ALPHA: f64 = 0.15;

    /// Creates a new power iteration, allocating two dense vectors.
    pub fn new(graph: &'a G) -> Result<Self, AllocationFailure> {
        let n = graph.num_nodes();
        Ok(Self {
            graph,
            alpha: Self::DEFAULT_ALPHA,
            norm_delta: f64::INFINITY,
            iteration: 0,
            rank: try_filled("rank", n, 0.0)?.into(),
            next: try_filled("next rank", n, 0.0)?.into(),
        })
    }

    /// Sets the restart probability α, which must be in (0 . . 1).
    pub fn alpha(&mut self, alpha: f64) -> &mut Self {
        self.alpha = alpha;
        self
    }

    /// Returns the rank vector.
    ///
    /// After calling [`run`](Self::run), this contains the rooted PageRank
    /// of the source.
    pub fn rank(&self) -> &[f64] {
        &self.rank
    }

    /// Returns the number of iterations performed by the last call to
    /// [`run`](Self::run).
    pub fn iterations(&self) -> usize {
        self.iteration
    }

    /// Returns the ℓ₁ norm of the difference between the last two
    /// approximations.
    pub fn norm_delta(&self) -> f64 {
        self.norm_delta
    }

    /// Runs the power iteration from `source` until the given predicate is
    /// satisfied.
    pub fn run(
        &mut self,
        source: usize,
        predicate: impl Predicate<preds::PredParams>,
    ) -> Result<(), InvalidParameter> {
        self.run_with_logging(source, predicate, no_logging![])
    }

    /// Runs the power iteration from `source` until the given predicate is
    /// satisfied, logging progress.
    pub fn run_with_logging(
        &mut self,
        source: usize,
        predicate: impl Predicate<preds::PredParams>,
        pl: &mut impl ProgressLog,
    ) -> Result<(), InvalidParameter> {
        check_alpha(self.alpha)?;
        check_node(source, self.graph.num_nodes())?;

        log::info!("Alpha: {}", self.alpha);
        log::info!("Stopping criterion: {}", predicate);

        let alpha = self.alpha;
        self.rank.fill(0.0);
        self.rank[source] = 1.0;
        self.iteration = 0;
        self.norm_delta = f64::INFINITY;

        pl.item_name("iteration");
        pl.expected_updates(None);
        pl.start(format!(
            "Computing rooted PageRank from {source} (alpha={alpha})..."
        ));

        loop {
            self.next.fill(0.0);
            self.next[source] = alpha;

            for (node, &value) in self.rank.iter().enumerate() {
                let outdegree = self.graph.outdegree(node);
                if value == 0.0 || outdegree == 0 {
                    continue;
                }
                let share = (1.0 - alpha) * value / outdegree as f64;
                for succ in self.graph.successors(node) {
                    self.next[succ] += share;
                }
            }

            self.norm_delta = self
                .rank
                .iter()
                .zip(self.next.iter())
                .fold(KahanSum::<f64>::new(), |sum, (x, y)| sum + (x - y).abs())
                .sum();
            std::mem::swap(&mut self.rank, &mut self.next);
            self.iteration += 1;

            pl.update();

            if predicate.eval(&preds::PredParams {
                iteration: self.iteration,
                norm_delta: self.norm_delta,
            }) {
                break;
            }
        }

        pl.done();
        log::info!(
            "Stopped after {} iterations, norm delta {}",
            self.iteration,
            self.norm_delta
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushrank::graphs::csr_graph::CsrGraph;

    #[test]
    fn test_sink_drops_mass() {
        let g = CsrGraph::from_arcs(&[(0, 1)]).unwrap();
        let mut power = PowerIteration::new(&g).unwrap();
        power.run(0, preds::MaxIter::from(10)).unwrap();
        assert_eq!(power.iterations(), 10);
        assert!((power.rank()[0] - 0.15).abs() < 1E-15);
        assert!((power.rank()[1] - 0.85 * 0.15).abs() < 1E-15);
        // Rooted at a sink, only the restart mass survives
        power.run(1, preds::MaxIter::from(3)).unwrap();
        assert_eq!(power.rank(), &[0.0, 0.15]);
    }

    #[test]
    fn test_invalid() {
        let g = CsrGraph::from_arcs(&[(0, 1)]).unwrap();
        let mut power = PowerIteration::new(&g).unwrap();
        assert_eq!(
            power.run(2, preds::MaxIter::default()),
            Err(InvalidParameter::Node {
                node: 2,
                num_nodes: 2
            })
        );
        power.alpha(1.0);
        assert_eq!(
            power.run(0, preds::MaxIter::default()),
            Err(InvalidParameter::Alpha(1.0))
        );
    }
}
