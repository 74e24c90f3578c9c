/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::{
    ArcsArgs, GlobalArgs, OutputArgs, SortOrder, create_output, load_graph, new_progress_logger,
    write_pairs,
};
use anyhow::Result;
use clap::Parser;
use predicates::prelude::*;
use pushrank::graphs::csr_graph::CsrGraph;
use pushrank_algo::rank::power::PowerIteration;
use pushrank_algo::rank::power::preds::{L1Norm, MaxIter};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "power",
    about = "Compute the rooted PageRank of a source by power iteration.",
    long_about = None
)]
pub struct CliArgs {
    /// The file containing the arcs of the graph, or "-" for standard input.
    pub arcs: PathBuf,

    #[arg(short, long)]
    /// The source node.
    pub source: usize,

    #[arg(short, long, default_value_t = PowerIteration::<CsrGraph>::DEFAULT_ALPHA)]
    /// The restart probability α (must be in the interval (0 . . 1)).
    pub alpha: f64,

    #[arg(short, long, default_value_t = L1Norm::DEFAULT_THRESHOLD)]
    /// Stop when the ℓ₁ norm of the difference between successive
    /// approximations is below this threshold.
    pub threshold: f64,

    #[arg(long)]
    /// Maximum number of iterations.
    pub max_iter: Option<usize>,

    #[arg(long, value_enum, default_value_t = SortOrder::None)]
    /// How to sort the output.
    pub sort: SortOrder,

    #[clap(flatten)]
    pub output_args: OutputArgs,

    #[clap(flatten)]
    pub arcs_args: ArcsArgs,
}

pub fn main(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    let graph = load_graph(&args.arcs, &args.arcs_args, &global_args)?;

    // Build stopping predicate
    let mut predicate = L1Norm::try_from(args.threshold)?.boxed();
    if let Some(max_iter) = args.max_iter {
        predicate = predicate.or(MaxIter::from(max_iter)).boxed();
    }

    let mut power = PowerIteration::new(&graph)?;
    power.alpha(args.alpha);
    let mut pl = new_progress_logger(&global_args);
    power.run_with_logging(args.source, predicate, &mut pl)?;

    let mut pairs = power
        .rank()
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, value)| value != 0.0)
        .collect::<Vec<_>>();
    args.sort.sort(&mut pairs);
    let mut out = create_output(args.output_args.output.as_deref())?;
    write_pairs(&mut out, &pairs, args.output_args.precision)?;
    out.flush()?;
    Ok(())
}
