/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::{
    ArcsArgs, CliDiscipline, GlobalArgs, OutputArgs, Policy, SortOrder, create_output, load_graph,
    write_pairs,
};
use anyhow::Result;
use clap::Parser;
use pushrank::graphs::csr_graph::CsrGraph;
use pushrank::traits::RandomAccessGraph;
use pushrank_algo::rank::{PushArena, PushRank};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "push",
    about = "Approximate the rooted PageRank of a source using the push method.",
    long_about = None
)]
pub struct CliArgs {
    /// The file containing the arcs of the graph, or "-" for standard input.
    pub arcs: PathBuf,

    #[arg(short, long)]
    /// The source node.
    pub source: usize,

    #[arg(short, long, default_value_t = PushRank::<CsrGraph>::DEFAULT_EPSILON)]
    /// The precision ε.
    pub epsilon: f64,

    #[arg(short, long, default_value_t = PushRank::<CsrGraph>::DEFAULT_ALPHA)]
    /// The restart probability α (must be in the interval (0 . . 1)).
    pub alpha: f64,

    #[arg(short, long, value_enum, default_value_t = Policy::Flat)]
    /// When the residual of a node must be pushed.
    pub policy: Policy,

    #[arg(short, long, value_enum, default_value_t = CliDiscipline::Stack)]
    /// The order in which nodes are pushed.
    pub discipline: CliDiscipline,

    #[arg(long)]
    /// The seed for the random discipline (default: 0).
    pub seed: Option<u64>,

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

    let mut push_rank = PushRank::new(&graph);
    push_rank
        .alpha(args.alpha)
        .epsilon(args.epsilon)
        .threshold(args.policy.into())
        .discipline(args.discipline.into_discipline(args.seed));
    push_rank.validate()?;
    log::debug!("{push_rank:?}");

    let mut arena = PushArena::new(graph.num_nodes())?;
    log::info!("Pushing from node {}...", args.source);
    let stats = push_rank.run(args.source, &mut arena)?;
    log::info!(
        "{} pushes, {} nodes touched, {} nodes ranked, mass dropped at sinks {:e}",
        stats.pushes,
        stats.residual_support,
        stats.rank_support,
        stats.dropped_mass
    );

    let mut pairs = arena.rank().iter_nonzero().collect::<Vec<_>>();
    args.sort.sort(&mut pairs);
    let mut out = create_output(args.output_args.output.as_deref())?;
    write_pairs(&mut out, &pairs, args.output_args.precision)?;
    out.flush()?;
    Ok(())
}
