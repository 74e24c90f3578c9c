/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::{
    ArcsArgs, GlobalArgs, OutputArgs, Policy, create_output, load_graph, new_progress_logger,
    write_record,
};
use anyhow::{Context, Result};
use clap::Parser;
use pushrank::graphs::csr_graph::CsrGraph;
use pushrank::traits::RandomAccessGraph;
use pushrank_algo::rank::{BatchPush, InvalidParameter, PushRank};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "all",
    about = "Approximate the rooted PageRank of every source using the push method, writing one line per source.",
    long_about = None
)]
pub struct CliArgs {
    /// The file containing the arcs of the graph, or "-" for standard input.
    pub arcs: PathBuf,

    #[arg(short, long, default_value_t = PushRank::<CsrGraph>::DEFAULT_EPSILON)]
    /// The precision ε.
    pub epsilon: f64,

    #[arg(short, long, default_value_t = PushRank::<CsrGraph>::DEFAULT_ALPHA)]
    /// The restart probability α (must be in the interval (0 . . 1)).
    pub alpha: f64,

    #[arg(short, long, value_enum, default_value_t = Policy::Degree)]
    /// When the residual of a node must be pushed.
    pub policy: Policy,

    #[arg(long)]
    /// A file containing the sources, one per line (default: all nodes, in
    /// increasing order).
    pub sources: Option<PathBuf>,

    #[clap(flatten)]
    pub output_args: OutputArgs,

    #[clap(flatten)]
    pub arcs_args: ArcsArgs,
}

/// Reads node identifiers, one per line, skipping empty lines and lines
/// starting with `#`.
pub fn read_sources(reader: impl BufRead) -> Result<Vec<usize>> {
    let mut sources = vec![];
    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Could not read line {}", i + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        sources.push(
            line.parse::<usize>()
                .with_context(|| format!("Line {}: {:?} is not a valid node identifier", i + 1, line))?,
        );
    }
    Ok(sources)
}

fn load_sources(path: &Path) -> Result<Vec<usize>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Could not open {}", path.display()))?;
    let sources = read_sources(BufReader::new(file))
        .with_context(|| format!("Could not read sources from {}", path.display()))?;
    log::info!("Read {} sources from {}", sources.len(), path.display());
    Ok(sources)
}

pub fn main(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    let graph = load_graph(&args.arcs, &args.arcs_args, &global_args)?;

    let sources = match &args.sources {
        Some(path) => load_sources(path)?,
        None => (0..graph.num_nodes()).collect(),
    };

    let mut batch = BatchPush::new(&graph)?;
    batch
        .push_rank()
        .alpha(args.alpha)
        .epsilon(args.epsilon)
        .threshold(args.policy.into());
    log::debug!("{:?}", batch.push_rank());
    batch.push_rank().validate()?;
    let num_nodes = graph.num_nodes();
    if let Some(&node) = sources.iter().find(|&&node| node >= num_nodes) {
        return Err(InvalidParameter::Node { node, num_nodes }.into());
    }

    let mut out = create_output(args.output_args.output.as_deref())?;
    let precision = args.output_args.precision;
    let mut pairs = vec![];
    let mut pl = new_progress_logger(&global_args);

    let stats = batch.run_with_logging(
        &sources,
        |source, rank| {
            pairs.clear();
            pairs.extend(rank.iter_nonzero());
            write_record(&mut out, &pairs, precision)
                .with_context(|| format!("Could not write the record of source {source}"))
        },
        &mut pl,
    )?;
    out.flush()?;

    log::info!(
        "Processed {} sources with {} pushes",
        stats.sources,
        stats.pushes
    );
    Ok(())
}
