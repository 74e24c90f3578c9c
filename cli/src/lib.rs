/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
#![deny(unused_doc_comments)]

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dsi_progress_logger::{ProgressLog, ProgressLogger, progress_logger};
use pushrank::prelude::*;
use pushrank_algo::rank::{Discipline, Threshold};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use std::time::SystemTime;

#[derive(Args, Debug)]
/// Shared CLI arguments for reading files containing arcs.
pub struct ArcsArgs {
    #[arg(long, default_value_t = '#')]
    /// Ignore lines that start with this symbol.
    pub line_comment_symbol: char,

    #[arg(long)]
    /// Do not ignore any line as a comment (overrides --line-comment-symbol).
    pub no_comments: bool,

    #[arg(long, default_value_t = 0)]
    /// How many lines to skip at the start of the input.
    pub lines_to_skip: usize,

    #[arg(long)]
    /// The number of nodes in the graph; if larger than the number inferred
    /// from the arcs, isolated nodes are added at the end of the graph.
    pub num_nodes: Option<usize>,
}

impl ArcsArgs {
    /// Returns the reading options corresponding to the arguments.
    pub fn options(&self) -> ArcsOptions {
        ArcsOptions {
            comment_symbol: (!self.no_comments).then_some(self.line_comment_symbol),
            lines_to_skip: self.lines_to_skip,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
/// The rule deciding when the residual of a node must be pushed.
pub enum Policy {
    /// Push when the residual exceeds ε.
    #[default]
    Flat,
    /// Push when the residual exceeds ε times the outdegree.
    Degree,
}

impl From<Policy> for Threshold {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Flat => Threshold::Flat,
            Policy::Degree => Threshold::DegreeScaled,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
/// The order in which nodes are extracted from the worklist.
pub enum CliDiscipline {
    /// Last in, first out.
    #[default]
    Stack,
    /// First in, first out.
    Queue,
    /// Uniformly random, seeded.
    Random,
}

impl CliDiscipline {
    /// Returns the corresponding discipline, using `seed` for the random one.
    pub fn into_discipline(self, seed: Option<u64>) -> Discipline {
        if seed.is_some() && self != CliDiscipline::Random {
            log::warn!("A seed is meaningful only with the random discipline: ignoring it");
        }
        match self {
            CliDiscipline::Stack => Discipline::Stack,
            CliDiscipline::Queue => Discipline::Queue,
            CliDiscipline::Random => Discipline::Random {
                seed: seed.unwrap_or(0),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
/// How to sort the lines of single-source outputs.
pub enum SortOrder {
    /// No sorting.
    #[default]
    None,
    /// By node identifier, in increasing order.
    Id,
    /// By value, in decreasing order (ties by increasing node identifier).
    Value,
}

impl SortOrder {
    /// Sorts `pairs` of nodes and values.
    pub fn sort(self, pairs: &mut [(usize, f64)]) {
        match self {
            SortOrder::None => {}
            SortOrder::Id => pairs.sort_unstable_by_key(|&(node, _)| node),
            SortOrder::Value => {
                pairs.sort_unstable_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)))
            }
        }
    }
}

/// Shared CLI arguments for writing results.
#[derive(Args, Debug)]
pub struct OutputArgs {
    #[arg(short, long)]
    /// Where to write the results (default: standard output).
    pub output: Option<std::path::PathBuf>,

    #[arg(long)]
    /// Decimal digits of the values, which are written in scientific notation
    /// (default: the shortest representation that reads back exactly).
    pub precision: Option<usize>,
}

/// Creates all parent directories of the given file path.
pub fn create_parent_dir(file_path: impl AsRef<Path>) -> Result<()> {
    // ensure that the dst directory exists
    if let Some(parent_dir) = file_path.as_ref().parent() {
        std::fs::create_dir_all(parent_dir).with_context(|| {
            format!(
                "Failed to create the directory {:?}",
                parent_dir.to_string_lossy()
            )
        })?;
    }
    Ok(())
}

/// Opens the given file for buffered writing, or standard output if `path`
/// is `None`.
pub fn create_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
        Some(path) => {
            create_parent_dir(path)?;
            let file = std::fs::File::create(path)
                .with_context(|| format!("Could not create {}", path.display()))?;
            log::info!("Writing results to {}", path.display());
            Box::new(BufWriter::new(file))
        }
    })
}

/// Writes `value` in scientific notation with the given number of decimal
/// digits.
fn write_value(out: &mut impl Write, value: f64, precision: Option<usize>) -> std::io::Result<()> {
    match precision {
        None => write!(out, "{value:e}"),
        Some(precision) => write!(out, "{value:.precision$e}"),
    }
}

/// Writes one `node value` line for each pair.
pub fn write_pairs(
    out: &mut impl Write,
    pairs: &[(usize, f64)],
    precision: Option<usize>,
) -> std::io::Result<()> {
    for &(node, value) in pairs {
        write!(out, "{node} ")?;
        write_value(out, value, precision)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Writes a single line containing the number of pairs followed by the
/// pairs.
pub fn write_record(
    out: &mut impl Write,
    pairs: &[(usize, f64)],
    precision: Option<usize>,
) -> std::io::Result<()> {
    write!(out, "{}", pairs.len())?;
    for &(node, value) in pairs {
        write!(out, " {node} ")?;
        write_value(out, value, precision)?;
    }
    writeln!(out)
}

/// Returns a progress logger configured using the global arguments.
pub fn new_progress_logger(global_args: &GlobalArgs) -> ProgressLogger {
    let mut pl = progress_logger![];
    pl.display_memory(true);
    if let Some(log_interval) = global_args.log_interval {
        pl.log_interval(log_interval);
    }
    pl
}

/// Builds a graph from an arc list read from `reader`.
pub fn read_graph(
    reader: impl BufRead,
    arcs_args: &ArcsArgs,
    pl: &mut impl ProgressLog,
) -> Result<CsrGraph> {
    let graph =
        CsrGraph::from_reader_with_logging(reader, arcs_args.options(), arcs_args.num_nodes, pl)?;
    log::info!(
        "The graph has {} nodes and {} arcs",
        graph.num_nodes(),
        graph.num_arcs()
    );
    Ok(graph)
}

/// Builds a graph from the arc list in the given file, or from standard
/// input if the path is `-`.
pub fn load_graph(
    path: impl AsRef<Path>,
    arcs_args: &ArcsArgs,
    global_args: &GlobalArgs,
) -> Result<CsrGraph> {
    let path = path.as_ref();
    let mut pl = new_progress_logger(global_args);
    if path.as_os_str() == "-" {
        log::info!("Reading arcs from standard input...");
        read_graph(std::io::stdin().lock(), arcs_args, &mut pl)
            .context("Could not build the graph from standard input")
    } else {
        log::info!("Reading arcs from {}", path.display());
        let file = std::fs::File::open(path)
            .with_context(|| format!("Could not open {}", path.display()))?;
        read_graph(BufReader::new(file), arcs_args, &mut pl)
            .with_context(|| format!("Could not build the graph from {}", path.display()))
    }
}

/// Parses a duration from a string.
/// For compatibility with Java, if no suffix is given, it is assumed to be in milliseconds.
/// You can use suffixes, the available ones are:
/// - `s` for seconds
/// - `m` for minutes
/// - `h` for hours
/// - `d` for days
///
/// Example: `1d2h3m4s567` this is parsed as: 1 day, 2 hours, 3 minutes, 4 seconds, and 567 milliseconds.
fn parse_duration(value: &str) -> Result<Duration> {
    if value.is_empty() {
        bail!("Empty duration string, if you want every 0 milliseconds use `0`.");
    }
    let mut duration = Duration::from_secs(0);
    let mut acc = String::new();
    for c in value.chars() {
        if c.is_ascii_digit() {
            acc.push(c);
        } else if c.is_whitespace() {
            continue;
        } else {
            let dur = acc.parse::<u64>()?;
            match c {
                's' => duration += Duration::from_secs(dur),
                'm' => duration += Duration::from_secs(dur * 60),
                'h' => duration += Duration::from_secs(dur * 60 * 60),
                'd' => duration += Duration::from_secs(dur * 60 * 60 * 24),
                _ => return Err(anyhow!("Invalid duration suffix: {}", c)),
            }
            acc.clear();
        }
    }
    if !acc.is_empty() {
        let dur = acc.parse::<u64>()?;
        duration += Duration::from_millis(dur);
    }
    Ok(duration)
}

/// Initializes the `env_logger` logger with a custom format including
/// timestamps with elapsed time since initialization.
pub fn init_env_logger() -> Result<()> {
    use jiff::SpanRound;
    use jiff::fmt::friendly::{Designator, Spacing, SpanPrinter};

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    let start = std::time::Instant::now();
    let printer = SpanPrinter::new()
        .spacing(Spacing::None)
        .designator(Designator::Compact);
    let span_round = SpanRound::new()
        .largest(jiff::Unit::Day)
        .smallest(jiff::Unit::Millisecond)
        .days_are_24_hours();

    builder.format(move |buf, record| {
        let Ok(ts) = jiff::Timestamp::try_from(SystemTime::now()) else {
            return Err(std::io::Error::other("Failed to get timestamp"));
        };
        let style = buf.default_level_style(record.level());
        let elapsed = start.elapsed();
        let span = jiff::Span::new()
            .seconds(elapsed.as_secs() as i64)
            .milliseconds(elapsed.subsec_millis() as i64);
        let span = span.round(span_round).map_err(std::io::Error::other)?;
        writeln!(
            buf,
            "{} {} {style}{}{style:#} [{:?}] {} - {}",
            ts.strftime("%F %T%.3f"),
            printer.span_to_string(&span),
            record.level(),
            std::thread::current().id(),
            record.target(),
            record.args()
        )
    });
    builder.try_init()?;
    Ok(())
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    #[arg(long, value_parser = parse_duration, global=true, display_order = 1000)]
    /// How often to log progress. Default is 10s. You can use the suffixes "s"
    /// for seconds, "m" for minutes, "h" for hours, and "d" for days. If no
    /// suffix is provided it is assumed to be in milliseconds.
    /// Example: "1d2h3m4s567" is parsed as 1 day + 2 hours + 3 minutes + 4
    /// seconds + 567 milliseconds = 93784567 milliseconds.
    pub log_interval: Option<Duration>,
}

#[derive(Subcommand, Debug)]
pub enum SubCommands {
    Push(push::CliArgs),
    All(all::CliArgs),
    Power(power::CliArgs),
}

#[derive(Parser, Debug)]
#[command(name = "pushrank", version)]
/// Approximates rooted (personalized) PageRank on graphs given as arc lists.
///
/// Noteworthy environment variables:
///
/// - RUST_LOG: configuration for env_logger
///   <https://docs.rs/env_logger/latest/env_logger/>
pub struct Cli {
    #[command(subcommand)]
    pub command: SubCommands,
    #[clap(flatten)]
    pub args: GlobalArgs,
}

pub mod all;
pub mod power;
pub mod push;

/// The entry point of the command-line interface.
pub fn cli_main<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let start = std::time::Instant::now();
    let cli = Cli::parse_from(args);
    match cli.command {
        SubCommands::Push(args) => {
            push::main(cli.args, args)?;
        }
        SubCommands::All(args) => {
            all::main(cli.args, args)?;
        }
        SubCommands::Power(args) => {
            power::main(cli.args, args)?;
        }
    }

    log::info!(
        "The command took {}",
        pretty_print_elapsed(start.elapsed().as_secs_f64())
    );

    Ok(())
}

/// Pretty-prints seconds in a human-readable format.
fn pretty_print_elapsed(elapsed: f64) -> String {
    let mut result = String::new();
    let mut elapsed_seconds = elapsed as u64;
    let weeks = elapsed_seconds / (60 * 60 * 24 * 7);
    elapsed_seconds %= 60 * 60 * 24 * 7;
    let days = elapsed_seconds / (60 * 60 * 24);
    elapsed_seconds %= 60 * 60 * 24;
    let hours = elapsed_seconds / (60 * 60);
    elapsed_seconds %= 60 * 60;
    let minutes = elapsed_seconds / 60;

    match weeks {
        0 => {}
        1 => result.push_str("1 week "),
        _ => result.push_str(&format!("{} weeks ", weeks)),
    }
    match days {
        0 => {}
        1 => result.push_str("1 day "),
        _ => result.push_str(&format!("{} days ", days)),
    }
    match hours {
        0 => {}
        1 => result.push_str("1 hour "),
        _ => result.push_str(&format!("{} hours ", hours)),
    }
    match minutes {
        0 => {}
        1 => result.push_str("1 minute "),
        _ => result.push_str(&format!("{} minutes ", minutes)),
    }

    result.push_str(&format!("{:.3} seconds ({}s)", elapsed % 60.0, elapsed));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsi_progress_logger::no_logging;

    fn arcs_args() -> ArcsArgs {
        ArcsArgs {
            line_comment_symbol: '#',
            no_comments: false,
            lines_to_skip: 0,
            num_nodes: None,
        }
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("1500").unwrap(), Duration::from_millis(1500));
        assert_eq!(
            parse_duration("1d2h3m4s567").unwrap(),
            Duration::from_millis(93784567)
        );
        assert!(parse_duration("").is_err());
        assert!(parse_duration("3x").is_err());
    }

    #[test]
    fn test_pretty_print_elapsed() {
        assert_eq!(pretty_print_elapsed(1.5), "1.500 seconds (1.5s)");
        assert_eq!(
            pretty_print_elapsed(3725.0),
            "1 hour 2 minutes 5.000 seconds (3725s)"
        );
    }

    #[test]
    fn test_sort() {
        let mut pairs = vec![(3, 0.25), (1, 0.5), (2, 0.25), (0, 0.125)];
        SortOrder::Value.sort(&mut pairs);
        assert_eq!(pairs, vec![(1, 0.5), (2, 0.25), (3, 0.25), (0, 0.125)]);
        SortOrder::Id.sort(&mut pairs);
        assert_eq!(pairs, vec![(0, 0.125), (1, 0.5), (2, 0.25), (3, 0.25)]);
        SortOrder::None.sort(&mut pairs);
        assert_eq!(pairs[0], (0, 0.125));
    }

    #[test]
    fn test_write() {
        let mut out = Vec::new();
        write_pairs(&mut out, &[(3, 0.5), (0, 0.125)], None).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "3 5e-1\n0 1.25e-1\n");

        let mut out = Vec::new();
        write_record(&mut out, &[(3, 0.5), (0, 0.125)], Some(2)).unwrap();
        write_record(&mut out, &[], Some(2)).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "2 3 5.00e-1 0 1.25e-1\n0\n"
        );
    }

    #[test]
    fn test_read_graph() {
        let args = ArcsArgs {
            lines_to_skip: 1,
            num_nodes: Some(4),
            ..arcs_args()
        };
        let g = read_graph("% header\n0 1\n1 0\n".as_bytes(), &args, no_logging![]).unwrap();
        assert_eq!(g.num_nodes(), 4);
        assert_eq!(g.num_arcs(), 2);

        let args = ArcsArgs {
            no_comments: true,
            ..arcs_args()
        };
        let err = read_graph("0 1\n# 1 2\n".as_bytes(), &args, no_logging![]).unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn test_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("out.txt");
        {
            let mut out = create_output(Some(&path)).unwrap();
            write_pairs(&mut out, &[(1, 1.0)], Some(1)).unwrap();
            out.flush().unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1 1.0e0\n");
    }
}
