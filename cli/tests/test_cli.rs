/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use pushrank_cli::cli_main;
use std::path::Path;

/// Parses `node value` lines.
fn parse_pairs(text: &str) -> Result<Vec<(usize, f64)>> {
    let mut pairs = vec![];
    for line in text.lines() {
        let (node, value) = line
            .split_once(' ')
            .ok_or_else(|| anyhow::anyhow!("Malformed line {line:?}"))?;
        pairs.push((node.parse()?, value.parse()?));
    }
    Ok(pairs)
}

fn run(args: &[&str]) -> Result<()> {
    cli_main(std::iter::once("pushrank").chain(args.iter().copied()))
}

fn write_arcs(dir: &Path, arcs: &str) -> Result<String> {
    let path = dir.join("arcs.txt");
    std::fs::write(&path, arcs)?;
    Ok(path.to_string_lossy().into_owned())
}

#[test]
fn test_push() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let arcs = write_arcs(dir.path(), "# two-cycle\n0 1\n1 0\n")?;
    let output = dir.path().join("out").join("push.txt");
    let output = output.to_string_lossy();

    run(&[
        "push", &arcs, "--source", "0", "--epsilon", "1e-9", "--sort", "id", "-o", &output,
    ])?;
    let pairs = parse_pairs(&std::fs::read_to_string(output.as_ref())?)?;
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0].0, 0);
    assert!((pairs[0].1 - 1.0 / 1.85).abs() < 1E-8);
    assert!((pairs[1].1 - 0.85 / 1.85).abs() < 1E-8);

    run(&[
        "push",
        &arcs,
        "--source",
        "1",
        "--discipline",
        "random",
        "--seed",
        "7",
        "--sort",
        "value",
        "--precision",
        "3",
        "-o",
        &output,
    ])?;
    let text = std::fs::read_to_string(output.as_ref())?;
    let pairs = parse_pairs(&text)?;
    assert_eq!(pairs[0].0, 1);
    assert!(pairs[0].1 >= pairs[1].1);
    assert!(text.lines().all(|line| line.contains('e')));
    Ok(())
}

#[test]
fn test_all() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let arcs = write_arcs(dir.path(), "0 1\n1 2\n2 0\n2 3\n")?;
    let output = dir.path().join("all.txt");
    let output = output.to_string_lossy();

    run(&["all", &arcs, "-o", &output])?;
    let text = std::fs::read_to_string(output.as_ref())?;
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 4);
    for line in lines {
        let fields = line.split(' ').collect::<Vec<_>>();
        let count = fields[0].parse::<usize>()?;
        assert_eq!(fields.len(), 1 + 2 * count);
    }
    // Node 3 is a sink: only its restart mass survives
    assert_eq!(text.lines().last(), Some("1 3 1.5e-1"));

    let sources = dir.path().join("sources.txt");
    std::fs::write(&sources, "3\n0\n")?;
    run(&[
        "all",
        &arcs,
        "--sources",
        &sources.to_string_lossy(),
        "-o",
        &output,
    ])?;
    let text = std::fs::read_to_string(output.as_ref())?;
    assert_eq!(text.lines().count(), 2);
    assert!(text.starts_with("1 3 "));
    Ok(())
}

#[test]
fn test_power() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let arcs = write_arcs(dir.path(), "0 1\n1 0\n")?;
    let output = dir.path().join("power.txt");
    let output = output.to_string_lossy();

    run(&["power", &arcs, "--source", "0", "--sort", "id", "-o", &output])?;
    let pairs = parse_pairs(&std::fs::read_to_string(output.as_ref())?)?;
    assert_eq!(pairs.len(), 2);
    assert!((pairs[0].1 - 1.0 / 1.85).abs() < 1E-8);
    assert!((pairs[1].1 - 0.85 / 1.85).abs() < 1E-8);
    Ok(())
}

#[test]
fn test_errors() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let arcs = write_arcs(dir.path(), "0 1\n1 x\n")?;
    let output = dir.path().join("out.txt");
    let output = output.to_string_lossy();

    let err = run(&["push", &arcs, "--source", "0", "-o", &output]).unwrap_err();
    assert!(format!("{err:#}").contains("Line 2"));

    let arcs = write_arcs(dir.path(), "0 1\n1 0\n")?;
    assert!(run(&["push", &arcs, "--source", "2", "-o", &output]).is_err());
    assert!(run(&["push", &arcs, "--source", "0", "--alpha", "1", "-o", &output]).is_err());
    assert!(run(&["push", &arcs, "--source", "0", "--epsilon", "0", "-o", &output]).is_err());
    assert!(run(&["power", &arcs, "--source", "0", "--threshold=-1", "-o", &output]).is_err());
    Ok(())
}

#[test]
fn test_all_errors_keep_output() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let arcs = write_arcs(dir.path(), "0 1\n1 0\n")?;
    let output = dir.path().join("all.txt");
    std::fs::write(&output, "previous\n")?;
    let output = output.to_string_lossy();

    assert!(run(&["all", &arcs, "--alpha", "0", "-o", &output]).is_err());
    let sources = dir.path().join("sources.txt");
    std::fs::write(&sources, "0\n2\n")?;
    let sources = sources.to_string_lossy();
    assert!(run(&["all", &arcs, "--sources", &sources, "-o", &output]).is_err());

    // The output is not touched when the arguments are invalid
    assert_eq!(std::fs::read_to_string(output.as_ref())?, "previous\n");
    Ok(())
}
