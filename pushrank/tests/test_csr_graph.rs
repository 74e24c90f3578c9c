/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use dsi_progress_logger::prelude::*;
use itertools::Itertools;
use pushrank::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

/// Checks that `g` contains exactly the arcs in `arcs`, as a multiset.
fn assert_same_arcs(g: &CsrGraph, arcs: &[(usize, usize)]) {
    assert_eq!(g.num_arcs(), arcs.len() as u64);
    assert_eq!(
        g.arcs().sorted().collect::<Vec<_>>(),
        arcs.iter().copied().sorted().collect::<Vec<_>>()
    );
    for x in 0..g.num_nodes() {
        assert_eq!(g.outdegree(x), g.dcf()[x + 1] - g.dcf()[x]);
        assert_eq!(
            RandomAccessGraph::successors(g, x).into_iter().count(),
            g.outdegree(x)
        );
    }
}

#[test]
fn test_shuffled_arcs() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut arcs = ErdosRenyi::new(100, 0.05, 0).arcs().collect::<Vec<_>>();
    // Loops and duplicates are kept
    arcs.extend([(3, 3), (7, 8), (7, 8), (99, 0)]);
    let mut rng = SmallRng::seed_from_u64(0);

    let mut pl = ProgressLogger::default();
    let reference = CsrGraph::from_arcs_with_logging(&arcs, None, &mut pl)?;
    assert_same_arcs(&reference, &arcs);

    for _ in 0..5 {
        arcs.shuffle(&mut rng);
        let g = CsrGraph::from_arcs(&arcs)?;
        assert_same_arcs(&g, &arcs);
        assert_eq!(g.outdegrees(), reference.outdegrees());
        assert_eq!(g.dcf(), reference.dcf());
        for x in 0..g.num_nodes() {
            assert_eq!(
                g.successors(x).iter().sorted().collect::<Vec<_>>(),
                reference.successors(x).iter().sorted().collect::<Vec<_>>()
            );
        }
    }
    Ok(())
}

#[test]
fn test_successor_order() -> Result<()> {
    let g = CsrGraph::from_arcs(&[(1, 5), (0, 2), (1, 3), (1, 5), (0, 1)])?;
    // Successors appear in input order
    assert_eq!(g.successors(0), &[2, 1]);
    assert_eq!(g.successors(1), &[5, 3, 5]);
    assert!(g.has_arc(1, 3));
    assert!(!g.has_arc(3, 1));
    assert!(g.is_sink(4));
    assert!(!g.is_sink(0));
    Ok(())
}

#[test]
fn test_from_text() -> Result<()> {
    let text = "# a small graph\n\n0 1\n  1\t2  \n2 0\n# trailing comment\n5 2\n";
    let g = build_graph(text.as_bytes())?;
    assert_eq!(g.num_nodes(), 6);
    assert_eq!(
        g.arcs().collect::<Vec<_>>(),
        vec![(0, 1), (1, 2), (2, 0), (5, 2)]
    );
    // Ids need not be contiguous
    assert!(g.is_sink(3) && g.is_sink(4));

    let mut pl = ProgressLogger::default();
    let options = ArcsOptions {
        comment_symbol: Some('%'),
        lines_to_skip: 1,
    };
    let g = CsrGraph::from_reader_with_logging(
        "100 200\n% comment\n0 1\n".as_bytes(),
        options,
        Some(10),
        &mut pl,
    )?;
    assert_eq!(g.num_nodes(), 10);
    assert_eq!(g.arcs().collect::<Vec<_>>(), vec![(0, 1)]);
    Ok(())
}

#[test]
fn test_errors() {
    let err = build_graph("0 1\n1 2 3\n".as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        ReadArcsError::InputFormat(InputFormatError::FieldCount { line: 2, .. })
    ));

    let err = build_graph("0 1\n\n-1 2\n".as_bytes()).unwrap_err();
    match err {
        ReadArcsError::InputFormat(e) => assert_eq!(e.line(), 3),
        _ => panic!("Unexpected error {err}"),
    }

    let err = build_graph("# only a comment\n1\n".as_bytes()).unwrap_err();
    assert!(err.to_string().contains("Line 2"));
}

#[test]
fn test_empty() -> Result<()> {
    for text in ["", "\n\n", "# nothing here\n"] {
        let g = build_graph(text.as_bytes())?;
        assert_eq!(g.num_nodes(), 0);
        assert_eq!(g.num_arcs(), 0);
        assert_eq!(g.dcf(), &[0]);
    }
    Ok(())
}
