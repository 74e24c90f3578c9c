/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use predicates::prelude::*;
use pushrank::graphs::csr_graph::CsrGraph;
use pushrank::graphs::random::ErdosRenyi;
use pushrank_algo::rank::power::{PowerIteration, preds};

#[test]
fn test_two_cycle() -> Result<()> {
    let g = CsrGraph::from_arcs(&[(0, 1), (1, 0)])?;
    let mut power = PowerIteration::new(&g)?;
    for alpha in [0.15, 0.5, 0.85] {
        power.alpha(alpha);
        power.run(1, preds::L1Norm::try_from(1E-12)?)?;
        assert!((power.rank()[1] - 1.0 / (2.0 - alpha)).abs() < 1E-10);
        assert!((power.rank()[0] - (1.0 - alpha) / (2.0 - alpha)).abs() < 1E-10);
        assert!(power.norm_delta() <= 1E-12);
    }
    Ok(())
}

#[test]
fn test_path() -> Result<()> {
    // Mass leaving the last node is dropped
    let g = CsrGraph::from_arcs(&[(0, 1), (1, 2)])?;
    let mut power = PowerIteration::new(&g)?;
    let alpha = 0.3;
    power.alpha(alpha);
    power.run(0, preds::L1Norm::default())?;
    // The iteration is exact after the path has been traversed
    assert_eq!(power.iterations(), 4);
    assert_eq!(power.norm_delta(), 0.0);
    let expected = [alpha, alpha * (1.0 - alpha), alpha * (1.0 - alpha) * (1.0 - alpha)];
    for (x, y) in power.rank().iter().zip(expected) {
        assert!((x - y).abs() < 1E-15);
    }
    Ok(())
}

#[test]
fn test_max_iter() -> Result<()> {
    let g = ErdosRenyi::new(30, 0.2, 0).to_csr()?;
    let mut power = PowerIteration::new(&g)?;
    power.run(
        0,
        preds::L1Norm::try_from(1E-300)?.or(preds::MaxIter::from(7)),
    )?;
    assert_eq!(power.iterations(), 7);
    assert!(power.norm_delta() > 0.0);

    power.run(0, preds::L1Norm::try_from(1E-6)?.or(preds::MaxIter::from(1000)))?;
    assert!(power.iterations() < 1000);
    assert!(power.norm_delta() <= 1E-6);
    Ok(())
}

#[test]
fn test_invalid_threshold() {
    assert!(preds::L1Norm::try_from(0.0).is_err());
    assert!(preds::L1Norm::try_from(-1.0).is_err());
    assert!(preds::L1Norm::try_from(f64::NAN).is_err());
    assert!(preds::L1Norm::try_from(None).is_ok());
}
