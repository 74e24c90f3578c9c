/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Rooted PageRank.

pub mod accounting;
pub use accounting::SparseAccounting;

pub mod batch;
pub use batch::{BatchPush, BatchStats};

pub mod power;
pub use power::PowerIteration;

pub mod push;
pub use push::{Discipline, InvalidParameter, PushArena, PushRank, PushStats, Threshold, push};
