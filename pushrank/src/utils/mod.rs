/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Miscellaneous utilities.

pub mod arcs;
pub use arcs::{ArcsOptions, ArcsReader, InputFormatError, ReadArcsError, read_arcs};

pub mod mem;
pub use mem::AllocationFailure;
