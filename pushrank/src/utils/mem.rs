/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Fallible allocation of the large arrays backing graphs and accounting
//! structures.

use thiserror::Error;

/// The allocator could not provide the memory needed for an array.
///
/// This error is fatal for the computation at hand: there is no way to
/// produce a partial result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Could not allocate {len} elements of {elem_size} bytes for {what}")]
pub struct AllocationFailure {
    /// What the array was meant to contain.
    pub what: &'static str,
    /// The requested number of elements.
    pub len: usize,
    /// The size in bytes of an element.
    pub elem_size: usize,
}

impl AllocationFailure {
    pub fn new<T>(what: &'static str, len: usize) -> Self {
        Self {
            what,
            len,
            elem_size: size_of::<T>(),
        }
    }
}

/// Returns an empty vector with capacity for exactly `len` elements.
pub fn try_with_capacity<T>(what: &'static str, len: usize) -> Result<Vec<T>, AllocationFailure> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| AllocationFailure::new::<T>(what, len))?;
    Ok(v)
}

/// Returns a vector of `len` copies of `value`.
pub fn try_filled<T: Clone>(
    what: &'static str,
    len: usize,
    value: T,
) -> Result<Vec<T>, AllocationFailure> {
    let mut v = try_with_capacity(what, len)?;
    v.resize(len, value);
    Ok(v)
}
