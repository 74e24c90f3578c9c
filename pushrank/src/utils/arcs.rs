/*
 * SPDX-FileCopyrightText: 2026 Tommaso Fontana
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Reading of textual arc lists.
//!
//! An arc list contains one arc per line, given as two non-negative integers
//! (source and target) separated by whitespace. Empty lines and comment lines
//! are ignored; any other line that does not match the format makes the whole
//! read fail with an [`InputFormatError`] that reports the line number: the
//! stream is never silently truncated.

use super::mem::{AllocationFailure, try_with_capacity};
use dsi_progress_logger::ProgressLog;
use std::io::BufRead;
use std::num::ParseIntError;
use thiserror::Error;

/// A malformed arc list.
///
/// Line numbers are one-based and count every physical line of the input,
/// including skipped and comment lines.
#[derive(Error, Debug)]
pub enum InputFormatError {
    #[error(
        "Line {line}: expected two non-negative integers separated by whitespace, got {content:?}"
    )]
    FieldCount { line: usize, content: String },
    #[error("Line {line}: {value:?} is not a valid node identifier ({source})")]
    NotANode {
        line: usize,
        value: String,
        source: ParseIntError,
    },
    #[error("Line {line}: node identifier {value} is too large")]
    NodeTooLarge { line: usize, value: usize },
    #[error("Could not read line {line}")]
    Io {
        line: usize,
        source: std::io::Error,
    },
}

impl InputFormatError {
    /// Returns the line at which the error occurred.
    pub fn line(&self) -> usize {
        match self {
            Self::FieldCount { line, .. }
            | Self::NotANode { line, .. }
            | Self::NodeTooLarge { line, .. }
            | Self::Io { line, .. } => *line,
        }
    }
}

/// Either an input or an allocation error while loading arcs.
#[derive(Error, Debug)]
pub enum ReadArcsError {
    #[error(transparent)]
    InputFormat(#[from] InputFormatError),
    #[error(transparent)]
    Allocation(#[from] AllocationFailure),
}

/// Options for reading arc lists.
#[derive(Debug, Clone)]
pub struct ArcsOptions {
    /// Lines whose first non-whitespace character is this symbol are
    /// ignored. `None` disables comments.
    pub comment_symbol: Option<char>,
    /// Number of lines to skip at the start of the input, before looking
    /// for comments.
    pub lines_to_skip: usize,
}

impl Default for ArcsOptions {
    fn default() -> Self {
        Self {
            comment_symbol: Some('#'),
            lines_to_skip: 0,
        }
    }
}

/// An iterator over the arcs of a textual arc list.
///
/// Each item is either an arc or the error that stopped the iteration; after
/// an error, the iterator is exhausted.
#[derive(Debug)]
pub struct ArcsReader<R> {
    reader: R,
    options: ArcsOptions,
    line: usize,
    buf: String,
    failed: bool,
}

impl<R: BufRead> ArcsReader<R> {
    pub fn new(reader: R, options: ArcsOptions) -> Self {
        Self {
            reader,
            options,
            line: 0,
            buf: String::new(),
            failed: false,
        }
    }

    /// Returns the number of lines read so far.
    pub fn lines_read(&self) -> usize {
        self.line
    }

    fn parse_node(&self, field: &str) -> Result<usize, InputFormatError> {
        let node = field
            .parse::<usize>()
            .map_err(|source| InputFormatError::NotANode {
                line: self.line,
                value: field.to_owned(),
                source,
            })?;
        // The number of nodes is the largest identifier plus one
        if node == usize::MAX {
            return Err(InputFormatError::NodeTooLarge {
                line: self.line,
                value: node,
            });
        }
        Ok(node)
    }

    fn parse_line(&self) -> Result<Option<(usize, usize)>, InputFormatError> {
        let content = self.buf.trim();
        if content.is_empty() || self.line <= self.options.lines_to_skip {
            return Ok(None);
        }
        if let Some(symbol) = self.options.comment_symbol {
            if content.starts_with(symbol) {
                return Ok(None);
            }
        }
        let mut fields = content.split_whitespace();
        match (fields.next(), fields.next(), fields.next()) {
            (Some(src), Some(dst), None) => Ok(Some((self.parse_node(src)?, self.parse_node(dst)?))),
            _ => Err(InputFormatError::FieldCount {
                line: self.line,
                content: content.to_owned(),
            }),
        }
    }
}

impl<R: BufRead> Iterator for ArcsReader<R> {
    type Item = Result<(usize, usize), InputFormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            self.buf.clear();
            self.line += 1;
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    self.line -= 1;
                    return None;
                }
                Ok(_) => match self.parse_line() {
                    Ok(Some(arc)) => return Some(Ok(arc)),
                    Ok(None) => continue,
                    Err(err) => {
                        self.failed = true;
                        return Some(Err(err));
                    }
                },
                Err(source) => {
                    self.failed = true;
                    return Some(Err(InputFormatError::Io {
                        line: self.line,
                        source,
                    }));
                }
            }
        }
    }
}

/// Reads all arcs from `reader`, logging progress on `pl`.
///
/// The first malformed line aborts the read.
pub fn read_arcs(
    reader: impl BufRead,
    options: ArcsOptions,
    pl: &mut impl ProgressLog,
) -> Result<Vec<(usize, usize)>, ReadArcsError> {
    let mut arcs = try_with_capacity("arcs", 1024)?;
    let mut iter = ArcsReader::new(reader, options);

    pl.item_name("arc");
    pl.expected_updates(None);
    pl.start("Reading arcs...");
    for arc in &mut iter {
        let arc = arc?;
        if arcs.len() == arcs.capacity() {
            arcs.try_reserve(arcs.len())
                .map_err(|_| AllocationFailure::new::<(usize, usize)>("arcs", 2 * arcs.len()))?;
        }
        arcs.push(arc);
        pl.light_update();
    }
    pl.done();
    log::info!("Read {} arcs from {} lines", arcs.len(), iter.lines_read());

    Ok(arcs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsi_progress_logger::no_logging;

    fn read(s: &str) -> Result<Vec<(usize, usize)>, ReadArcsError> {
        read_arcs(s.as_bytes(), ArcsOptions::default(), no_logging![])
    }

    #[test]
    fn test_whitespace() {
        let arcs = read("0 1\n1\t2\n  2   0  \r\n\n3 3").unwrap();
        assert_eq!(arcs, vec![(0, 1), (1, 2), (2, 0), (3, 3)]);
    }

    #[test]
    fn test_comments_and_skip() {
        let options = ArcsOptions {
            comment_symbol: Some('%'),
            lines_to_skip: 1,
        };
        let input = "header line\n% comment\n0 1\n";
        let arcs = read_arcs(input.as_bytes(), options, no_logging![]).unwrap();
        assert_eq!(arcs, vec![(0, 1)]);

        // Without comments the comment line is malformed
        let options = ArcsOptions {
            comment_symbol: None,
            lines_to_skip: 0,
        };
        let err = read_arcs("# x y\n".as_bytes(), options.clone(), no_logging![]).unwrap_err();
        assert!(matches!(
            err,
            ReadArcsError::InputFormat(InputFormatError::FieldCount { line: 1, .. })
        ));
        let err = read_arcs("# x\n".as_bytes(), options, no_logging![]).unwrap_err();
        assert!(matches!(
            err,
            ReadArcsError::InputFormat(InputFormatError::NotANode { line: 1, .. })
        ));
    }

    #[test]
    fn test_field_count() {
        for input in ["0 1\n1 2 3\n", "0 1\n4\n"] {
            match read(input) {
                Err(ReadArcsError::InputFormat(err)) => {
                    assert_eq!(err.line(), 2);
                    assert!(matches!(err, InputFormatError::FieldCount { .. }));
                }
                other => panic!("unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn test_not_a_node() {
        for input in ["0 1\n2 -1\n3 4\n", "0 1\n2 x\n", "0 1\n2.5 3\n"] {
            match read(input) {
                Err(ReadArcsError::InputFormat(InputFormatError::NotANode { line, .. })) => {
                    assert_eq!(line, 2)
                }
                other => panic!("unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn test_too_large() {
        let input = format!("0 {}\n", usize::MAX);
        assert!(matches!(
            read(&input),
            Err(ReadArcsError::InputFormat(
                InputFormatError::NodeTooLarge { line: 1, .. }
            ))
        ));
    }

    #[test]
    fn test_stops_after_error() {
        let mut iter = ArcsReader::new("0 1\nx y\n1 2\n".as_bytes(), ArcsOptions::default());
        assert!(matches!(iter.next(), Some(Ok((0, 1)))));
        assert!(matches!(iter.next(), Some(Err(_))));
        assert!(iter.next().is_none());
    }
}
