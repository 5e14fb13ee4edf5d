// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced while collecting outcomes and writing reports.

use std::{fmt, io};
use thiserror::Error;

/// A completed test could not be attached to a suite.
///
/// Returned by [`Collector::record`](crate::Collector::record). This is fatal for the run's
/// report: an outcome that cannot be grouped would corrupt the document.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("malformed metadata for test `{test_name}`: {reason}")]
#[non_exhaustive]
pub struct MalformedTestMetadata {
    /// The qualified name of the test.
    pub test_name: String,

    /// What was wrong with the metadata.
    pub reason: MalformedReason,
}

impl MalformedTestMetadata {
    pub(crate) fn new(test_name: impl Into<String>, reason: MalformedReason) -> Self {
        Self {
            test_name: test_name.into(),
            reason,
        }
    }
}

/// The reason a [`MalformedTestMetadata`] error was produced.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum MalformedReason {
    /// The test has no enclosing group, so no suite name can be resolved.
    NoEnclosingGroup,

    /// The run time is negative, not finite, or too large to represent.
    InvalidRunTime(f64),
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEnclosingGroup => write!(f, "test has no enclosing group"),
            Self::InvalidRunTime(secs) => write!(f, "invalid run time {secs}s"),
        }
    }
}

/// The end-of-run summary supplied by the host could not be used.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("invalid run summary: total duration {total_duration}s is out of range")]
pub struct InvalidRunSummary {
    /// The duration that was supplied.
    pub total_duration: f64,
}

/// An error that occurs while writing a [`Report`](crate::Report) to a sink.
///
/// Returned by [`Report::serialize`](crate::Report::serialize). The report is produced exactly
/// once per run, so these errors are never retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SinkWriteError {
    /// The XML writer failed while rendering the document.
    #[error("error serializing JUnit report")]
    Serialize(#[from] quick_xml::Error),

    /// The rendered document could not be written to the sink.
    #[error("error writing JUnit report to sink")]
    Io(#[source] io::Error),
}

/// A single line of the host event stream could not be decoded.
#[derive(Debug, Error)]
#[error("failed to parse host event")]
pub struct EventParseError {
    #[from]
    inner: serde_json::Error,
}

/// An error returned by [`JunitFormatter`](crate::JunitFormatter).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FormatterError {
    /// A completed test could not be recorded.
    #[error(transparent)]
    Metadata(#[from] MalformedTestMetadata),

    /// The end-of-run summary was invalid.
    #[error(transparent)]
    Summary(#[from] InvalidRunSummary),

    /// The report could not be written out.
    #[error(transparent)]
    Write(#[from] SinkWriteError),
}
