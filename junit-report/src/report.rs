// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    collector::{Collector, Suite},
    config::ReportConfig,
    errors::{InvalidRunSummary, SinkWriteError},
    serialize::serialize_report,
};
use chrono::{DateTime, FixedOffset, Local};
use std::{io, time::Duration};

/// Global counters supplied by the host at the end of a run.
///
/// These are embedded in the root element as-is. They are not checked against the counts derived
/// from the recorded suites.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunSummary {
    /// The overall time taken by the run.
    pub time: Duration,

    /// The total number of tests.
    pub tests: usize,

    /// The total number of failed tests.
    pub failures: usize,

    /// The total number of pending tests.
    pub pending: usize,

    /// The time at which the summary was produced.
    pub timestamp: DateTime<FixedOffset>,
}

impl RunSummary {
    /// Creates a new `RunSummary` timestamped with the current local time.
    pub fn new(time: Duration, tests: usize, failures: usize, pending: usize) -> Self {
        Self {
            time,
            tests,
            failures,
            pending,
            timestamp: Local::now().into(),
        }
    }

    /// Creates a new `RunSummary` from a duration in seconds.
    ///
    /// Fails if the duration is negative, not finite, or too large to represent.
    pub fn from_secs_f64(
        time: f64,
        tests: usize,
        failures: usize,
        pending: usize,
    ) -> Result<Self, InvalidRunSummary> {
        let duration = Duration::try_from_secs_f64(time).map_err(|_| InvalidRunSummary {
            total_duration: time,
        })?;
        Ok(Self::new(duration, tests, failures, pending))
    }

    /// Sets the timestamp.
    pub fn set_timestamp(&mut self, timestamp: impl Into<DateTime<FixedOffset>>) -> &mut Self {
        self.timestamp = timestamp.into();
        self
    }
}

/// The root of a JUnit report: the run summary plus every suite, in creation order.
#[derive(Clone, Debug)]
pub struct Report {
    summary: RunSummary,
    suites: Vec<Suite>,
}

impl Report {
    /// Builds a report out of the final state of a collector.
    pub fn build(summary: RunSummary, collector: Collector) -> Self {
        tracing::debug!(
            suites = collector.suites().len(),
            outcomes = collector.len(),
            tests = summary.tests,
            failures = summary.failures,
            pending = summary.pending,
            "building JUnit report",
        );
        Self {
            summary,
            suites: collector.into_suites(),
        }
    }

    /// Returns the run summary.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Returns the suites, in the order they were created.
    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }

    /// Serializes this report to the given writer.
    ///
    /// The document is rendered in memory first and then written out with a single call, so the
    /// writer never sees a partial document because of a serialization error.
    pub fn serialize(
        &self,
        mut writer: impl io::Write,
        config: &ReportConfig,
    ) -> Result<(), SinkWriteError> {
        let buf = self.to_bytes(config)?;
        writer.write_all(&buf).map_err(SinkWriteError::Io)?;
        writer.flush().map_err(SinkWriteError::Io)
    }

    /// Serializes this report to a string.
    pub fn to_string(&self, config: &ReportConfig) -> Result<String, SinkWriteError> {
        let buf = self.to_bytes(config)?;
        String::from_utf8(buf).map_err(|utf8_err| {
            SinkWriteError::Serialize(quick_xml::Error::NonDecodable(Some(utf8_err.utf8_error())))
        })
    }

    fn to_bytes(&self, config: &ReportConfig) -> Result<Vec<u8>, SinkWriteError> {
        let mut buf: Vec<u8> = vec![];
        serialize_report(self, config, &mut buf)?;
        Ok(buf)
    }
}
