// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A formatter that a host test framework drives for a single run.

use crate::{
    collector::Collector,
    config::ReportConfig,
    errors::{FormatterError, MalformedTestMetadata, SinkWriteError},
    events::HostEvent,
    outcome::{CompletedTest, TestOutcome},
    report::{Report, RunSummary},
};
use debug_ignore::DebugIgnore;
use std::{fmt, io};

/// Collects outcomes over the course of a run, then writes a JUnit report to a sink.
///
/// [`run_finished`](Self::run_finished) consumes the formatter, so a report is written at most
/// once.
pub struct JunitFormatter<W> {
    config: ReportConfig,
    collector: Collector,
    sink: DebugIgnore<W>,
}

// Not derived: the sink need not implement `Debug`.
impl<W> fmt::Debug for JunitFormatter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JunitFormatter")
            .field("config", &self.config)
            .field("collector", &self.collector)
            .field("sink", &self.sink)
            .finish()
    }
}

impl<W: io::Write> JunitFormatter<W> {
    /// Creates a new formatter writing to the given sink.
    pub fn new(sink: W, config: ReportConfig) -> Self {
        Self {
            config,
            collector: Collector::new(),
            sink: DebugIgnore(sink),
        }
    }

    /// Returns the collector holding the outcomes recorded so far.
    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    /// Records a completed test.
    pub fn test_finished(
        &mut self,
        test: CompletedTest,
    ) -> Result<&TestOutcome, MalformedTestMetadata> {
        self.collector.record(test)
    }

    /// Builds the report and writes it to the sink, returning the sink.
    pub fn run_finished(self, summary: RunSummary) -> Result<W, SinkWriteError> {
        let Self {
            config,
            collector,
            sink: DebugIgnore(mut sink),
        } = self;

        let report = Report::build(summary, collector);
        report.serialize(&mut sink, &config)?;
        tracing::debug!(suites = report.suites().len(), "wrote JUnit report");
        Ok(sink)
    }

    /// Handles an event from the host's event stream.
    ///
    /// Returns [`FormatterState::Collecting`] while more events are expected, and
    /// [`FormatterState::Finished`] with the sink once the report has been written.
    pub fn handle_event(mut self, event: HostEvent) -> Result<FormatterState<W>, FormatterError> {
        match event {
            HostEvent::TestFinished(event) => {
                self.test_finished(event.into_completed_test()?)?;
                Ok(FormatterState::Collecting(self))
            }
            HostEvent::RunFinished(event) => {
                let summary = event.into_summary()?;
                Ok(FormatterState::Finished(self.run_finished(summary)?))
            }
        }
    }
}

/// The state of a [`JunitFormatter`] after handling an event.
#[derive(Debug)]
pub enum FormatterState<W> {
    /// The run is still in progress.
    Collecting(JunitFormatter<W>),

    /// The report has been written to the returned sink.
    Finished(W),
}
