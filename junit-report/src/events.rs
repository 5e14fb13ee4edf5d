// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events sent by the host test framework, in their JSON encoding.
//!
//! A host emits one [`HostEvent::TestFinished`] per completed test, in execution order, followed
//! by a single [`HostEvent::RunFinished`].

use crate::{
    errors::{EventParseError, InvalidRunSummary, MalformedTestMetadata},
    outcome::{CompletedTest, FailureDetail, GroupChain, TestStatus},
    report::RunSummary,
};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

/// An event sent by the host.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum HostEvent {
    /// A test finished running.
    TestFinished(TestFinishedEvent),

    /// The run finished. No further events follow.
    RunFinished(RunFinishedEvent),
}

impl HostEvent {
    /// Parses a single event from a line of JSON.
    pub fn from_json(line: &str) -> Result<Self, EventParseError> {
        Ok(serde_json::from_str(line)?)
    }
}

/// The status of a test, as sent by the host.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// The test passed.
    Passed,
    /// The test failed.
    Failed,
    /// The test is pending.
    Pending,
}

/// A test finished running.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestFinishedEvent {
    /// The full nested description of the test.
    pub qualified_name: String,

    /// The status of the test.
    pub status: EventStatus,

    /// The run time of the test, in seconds.
    pub run_time: f64,

    /// The description of the test's outermost group.
    #[serde(default)]
    pub root_group_name: Option<String>,

    /// The failure message, for failed tests.
    #[serde(default)]
    pub failure_message: Option<String>,

    /// Formatted backtrace lines, for failed tests.
    #[serde(default)]
    pub backtrace_lines: Option<Vec<String>>,
}

impl TestFinishedEvent {
    /// Converts this event into a [`CompletedTest`].
    ///
    /// Fails if the run time is invalid. A missing root group is reported later, by
    /// [`Collector::record`](crate::Collector::record).
    pub fn into_completed_test(self) -> Result<CompletedTest, MalformedTestMetadata> {
        let Self {
            qualified_name,
            status,
            run_time,
            root_group_name,
            failure_message,
            backtrace_lines,
        } = self;

        let status = match status {
            EventStatus::Passed => TestStatus::Passed,
            EventStatus::Pending => TestStatus::Pending,
            EventStatus::Failed => {
                let failure = if failure_message.is_none() && backtrace_lines.is_none() {
                    None
                } else {
                    Some(FailureDetail::new(
                        failure_message.unwrap_or_default(),
                        backtrace_lines.unwrap_or_default(),
                    ))
                };
                TestStatus::Failed { failure }
            }
        };
        let groups = root_group_name
            .map(GroupChain::from_root)
            .unwrap_or_default();

        CompletedTest::from_secs_f64(qualified_name, status, run_time, groups)
    }
}

/// The run finished.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunFinishedEvent {
    /// The overall run time, in seconds.
    pub total_duration: f64,

    /// The total number of tests.
    pub total_count: usize,

    /// The total number of failed tests.
    pub failure_count: usize,

    /// The total number of pending tests.
    pub pending_count: usize,

    /// The time the run finished. Defaults to the time the event is converted.
    #[serde(default)]
    pub timestamp: Option<DateTime<FixedOffset>>,
}

impl RunFinishedEvent {
    /// Converts this event into a [`RunSummary`].
    pub fn into_summary(self) -> Result<RunSummary, InvalidRunSummary> {
        let mut summary = RunSummary::from_secs_f64(
            self.total_duration,
            self.total_count,
            self.failure_count,
            self.pending_count,
        )?;
        if let Some(timestamp) = self.timestamp {
            summary.set_timestamp(timestamp);
        }
        Ok(summary)
    }
}
