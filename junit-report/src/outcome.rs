// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::{MalformedReason, MalformedTestMetadata};
use std::time::Duration;

/// The chain of nesting groups a test was declared in.
///
/// Groups are stored outermost first. The outermost group names the suite the test is reported
/// under.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GroupChain {
    groups: Vec<String>,
}

impl GroupChain {
    /// Creates a chain from group descriptions ordered outermost to innermost.
    pub fn new(outermost_first: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            groups: outermost_first.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a chain from group descriptions ordered innermost to outermost, as produced by
    /// walking parent references upwards from a test.
    pub fn from_innermost(innermost_first: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut groups: Vec<String> = innermost_first.into_iter().map(Into::into).collect();
        groups.reverse();
        Self { groups }
    }

    /// Creates a chain consisting of only a root group.
    pub fn from_root(root: impl Into<String>) -> Self {
        Self {
            groups: vec![root.into()],
        }
    }

    /// Returns the description of the outermost group, or `None` if the chain is empty.
    pub fn root_name(&self) -> Option<&str> {
        self.groups.first().map(String::as_str)
    }

    /// Returns the groups, outermost first.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Returns true if the test has no enclosing group.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Details about why a test failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FailureDetail {
    /// The failure message.
    pub message: String,

    /// Backtrace locations, already formatted by the host.
    pub backtrace: Vec<String>,
}

impl FailureDetail {
    /// Creates a new `FailureDetail`.
    pub fn new(
        message: impl Into<String>,
        backtrace: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            message: message.into(),
            backtrace: backtrace.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the text written into the `failure` element: the message, a newline, then the
    /// backtrace lines joined by newlines.
    pub fn description(&self) -> String {
        let mut out = String::with_capacity(self.message.len() + 1);
        out.push_str(&self.message);
        out.push('\n');
        out.push_str(&self.backtrace.join("\n"));
        out
    }
}

/// The status of a completed test.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TestStatus {
    /// The test passed.
    Passed,

    /// The test failed.
    Failed {
        /// Information about the failure, if the host supplied any.
        failure: Option<FailureDetail>,
    },

    /// The test was marked pending and not run to completion.
    Pending,
}

impl TestStatus {
    /// Creates a failed status with the given detail.
    pub fn failed(failure: FailureDetail) -> Self {
        Self::Failed {
            failure: Some(failure),
        }
    }

    /// Returns true if this is a failure.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns true if this test is pending.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// A test that has just finished, as reported by the host.
///
/// Passed to [`Collector::record`](crate::Collector::record), which resolves the suite it belongs
/// to and turns it into a [`TestOutcome`].
#[derive(Clone, Debug)]
pub struct CompletedTest {
    /// The full nested description of the test.
    pub name: String,

    /// The status of the test.
    pub status: TestStatus,

    /// The time the test took to run.
    pub run_time: Duration,

    /// The groups the test was declared in.
    pub groups: GroupChain,
}

impl CompletedTest {
    /// Creates a new `CompletedTest`.
    pub fn new(
        name: impl Into<String>,
        status: TestStatus,
        run_time: Duration,
        groups: GroupChain,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            run_time,
            groups,
        }
    }

    /// Creates a new `CompletedTest` from a run time in seconds.
    ///
    /// Fails if the run time is negative, not finite, or too large to represent.
    pub fn from_secs_f64(
        name: impl Into<String>,
        status: TestStatus,
        run_time: f64,
        groups: GroupChain,
    ) -> Result<Self, MalformedTestMetadata> {
        let name = name.into();
        match Duration::try_from_secs_f64(run_time) {
            Ok(run_time) => Ok(Self::new(name, status, run_time, groups)),
            Err(_) => Err(MalformedTestMetadata::new(
                name,
                MalformedReason::InvalidRunTime(run_time),
            )),
        }
    }
}

/// A recorded test outcome. Immutable once recorded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestOutcome {
    name: String,
    status: TestStatus,
    run_time: Duration,
    suite_name: String,
}

impl TestOutcome {
    pub(crate) fn new(test: CompletedTest, suite_name: String) -> Self {
        let CompletedTest {
            name,
            status,
            run_time,
            groups: _,
        } = test;
        Self {
            name,
            status,
            run_time,
            suite_name,
        }
    }

    /// Returns the qualified display name of the test.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the status of the test.
    pub fn status(&self) -> &TestStatus {
        &self.status
    }

    /// Returns the time the test took to run.
    pub fn run_time(&self) -> Duration {
        self.run_time
    }

    /// Returns the name of the suite this outcome belongs to.
    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }
}
