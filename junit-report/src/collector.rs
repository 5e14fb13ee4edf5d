// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grouping of completed tests into suites.

use crate::{
    errors::{MalformedReason, MalformedTestMetadata},
    outcome::{CompletedTest, TestOutcome},
};
use indexmap::IndexMap;

/// A named group of outcomes sharing the same outermost group.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Suite {
    name: String,
    outcomes: Vec<TestOutcome>,
}

impl Suite {
    fn new(name: String) -> Self {
        Self {
            name,
            outcomes: vec![],
        }
    }

    /// Returns the name of this suite.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the outcomes in this suite, in the order they were recorded.
    pub fn outcomes(&self) -> &[TestOutcome] {
        &self.outcomes
    }

    /// Returns the number of tests in this suite.
    pub fn tests(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns the number of failed tests in this suite.
    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status().is_failed())
            .count()
    }

    /// Returns the number of pending tests in this suite.
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status().is_pending())
            .count()
    }
}

/// Receives completed tests in execution order and groups them into suites.
///
/// Suites are kept in the order their first outcome was recorded, and outcomes within a suite
/// are kept in recording order.
#[derive(Clone, Debug, Default)]
pub struct Collector {
    suites: IndexMap<String, Suite>,
    len: usize,
}

impl Collector {
    /// Creates a new, empty `Collector`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed test under the suite named by its outermost group.
    ///
    /// Fails if the test has no enclosing group.
    pub fn record(&mut self, test: CompletedTest) -> Result<&TestOutcome, MalformedTestMetadata> {
        let Some(suite_name) = test.groups.root_name() else {
            return Err(MalformedTestMetadata::new(
                test.name,
                MalformedReason::NoEnclosingGroup,
            ));
        };
        let suite_name = suite_name.to_owned();

        tracing::trace!(
            test = %test.name,
            suite = %suite_name,
            status = ?test.status,
            "recording test outcome",
        );

        let suite = self
            .suites
            .entry(suite_name.clone())
            .or_insert_with_key(|name| {
                tracing::debug!(suite = %name, "creating suite");
                Suite::new(name.clone())
            });
        let index = suite.outcomes.len();
        suite.outcomes.push(TestOutcome::new(test, suite_name));
        self.len += 1;

        Ok(&suite.outcomes[index])
    }

    /// Returns the suites in the order they were created.
    pub fn suites(&self) -> impl ExactSizeIterator<Item = &Suite> {
        self.suites.values()
    }

    /// Returns the suite with the given name, if any outcome has been recorded for it.
    pub fn suite(&self, name: &str) -> Option<&Suite> {
        self.suites.get(name)
    }

    /// Returns the total number of recorded outcomes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no outcomes have been recorded.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Consumes the collector, returning the suites in the order they were created.
    pub fn into_suites(self) -> Vec<Suite> {
        self.suites.into_values().collect()
    }
}
