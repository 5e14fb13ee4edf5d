// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collect test outcomes into suites and write them out as a JUnit XML report.
//!
//! A host test framework feeds each completed test to a [`Collector`] (or a [`JunitFormatter`],
//! which owns one), in execution order. Tests are grouped into suites by the description of
//! their outermost group. Once the run is over, [`Report::build`] combines the suites with the
//! host's [`RunSummary`] and the report is serialized exactly once.

mod collector;
mod config;
pub mod errors;
pub mod events;
mod formatter;
mod outcome;
mod report;
mod serialize;

pub use collector::*;
pub use config::*;
pub use formatter::*;
pub use outcome::*;
pub use report::*;
