// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::DateTime;
use goldenfile::Mint;
use junit_report::{
    Collector, CompletedTest, FailureDetail, GroupChain, Report, ReportConfig, RunSummary,
    TestStatus,
};
use std::time::Duration;

#[test]
fn fixtures() {
    let mut mint = Mint::new("tests/fixtures");

    let f = mint
        .new_goldenfile("mixed_report.xml")
        .expect("creating new goldenfile succeeds");

    let mixed_report = mixed_report();
    mixed_report
        .serialize(f, &ReportConfig::default())
        .expect("serializing mixed_report succeeds");
}

fn mixed_report() -> Report {
    let mut collector = Collector::new();

    let calculator = GroupChain::from_root("Calculator");
    collector
        .record(CompletedTest::new(
            "adds numbers",
            TestStatus::Passed,
            Duration::from_millis(10),
            calculator.clone(),
        ))
        .expect("recording adds numbers succeeds");
    collector
        .record(CompletedTest::new(
            "Calculator divides",
            TestStatus::failed(FailureDetail::new("divide by zero", ["a.rb:10"])),
            Duration::from_millis(20),
            GroupChain::new(["Calculator", "#divide"]),
        ))
        .expect("recording Calculator divides succeeds");

    // Interleaved with the Calculator tests, but creates a second suite.
    collector
        .record(CompletedTest::new(
            "Parser handles <tags> & entities",
            TestStatus::failed(FailureDetail::new(
                r#"expected "<a>" got ]]> end"#,
                ["parser.rb:3:in `parse'", "spec/parser_spec.rb:12"],
            )),
            Duration::from_millis(1500),
            GroupChain::from_innermost(["with entities", "Parser"]),
        ))
        .expect("recording Parser test succeeds");

    collector
        .record(CompletedTest::new(
            "Calculator multiplies",
            TestStatus::Pending,
            Duration::ZERO,
            calculator,
        ))
        .expect("recording Calculator multiplies succeeds");

    let mut summary = RunSummary::new(Duration::new(1, 534_000_000), 4, 2, 1);
    summary.set_timestamp(
        DateTime::parse_from_rfc3339("2026-10-19T10:00:00-07:00").expect("timestamp is valid"),
    );

    Report::build(summary, collector)
}
