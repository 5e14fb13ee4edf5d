// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize a `Report`.

use crate::{
    collector::Suite,
    config::ReportConfig,
    outcome::{TestOutcome, TestStatus},
    report::{Report, RunSummary},
};
use chrono::SecondsFormat;
use quick_xml::{
    Writer,
    escape::escape,
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event, attributes::Attribute},
    name::QName,
};
use std::{borrow::Cow, io, time::Duration};

static TESTSUITES_TAG: &str = "testsuites";
static TESTSUITE_TAG: &str = "testsuite";
static TESTCASE_TAG: &str = "testcase";
static PROPERTIES_TAG: &str = "properties";
static FAILURE_TAG: &str = "failure";
static SKIPPED_TAG: &str = "skipped";

static FAILURE_TYPE: &str = "failed";

// Errors are never distinguished from failures.
static ERRORS_COUNT: &str = "0";

pub(crate) fn serialize_report(
    report: &Report,
    config: &ReportConfig,
    writer: impl io::Write,
) -> quick_xml::Result<()> {
    let mut writer = Writer::new_with_indent(writer, b' ', config.indent);

    let decl = BytesDecl::new("1.0", Some("UTF-8"), None);
    writer.write_event(Event::Decl(decl))?;

    serialize_report_impl(report, config, &mut writer)?;

    // Add a trailing newline.
    writer.write_indent()
}

fn serialize_report_impl(
    report: &Report,
    config: &ReportConfig,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    // Use the destructuring syntax to ensure that all fields are handled.
    let RunSummary {
        time,
        tests,
        failures,
        pending,
        timestamp,
    } = report.summary();

    let mut testsuites_tag = BytesStart::new(TESTSUITES_TAG);
    testsuites_tag.push_attribute(("errors", ERRORS_COUNT));
    testsuites_tag.push_attribute(("failures", failures.to_string().as_str()));
    testsuites_tag.push_attribute(("skipped", pending.to_string().as_str()));
    testsuites_tag.push_attribute(("tests", tests.to_string().as_str()));
    testsuites_tag.push_attribute(("time", serialize_time(time, config).as_str()));
    testsuites_tag.push_attribute((
        "timestamp",
        timestamp
            .to_rfc3339_opts(SecondsFormat::Secs, false)
            .as_str(),
    ));
    writer.write_event(Event::Start(testsuites_tag))?;

    for suite in report.suites() {
        serialize_suite(suite, config, writer)?;
    }

    serialize_end_tag(TESTSUITES_TAG, writer)
}

fn serialize_suite(
    suite: &Suite,
    config: &ReportConfig,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let mut testsuite_tag = BytesStart::new(TESTSUITE_TAG);
    testsuite_tag.push_attribute(text_attribute("name", &sanitize(suite.name(), false)));
    testsuite_tag.push_attribute(("tests", suite.tests().to_string().as_str()));
    testsuite_tag.push_attribute(("errors", ERRORS_COUNT));
    testsuite_tag.push_attribute(("failures", suite.failures().to_string().as_str()));
    testsuite_tag.push_attribute(("skipped", suite.skipped().to_string().as_str()));
    writer.write_event(Event::Start(testsuite_tag))?;

    // Always present, always empty.
    writer.write_event(Event::Empty(BytesStart::new(PROPERTIES_TAG)))?;

    for outcome in suite.outcomes() {
        serialize_testcase(outcome, config, writer)?;
    }

    serialize_end_tag(TESTSUITE_TAG, writer)
}

fn serialize_testcase(
    outcome: &TestOutcome,
    config: &ReportConfig,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    let name = sanitize(outcome.name(), false);

    let mut testcase_tag = BytesStart::new(TESTCASE_TAG);
    testcase_tag.push_attribute(text_attribute("name", &name));
    testcase_tag.push_attribute(("time", serialize_time(&outcome.run_time(), config).as_str()));

    match outcome.status() {
        TestStatus::Passed => writer.write_event(Event::Empty(testcase_tag))?,
        TestStatus::Pending => {
            writer.write_event(Event::Start(testcase_tag))?;
            writer.write_event(Event::Empty(BytesStart::new(SKIPPED_TAG)))?;
            serialize_end_tag(TESTCASE_TAG, writer)?;
        }
        TestStatus::Failed { failure } => {
            writer.write_event(Event::Start(testcase_tag))?;

            let mut failure_tag = BytesStart::new(FAILURE_TAG);
            failure_tag.push_attribute(text_attribute("message", &format!("failed {name}")));
            failure_tag.push_attribute(("type", FAILURE_TYPE));
            writer.write_event(Event::Start(failure_tag))?;

            let description = failure
                .as_ref()
                .map(|failure| failure.description())
                .unwrap_or_default();
            serialize_cdata(&sanitize(&description, config.strip_ansi), writer)?;

            serialize_end_tag(FAILURE_TAG, writer)?;
            serialize_end_tag(TESTCASE_TAG, writer)?;
        }
    }

    Ok(())
}

/// Builds an attribute whose value survives attribute-value normalization.
///
/// XML parsers replace literal tabs, newlines and carriage returns in attribute values with
/// spaces, so those are written as character references on top of the usual escaping.
fn text_attribute<'a>(key: &'a str, value: &str) -> Attribute<'a> {
    let escaped = escape(value);
    let value = if escaped.contains(['\t', '\n', '\r']) {
        let mut out = String::with_capacity(escaped.len() + 8);
        for c in escaped.chars() {
            match c {
                '\t' => out.push_str("&#9;"),
                '\n' => out.push_str("&#10;"),
                '\r' => out.push_str("&#13;"),
                c => out.push(c),
            }
        }
        out
    } else {
        escaped.into_owned()
    };

    Attribute {
        key: QName(key.as_bytes()),
        value: Cow::Owned(value.into_bytes()),
    }
}

fn serialize_cdata(text: &str, writer: &mut Writer<impl io::Write>) -> quick_xml::Result<()> {
    for piece in payload_pieces(text) {
        match piece {
            PayloadPiece::Cdata(section) => {
                writer.write_event(Event::CData(BytesCData::new(section)))?;
            }
            PayloadPiece::CarriageReturn => {
                writer.write_event(Event::Text(BytesText::from_escaped("&#13;")))?;
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum PayloadPiece<'a> {
    Cdata(&'a str),
    CarriageReturn,
}

/// Splits a failure payload into CDATA sections and carriage returns.
///
/// Parsers turn a literal `\r` into `\n` even inside CDATA, so each one is written as a
/// character reference between sections.
fn payload_pieces(text: &str) -> Vec<PayloadPiece<'_>> {
    let mut pieces = vec![];
    for (index, line) in text.split('\r').enumerate() {
        if index > 0 {
            pieces.push(PayloadPiece::CarriageReturn);
        }
        pieces.extend(
            cdata_sections(line)
                .into_iter()
                .filter(|section| !section.is_empty())
                .map(PayloadPiece::Cdata),
        );
    }
    if pieces.is_empty() {
        pieces.push(PayloadPiece::Cdata(""));
    }
    pieces
}

/// Splits text into pieces that can each be wrapped in a CDATA section.
///
/// A CDATA section cannot contain `]]>`, so every occurrence is split between its `]]` and `>`.
/// Adjacent sections are concatenated by XML parsers, so the text reads back unchanged.
fn cdata_sections(text: &str) -> Vec<&str> {
    let mut sections = vec![];
    let mut start = 0;
    for (index, _) in text.match_indices("]]>") {
        sections.push(&text[start..index + 2]);
        start = index + 2;
    }
    sections.push(&text[start..]);
    sections
}

/// Removes text that cannot appear in an XML 1.0 document.
///
/// XML-special characters such as `<` and `&` are kept; they are escaped by the writer.
fn sanitize(text: &str, strip_ansi: bool) -> Cow<'_, str> {
    let text = if strip_ansi && text.contains('\x1b') {
        Cow::Owned(strip_ansi_escapes::strip_str(text))
    } else {
        Cow::Borrowed(text)
    };

    if text.contains(is_invalid_xml_char) {
        Cow::Owned(text.replace(is_invalid_xml_char, ""))
    } else {
        text
    }
}

fn is_invalid_xml_char(c: char) -> bool {
    matches!(c, '\x00'..='\x08' | '\x0b' | '\x0c' | '\x0e'..='\x1f' | '\u{fffe}' | '\u{ffff}')
}

fn serialize_end_tag(
    tag_name: &'static str,
    writer: &mut Writer<impl io::Write>,
) -> quick_xml::Result<()> {
    writer.write_event(Event::End(BytesEnd::new(tag_name)))
}

// Serialize time as seconds with a fixed number of decimal points.
fn serialize_time(time: &Duration, config: &ReportConfig) -> String {
    format!("{:.*}", config.time_precision, time.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collector::Collector,
        outcome::{CompletedTest, FailureDetail, GroupChain},
    };
    use chrono::DateTime;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn summary(time_ms: u64, tests: usize, failures: usize, pending: usize) -> RunSummary {
        let mut summary = RunSummary::new(Duration::from_millis(time_ms), tests, failures, pending);
        summary.set_timestamp(
            DateTime::parse_from_rfc3339("2026-10-19T10:00:00+00:00").expect("valid timestamp"),
        );
        summary
    }

    fn record(collector: &mut Collector, name: &str, status: TestStatus, ms: u64, root: &str) {
        collector
            .record(CompletedTest::new(
                name,
                status,
                Duration::from_millis(ms),
                GroupChain::from_root(root),
            ))
            .expect("test has a root group");
    }

    fn render(summary: RunSummary, collector: Collector) -> String {
        Report::build(summary, collector)
            .to_string(&ReportConfig::default())
            .expect("serializing to a string succeeds")
    }

    #[test]
    fn calculator_scenario() {
        let mut collector = Collector::new();
        record(&mut collector, "adds numbers", TestStatus::Passed, 10, "Calculator");
        record(
            &mut collector,
            "Calculator divides",
            TestStatus::failed(FailureDetail::new("divide by zero", ["a.rb:10"])),
            20,
            "Calculator",
        );

        let expected = indoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <testsuites errors="0" failures="1" skipped="0" tests="2" time="0.030" timestamp="2026-10-19T10:00:00+00:00">
              <testsuite name="Calculator" tests="2" errors="0" failures="1" skipped="0">
                <properties/>
                <testcase name="adds numbers" time="0.010"/>
                <testcase name="Calculator divides" time="0.020">
                  <failure message="failed Calculator divides" type="failed"><![CDATA[divide by zero
            a.rb:10]]></failure>
                </testcase>
              </testsuite>
            </testsuites>
        "#};
        assert_eq!(render(summary(30, 2, 1, 0), collector), expected);
    }

    #[test]
    fn pending_is_skipped_marker_only() {
        let mut collector = Collector::new();
        record(&mut collector, "later", TestStatus::Pending, 0, "Widget");

        let expected = indoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <testsuites errors="0" failures="0" skipped="1" tests="1" time="0.000" timestamp="2026-10-19T10:00:00+00:00">
              <testsuite name="Widget" tests="1" errors="0" failures="0" skipped="1">
                <properties/>
                <testcase name="later" time="0.000">
                  <skipped/>
                </testcase>
              </testsuite>
            </testsuites>
        "#};
        assert_eq!(render(summary(0, 1, 0, 1), collector), expected);
    }

    #[test]
    fn empty_run() {
        let expected = indoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <testsuites errors="0" failures="0" skipped="0" tests="0" time="0.000" timestamp="2026-10-19T10:00:00+00:00">
            </testsuites>
        "#};
        assert_eq!(render(summary(0, 0, 0, 0), Collector::new()), expected);
    }

    #[test]
    fn failure_without_detail_has_empty_payload() {
        let mut collector = Collector::new();
        record(
            &mut collector,
            "broken",
            TestStatus::Failed { failure: None },
            5,
            "S",
        );
        let output = render(summary(5, 1, 1, 0), collector);
        assert!(
            output.contains(
                r#"<failure message="failed broken" type="failed"><![CDATA[]]></failure>"#
            ),
            "output: {output}"
        );
    }

    #[test]
    fn attributes_are_escaped() {
        let mut collector = Collector::new();
        record(
            &mut collector,
            r#"handles <tags> & "quotes""#,
            TestStatus::Failed { failure: None },
            1,
            "Suite <1> & 'more'",
        );
        let output = render(summary(1, 1, 1, 0), collector);
        assert!(
            output.contains(
                r#"<testsuite name="Suite &lt;1&gt; &amp; &apos;more&apos;" tests="1""#
            ),
            "output: {output}"
        );
        assert!(
            output.contains(
                r#"<failure message="failed handles &lt;tags&gt; &amp; &quot;quotes&quot;" type="failed">"#
            ),
            "output: {output}"
        );
    }

    #[test]
    fn attribute_whitespace_uses_character_references() {
        let mut collector = Collector::new();
        record(
            &mut collector,
            "multi\nline\tname\r",
            TestStatus::Failed { failure: None },
            1,
            "Suite\none",
        );
        let output = render(summary(1, 1, 1, 0), collector);
        assert!(
            output.contains(r#"<testsuite name="Suite&#10;one" tests="1""#),
            "output: {output}"
        );
        assert!(
            output.contains(r#"<testcase name="multi&#10;line&#9;name&#13;" time="0.001">"#),
            "output: {output}"
        );
        assert!(
            output.contains(
                r#"<failure message="failed multi&#10;line&#9;name&#13;" type="failed">"#
            ),
            "output: {output}"
        );
    }

    #[test]
    fn payload_carriage_returns_are_referenced() {
        let mut collector = Collector::new();
        record(
            &mut collector,
            "crlf",
            TestStatus::failed(FailureDetail::new("a\r\nb", ["x.rb:1\r"])),
            1,
            "S",
        );
        let output = render(summary(1, 1, 1, 0), collector);
        assert!(
            output.contains(
                "<![CDATA[a]]>&#13;<![CDATA[\nb\nx.rb:1]]>&#13;</failure>"
            ),
            "output: {output}"
        );
        assert!(!output.contains('\r'), "output: {output}");
    }

    #[test]
    fn config_is_honored() {
        let mut collector = Collector::new();
        record(&mut collector, "quick", TestStatus::Passed, 1, "S");

        let mut config = ReportConfig::default();
        config.set_indent(4).set_time_precision(6);
        let output = Report::build(summary(1, 1, 0, 0), collector)
            .to_string(&config)
            .unwrap();
        assert!(
            output.contains("\n    <testsuite name=\"S\""),
            "output: {output}"
        );
        assert!(
            output.contains("\n        <testcase name=\"quick\" time=\"0.001000\"/>"),
            "output: {output}"
        );
    }

    #[test_case("plain", &["plain"] ; "no terminator")]
    #[test_case("", &[""] ; "empty")]
    #[test_case("a]]>b", &["a]]", ">b"] ; "single terminator")]
    #[test_case("]]>]]>", &["]]", ">]]", ">"] ; "adjacent terminators")]
    #[test_case("x]]y]]>", &["x]]y]]", ">"] ; "trailing terminator")]
    fn split_cdata(input: &str, expected: &[&str]) {
        let sections = cdata_sections(input);
        assert_eq!(sections, expected);
        assert_eq!(sections.concat(), input);
        for section in sections {
            assert!(!section.contains("]]>"));
        }
    }

    #[test_case("", &[PayloadPiece::Cdata("")] ; "empty")]
    #[test_case("a\r\nb", &[PayloadPiece::Cdata("a"), PayloadPiece::CarriageReturn, PayloadPiece::Cdata("\nb")] ; "crlf")]
    #[test_case("\r", &[PayloadPiece::CarriageReturn] ; "lone carriage return")]
    #[test_case("x]]>\r]]>", &[PayloadPiece::Cdata("x]]"), PayloadPiece::Cdata(">"), PayloadPiece::CarriageReturn, PayloadPiece::Cdata("]]"), PayloadPiece::Cdata(">")] ; "mixed with terminators")]
    fn split_payload(input: &str, expected: &[PayloadPiece<'_>]) {
        assert_eq!(payload_pieces(input), expected);
    }

    #[test_case("tab\tand\nnewline\r", false, "tab\tand\nnewline\r" ; "whitespace kept")]
    #[test_case("bell\x07 nul\x00", false, "bell nul" ; "control characters removed")]
    #[test_case("\x1b[31mred\x1b[0m", true, "red" ; "ansi stripped")]
    #[test_case("\x1b[31mred\x1b[0m", false, "[31mred[0m" ; "ansi kept but escape removed")]
    #[test_case("<&>]]> ünïcødé 🦀", true, "<&>]]> ünïcødé 🦀" ; "printable text unchanged")]
    fn sanitize_text(input: &str, strip_ansi: bool, expected: &str) {
        assert_eq!(sanitize(input, strip_ansi), expected);
    }
}
