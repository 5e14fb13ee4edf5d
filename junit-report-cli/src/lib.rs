// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line driver for `junit-report`.
//!
//! Reads host events as JSON lines, feeds them through a [`JunitFormatter`], and writes the
//! finished report once the `run-finished` event arrives.

mod output;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser};
use color_eyre::{
    Result,
    eyre::{WrapErr, bail},
};
use junit_report::{FormatterState, JunitFormatter, ReportConfig, events::HostEvent};
use output::OutputOpts;
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
};

/// Convert a JSON-lines test event log into a JUnit XML report.
#[derive(Debug, Parser)]
#[command(version, styles = output::clap_styles::style())]
pub struct JunitReportApp {
    /// File to read events from, or `-` for standard input
    #[arg(long, short, value_name = "PATH", default_value = "-")]
    input: Utf8PathBuf,

    /// File to write the report to [default: standard output]
    #[arg(long, short, value_name = "PATH")]
    output: Option<Utf8PathBuf>,

    #[command(flatten)]
    report_opts: ReportOpts,

    #[command(flatten)]
    output_opts: OutputOpts,
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Report options")]
struct ReportOpts {
    /// Number of spaces per indentation level
    #[arg(long, value_name = "N", default_value_t = ReportConfig::DEFAULT_INDENT)]
    indent: usize,

    /// Number of decimal places for durations
    #[arg(long, value_name = "N", default_value_t = ReportConfig::DEFAULT_TIME_PRECISION)]
    time_precision: usize,

    /// Keep ANSI escape sequences in failure output
    #[arg(long)]
    no_strip_ansi: bool,
}

impl ReportOpts {
    fn to_config(&self) -> ReportConfig {
        let mut config = ReportConfig::default();
        config
            .set_indent(self.indent)
            .set_time_precision(self.time_precision)
            .set_strip_ansi(!self.no_strip_ansi);
        config
    }
}

impl JunitReportApp {
    /// Executes the app.
    pub fn exec(self) -> Result<()> {
        self.output_opts.init()?;
        let config = self.report_opts.to_config();

        let report = if self.input == "-" {
            replay_events(io::stdin().lock(), config)
                .wrap_err("failed to replay events from standard input")?
        } else {
            let file = File::open(&self.input)
                .wrap_err_with(|| format!("failed to open event log `{}`", self.input))?;
            replay_events(BufReader::new(file), config)
                .wrap_err_with(|| format!("failed to replay events from `{}`", self.input))?
        };

        match &self.output {
            Some(path) => {
                write_report_file(path, &report)?;
                tracing::info!("wrote JUnit report to {path}");
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(&report)
                    .and_then(|()| stdout.flush())
                    .wrap_err("failed to write JUnit report to standard output")?;
            }
        }

        Ok(())
    }
}

/// Feeds every event in `reader` through a formatter, returning the rendered report.
///
/// Blank lines are skipped. It is an error for the stream to end before a `run-finished` event,
/// or to contain anything other than blank lines after one.
pub fn replay_events(reader: impl BufRead, config: ReportConfig) -> Result<Vec<u8>> {
    let mut state = FormatterState::Collecting(JunitFormatter::new(Vec::new(), config));

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.wrap_err_with(|| format!("failed to read line {line_number}"))?;
        if line.trim().is_empty() {
            continue;
        }

        let formatter = match state {
            FormatterState::Collecting(formatter) => formatter,
            FormatterState::Finished(_) => {
                bail!("unexpected event on line {line_number} after run-finished");
            }
        };

        let event = HostEvent::from_json(&line)
            .wrap_err_with(|| format!("invalid event on line {line_number}"))?;
        tracing::trace!(line = line_number, ?event, "handling event");
        state = formatter
            .handle_event(event)
            .wrap_err_with(|| format!("failed to handle event on line {line_number}"))?;
    }

    match state {
        FormatterState::Finished(report) => Ok(report),
        FormatterState::Collecting(formatter) => bail!(
            "event stream ended without a run-finished event ({} outcomes recorded, no report written)",
            formatter.collector().len(),
        ),
    }
}

fn write_report_file(path: &Utf8Path, report: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .wrap_err_with(|| format!("failed to create directory `{dir}`"))?;
    }

    atomicwrites::AtomicFile::new(path, atomicwrites::AllowOverwrite)
        .write(|file| file.write_all(report))
        .wrap_err_with(|| format!("failed to write JUnit report to `{path}`"))
}
