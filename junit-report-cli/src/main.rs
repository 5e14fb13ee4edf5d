// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::Parser;
use color_eyre::Result;
use junit_report_cli::JunitReportApp;

fn main() -> Result<()> {
    color_eyre::install()?;

    JunitReportApp::parse().exec()
}
