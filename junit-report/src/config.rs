// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Deserialize;

/// Options controlling how a [`Report`](crate::Report) is rendered.
///
/// Every field has a default, so an empty table deserializes to [`ReportConfig::default`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ReportConfig {
    /// The number of spaces to indent each nesting level by.
    pub indent: usize,

    /// The number of decimal places durations are rendered with.
    pub time_precision: usize,

    /// Whether to strip ANSI escape sequences from failure output.
    pub strip_ansi: bool,
}

impl ReportConfig {
    /// The default indentation width.
    pub const DEFAULT_INDENT: usize = 2;

    /// The default number of decimal places for durations.
    pub const DEFAULT_TIME_PRECISION: usize = 3;

    /// Sets the indentation width.
    pub fn set_indent(&mut self, indent: usize) -> &mut Self {
        self.indent = indent;
        self
    }

    /// Sets the number of decimal places durations are rendered with.
    pub fn set_time_precision(&mut self, time_precision: usize) -> &mut Self {
        self.time_precision = time_precision;
        self
    }

    /// Sets whether ANSI escape sequences are stripped from failure output.
    pub fn set_strip_ansi(&mut self, strip_ansi: bool) -> &mut Self {
        self.strip_ansi = strip_ansi;
        self
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            indent: Self::DEFAULT_INDENT,
            time_precision: Self::DEFAULT_TIME_PRECISION,
            strip_ansi: true,
        }
    }
}
