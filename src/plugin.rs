//! Monitoring-plugin output conventions.
//!
//! The hosting monitoring framework consumes a status classification, a set
//! of labeled numeric metrics (perfdata) for time-series recording, and a
//! free-text long output for diagnostics. The process exit code is a fixed
//! function of the status. This module renders all of that in the
//! conventional plugin form:
//!
//! ```text
//! CRITICAL: percentage_connected = 50 out of accepted range [100, 100] | percentage_connected=50 ...
//! <long output>
//! ```

use std::fmt;

/// Plugin status classification, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// Process exit code expected by the monitoring framework.
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    /// Returns the more severe of the two statuses.
    pub fn escalate(self, other: Status) -> Status {
        self.max(other)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        };
        write!(f, "{name}")
    }
}

/// Formats a metric value without a trailing fractional part when integral.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

/// One complete probe report: status, summary, perfdata, and long output.
#[derive(Debug)]
pub struct Report {
    status: Status,
    summaries: Vec<String>,
    perfdata: Vec<(String, f64)>,
    long_output: Option<String>,
}

impl Report {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            summaries: Vec::new(),
            perfdata: Vec::new(),
            long_output: None,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }

    /// Appends one human-readable summary clause to the first output line.
    pub fn add_summary(&mut self, summary: impl Into<String>) {
        self.summaries.push(summary.into());
    }

    /// Appends one labeled metric to the perfdata section.
    pub fn add_metric(&mut self, label: impl Into<String>, value: f64) {
        self.perfdata.push((label.into(), value));
    }

    /// Sets the free-text diagnostic block printed after the first line.
    pub fn set_long_output(&mut self, long_output: impl Into<String>) {
        self.long_output = Some(long_output.into());
    }

    /// Renders the full plugin output block.
    pub fn render(&self) -> String {
        let mut out = self.status.to_string();
        if !self.summaries.is_empty() {
            out.push_str(": ");
            out.push_str(&self.summaries.join(", "));
        }
        if !self.perfdata.is_empty() {
            out.push_str(" | ");
            let perfdata: Vec<String> = self
                .perfdata
                .iter()
                .map(|(label, value)| format!("{label}={}", format_value(*value)))
                .collect();
            out.push_str(&perfdata.join(" "));
        }
        if let Some(long_output) = &self.long_output {
            out.push('\n');
            out.push_str(long_output);
        }
        out
    }
}
