//! Derivation of the fixed metric set and threshold evaluation.
//!
//! [`MetricSet::derive`] indexes into the aggregate statistics to compute
//! the five named metrics the probe reports. [`evaluate`] compares each
//! metric against its accepted [`Range`] and escalates the plugin status to
//! critical for every violation, while all metrics stay reported as
//! perfdata regardless of outcome.

use std::collections::BTreeMap;
use std::fmt;

use crate::drbd::{AttrValue, Resource, ResourceMap, attrs};
use crate::plugin::{self, Status};
use crate::stats::DrbdStats;

pub const PERCENTAGE_UP_TO_DATE: &str = "percentage_up_to_date";
pub const PERCENTAGE_UP_TO_DATE_OR_AHEAD: &str = "percentage_up_to_date_or_ahead";
pub const PERCENTAGE_CONNECTED: &str = "percentage_connected";
pub const PERCENTAGE_LOCAL_PRIMARY: &str = "percentage_local_primary";
pub const ABNORMAL_IO_FLAGS: &str = "abnormal_io_flags";

/// All metric names, in reporting order.
pub const METRIC_NAMES: &[&str] = &[
    PERCENTAGE_UP_TO_DATE,
    PERCENTAGE_UP_TO_DATE_OR_AHEAD,
    PERCENTAGE_CONNECTED,
    PERCENTAGE_LOCAL_PRIMARY,
    ABNORMAL_IO_FLAGS,
];

/// I/O flags of a resource with fully operational, unsuspended I/O.
pub const NORMAL_IO_FLAGS: &str = "r-----";

/// One named metric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    pub name: &'static str,
    pub value: f64,
}

/// The fixed set of metrics derived from one status snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSet {
    metrics: Vec<Metric>,
}

impl MetricSet {
    /// Computes all metrics from the aggregate statistics and the raw
    /// resource map.
    ///
    /// Percentage lookups default to 0, so an empty snapshot yields all-zero
    /// percentages rather than failing.
    pub fn derive(stats: &DrbdStats, resources: &ResourceMap) -> Self {
        let ds_both =
            |value: &str| stats.lr_counts("ds").map_or(0.0, |lr| lr.both().percentage(value));

        let up_to_date = ds_both("UpToDate");
        let up_to_date_or_ahead = up_to_date + ds_both("Ahead") + ds_both("Behind");
        let connected = stats.counts("cs").map_or(0.0, |t| t.percentage("Connected"));
        let local_primary = stats
            .lr_counts("ro")
            .map_or(0.0, |lr| lr.local().percentage("Primary"));
        let abnormal_io_flags = resources
            .values()
            .filter(|resource| !has_normal_io_flags(resource))
            .count();

        Self {
            metrics: vec![
                Metric {
                    name: PERCENTAGE_UP_TO_DATE,
                    value: up_to_date,
                },
                Metric {
                    name: PERCENTAGE_UP_TO_DATE_OR_AHEAD,
                    value: up_to_date_or_ahead,
                },
                Metric {
                    name: PERCENTAGE_CONNECTED,
                    value: connected,
                },
                Metric {
                    name: PERCENTAGE_LOCAL_PRIMARY,
                    value: local_primary,
                },
                Metric {
                    name: ABNORMAL_IO_FLAGS,
                    value: abnormal_io_flags as f64,
                },
            ],
        }
    }

    /// Iterates over the metrics in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter()
    }

    /// Looks up one metric value by name.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.metrics
            .iter()
            .find(|metric| metric.name == name)
            .map(|metric| metric.value)
    }
}

fn has_normal_io_flags(resource: &Resource) -> bool {
    matches!(
        resource.get(attrs::IO_FLAGS),
        Some(AttrValue::Text(flags)) if flags == NORMAL_IO_FLAGS
    )
}

/// Inclusive acceptable range of one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub low: f64,
    pub high: f64,
}

impl Range {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Whether the value lies within `[low, high]`.
    pub fn contains(self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}]",
            plugin::format_value(self.low),
            plugin::format_value(self.high)
        )
    }
}

/// Raised when a threshold override names a metric that does not exist.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric `{0}`")]
pub struct UnknownMetric(pub String);

/// Accepted range per metric, defaulting to the fixed threshold table.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    ranges: BTreeMap<&'static str, Range>,
}

impl Default for Thresholds {
    fn default() -> Self {
        let mut ranges = BTreeMap::new();
        ranges.insert(PERCENTAGE_UP_TO_DATE, Range::new(90.0, 100.0));
        ranges.insert(PERCENTAGE_UP_TO_DATE_OR_AHEAD, Range::new(100.0, 100.0));
        ranges.insert(PERCENTAGE_CONNECTED, Range::new(100.0, 100.0));
        ranges.insert(PERCENTAGE_LOCAL_PRIMARY, Range::new(100.0, 100.0));
        ranges.insert(ABNORMAL_IO_FLAGS, Range::new(0.0, 0.0));
        Self { ranges }
    }
}

impl Thresholds {
    /// The accepted range of one metric.
    pub fn range(&self, name: &str) -> Option<Range> {
        self.ranges.get(name).copied()
    }

    /// Replaces the accepted range of one metric.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownMetric`] if the name is not in [`METRIC_NAMES`].
    pub fn set(&mut self, name: &str, range: Range) -> Result<(), UnknownMetric> {
        let key = *METRIC_NAMES
            .iter()
            .find(|&&known| known == name)
            .ok_or_else(|| UnknownMetric(name.to_owned()))?;
        self.ranges.insert(key, range);
        Ok(())
    }
}

/// Outcome of checking a metric set against its thresholds.
#[derive(Debug)]
pub struct Evaluation {
    pub status: Status,
    pub violations: Vec<String>,
}

/// Classifies the metric set against the thresholds.
///
/// Status starts at [`Status::Ok`] and escalates to [`Status::Critical`]
/// for every metric outside its accepted range, with one explanatory
/// message per violation. Metrics without a configured range are reported
/// but never checked.
pub fn evaluate(metrics: &MetricSet, thresholds: &Thresholds) -> Evaluation {
    let mut status = Status::Ok;
    let mut violations = Vec::new();
    for metric in metrics.iter() {
        if let Some(range) = thresholds.range(metric.name) {
            if !range.contains(metric.value) {
                status = status.escalate(Status::Critical);
                violations.push(format!(
                    "{} = {} out of accepted range {range}",
                    metric.name,
                    plugin::format_value(metric.value),
                ));
            }
        }
    }
    Evaluation { status, violations }
}
