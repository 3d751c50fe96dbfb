//! Command-line configuration.
//!
//! The probe itself takes no tuning beyond which file to read and which
//! accepted ranges to apply: the hosting framework passes per-metric
//! threshold overrides as repeated `--range METRIC=LOW:HIGH` options, which
//! are layered over the built-in threshold table.

use std::path::PathBuf;

use clap::Parser;

use crate::metrics::{self, Range, Thresholds, UnknownMetric};

/// Well-known path of the kernel replication status file.
pub const DEFAULT_STATUS_FILE: &str = "/proc/drbd";

#[derive(Debug, Parser)]
#[command(
    name = "drbd-check",
    version,
    about = "Checks DRBD replication state from /proc/drbd and reports plugin status"
)]
pub struct Config {
    /// Path of the replication status file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_STATUS_FILE)]
    pub status_file: PathBuf,

    /// Override the accepted range of one metric; may be repeated.
    #[arg(long = "range", value_name = "METRIC=LOW:HIGH", value_parser = parse_range_override)]
    pub ranges: Vec<RangeOverride>,
}

/// One parsed `--range` override.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeOverride {
    pub metric: String,
    pub range: Range,
}

fn parse_range_override(arg: &str) -> Result<RangeOverride, String> {
    let (metric, bounds) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected METRIC=LOW:HIGH, got `{arg}`"))?;
    if !metrics::METRIC_NAMES.contains(&metric) {
        return Err(format!(
            "unknown metric `{metric}`, expected one of: {}",
            metrics::METRIC_NAMES.join(", ")
        ));
    }
    let (low, high) = bounds
        .split_once(':')
        .ok_or_else(|| format!("expected LOW:HIGH bounds, got `{bounds}`"))?;
    let low: f64 = low
        .parse()
        .map_err(|_| format!("invalid lower bound `{low}`"))?;
    let high: f64 = high
        .parse()
        .map_err(|_| format!("invalid upper bound `{high}`"))?;
    if low > high {
        return Err(format!("lower bound {low} exceeds upper bound {high}"));
    }
    Ok(RangeOverride {
        metric: metric.to_owned(),
        range: Range::new(low, high),
    })
}

impl Config {
    /// The default threshold table with the command-line overrides applied.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownMetric`] for an override naming a metric the probe
    /// does not derive. Overrides built through [`Config::parse`] have
    /// already been validated, so this only fires for hand-built configs.
    pub fn thresholds(&self) -> Result<Thresholds, UnknownMetric> {
        let mut thresholds = Thresholds::default();
        for RangeOverride { metric, range } in &self.ranges {
            thresholds.set(metric, *range)?;
        }
        Ok(thresholds)
    }
}
