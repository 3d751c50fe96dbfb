//! drbd-check: a monitoring probe for DRBD block-device replication.
//!
//! Each invocation reads one point-in-time snapshot of the kernel-exported
//! status file (`/proc/drbd` by default), parses the per-resource records,
//! aggregates summary statistics across all resources, derives a fixed set
//! of named metrics, and checks each against its accepted range. The result
//! is rendered in monitoring-plugin conventions and mapped to the framework
//! exit codes; fatal failures (unreadable or malformed input) classify the
//! run as `UNKNOWN` with a diagnostic trace instead of partial results.

pub mod config;
pub mod drbd;
pub mod fsutil;
pub mod metrics;
pub mod plugin;
pub mod stats;

use config::Config;
use metrics::MetricSet;
use plugin::{Report, Status};

/// Fatal probe failures. Any of these aborts the run and is reported as
/// `UNKNOWN`; threshold violations are not errors and never appear here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    FileRead(#[from] fsutil::FileReadError),
    #[error(transparent)]
    Parse(#[from] drbd::ParseError),
    #[error(transparent)]
    Stats(#[from] stats::Error),
    #[error(transparent)]
    UnknownMetric(#[from] metrics::UnknownMetric),
}

/// Runs the probe once and always yields a printable report.
///
/// Successful runs report every metric as perfdata and dump the parsed
/// resource map as long output, with status `OK` or `CRITICAL` per the
/// threshold evaluation. Failed runs report `UNKNOWN` with the error chain
/// as long output and no perfdata.
pub fn run(config: &Config) -> Report {
    match probe(config) {
        Ok(report) => report,
        Err(err) => {
            log::error!("probe failed: {err}");
            failure_report(&err)
        }
    }
}

fn probe(config: &Config) -> Result<Report, Error> {
    let raw = fsutil::read_to_string(&config.status_file)?;
    let resources = drbd::parse(&raw)?;
    log::debug!(
        "parsed {} resources from `{}`",
        resources.len(),
        config.status_file.display()
    );

    let aggregated = stats::aggregate(&resources)?;
    let metric_set = MetricSet::derive(&aggregated, &resources);
    let thresholds = config.thresholds()?;
    let evaluation = metrics::evaluate(&metric_set, &thresholds);
    for violation in &evaluation.violations {
        log::warn!("{violation}");
    }

    let mut report = Report::new(evaluation.status);
    if evaluation.violations.is_empty() {
        report.add_summary("all metrics within accepted ranges");
    }
    for violation in evaluation.violations {
        report.add_summary(violation);
    }
    for metric in metric_set.iter() {
        report.add_metric(metric.name, metric.value);
    }
    report.set_long_output(diagnostic_dump(&resources));
    Ok(report)
}

/// JSON dump of the parsed resource map, followed by an attribute legend.
fn diagnostic_dump(resources: &drbd::ResourceMap) -> String {
    let dump = serde_json::to_string_pretty(resources)
        .unwrap_or_else(|err| format!("failed to serialize resource map: {err}"));
    let codes = resources
        .values()
        .flat_map(|resource| resource.keys())
        .map(String::as_str);
    let legend = drbd::attrs::legend(codes);
    if legend.is_empty() {
        dump
    } else {
        format!("{dump}\n{legend}")
    }
}

fn failure_report(err: &Error) -> Report {
    let mut report = Report::new(Status::Unknown);
    report.add_summary(err.to_string());
    report.set_long_output(error_trace(err));
    report
}

/// Renders the full cause chain of an error, one cause per line.
fn error_trace(err: &dyn std::error::Error) -> String {
    let mut trace = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        trace.push_str("\ncaused by: ");
        trace.push_str(&cause.to_string());
        source = cause.source();
    }
    trace
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;

    fn config_for(contents: &str) -> (Config, tempfile::NamedTempFile) {
        let mut tmp = tempfile::NamedTempFile::new().expect("failed to create temp file");
        tmp.write_all(contents.as_bytes())
            .expect("failed to write temp file");
        let config = Config {
            status_file: tmp.path().to_path_buf(),
            ranges: Vec::new(),
        };
        (config, tmp)
    }

    #[test]
    fn healthy_snapshot_reports_ok() {
        let (config, _tmp) = config_for(
            "\
version: 8.4.11-1 (api:1/proto:86-101)
srcversion: 211FB288A383ED945B83420
 0: cs:Connected ro:Primary/Secondary ds:UpToDate/UpToDate C r-----
    ns:6218 nr:0 dw:6218 dr:1325 al:14 bm:0 lo:0 pe:0 ua:0 ap:0 ep:1 wo:f oos:0
",
        );
        let report = run(&config);

        assert_eq!(report.status(), Status::Ok);
        assert_eq!(report.exit_code(), 0);
        let rendered = report.render();
        assert!(rendered.starts_with("OK: all metrics within accepted ranges"));
        assert!(rendered.contains("percentage_connected=100"));
        assert!(rendered.contains("abnormal_io_flags=0"));
        // long output carries the resource dump and the attribute legend
        assert!(rendered.contains("\"cs\": \"Connected\""));
        assert!(rendered.contains("cs = connection state"));
    }

    #[test]
    fn disconnected_resource_reports_critical_with_all_perfdata() {
        let (config, _tmp) = config_for(
            "\
version: 8.4.11-1 (api:1/proto:86-101)
srcversion: 211FB288A383ED945B83420
 0: cs:Connected ro:Primary/Secondary ds:UpToDate/UpToDate C r-----
    ns:6218 nr:0 dw:6218 dr:1325 al:14 bm:0 lo:0 pe:0 ua:0 ap:0 ep:1 wo:f oos:0
 1: cs:WFConnection ro:Primary/Secondary ds:Diskless/UpToDate C r-----
    ns:0 nr:0 dw:0 dr:0 al:0 bm:0 lo:0 pe:0 ua:0 ap:0 ep:1 wo:f oos:0
",
        );
        let report = run(&config);

        assert_eq!(report.status(), Status::Critical);
        assert_eq!(report.exit_code(), 2);
        let rendered = report.render();
        assert!(rendered.starts_with("CRITICAL: "));
        assert!(rendered.contains("percentage_connected = 50 out of accepted range [100, 100]"));
        // violated or not, every metric is still reported for trending
        assert!(rendered.contains("percentage_connected=50"));
        assert!(rendered.contains("percentage_up_to_date=75"));
    }

    #[test]
    fn malformed_input_reports_unknown_without_metrics() {
        let (config, _tmp) = config_for(
            "\
version: 8.4.11-1 (api:1/proto:86-101)
srcversion: 211FB288A383ED945B83420
 0: cs:Connected ro:Primary/Secondary ds:UpToDate/UpToDate r-----
    ns:0 nr:0 dw:0 dr:0 al:0 bm:0 lo:0 pe:0 ua:0 ap:0 ep:1 wo:f oos:0
",
        );
        let report = run(&config);

        assert_eq!(report.status(), Status::Unknown);
        assert_eq!(report.exit_code(), 3);
        let rendered = report.render();
        assert!(rendered.starts_with("UNKNOWN: "));
        assert!(rendered.contains("expected 6 tokens at line 3"));
        assert!(!rendered.contains('|'), "no perfdata on fatal failure");
    }

    #[test]
    fn missing_status_file_reports_unknown_with_trace() {
        let config = Config {
            status_file: PathBuf::from("/definitely/does/not/exist"),
            ranges: Vec::new(),
        };
        let report = run(&config);

        assert_eq!(report.status(), Status::Unknown);
        let rendered = report.render();
        assert!(rendered.contains("failed to read file `/definitely/does/not/exist`"));
        assert!(rendered.contains("caused by: "));
    }

    #[test]
    fn empty_snapshot_is_critical_not_unknown() {
        let (config, _tmp) = config_for("version: 8.4.11\nsrcversion: x\n");
        let report = run(&config);

        assert_eq!(report.status(), Status::Critical);
        let rendered = report.render();
        assert!(rendered.contains("percentage_connected = 0 out of accepted range"));
        assert!(rendered.contains("abnormal_io_flags=0"));
    }
}
