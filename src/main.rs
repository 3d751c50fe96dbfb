use clap::Parser;

use drbd_check::config::Config;

/// Entry point for the drbd-check monitoring probe.
///
/// Reads the kernel replication status file once, checks the derived
/// metrics against their accepted ranges, prints a monitoring-plugin
/// report, and exits with the code the framework expects (0 OK, 1 WARNING,
/// 2 CRITICAL, 3 UNKNOWN). Parse and I/O failures exit 3.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=debug drbd-check --range percentage_up_to_date=80:100
/// ```
fn main() {
    env_logger::init();
    let config = Config::parse();
    let report = drbd_check::run(&config);
    println!("{}", report.render());
    std::process::exit(report.exit_code());
}
