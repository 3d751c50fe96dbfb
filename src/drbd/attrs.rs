//! Attribute code taxonomy for `/proc/drbd` resource records.
//!
//! Every attribute code reported for a resource falls into one of three
//! disjoint sets that determine how it is aggregated:
//!
//! - *summable* codes hold integer counters and are summed across resources.
//! - *enumerable* codes hold plain string tokens and are counted per
//!   distinct value.
//! - *local/remote enumerable* codes hold composite `Local/Remote` strings
//!   that are split and counted per side.
//!
//! Two additional codes, [`REPLICATION_PROTOCOL`] and [`IO_FLAGS`], are
//! synthesized by the parser from positional tokens that do not appear in
//! `key:value` form in the status file.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Integer counter attributes, aggregated by summing across all resources.
pub const SUMMABLE_KEYS: &[&str] = &["ns", "nr", "dw", "dr", "al", "bm", "lo", "pe", "ua", "ap"];

/// String attributes, aggregated by counting occurrences per distinct value.
pub const ENUMERABLE_KEYS: &[&str] = &["cs"];

/// Composite `Local/Remote` attributes, counted per side and combined.
pub const LR_ENUMERABLE_KEYS: &[&str] = &["ro", "ds"];

/// Synthetic code for the positional replication-protocol token.
pub const REPLICATION_PROTOCOL: &str = "rp";

/// Synthetic code for the positional I/O-flags token.
pub const IO_FLAGS: &str = "iof";

static DESCRIPTIONS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::with_capacity(18);

    m.insert("cs", "connection state");
    m.insert("ro", "roles");
    m.insert("ds", "disk states");
    m.insert("ns", "network send");
    m.insert("nr", "network receive");
    m.insert("dw", "disk write");
    m.insert("dr", "disk read");
    m.insert("al", "activity log");
    m.insert("bm", "bit map");
    m.insert("lo", "local count");
    m.insert("pe", "pending");
    m.insert("ua", "unacknowledged");
    m.insert("ap", "application pending");
    m.insert("ep", "epochs");
    m.insert("wo", "write order");
    m.insert("oos", "out of sync");
    m.insert(REPLICATION_PROTOCOL, "replication protocol");
    m.insert(IO_FLAGS, "I/O flags");

    m
});

/// Returns true if the code is an integer counter summed across resources.
pub fn is_summable(code: &str) -> bool {
    SUMMABLE_KEYS.contains(&code)
}

/// Returns true if the code is counted per distinct value.
pub fn is_enumerable(code: &str) -> bool {
    ENUMERABLE_KEYS.contains(&code)
}

/// Returns true if the code holds a composite `Local/Remote` value.
pub fn is_lr_enumerable(code: &str) -> bool {
    LR_ENUMERABLE_KEYS.contains(&code)
}

/// Returns the human-readable description of an attribute code, if known.
pub fn describe(code: &str) -> Option<&'static str> {
    DESCRIPTIONS.get(code).copied()
}

/// Renders a `code = description` legend for the given attribute codes.
///
/// Codes without a known description are skipped. The legend is sorted and
/// deduplicated, and is appended to the diagnostic long output so readers do
/// not have to know the two-letter codes by heart.
pub fn legend<'a>(codes: impl IntoIterator<Item = &'a str>) -> String {
    let mut entries: Vec<String> = codes
        .into_iter()
        .filter_map(|code| describe(code).map(|desc| format!("{code} = {desc}")))
        .collect();
    entries.sort_unstable();
    entries.dedup();
    entries.join("\n")
}
