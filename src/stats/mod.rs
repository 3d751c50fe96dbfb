//! Aggregation of parsed resource records into summary statistics.
//!
//! [`aggregate`] transposes a [`ResourceMap`] into per-attribute value
//! sequences and reduces them according to the attribute taxonomy in
//! [`crate::drbd::attrs`]: summable codes are summed, enumerable codes are
//! counted per distinct value, and `Local/Remote` codes are split and
//! counted per side as well as combined.
//!
//! The resulting [`DrbdStats`] snapshot is immutable and deterministic: the
//! resource map iterates in name order, and all tables are ordered by key.
//! Percentage lookups through [`CountTable::percentage`] are total
//! functions, answering 0 for values that were never observed and for empty
//! tables, so callers never divide by zero.

mod error;

pub use error::{Error, Result};

use std::collections::BTreeMap;

use crate::drbd::{AttrValue, ResourceMap, attrs};

/// Occurrence counts of the distinct values of one attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountTable {
    counts: BTreeMap<String, u64>,
}

impl CountTable {
    fn add(&mut self, value: &str) {
        *self.counts.entry(value.to_owned()).or_insert(0) += 1;
    }

    /// Pointwise sum of two count tables.
    fn merged(&self, other: &CountTable) -> CountTable {
        let mut merged = self.clone();
        for (value, count) in &other.counts {
            *merged.counts.entry(value.clone()).or_insert(0) += count;
        }
        merged
    }

    /// Returns how often the given value occurred, 0 if never.
    pub fn count(&self, value: &str) -> u64 {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Total occurrences over all distinct values.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Percentage of occurrences that were the given value.
    ///
    /// Answers 0 for values that never occurred and for empty tables.
    pub fn percentage(&self, value: &str) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.count(value) as f64 * 100.0 / total as f64
    }

    /// Materializes the full percentage table over the observed values.
    pub fn percentages(&self) -> BTreeMap<&str, f64> {
        self.counts
            .keys()
            .map(|value| (value.as_str(), self.percentage(value)))
            .collect()
    }

    /// Iterates over `(value, count)` pairs in value order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(value, count)| (value.as_str(), *count))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Per-side counts of a `Local/Remote` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LrCounts {
    local: CountTable,
    remote: CountTable,
    both: CountTable,
}

impl LrCounts {
    /// Counts of the local-side values only.
    pub fn local(&self) -> &CountTable {
        &self.local
    }

    /// Counts of the remote-side values only.
    pub fn remote(&self) -> &CountTable {
        &self.remote
    }

    /// Combined counts: the pointwise sum of local and remote.
    pub fn both(&self) -> &CountTable {
        &self.both
    }
}

/// Immutable statistics snapshot over all resources of one status file.
#[derive(Debug, Clone, PartialEq)]
pub struct DrbdStats {
    totals: BTreeMap<String, i64>,
    enumerable: BTreeMap<String, CountTable>,
    lr_enumerable: BTreeMap<String, LrCounts>,
}

impl DrbdStats {
    /// Summed totals per summable attribute code.
    ///
    /// Every code in [`attrs::SUMMABLE_KEYS`] is present, 0 when no resource
    /// reported it.
    pub fn totals(&self) -> &BTreeMap<String, i64> {
        &self.totals
    }

    /// Summed total of one summable code, 0 if never observed.
    pub fn total(&self, code: &str) -> i64 {
        self.totals.get(code).copied().unwrap_or(0)
    }

    /// Count table of a plain enumerable code.
    pub fn counts(&self, code: &str) -> Option<&CountTable> {
        self.enumerable.get(code)
    }

    /// Per-side count tables of a `Local/Remote` code.
    pub fn lr_counts(&self, code: &str) -> Option<&LrCounts> {
        self.lr_enumerable.get(code)
    }
}

/// Reduces the resource map into a [`DrbdStats`] snapshot.
///
/// Pure and deterministic: the same map always yields identical statistics.
/// Every code of the attribute taxonomy gets an entry even when no resource
/// carries it, so lookups on an empty map behave like empty tables rather
/// than missing ones.
///
/// # Errors
///
/// Returns an [`Error`] if a summable attribute holds a non-integer value
/// or a `Local/Remote` attribute does not split into exactly two parts on
/// `/`.
pub fn aggregate(resources: &ResourceMap) -> Result<DrbdStats> {
    let by_attribute = transpose(resources);
    let empty: Vec<&AttrValue> = Vec::new();

    let mut totals = BTreeMap::new();
    for &code in attrs::SUMMABLE_KEYS {
        let values = by_attribute.get(code).unwrap_or(&empty);
        let mut sum = 0i64;
        for value in values {
            sum += value.as_integer().ok_or_else(|| Error::ExpectedInteger {
                attribute: code.to_owned(),
                value: value.to_string(),
            })?;
        }
        totals.insert(code.to_owned(), sum);
    }

    let mut enumerable = BTreeMap::new();
    for &code in attrs::ENUMERABLE_KEYS {
        let mut table = CountTable::default();
        for value in by_attribute.get(code).unwrap_or(&empty) {
            table.add(&value.to_string());
        }
        enumerable.insert(code.to_owned(), table);
    }

    let mut lr_enumerable = BTreeMap::new();
    for &code in attrs::LR_ENUMERABLE_KEYS {
        let mut local = CountTable::default();
        let mut remote = CountTable::default();
        for value in by_attribute.get(code).unwrap_or(&empty) {
            let (local_part, remote_part) = split_pair(code, value)?;
            local.add(local_part);
            remote.add(remote_part);
        }
        let both = local.merged(&remote);
        lr_enumerable.insert(
            code.to_owned(),
            LrCounts {
                local,
                remote,
                both,
            },
        );
    }

    Ok(DrbdStats {
        totals,
        enumerable,
        lr_enumerable,
    })
}

/// Groups attribute values across all resources by attribute code.
///
/// Value order within a group follows resource-name order, since the map
/// iterates sorted by key.
fn transpose(resources: &ResourceMap) -> BTreeMap<&str, Vec<&AttrValue>> {
    let mut by_attribute: BTreeMap<&str, Vec<&AttrValue>> = BTreeMap::new();
    for resource in resources.values() {
        for (code, value) in resource {
            by_attribute.entry(code.as_str()).or_default().push(value);
        }
    }
    by_attribute
}

/// Splits a `Local/Remote` value into its two sides.
fn split_pair<'a>(code: &str, value: &'a AttrValue) -> Result<(&'a str, &'a str)> {
    let malformed = || Error::MalformedPair {
        attribute: code.to_owned(),
        value: value.to_string(),
    };
    let text = value.as_text().ok_or_else(malformed)?;
    let (local, remote) = text.split_once('/').ok_or_else(malformed)?;
    if remote.contains('/') {
        return Err(malformed());
    }
    Ok((local, remote))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drbd;

    fn sample_resources() -> ResourceMap {
        let input = "\
version: 8.4.11-1 (api:1/proto:86-101)
srcversion: 211FB288A383ED945B83420
 0: cs:Connected ro:Primary/Secondary ds:UpToDate/UpToDate C r-----
    ns:6218 nr:0 dw:6218 dr:1325 al:14 bm:0 lo:0 pe:0 ua:0 ap:0 ep:1 wo:f oos:0
 1: cs:WFConnection ro:Secondary/Unknown ds:Diskless/UpToDate C r-----
    ns:100 nr:7 dw:0 dr:25 al:2 bm:0 lo:0 pe:0 ua:0 ap:0 ep:1 wo:f oos:0
";
        drbd::parse(input).unwrap()
    }

    #[test]
    fn sums_summable_attributes() {
        let stats = aggregate(&sample_resources()).unwrap();

        assert_eq!(stats.total("ns"), 6318);
        assert_eq!(stats.total("nr"), 7);
        assert_eq!(stats.total("dr"), 1350);
        assert_eq!(stats.total("al"), 16);
        assert_eq!(stats.total("pe"), 0);
    }

    #[test]
    fn counts_enumerable_attributes() {
        let stats = aggregate(&sample_resources()).unwrap();
        let cs = stats.counts("cs").unwrap();

        assert_eq!(cs.count("Connected"), 1);
        assert_eq!(cs.count("WFConnection"), 1);
        assert_eq!(cs.count("StandAlone"), 0);
        assert_eq!(cs.total(), 2);
    }

    #[test]
    fn splits_and_counts_local_remote_attributes() {
        let stats = aggregate(&sample_resources()).unwrap();
        let ds = stats.lr_counts("ds").unwrap();

        assert_eq!(ds.local().count("UpToDate"), 1);
        assert_eq!(ds.local().count("Diskless"), 1);
        assert_eq!(ds.remote().count("UpToDate"), 2);
        assert_eq!(ds.both().count("UpToDate"), 3);
        assert_eq!(ds.both().count("Diskless"), 1);
        assert_eq!(ds.both().total(), 4);
    }

    #[test]
    fn both_is_pointwise_sum_of_local_and_remote() {
        let stats = aggregate(&sample_resources()).unwrap();
        for code in drbd::attrs::LR_ENUMERABLE_KEYS {
            let lr = stats.lr_counts(code).unwrap();
            for (value, count) in lr.both().iter() {
                assert_eq!(
                    count,
                    lr.local().count(value) + lr.remote().count(value),
                    "mismatch for `{code}` value `{value}`"
                );
            }
        }
    }

    #[test]
    fn nonempty_percentage_tables_sum_to_100() {
        let stats = aggregate(&sample_resources()).unwrap();
        let cs = stats.counts("cs").unwrap();
        let sum: f64 = cs.percentages().values().sum();
        assert!((sum - 100.0).abs() < 1e-9);

        let ds_both = stats.lr_counts("ds").unwrap().both();
        let sum: f64 = ds_both.percentages().values().sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn percentage_lookups_default_to_zero() {
        let stats = aggregate(&sample_resources()).unwrap();
        let cs = stats.counts("cs").unwrap();
        assert_eq!(cs.percentage("StandAlone"), 0.0);

        let empty = CountTable::default();
        assert_eq!(empty.total(), 0);
        assert_eq!(empty.percentage("anything"), 0.0);
    }

    #[test]
    fn aggregation_is_deterministic() {
        let resources = sample_resources();
        let first = aggregate(&resources).unwrap();
        let second = aggregate(&resources).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_map_yields_zero_totals_and_empty_tables() {
        let stats = aggregate(&ResourceMap::new()).unwrap();

        for code in drbd::attrs::SUMMABLE_KEYS {
            assert_eq!(stats.total(code), 0);
        }
        for code in drbd::attrs::ENUMERABLE_KEYS {
            assert!(stats.counts(code).unwrap().is_empty());
        }
        for code in drbd::attrs::LR_ENUMERABLE_KEYS {
            let lr = stats.lr_counts(code).unwrap();
            assert!(lr.local().is_empty());
            assert!(lr.remote().is_empty());
            assert!(lr.both().is_empty());
            assert_eq!(lr.both().percentage("UpToDate"), 0.0);
        }
    }

    #[test]
    fn non_integer_summable_value_is_rejected() {
        let mut resources = sample_resources();
        resources
            .get_mut("0")
            .unwrap()
            .insert("ns".to_owned(), AttrValue::Text("lots".to_owned()));

        let err = aggregate(&resources).unwrap_err();
        match err {
            Error::ExpectedInteger { attribute, value } => {
                assert_eq!(attribute, "ns");
                assert_eq!(value, "lots");
            }
            other => panic!("expected ExpectedInteger, got {other:?}"),
        }
    }

    #[test]
    fn malformed_local_remote_value_is_rejected() {
        for bad in ["UpToDate", "a/b/c"] {
            let mut resources = sample_resources();
            resources
                .get_mut("0")
                .unwrap()
                .insert("ds".to_owned(), AttrValue::Text(bad.to_owned()));

            let err = aggregate(&resources).unwrap_err();
            match err {
                Error::MalformedPair { attribute, value } => {
                    assert_eq!(attribute, "ds");
                    assert_eq!(value, bad);
                }
                other => panic!("expected MalformedPair, got {other:?}"),
            }
        }
    }
}
