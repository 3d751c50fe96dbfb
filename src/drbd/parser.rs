//! Parser for the kernel-exported `/proc/drbd` status file.
//!
//! The file starts with a two-line header (a `version` line and a source
//! version line), followed by exactly two lines per replicated resource:
//!
//! ```text
//! version: 8.4.11-1 (api:1/proto:86-101)
//! srcversion: 211FB288A383ED945B83420
//!  0: cs:Connected ro:Primary/Secondary ds:UpToDate/UpToDate C r-----
//!     ns:6218 nr:0 dw:6218 dr:1325 al:14 bm:0 lo:0 pe:0 ua:0 ap:0 ep:1 wo:f oos:0
//! ```
//!
//! The first line of a block carries the resource name (`0:` above), three
//! `key:value` tokens, and two positional tokens for the replication
//! protocol and the I/O suspension flags. The second line carries thirteen
//! `key:value` counters. Values that parse as base-10 integers become
//! [`AttrValue::Integer`], everything else stays [`AttrValue::Text`].
//!
//! Parsing is strict: wrong token counts, tokens without a `:` separator,
//! truncated blocks, and duplicate resource names are all fatal.

use super::error::ParseError;
use super::{AttrValue, Resource, ResourceMap, attrs};

/// Token count of the first line of a resource block.
const OVERVIEW_TOKENS: usize = 6;

/// Token count of the second line of a resource block.
const DETAIL_TOKENS: usize = 13;

/// Parses the raw status-file text into a map from resource name to record.
///
/// The returned map is keyed by resource name, so iteration order is
/// deterministic regardless of the order of blocks in the file.
///
/// # Errors
///
/// Returns a [`ParseError`] naming the offending line or token if the input
/// deviates from the fixed format in any way.
pub fn parse(input: &str) -> Result<ResourceMap, ParseError> {
    let mut lines = input.lines().enumerate().map(|(idx, line)| (idx + 1, line));

    let (_, header) = lines.next().ok_or(ParseError::MissingHeader { line: 1 })?;
    if !header.starts_with("version") {
        return Err(ParseError::InvalidHeader {
            line: 1,
            content: header.trim().to_owned(),
        });
    }
    // Line 2 is the source-version line; its content is not interpreted.
    lines.next().ok_or(ParseError::MissingHeader { line: 2 })?;

    let mut resources = ResourceMap::new();
    while let Some((lineno, overview)) = lines.next() {
        let (name, mut resource) = parse_overview_line(overview, lineno)?;
        let (detail_lineno, detail) = lines.next().ok_or_else(|| ParseError::TruncatedBlock {
            resource: name.clone(),
        })?;
        parse_detail_line(detail, detail_lineno, &mut resource)?;
        if resources.insert(name.clone(), resource).is_some() {
            return Err(ParseError::DuplicateResource {
                resource: name,
                line: lineno,
            });
        }
    }
    Ok(resources)
}

/// Parses the first line of a resource block.
///
/// Yields the resource name (the leading token with its trailing `:`
/// stripped) and a record holding the three `key:value` tokens plus the two
/// positional tokens under the synthetic [`attrs::REPLICATION_PROTOCOL`] and
/// [`attrs::IO_FLAGS`] codes.
fn parse_overview_line(line: &str, lineno: usize) -> Result<(String, Resource), ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != OVERVIEW_TOKENS {
        return Err(ParseError::TokenCount {
            line: lineno,
            expected: OVERVIEW_TOKENS,
            found: tokens.len(),
            content: line.trim().to_owned(),
        });
    }

    let name = tokens[0]
        .strip_suffix(':')
        .ok_or_else(|| ParseError::UnterminatedName {
            token: tokens[0].to_owned(),
            line: lineno,
        })?;

    let mut resource = Resource::new();
    for token in &tokens[1..OVERVIEW_TOKENS - 2] {
        let (key, value) = parse_kv_token(token, lineno)?;
        resource.insert(key, value);
    }
    resource.insert(
        attrs::REPLICATION_PROTOCOL.to_owned(),
        AttrValue::Text(tokens[OVERVIEW_TOKENS - 2].to_owned()),
    );
    resource.insert(
        attrs::IO_FLAGS.to_owned(),
        AttrValue::Text(tokens[OVERVIEW_TOKENS - 1].to_owned()),
    );

    Ok((name.to_owned(), resource))
}

/// Parses the second line of a resource block into the given record.
fn parse_detail_line(line: &str, lineno: usize, resource: &mut Resource) -> Result<(), ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != DETAIL_TOKENS {
        return Err(ParseError::TokenCount {
            line: lineno,
            expected: DETAIL_TOKENS,
            found: tokens.len(),
            content: line.trim().to_owned(),
        });
    }
    for token in tokens {
        let (key, value) = parse_kv_token(token, lineno)?;
        resource.insert(key, value);
    }
    Ok(())
}

/// Splits a `key:value` token on its first `:` and types the value.
///
/// The value becomes an [`AttrValue::Integer`] only when the full string is
/// a valid base-10 integer; otherwise it is kept verbatim as text.
fn parse_kv_token(token: &str, lineno: usize) -> Result<(String, AttrValue), ParseError> {
    let (key, value) = token
        .split_once(':')
        .ok_or_else(|| ParseError::MissingSeparator {
            token: token.to_owned(),
            line: lineno,
        })?;
    let value = match value.parse::<i64>() {
        Ok(n) => AttrValue::Integer(n),
        Err(_) => AttrValue::Text(value.to_owned()),
    };
    Ok((key.to_owned(), value))
}
