//! Structured error type for `/proc/drbd` parsing failures.
//!
//! Every variant names the offending line (1-based, counted over the whole
//! file) and, where applicable, the token or resource that could not be
//! handled. Any [`ParseError`] is fatal for the probe run: no partial
//! resource map is ever returned.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("status file ended before header line {line}")]
    MissingHeader { line: usize },

    #[error("header line {line} does not start with `version`: `{content}`")]
    InvalidHeader { line: usize, content: String },

    #[error("expected {expected} tokens at line {line}, found {found}: `{content}`")]
    TokenCount {
        line: usize,
        expected: usize,
        found: usize,
        content: String,
    },

    #[error("missing `:` separator in token `{token}` at line {line}")]
    MissingSeparator { token: String, line: usize },

    #[error("resource name token `{token}` at line {line} does not end with `:`")]
    UnterminatedName { token: String, line: usize },

    #[error("status file ended in the middle of the block for resource `{resource}`")]
    TruncatedBlock { resource: String },

    #[error("duplicate resource `{resource}` at line {line}")]
    DuplicateResource { resource: String, line: usize },
}
