//! Error types surfaced by parsing, querying and configuration.

use thiserror::Error;

/// A selector string that cannot be parsed at all.
///
/// Raised for malformed id, class, attribute or pseudo-class tokens and for
/// unknown pseudo-class names. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} in selector `{selector}`")]
pub struct SyntaxError {
    /// What went wrong.
    pub message: String,
    /// The full input string that was being parsed.
    pub selector: String,
}

/// Errors returned by the public query operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The selector string could not be parsed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A node handle passed to a query does not belong to the queried tree.
    #[error("node {0} does not belong to the queried tree")]
    UnknownNode(String),
}

/// Failure reported by a host-native selector evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("native evaluation of `{selector}` failed: {reason}")]
pub struct NativeError {
    /// The native selector string that was handed to the evaluator.
    pub selector: String,
    /// Host-provided explanation.
    pub reason: String,
}

/// Errors raised while loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document is not valid JSON for the expected shape.
    #[error("invalid engine configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A bounded cache must be able to hold at least one entry.
    #[error("cache_capacity must be greater than zero")]
    ZeroCapacity,
}
