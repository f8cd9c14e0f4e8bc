//! Selector compiler and tree query engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Parser**: selector strings to a reusable [`SelectorList`], with
//!   per-branch error recovery and an owned, bounded cache
//!   ([Selectors Level 4](https://www.w3.org/TR/selectors-4/) syntax plus the
//!   `$` subject prefix and the relative `*-match` pseudo-classes)
//! - **Pseudo registry**: a fixed table of pseudo-classes with argument grammars
//!   (`An+B`, nested selector lists, relative compound copies)
//! - **Matcher**: compound tests and backtracking combinator walks
//! - **Query engine**: candidate selection, optional native delegation with
//!   permanent fallback, merging and de-duplication
//!
//! The engine reads trees through [`TreeAdapter`]; an implementation for
//! [`sift_dom::DomTree`] is included.
//!
//! # Not Implemented
//!
//! - Specificity and cascade ordering
//! - Selector serialization beyond the native-evaluator string
//! - Live query subscriptions

/// Tree, host and native-evaluator traits.
pub mod adapter;
/// Bounded selector-string cache.
pub mod cache;
/// Native capability profile.
pub mod capability;
/// Engine configuration loaded from JSON.
pub mod config;
/// Error types.
pub mod error;
/// Selector string parser.
pub mod parser;
/// Pseudo-class registry, positional formulas and predicates.
pub mod pseudo;
/// Query entry points.
pub mod query;
/// Parsed selector representation.
pub mod selector;

mod dom;
mod matcher;

pub use adapter::{HostContext, NativeEvaluator, NoHost, NodeKind, StaticHost, TreeAdapter};
pub use cache::SelectorCache;
pub use capability::{CapabilityProfile, PseudoSupport};
pub use config::EngineConfig;
pub use error::{ConfigError, Error, NativeError, SyntaxError};
pub use parser::SelectorParser;
pub use pseudo::{PseudoKind, PseudoRegistry};
pub use query::{Engine, Scope};
pub use selector::{Selector, SelectorList};
